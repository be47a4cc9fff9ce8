use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tahkik_align::{
    read_canonical, EngineBuilder, EngineConfig, EngineInput, OcrLine, RunPhase,
    SpellcheckPayload,
};
use tracing_subscriber::EnvFilter;

const MAX_COPIES: usize = 4;

#[derive(Debug, Parser)]
#[command(name = "tahkik_align")]
#[command(about = "Align OCR lines of up to four manuscript copies against an edited text")]
struct Args {
    /// Canonical document (.docx, or plain UTF-8 text).
    #[arg(long, env = "TAHKIK_ALIGN_CANONICAL")]
    canonical: PathBuf,
    /// OCR lines of one copy as JSON; repeat in copy order (copy 1 first).
    #[arg(long = "copy", required = true, num_args = 1)]
    copies: Vec<PathBuf>,
    #[arg(long, env = "TAHKIK_ALIGN_SPELLCHECK")]
    spellcheck: Option<PathBuf>,
    /// Engine configuration JSON; flags below override its values.
    #[arg(long, env = "TAHKIK_ALIGN_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "TAHKIK_ALIGN_OUT", default_value = "alignment.json")]
    out: PathBuf,
    #[arg(long, env = "TAHKIK_ALIGN_PREFIX_WORDS")]
    prefix_words: Option<usize>,
    #[arg(long, env = "TAHKIK_ALIGN_OVERLAP_MAX_KEEP")]
    overlap_max_keep: Option<usize>,
    #[arg(long, env = "TAHKIK_ALIGN_SKIP_MIN_RUN")]
    skip_min_run: Option<usize>,
}

/// A copy file is either a bare array of lines or `{ "lines": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CopyFile {
    Lines(Vec<OcrLine>),
    Wrapped { lines: Vec<OcrLine> },
}

impl CopyFile {
    fn into_lines(self) -> Vec<OcrLine> {
        match self {
            Self::Lines(lines) | Self::Wrapped { lines } => lines,
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = run() {
        eprintln!("tahkik_align: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    if args.copies.len() > MAX_COPIES {
        return Err(format!(
            "at most {MAX_COPIES} --copy files are supported, got {}",
            args.copies.len()
        ));
    }

    let config = build_config(&args)?;
    let aligner = EngineBuilder::new(config)
        .build()
        .map_err(|e| e.to_string())?;

    let canonical_text = read_canonical(&args.canonical).map_err(|e| e.to_string())?;
    let copies = args
        .copies
        .iter()
        .map(|path| load_copy(path))
        .collect::<Result<Vec<_>, _>>()?;
    let spellcheck = args
        .spellcheck
        .as_deref()
        .map(SpellcheckPayload::load)
        .transpose()
        .map_err(|e| e.to_string())?;

    let input = EngineInput {
        canonical_path: args.canonical.to_string_lossy().to_string(),
        canonical_text,
        copies,
        spellcheck,
    };

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(120));

    let result = aligner.run_with_status(&input, |phase| {
        match phase {
            RunPhase::LinkFailed(_) | RunPhase::SkipsFailed(_) => {
                progress.println(format!("warning: {phase}"));
            }
            _ => progress.set_message(phase.to_string()),
        }
        Ok(())
    });
    let artifact = match result {
        Ok(artifact) => artifact,
        Err(err) => {
            progress.abandon_with_message("failed");
            return Err(err.to_string());
        }
    };

    artifact
        .write_atomic(&args.out)
        .map_err(|e| e.to_string())?;
    progress.finish_with_message(format!("wrote {}", args.out.display()));
    Ok(())
}

fn build_config(args: &Args) -> Result<EngineConfig, String> {
    let mut config = match args.config.as_deref() {
        Some(path) => EngineConfig::load(path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    if let Some(prefix_words) = args.prefix_words {
        config.prefix_words = prefix_words;
    }
    if let Some(overlap_max_keep) = args.overlap_max_keep {
        config.overlap_max_keep = overlap_max_keep;
    }
    if let Some(skip_min_run) = args.skip_min_run {
        config.skip_min_run = skip_min_run;
    }
    Ok(config)
}

fn load_copy(path: &Path) -> Result<Vec<OcrLine>, String> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read copy {}: {e}", path.display()))?;
    let file: CopyFile = serde_json::from_str(&data)
        .map_err(|e| format!("failed to parse copy {}: {e}", path.display()))?;
    Ok(file.into_lines())
}
