use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tahkik_align::alignment::edit_ops::OpTag;
use tahkik_align::alignment::global_align::align_streams;
use tahkik_align::alignment::normalize::normalize_token;
use tahkik_align::pipeline::defaults::{
    ArabicSkeletonNormalizer, EnsembleLineScorer, HirschbergSequenceAligner,
};
use tahkik_align::{
    AlignedLine, AlignmentError, CopyId, EngineBuilder, EngineConfig, EngineInput, LineScorer,
    OcrLine, SpellcheckPayload, SpellcheckRecord, WitnessAligner,
};

const WORDS: [&str; 24] = [
    "بسم", "الله", "الرحمن", "الرحيم", "الحمد", "رب", "العالمين", "مالك", "يوم", "الدين", "اياك",
    "نعبد", "نستعين", "اهدنا", "الصراط", "المستقيم", "قال", "الشيخ", "الامام", "رحمه", "كتاب",
    "باب", "فصل", "بيان",
];
const NOISE: [&str; 6] = ["سين", "صاد", "ضاد", "طاء", "ظاء", "غين"];

fn engine() -> WitnessAligner {
    EngineBuilder::new(EngineConfig::default())
        .build()
        .expect("default engine builds")
}

fn words(range: std::ops::Range<usize>) -> String {
    WORDS[range].join(" ")
}

fn lines(texts: &[&str]) -> Vec<OcrLine> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| OcrLine::new(i + 1, *t))
        .collect()
}

fn spans(lines: &[AlignedLine]) -> Vec<(usize, usize)> {
    lines
        .iter()
        .map(|l| (l.best.start_word, l.best.end_word))
        .collect()
}

fn run(canonical: &str, copies: Vec<Vec<OcrLine>>) -> tahkik_align::AlignmentArtifact {
    engine()
        .run(&EngineInput {
            canonical_path: "canonical.txt".to_string(),
            canonical_text: canonical.to_string(),
            copies,
            spellcheck: None,
        })
        .expect("run succeeds")
}

fn assert_spans_well_formed(lines: &[AlignedLine], canonical: &[String]) {
    let m = canonical.len();
    for line in lines {
        let (s, e) = (line.best.start_word, line.best.end_word);
        assert!(s <= e && e <= m, "line {} has span [{s},{e}) over {m}", line.line_no);
        assert_eq!(line.best.raw, canonical[s..e].join(" "));
        assert_eq!(line.seg_wc, e - s);
    }
    for pair in lines.windows(2) {
        assert!(pair[0].best.start_word <= pair[1].best.start_word);
        assert_eq!(pair[0].best.end_word, pair[1].best.start_word);
    }
}

#[test]
fn exact_lines_map_to_exact_spans() {
    let aligner = engine();
    let canonical = aligner.tokenize_canonical(&words(0..5)).unwrap();
    let line_texts = [words(0..2), words(2..4), words(4..5)];
    let copy = lines(&line_texts.iter().map(String::as_str).collect::<Vec<_>>());
    let aligned = aligner.align_copy(&canonical, &copy, None).unwrap();

    assert_eq!(spans(&aligned.lines), vec![(0, 2), (2, 4), (4, 5)]);
    assert_eq!(aligned.anchor_count, 5);
    for (line, text) in aligned.lines.iter().zip(&line_texts) {
        assert_eq!(&line.best.raw, text);
        assert!(line.best.score >= 90, "score {}", line.best.score);
    }
}

#[test]
fn empty_middle_line_gets_empty_span() {
    let artifact = run(
        &words(0..5),
        vec![lines(&[&words(0..2), "", &words(3..5)])],
    );
    let copy = artifact.lines(CopyId::First);
    assert_eq!(spans(copy), vec![(0, 2), (2, 2), (2, 5)]);
    assert!(copy[1].is_empty_ocr);
    assert_eq!(copy[1].best.raw, "");
    assert_eq!(copy[1].best.score, 0);
}

#[test]
fn empty_line_next_to_unanchored_words_consumes_nothing() {
    let artifact = run(
        &words(0..6),
        vec![lines(&[&words(0..2), "", "سين صاد", &words(4..6)])],
    );
    assert_eq!(
        spans(artifact.lines(CopyId::First)),
        vec![(0, 2), (2, 2), (2, 4), (4, 6)]
    );
}

#[test]
fn lone_empty_line_in_gap_absorbs_half_of_it() {
    let artifact = run(&words(0..6), vec![lines(&[&words(0..2), "", &words(5..6)])]);
    assert_eq!(
        spans(artifact.lines(CopyId::First)),
        vec![(0, 2), (2, 3), (3, 6)]
    );
}

#[test]
fn noise_tokens_stay_inside_their_line_and_surface_as_skip() {
    let noisy = lines(&[
        &words(0..3),
        &format!("{} سين صاد ضاد {}", WORDS[3], WORDS[4]),
        &words(5..9),
    ]);
    let clean = lines(&[&words(0..3), &words(3..5), &words(5..9)]);
    let artifact = run(&words(0..9), vec![noisy, clean]);

    assert_eq!(
        spans(artifact.lines(CopyId::First)),
        vec![(0, 3), (3, 5), (5, 9)]
    );
    let align_n1 = artifact
        .debug_log
        .iter()
        .find(|entry| entry.name == "align_n1")
        .expect("copy 1 debug entry");
    assert_eq!(align_n1.data["edit_distance"], 3);
    let flagged = artifact
        .skips_for(CopyId::First, CopyId::Second)
        .expect("skip report present");
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].line_no, 2);
    assert!(flagged[0].max_consecutive_miss >= 3);
    assert!(artifact
        .skips_for(CopyId::Second, CopyId::First)
        .expect("reverse report present")
        .is_empty());
}

#[test]
fn two_missing_tokens_are_not_a_skip() {
    let noisy = lines(&[&format!("{} سين صاد {}", WORDS[0], WORDS[1])]);
    let clean = lines(&[&words(0..2)]);
    let artifact = run(&words(0..2), vec![noisy, clean]);
    assert!(artifact
        .skips_for(CopyId::First, CopyId::Second)
        .unwrap()
        .is_empty());
}

#[test]
fn identical_copies_point_at_each_other() {
    let copy = lines(&[&words(0..2), &words(2..4)]);
    let artifact = run(&words(0..4), vec![copy.clone(), copy]);

    for (source, target) in [(CopyId::First, CopyId::Second), (CopyId::Second, CopyId::First)] {
        let lines = artifact.lines(source);
        assert_eq!(spans(lines), vec![(0, 2), (2, 4)]);
        for line in lines {
            let links = &line.links[&target];
            assert_eq!(links.alt.as_ref().unwrap().line_no, line.line_no);
            assert_eq!(links.alt_list.len(), 1);
            assert_eq!(links.alt_list[0].line_no, line.line_no);
            assert_eq!(links.alt_list[0].overlap, 2);
            assert_eq!(links.ocr_alt_best.as_ref().unwrap().line_no, line.line_no);
            assert_eq!(links.ocr_alt_best.as_ref().unwrap().shared_tokens, 2);
        }
    }

    let json: Value = serde_json::from_str(&artifact.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["aligned"][0]["alt"]["line_no"], 1);
    assert_eq!(json["aligned_alt"][1]["alt_list"][0]["overlap"], 2);
    assert_eq!(json["aligned_alt"][1]["ocr_alt_best"]["line_no"], 2);
    assert_eq!(json["has_alt"], true);
    assert_eq!(json["has_alt3"], false);
}

#[test]
fn third_copy_uses_outward_pointer_names() {
    let copy = lines(&[&words(0..2), &words(2..4)]);
    let artifact = run(&words(0..4), vec![copy.clone(), copy.clone(), copy]);
    let json: Value = serde_json::from_str(&artifact.to_json_pretty().unwrap()).unwrap();

    let first = &json["aligned"][0];
    assert!(first.get("alt").is_some());
    assert!(first.get("alt3").is_some());
    assert!(first.get("ocr_alt3_list").is_some());
    let second = &json["aligned_alt"][0];
    assert!(second.get("alt").is_some());
    assert!(second.get("alt3").is_some());
    let third = &json["aligned_alt3"][0];
    assert!(third.get("alt").is_some());
    assert!(third.get("alt2").is_some());
    assert!(third.get("alt3").is_none());

    assert!(json.get("skips_n1_vs_n3").is_some());
    assert!(json.get("skips_n1_vs_n4").is_none());
}

fn generated_word(i: usize) -> String {
    const LETTERS: [char; 10] = ['ب', 'ت', 'ث', 'ج', 'ح', 'خ', 'د', 'ذ', 'ر', 'ز'];
    format!("{}{}م", LETTERS[i / 10], LETTERS[i % 10])
}

fn joined(indices: impl IntoIterator<Item = usize>) -> String {
    indices
        .into_iter()
        .map(generated_word)
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn copy_missing_a_run_of_words_is_reported_against_the_full_copy() {
    let canonical = joined(0..50);
    let breaks = [0, 5, 10, 19, 27, 35, 43, 50];
    let full: Vec<String> = breaks.windows(2).map(|w| joined(w[0]..w[1])).collect();
    let mut short = full.clone();
    short[3] = joined([19, 26]);

    let artifact = run(
        &canonical,
        vec![
            lines(&full.iter().map(String::as_str).collect::<Vec<_>>()),
            lines(&short.iter().map(String::as_str).collect::<Vec<_>>()),
        ],
    );

    let flagged = artifact
        .skips_for(CopyId::First, CopyId::Second)
        .expect("skips_n2_vs_n1 present");
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].line_no, 4);
    assert!(flagged[0].max_consecutive_miss >= 6);
    assert!(artifact
        .skips_for(CopyId::Second, CopyId::First)
        .expect("skips_n1_vs_n2 present")
        .is_empty());

    let json: Value = serde_json::from_str(&artifact.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["skips_n2_vs_n1"][0]["line_no"], 4);
    assert_eq!(json["skips_n1_vs_n2"], serde_json::json!([]));
}

#[test]
fn spellcheck_hits_follow_line_spans() {
    let canonical = "قال الصلوة ثم الزكوة وقال الصلوة رحمه الله";
    let copy = lines(&["قال الصلوة ثم", "الزكوة وقال الصلوة", "رحمه الله"]);
    let record = |wrong: &str, wrong_norm: Option<String>| SpellcheckRecord {
        wrong: wrong.to_string(),
        wrong_norm,
        suggestion: String::new(),
        reason: "rasm".to_string(),
        sources: Vec::new(),
    };
    let payload = SpellcheckPayload {
        errors_merged: vec![
            record("الصلوة", Some(normalize_token("الصلوة"))),
            record("الزكوة", None),
        ],
    };
    let artifact = engine()
        .run(&EngineInput {
            canonical_path: "canonical.txt".to_string(),
            canonical_text: canonical.to_string(),
            copies: vec![copy],
            spellcheck: Some(payload),
        })
        .unwrap();

    let aligned = artifact.lines(CopyId::First);
    let counts: Vec<(usize, usize)> = aligned
        .iter()
        .map(|l| (l.error_hits.len(), l.error_count))
        .collect();
    assert_eq!(counts, vec![(1, 1), (2, 2), (0, 0)]);
    assert_eq!(aligned[1].error_hits[1].word_index, 5);
    assert_eq!(artifact.spellcheck.len(), 2);
    assert_eq!(artifact.spellcheck[1].wrong_norm.as_deref(), Some("الزكوة"));
}

#[test]
fn single_token_canonical() {
    let artifact = run(WORDS[1], vec![lines(&[WORDS[1], WORDS[0]])]);
    assert_eq!(spans(artifact.lines(CopyId::First)), vec![(0, 1), (1, 1)]);
}

#[test]
fn all_empty_ocr_is_invalid_input() {
    let err = engine()
        .run(&EngineInput {
            canonical_path: String::new(),
            canonical_text: words(0..3),
            copies: vec![lines(&["", "  "])],
            spellcheck: None,
        })
        .unwrap_err();
    assert!(matches!(err, AlignmentError::InvalidInput { .. }));
}

#[test]
fn identical_streams_give_one_equal_opcode() {
    let tokens: Vec<String> = WORDS.iter().map(|w| normalize_token(w)).collect();
    let aligned = align_streams(&tokens, &tokens, &HirschbergSequenceAligner, 0xE000, 0xFFFF)
        .unwrap();
    assert_eq!(aligned.opcodes.len(), 1);
    assert_eq!(aligned.opcodes[0].tag, OpTag::Equal);
    assert_eq!(aligned.anchors().len(), tokens.len());
}

#[test]
fn punctuation_only_tokens_keep_their_index_but_never_anchor() {
    let canonical = format!("{} ، {} {}", WORDS[0], WORDS[1], WORDS[2]);
    let artifact = run(&canonical, vec![lines(&[WORDS[0], &words(1..3)])]);
    assert_eq!(artifact.tahkik_tokens.len(), 4);
    assert_eq!(spans(artifact.lines(CopyId::First)), vec![(0, 1), (1, 4)]);
}

fn random_copy(rng: &mut StdRng, canonical: &[&str]) -> Vec<OcrLine> {
    let mut tokens: Vec<&str> = Vec::new();
    for &word in canonical {
        let roll: f64 = rng.gen();
        if roll < 0.08 {
            continue;
        }
        if roll < 0.13 {
            tokens.push(NOISE[rng.gen_range(0..NOISE.len())]);
            continue;
        }
        if roll < 0.17 {
            tokens.push(NOISE[rng.gen_range(0..NOISE.len())]);
        }
        if roll < 0.19 {
            tokens.push("،");
        }
        tokens.push(word);
    }
    if tokens.is_empty() {
        tokens.push(canonical[0]);
    }

    let mut texts = Vec::new();
    let mut rest = tokens.as_slice();
    while !rest.is_empty() {
        if rng.gen_bool(0.1) {
            texts.push(String::new());
        }
        let take = rng.gen_range(1..=7).min(rest.len());
        texts.push(rest[..take].join(" "));
        rest = &rest[take..];
    }
    texts
        .into_iter()
        .enumerate()
        .map(|(i, t)| OcrLine::new(i + 1, t))
        .collect()
}

fn random_input(seed: u64) -> EngineInput {
    let mut rng = StdRng::seed_from_u64(seed);
    let len = rng.gen_range(20..80);
    let canonical: Vec<&str> = (0..len).map(|_| WORDS[rng.gen_range(0..WORDS.len())]).collect();
    let copies = (0..rng.gen_range(1..=4))
        .map(|_| random_copy(&mut rng, &canonical))
        .collect();
    EngineInput {
        canonical_path: format!("random-{seed}.txt"),
        canonical_text: canonical.join(" "),
        copies,
        spellcheck: None,
    }
}

#[test]
fn random_copies_yield_ordered_touching_spans() {
    let aligner = EngineBuilder::new(EngineConfig {
        overlap_max_keep: 64,
        ..EngineConfig::default()
    })
    .build()
    .unwrap();
    let scorer = EnsembleLineScorer::from_config(aligner.config());

    for seed in 0..24u64 {
        let input = random_input(seed);
        let artifact = aligner.run(&input).unwrap();
        assert_eq!(artifact.copies.len(), input.copies.len());

        for copy in &artifact.copies {
            assert_spans_well_formed(&copy.lines, &artifact.tahkik_tokens);
            for line in &copy.lines {
                assert_eq!(
                    scorer.score(&line.ocr_text, &line.best.raw, &ArabicSkeletonNormalizer),
                    Some(line.best.score)
                );
            }
        }

        for source in &artifact.copies {
            for line in &source.lines {
                for (target, links) in &line.links {
                    for entry in &links.alt_list {
                        let back = &artifact.lines(*target)[entry.line_no - 1].links[&source.copy];
                        let mirrored = back
                            .alt_list
                            .iter()
                            .find(|e| e.line_no == line.line_no)
                            .expect("overlap list is symmetric");
                        assert_eq!(mirrored.overlap, entry.overlap);
                    }
                }
            }
        }

        let pushed: u64 = artifact
            .debug_log
            .iter()
            .filter_map(|entry| entry.data.get("pushed_lines").and_then(Value::as_u64))
            .sum();
        assert_eq!(pushed, 0, "monotone anchors never need a push (seed {seed})");
    }
}

#[test]
fn runs_are_byte_identical() {
    let aligner = engine();
    for seed in [3u64, 11, 29] {
        let input = random_input(seed);
        let first = aligner.run(&input).unwrap().to_json_pretty().unwrap();
        let second = aligner.run(&input).unwrap().to_json_pretty().unwrap();
        assert_eq!(first, second);
    }
}
