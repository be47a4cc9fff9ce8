//! The combined alignment payload and its JSON shape.
//!
//! Line records keep their cross-witness pointers keyed by target copy; the
//! per-pair field names the viewer expects (`alt`, `alt3_list`,
//! `ocr_alt2_best`, ...) are only produced here, at serialization time.

use std::path::Path;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::AlignmentError;
use crate::types::{AlignedLine, CopyId, CopyPair, SkipEntry, SpellcheckRecord};

pub const ALGO_VERSION: &str = concat!(
    "tahkik-align/",
    env!("CARGO_PKG_VERSION"),
    "/hirschberg-spans"
);

/// Field stem for pointers held by a line of `source` towards `target`.
/// Pointers into copy 1 are always `alt`; copies 1 and 2 also share `alt`
/// in the other direction; everything else is `altN` for target copy N.
pub fn pointer_stem(source: CopyId, target: CopyId) -> &'static str {
    match (source, target) {
        (_, CopyId::First) | (CopyId::First, CopyId::Second) => "alt",
        (_, CopyId::Second) => "alt2",
        (_, CopyId::Third) => "alt3",
        (_, CopyId::Fourth) => "alt4",
    }
}

/// Artifact key of the skip report whose inspected lines belong to
/// `pair.source` and whose reference is `pair.target`: reads as "what copy
/// `target` misses compared to copy `source`".
pub fn skip_key(pair: CopyPair) -> String {
    format!("skips_{}_vs_{}", pair.target, pair.source)
}

/// Skip reports the artifact carries, as `(source, target)` pairs.
pub const SKIP_PAIRS: [(CopyId, CopyId); 4] = [
    (CopyId::Second, CopyId::First),
    (CopyId::First, CopyId::Second),
    (CopyId::Third, CopyId::First),
    (CopyId::Fourth, CopyId::First),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugEntry {
    pub name: String,
    pub description: String,
    pub output: String,
    pub data: serde_json::Value,
}

impl DebugEntry {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        output: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            output: output.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyRecords {
    pub copy: CopyId,
    pub lines: Vec<AlignedLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentArtifact {
    pub algo_version: String,
    pub docx_path: String,
    pub tahkik_tokens: Vec<String>,
    /// Copy 1 first; at most four entries.
    pub copies: Vec<CopyRecords>,
    /// Keyed by `(source, target)`; a missing entry is omitted from the JSON.
    pub skips: Vec<(CopyPair, Vec<SkipEntry>)>,
    pub spellcheck: Vec<SpellcheckRecord>,
    pub debug_log: Vec<DebugEntry>,
}

impl AlignmentArtifact {
    pub fn copy(&self, copy: CopyId) -> Option<&CopyRecords> {
        self.copies.iter().find(|c| c.copy == copy)
    }

    pub fn lines(&self, copy: CopyId) -> &[AlignedLine] {
        self.copy(copy).map(|c| c.lines.as_slice()).unwrap_or(&[])
    }

    pub fn skips_for(&self, source: CopyId, target: CopyId) -> Option<&[SkipEntry]> {
        let pair = CopyPair::new(source, target);
        self.skips
            .iter()
            .find(|(p, _)| *p == pair)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn to_json_pretty(&self) -> Result<String, AlignmentError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AlignmentError::json("serialize alignment artifact", e))
    }

    /// Write indented JSON next to `path` and rename it into place.
    pub fn write_atomic(&self, path: &Path) -> Result<(), AlignmentError> {
        let json = self.to_json_pretty()?;
        let mut tmp_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| AlignmentError::invalid_input("artifact path has no file name"))?;
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        std::fs::write(&tmp_path, json.as_bytes())
            .map_err(|e| AlignmentError::io("write artifact temp file", e))?;
        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(AlignmentError::io("rename artifact into place", e));
        }
        tracing::info!(path = %path.display(), bytes = json.len(), "alignment artifact written");
        Ok(())
    }
}

fn copy_suffix(copy: CopyId) -> &'static str {
    match copy {
        CopyId::First => "",
        CopyId::Second => "_alt",
        CopyId::Third => "_alt3",
        CopyId::Fourth => "_alt4",
    }
}

impl Serialize for AlignmentArtifact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("algo_version", &self.algo_version)?;
        map.serialize_entry("docx_path", &self.docx_path)?;
        map.serialize_entry("tahkik_word_count", &self.tahkik_tokens.len())?;
        map.serialize_entry("tahkik_tokens", &self.tahkik_tokens)?;

        for copy in CopyId::ALL {
            let lines = self.lines(copy);
            let records: Vec<LineRecord<'_>> =
                lines.iter().map(|line| LineRecord { copy, line }).collect();
            let suffix = copy_suffix(copy);
            if copy != CopyId::First {
                map.serialize_entry(&format!("has{suffix}"), &self.copy(copy).is_some())?;
            }
            map.serialize_entry(&format!("lines_count{suffix}"), &lines.len())?;
            map.serialize_entry(&format!("aligned{suffix}"), &records)?;
        }

        for (source, target) in SKIP_PAIRS {
            if let Some(entries) = self.skips_for(source, target) {
                map.serialize_entry(&skip_key(CopyPair::new(source, target)), entries)?;
            }
        }

        map.serialize_entry("spellcheck", &self.spellcheck)?;
        map.serialize_entry("debug_log", &self.debug_log)?;
        map.end()
    }
}

/// One aligned line as the viewer reads it.
struct LineRecord<'a> {
    copy: CopyId,
    line: &'a AlignedLine,
}

impl Serialize for LineRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let line = self.line;
        let provenance = &line.provenance;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("line_no", &line.line_no)?;
        map.serialize_entry("line_image", &provenance.line_image)?;
        map.serialize_entry("ocr_text", &line.ocr_text)?;
        if let Some(page_image) = &provenance.page_image {
            map.serialize_entry("page_image", page_image)?;
        }
        if let Some(page_name) = &provenance.page_name {
            map.serialize_entry("page_name", page_name)?;
        }
        if let Some(bbox) = &provenance.bbox {
            map.serialize_entry("bbox", bbox)?;
        }
        if let Some(line_index) = &provenance.line_index {
            map.serialize_entry("line_index", line_index)?;
        }
        map.serialize_entry("best", &line.best)?;
        map.serialize_entry("error_hits", &line.error_hits)?;
        map.serialize_entry("error_count", &line.error_count)?;
        map.serialize_entry("is_empty_ocr", &line.is_empty_ocr)?;
        map.serialize_entry("ocr_wc", &line.ocr_wc)?;
        map.serialize_entry("seg_wc", &line.seg_wc)?;

        for (&target, links) in &line.links {
            let stem = pointer_stem(self.copy, target);
            if let Some(alt) = &links.alt {
                map.serialize_entry(stem, alt)?;
            }
            map.serialize_entry(&format!("{stem}_list"), &links.alt_list)?;
            map.serialize_entry(&format!("ocr_{stem}_list"), &links.ocr_alt_list)?;
            if let Some(best) = &links.ocr_alt_best {
                map.serialize_entry(&format!("ocr_{stem}_best"), best)?;
            }
        }
        map.end()
    }
}
