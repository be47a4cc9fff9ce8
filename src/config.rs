use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AlignmentError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Leading words of each line that feed the prefix-level scoring ensemble.
    pub prefix_words: usize,
    pub w_main: f64,
    pub w_prefix: f64,
    /// Maximum length of every `*_list` pointer list.
    pub overlap_max_keep: usize,
    /// Minimum run of consecutive unmatched tokens in one source line that
    /// is reported as a skip.
    pub skip_min_run: usize,
    /// First code handed out to distinct skeletons when encoding streams.
    pub token_code_base: u32,
    /// Code reserved for tokens whose skeleton is empty.
    pub empty_sentinel: u32,
    /// Band of `seg_wc / ocr_wc` inside which no length penalty applies.
    pub length_band: [f64; 2],
    /// Penalty points per unit of ratio outside `length_band`.
    pub length_penalty_slope: f64,
    /// Largest magnitude the length penalty can reach.
    pub length_penalty_cap: f64,
}

impl EngineConfig {
    pub const DEFAULT_PREFIX_WORDS: usize = 4;
    pub const DEFAULT_OVERLAP_MAX_KEEP: usize = 6;
    pub const DEFAULT_SKIP_MIN_RUN: usize = 3;
    pub const DEFAULT_TOKEN_CODE_BASE: u32 = 0xE000;
    pub const DEFAULT_EMPTY_SENTINEL: u32 = 0xFFFF;

    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read engine config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| AlignmentError::json("parse engine config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AlignmentError> {
        if self.overlap_max_keep == 0 {
            return Err(AlignmentError::invalid_input(
                "overlap_max_keep must be at least 1",
            ));
        }
        if self.skip_min_run == 0 {
            return Err(AlignmentError::invalid_input("skip_min_run must be at least 1"));
        }
        let weights = [
            self.w_main,
            self.w_prefix,
            self.length_penalty_slope,
            self.length_penalty_cap,
            self.length_band[0],
            self.length_band[1],
        ];
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(AlignmentError::invalid_input(
                "scoring weights must be finite numbers",
            ));
        }
        if self.length_band[0] > self.length_band[1] {
            return Err(AlignmentError::invalid_input(format!(
                "length_band is inverted: [{}, {}]",
                self.length_band[0], self.length_band[1]
            )));
        }
        if self.token_code_base == self.empty_sentinel {
            return Err(AlignmentError::invalid_input(
                "token_code_base and empty_sentinel must differ",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prefix_words: Self::DEFAULT_PREFIX_WORDS,
            w_main: 0.85,
            w_prefix: 0.15,
            overlap_max_keep: Self::DEFAULT_OVERLAP_MAX_KEEP,
            skip_min_run: Self::DEFAULT_SKIP_MIN_RUN,
            token_code_base: Self::DEFAULT_TOKEN_CODE_BASE,
            empty_sentinel: Self::DEFAULT_EMPTY_SENTINEL,
            length_band: [0.7, 1.4],
            length_penalty_slope: 40.0,
            length_penalty_cap: 25.0,
        }
    }
}
