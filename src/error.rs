use thiserror::Error;

use crate::types::CopyPair;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read canonical document ({context}): {message}")]
    Document {
        context: &'static str,
        message: String,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("alignment unavailable ({context}): {message}")]
    AlignmentUnavailable {
        context: &'static str,
        message: String,
    },
    #[error("cross-witness linking failed for {pair}: {message}")]
    CrossLinkFailure { pair: CopyPair, message: String },
    #[error("skip detection failed for {pair}: {message}")]
    SkipDetectionFailure { pair: CopyPair, message: String },
    #[error("run cancelled during {phase}")]
    Cancelled { phase: String },
}

impl AlignmentError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn document(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Document {
            context,
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn alignment_unavailable(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::AlignmentUnavailable {
            context,
            message: err.to_string(),
        }
    }

    pub(crate) fn cross_link(pair: CopyPair, err: impl std::fmt::Display) -> Self {
        Self::CrossLinkFailure {
            pair,
            message: err.to_string(),
        }
    }

    pub(crate) fn skip_detection(pair: CopyPair, err: impl std::fmt::Display) -> Self {
        Self::SkipDetectionFailure {
            pair,
            message: err.to_string(),
        }
    }

    /// Cancellation helper for status callbacks.
    pub fn cancelled(phase: impl Into<String>) -> Self {
        Self::Cancelled {
            phase: phase.into(),
        }
    }
}
