pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use alignment::artifact::{AlignmentArtifact, DebugEntry};
pub use alignment::canonical::read_canonical;
pub use alignment::spellcheck::SpellcheckIndex;
pub use config::EngineConfig;
pub use error::AlignmentError;
pub use pipeline::builder::EngineBuilder;
pub use pipeline::runtime::{CopyAlignment, WitnessAligner};
pub use pipeline::traits::{LineScorer, Normalizer, SequenceAligner};
pub use types::{
    AlignedLine, CopyId, CopyPair, EngineInput, OcrLine, RunPhase, SkipEntry, SpellcheckPayload,
    SpellcheckRecord,
};
