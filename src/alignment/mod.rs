pub mod artifact;
pub mod canonical;
pub mod crosslink;
pub mod edit_ops;
pub mod global_align;
pub mod normalize;
pub mod scoring;
pub mod similarity;
pub mod skips;
pub mod spans;
pub mod spellcheck;
pub mod tokenization;
