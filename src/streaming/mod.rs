pub mod assembler;

pub use assembler::{AssemblerStats, StreamAssembler, looks_like_incomplete_json};
