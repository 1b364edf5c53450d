//! # Agent Stream Parser
//!
//! Turns the free-form text an agentic LLM backend streams back into an
//! ordered list of typed content blocks that a renderer can walk in order.
//!
//! ## Overview
//!
//! The pipeline runs one way:
//! - **Tag segmentation** - pseudo-XML tags (`<thinking>`, `<tool_call>`, ...) split the text
//! - **Block classification** - each tagged body maps to a [`models::BlockKind`]
//! - **Chart sniffing** - chart JSON in text or tool output becomes a `chart` block
//! - **Stream assembly** - newline-delimited `{type, data}` envelopes are rebuilt from network chunks
//!
//! Malformed input never produces an error: the worst case is plain text.
//!
//! ## Quick Start
//!
//! ```rust
//! use agent_stream_parser::{BlockKind, parse_structured_content};
//!
//! let blocks = parse_structured_content(
//!     "<thinking>Plan.</thinking>\n\nDo it.\n\n<final_answer>Done.</final_answer>",
//! );
//! assert_eq!(blocks.len(), 3);
//! assert_eq!(blocks[0].kind(), BlockKind::Thinking);
//! assert_eq!(blocks[2].content(), "Done.");
//! ```
//!
//! ## Modules
//!
//! - [`parser`] - Tag segmenter, block classifier and the parsing driver
//! - [`chart`] - Chart detection, sniffing and normalization
//! - [`streaming`] - Chunk assembler for the envelope stream
//! - [`models`] - Block, chart, envelope and tool execution types
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and handling
//! - [`metrics`] - Parse counters

pub mod chart;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod streaming;

pub use config::{ParseOptions, ParserConfig};
pub use error::{ParserError, Result};
pub use models::{BlockKind, ChartRoute, ChartType, ContentBlock, NormalizedChart, StreamEnvelope, ToolExecution};
pub use parser::{StructuredParser, parse_structured_content};
pub use streaming::StreamAssembler;
