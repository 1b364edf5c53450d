pub mod block;
pub mod chart;
pub mod envelope;
pub mod execution;

pub use block::{BlockDraft, BlockKind, ContentBlock, ToolUseParts};
pub use chart::{ChartRoute, ChartType, NormalizedChart};
pub use envelope::StreamEnvelope;
pub use execution::ToolExecution;
