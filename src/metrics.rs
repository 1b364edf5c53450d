use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters for the parsing pipeline and the chunk assembler
///
/// Thread-safe atomic counters; parsing itself stays stateless.
#[derive(Default)]
pub struct ParseMetrics {
    /// Messages run through the block pipeline
    pub documents_parsed: AtomicU64,

    /// Blocks emitted across all parses
    pub blocks_emitted: AtomicU64,

    /// Chart blocks among the emitted blocks
    pub charts_detected: AtomicU64,

    /// Open tags left as text because no close tag followed
    pub unclosed_tags: AtomicU64,

    /// Envelopes produced by chunk assemblers
    pub envelopes_emitted: AtomicU64,

    /// Assembler lines dropped as invalid
    pub lines_dropped: AtomicU64,

    /// Total parse time in microseconds
    pub total_parse_time_us: AtomicU64,
}

impl ParseMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed parse
    pub fn record_parse(&self, blocks: usize, charts: usize, unclosed: usize, duration: Duration) {
        self.documents_parsed.fetch_add(1, Ordering::Relaxed);
        self.blocks_emitted.fetch_add(blocks as u64, Ordering::Relaxed);
        self.charts_detected.fetch_add(charts as u64, Ordering::Relaxed);
        self.unclosed_tags.fetch_add(unclosed as u64, Ordering::Relaxed);
        self.total_parse_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_envelope(&self) {
        self.envelopes_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_line(&self) {
        self.lines_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get average parse time in microseconds
    pub fn avg_parse_time_us(&self) -> u64 {
        let total = self.total_parse_time_us.load(Ordering::Relaxed);
        let count = self.documents_parsed.load(Ordering::Relaxed);
        if count > 0 { total / count } else { 0 }
    }

    /// Get snapshot of current metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_parsed: self.documents_parsed.load(Ordering::Relaxed),
            blocks_emitted: self.blocks_emitted.load(Ordering::Relaxed),
            charts_detected: self.charts_detected.load(Ordering::Relaxed),
            unclosed_tags: self.unclosed_tags.load(Ordering::Relaxed),
            envelopes_emitted: self.envelopes_emitted.load(Ordering::Relaxed),
            lines_dropped: self.lines_dropped.load(Ordering::Relaxed),
            avg_parse_time_us: self.avg_parse_time_us(),
        }
    }

    /// Reset all metrics (useful for testing)
    pub fn reset(&self) {
        self.documents_parsed.store(0, Ordering::Relaxed);
        self.blocks_emitted.store(0, Ordering::Relaxed);
        self.charts_detected.store(0, Ordering::Relaxed);
        self.unclosed_tags.store(0, Ordering::Relaxed);
        self.envelopes_emitted.store(0, Ordering::Relaxed);
        self.lines_dropped.store(0, Ordering::Relaxed);
        self.total_parse_time_us.store(0, Ordering::Relaxed);
    }
}

/// Immutable snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub documents_parsed: u64,
    pub blocks_emitted: u64,
    pub charts_detected: u64,
    pub unclosed_tags: u64,
    pub envelopes_emitted: u64,
    pub lines_dropped: u64,
    pub avg_parse_time_us: u64,
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parse Metrics: {} documents, {} blocks ({} charts), {} unclosed tags, {} envelopes, {} dropped lines, avg {:.2}ms",
            self.documents_parsed,
            self.blocks_emitted,
            self.charts_detected,
            self.unclosed_tags,
            self.envelopes_emitted,
            self.lines_dropped,
            self.avg_parse_time_us as f64 / 1000.0
        )
    }
}

lazy_static::lazy_static! {
    /// Global metrics instance
    pub static ref PARSE_METRICS: ParseMetrics = ParseMetrics::new();
}
