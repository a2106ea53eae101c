//! Run statistics

use std::time::{Duration, Instant};

const RULE_WIDTH: usize = 70;

/// Counters for one run
///
/// Passed by reference through the pipeline; nothing is derived and cached,
/// so the rendered summary always reflects the counters as they are.
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Files found by discovery
    pub total_discovered: usize,

    /// Tasks that produced an output
    pub succeeded: usize,

    /// Tasks (or files) that failed
    pub failed: usize,

    /// Same-type pairs and oversize files
    pub skipped: usize,

    /// Sum of output sizes of successful tasks
    pub bytes_processed: u64,

    /// `(relative path, reason)` in the order they happened
    pub failures: Vec<(String, String)>,

    started_at: Instant,
}

impl RunStats {
    /// Start a new run clock
    pub fn new() -> Self {
        Self {
            total_discovered: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            bytes_processed: 0,
            failures: Vec::new(),
            started_at: Instant::now(),
        }
    }

    pub fn record_success(&mut self, bytes: u64) {
        self.succeeded += 1;
        self.bytes_processed = self.bytes_processed.saturating_add(bytes);
    }

    pub fn record_failure(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push((path.into(), reason.into()));
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Time since the stats were created
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Summary block, one line per entry
    pub fn render(&self) -> Vec<String> {
        self.render_with_elapsed(self.elapsed())
    }

    fn render_with_elapsed(&self, elapsed: Duration) -> Vec<String> {
        let rule = "=".repeat(RULE_WIDTH);
        let mut lines = vec![
            rule.clone(),
            "CONVERSION STATISTICS".to_string(),
            rule.clone(),
            format!("Total files discovered: {}", self.total_discovered),
            format!("Successful conversions: {}", self.succeeded),
            format!("Failed conversions: {}", self.failed),
            format!("Skipped: {}", self.skipped),
            format!("Total data processed: {}", format_bytes(self.bytes_processed)),
            format!("Total runtime: {}", format_duration(elapsed)),
        ];

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("Failed Files:".to_string());
            for (path, reason) in &self.failures {
                lines.push(format!("  - {path}: {reason}"));
            }
        }

        lines.push(rule);
        lines
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable size, e.g. `12.3KB`
pub fn format_bytes(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1}{unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1}TB")
}

/// Human-readable duration: `4.2s`, `3m 2.0s` or `1h 4m`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{secs:.1}s")
    } else if secs < 3600.0 {
        let minutes = (secs / 60.0).floor();
        format!("{}m {:.1}s", minutes as u64, secs - minutes * 60.0)
    } else {
        let whole = duration.as_secs();
        format!("{}h {}m", whole / 3600, (whole % 3600) / 60)
    }
}
