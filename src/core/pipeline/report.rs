//! Run report written into the output tree

use super::stats::RunStats;
use crate::config::DocpipeConfig;
use crate::core::rotation::RotationOutcome;
use std::path::Path;

/// Accumulates per-file outcome lines for `run_report_{timestamp}.txt`
#[derive(Debug, Clone)]
pub struct RunReport {
    header: Vec<String>,
    entries: Vec<String>,
    rotation: Vec<String>,
}

impl RunReport {
    /// Start a report with the mode and configuration summary
    pub fn new(config: &DocpipeConfig, dry_run: bool) -> Self {
        let conversion = &config.conversion;
        let dirs = &config.directories;
        let header = vec![
            "Document Conversion Run Report".to_string(),
            format!(
                "Generated: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            ),
            format!("Mode: {}", if dry_run { "DRY RUN" } else { "PRODUCTION" }),
            String::new(),
            "Configuration:".to_string(),
            format!("  Input types: {}", conversion.input_types.join(", ")),
            format!("  Output types: {}", conversion.output_types.join(", ")),
            format!("  Max file size: {}MB", conversion.max_file_size_mb),
            format!("  Inputs directory: {}", dirs.active.display()),
            format!("  Outputs directory: {}", dirs.output.display()),
            format!("  Retry attempts: {}", conversion.retry_attempts),
            format!("  Engine: {}", config.engine.program),
            String::new(),
        ];

        Self {
            header,
            entries: Vec::new(),
            rotation: Vec::new(),
        }
    }

    pub fn success(&mut self, relative: &str, output: &Path) {
        self.entries
            .push(format!("SUCCESS: {} -> {}", relative, output.display()));
    }

    pub fn failure(&mut self, relative: &str, output: &Path, reason: &str) {
        self.entries.push(format!(
            "FAILED: {} -> {} ({})",
            relative,
            output.display(),
            reason
        ));
    }

    /// A file that could not be inspected before conversion
    pub fn unreadable(&mut self, relative: &str, reason: &str) {
        self.entries.push(format!("FAILED: {relative} ({reason})"));
    }

    pub fn skipped_size(&mut self, relative: &str, detail: &str) {
        self.entries
            .push(format!("SKIPPED (size): {relative} - {detail}"));
    }

    pub fn skipped_same_type(&mut self, relative: &str, format: &str) {
        self.entries
            .push(format!("SKIPPED (same type): {relative} -> {format}"));
    }

    pub fn dry_run(&mut self, relative: &str, output: &Path) {
        self.entries
            .push(format!("[DRY RUN] {} -> {}", relative, output.display()));
    }

    /// Record what rotation did, or `None` when it was disabled
    pub fn rotation(&mut self, outcome: Option<&RotationOutcome>) {
        self.rotation.clear();
        self.rotation.push("Rotation:".to_string());
        match outcome {
            None => self.rotation.push("  Disabled".to_string()),
            Some(outcome) => {
                self.rotation
                    .push(format!("  Archive: {}", outcome.archive_path.display()));
                self.rotation
                    .push(format!("  Staging -> active: {}", outcome.staging_moved));
                self.rotation
                    .push(format!("  Queue -> staging: {}", outcome.queue_moved));
                for issue in &outcome.issues {
                    self.rotation.push(format!("  INCONSISTENT: {issue}"));
                }
            }
        }
    }

    /// Record that the archive step failed and no tier was advanced
    pub fn rotation_aborted(&mut self, reason: &str) {
        self.rotation.clear();
        self.rotation.push("Rotation:".to_string());
        self.rotation.push(format!("  ROTATION ABORTED: {reason}"));
    }

    /// Outcome lines recorded so far
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Full report text
    pub fn render(&self, discovered: usize, stats: &RunStats) -> String {
        let mut lines = self.header.clone();
        lines.push(format!("Files discovered: {discovered}"));
        lines.push(String::new());
        lines.extend(self.entries.iter().cloned());
        if !self.rotation.is_empty() {
            lines.push(String::new());
            lines.extend(self.rotation.iter().cloned());
        }
        lines.push(String::new());
        lines.extend(stats.render());
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}
