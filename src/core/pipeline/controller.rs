//! Run sequencing
//!
//! One run walks a fixed sequence of states:
//! `Init -> Prepare -> Discover -> Validate -> Convert -> Rotate -> Report -> Done`.
//! Rotation only starts once every conversion has finished, so the archive
//! holds exactly what this run processed.

use super::report::RunReport;
use super::stats::{format_bytes, RunStats};
use crate::adapters::engine::ConversionEngine;
use crate::config::{DirectoriesConfig, DocpipeConfig};
use crate::core::catalog::discover;
use crate::core::convert::{ConversionOrchestrator, RetryPolicy};
use crate::core::naming::plan_task;
use crate::core::rotation::{RotationEngine, RotationOutcome};
use crate::core::store::{DryRunStore, FileStore, FsStore};
use crate::core::timestamp::now_stamp;
use crate::domain::{DocpipeError, InputFileRef, Result};
use crate::{log_file_outcome, log_phase};
use std::fmt;
use std::path::{Path, PathBuf};

/// Pipeline states in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunState {
    Init,
    Prepare,
    Discover,
    Validate,
    Convert,
    Rotate,
    Report,
    Done,
}

impl RunState {
    /// Every state, in order
    pub const SEQUENCE: [RunState; 8] = [
        RunState::Init,
        RunState::Prepare,
        RunState::Discover,
        RunState::Validate,
        RunState::Convert,
        RunState::Rotate,
        RunState::Report,
        RunState::Done,
    ];

    fn description(&self) -> &'static str {
        match self {
            RunState::Init => "Resolving directories",
            RunState::Prepare => "Creating directories and snapshotting outputs",
            RunState::Discover => "Scanning for input files",
            RunState::Validate => "Checking file sizes",
            RunState::Convert => "Processing documents",
            RunState::Rotate => "Input tier rotation",
            RunState::Report => "Writing run report",
            RunState::Done => "Run complete",
        }
    }
}

impl RunState {
    /// Upper-case name used in phase banners
    pub fn label(&self) -> &'static str {
        match self {
            RunState::Init => "INIT",
            RunState::Prepare => "PREPARE",
            RunState::Discover => "DISCOVERY",
            RunState::Validate => "VALIDATION",
            RunState::Convert => "CONVERSION",
            RunState::Rotate => "ROTATION",
            RunState::Report => "REPORT",
            RunState::Done => "DONE",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final counters
    pub stats: RunStats,

    /// `None` when rotation was disabled
    pub rotation: Option<RotationOutcome>,

    /// Output snapshot taken during Prepare (the would-be path in dry-run)
    pub snapshot_path: Option<PathBuf>,

    /// Written run report; `None` in dry-run or if writing failed
    pub report_path: Option<PathBuf>,

    /// Whether the run was a dry run
    pub dry_run: bool,

    /// States entered, in order
    pub states: Vec<RunState>,
}

impl RunOutcome {
    /// Process exit code for this outcome
    ///
    /// Fatal conditions never produce an outcome; the CLI maps those errors
    /// to 2 (configuration) or 5 (fatal).
    pub fn exit_code(&self) -> i32 {
        let rotation_consistent = self
            .rotation
            .as_ref()
            .map(RotationOutcome::is_consistent)
            .unwrap_or(true);

        if !rotation_consistent {
            3 // Rotation left tiers inconsistent
        } else if self.stats.failed > 0 {
            1 // Some conversions failed
        } else {
            0
        }
    }
}

/// Absolute tier and output paths for one run
#[derive(Debug, Clone)]
struct RunDirs {
    active: PathBuf,
    output: PathBuf,
    queue: PathBuf,
    staging: PathBuf,
}

impl RunDirs {
    fn resolve(dirs: &DirectoriesConfig) -> Result<Self> {
        let absolute = |path: &Path| {
            std::path::absolute(path).map_err(|e| DocpipeError::Directory {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        };
        Ok(Self {
            active: absolute(&dirs.active)?,
            output: absolute(&dirs.output)?,
            queue: absolute(&dirs.queue)?,
            staging: absolute(&dirs.staging)?,
        })
    }
}

/// Composition root for one pipeline run
pub struct PipelineController<'a> {
    config: DocpipeConfig,
    engine: &'a dyn ConversionEngine,
}

impl<'a> PipelineController<'a> {
    /// Create a controller for an already validated configuration
    pub fn new(config: DocpipeConfig, engine: &'a dyn ConversionEngine) -> Self {
        Self { config, engine }
    }

    /// Run with the store selected by `application.dry_run`
    ///
    /// # Errors
    ///
    /// Returns an error on fatal conditions: a directory that cannot be
    /// created, a failed output snapshot, a discovery path mismatch, or a
    /// failed rotation archive step.
    pub async fn run(&self) -> Result<RunOutcome> {
        if self.config.application.dry_run {
            self.execute(&DryRunStore::new()).await
        } else {
            self.execute(&FsStore::new()).await
        }
    }

    /// Run against an explicit store
    pub async fn execute(&self, store: &dyn FileStore) -> Result<RunOutcome> {
        let dry_run = store.is_dry_run();
        let mut states = Vec::with_capacity(RunState::SEQUENCE.len());
        let mut stats = RunStats::new();
        let mut report = RunReport::new(&self.config, dry_run);

        enter(&mut states, RunState::Init);
        if dry_run {
            tracing::warn!("DRY RUN MODE: no files will be written, moved or archived");
        }
        let dirs = RunDirs::resolve(&self.config.directories)?;

        enter(&mut states, RunState::Prepare);
        for dir in [&dirs.output, &dirs.queue, &dirs.staging, &dirs.active] {
            store.ensure_dir(dir)?;
        }
        let snapshot_path = if self.config.rotation.snapshot_outputs {
            store.snapshot(&dirs.output, &now_stamp())?
        } else {
            None
        };

        enter(&mut states, RunState::Discover);
        let files = discover(&dirs.active, &self.config.conversion.input_set())?;
        stats.total_discovered = files.len();
        tracing::info!(
            count = files.len(),
            input_types = ?self.config.conversion.input_types,
            output_types = ?self.config.conversion.output_types,
            "Found {} input files with allowed types",
            files.len()
        );
        if files.is_empty() {
            tracing::warn!(active = %dirs.active.display(), "No input files found to process");
        }

        enter(&mut states, RunState::Validate);
        let eligible = self.check_sizes(&files, &mut stats, &mut report);

        enter(&mut states, RunState::Convert);
        self.convert_all(&eligible, store, &dirs, &mut stats, &mut report)
            .await;

        enter(&mut states, RunState::Rotate);
        let rotation = if self.config.rotation.enabled {
            let engine = RotationEngine::new(store, self.config.rotation.overwrite);
            match engine.rotate(&dirs.active, &dirs.queue, &dirs.staging) {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    // Per-file outcomes must survive an aborted rotation
                    report.rotation_aborted(&e.to_string());
                    enter(&mut states, RunState::Report);
                    write_report(store, &dirs.output, &report, &stats);
                    return Err(e);
                }
            }
        } else {
            tracing::warn!("Rotation disabled; tiers left in place");
            None
        };
        report.rotation(rotation.as_ref());

        enter(&mut states, RunState::Report);
        let report_path = write_report(store, &dirs.output, &report, &stats);
        for line in stats.render() {
            tracing::info!("{}", line);
        }

        enter(&mut states, RunState::Done);

        Ok(RunOutcome {
            stats,
            rotation,
            snapshot_path,
            report_path,
            dry_run,
            states,
        })
    }

    /// Drop oversize files before they reach the engine
    fn check_sizes<'f>(
        &self,
        files: &'f [InputFileRef],
        stats: &mut RunStats,
        report: &mut RunReport,
    ) -> Vec<&'f InputFileRef> {
        let max_mb = self.config.conversion.max_file_size_mb;
        let limit = self.config.conversion.max_file_size_bytes();
        let mut eligible = Vec::with_capacity(files.len());

        for file in files {
            match std::fs::metadata(&file.absolute_path) {
                Ok(meta) if meta.len() > limit => {
                    let detail = format!(
                        "File size {} exceeds limit of {}MB",
                        format_bytes(meta.len()),
                        max_mb
                    );
                    stats.record_skip();
                    report.skipped_size(&file.relative_path, &detail);
                    log_file_outcome!("SKIPPED", file.relative_path, detail);
                }
                Ok(meta) => {
                    tracing::debug!(file = %file.relative_path, size = %format_bytes(meta.len()), "Size ok");
                    eligible.push(file);
                }
                Err(e) => {
                    let reason = format!("Could not check file size: {e}");
                    stats.record_failure(&file.relative_path, &reason);
                    report.unreadable(&file.relative_path, &reason);
                    log_file_outcome!("FAILED", file.relative_path, reason);
                }
            }
        }

        eligible
    }

    async fn convert_all(
        &self,
        files: &[&InputFileRef],
        store: &dyn FileStore,
        dirs: &RunDirs,
        stats: &mut RunStats,
        report: &mut RunReport,
    ) {
        let conversion = &self.config.conversion;
        let output_types = conversion.output_set();
        let orchestrator = ConversionOrchestrator::new(
            self.engine,
            store,
            conversion.retry_attempts,
            RetryPolicy::from_config(conversion),
        );
        let total = files.len();

        for (idx, file) in files.iter().enumerate() {
            let position = idx + 1;
            let percent = position as f64 / total as f64 * 100.0;
            tracing::info!(
                "[{}/{} - {:.1}%] Processing: {}",
                position,
                total,
                percent,
                file.relative_path
            );

            for output_ext in &output_types {
                let Some(task) = plan_task(file, output_ext, &dirs.output) else {
                    tracing::debug!(file = %file.relative_path, "Skipping same-type conversion: {}", output_ext);
                    stats.record_skip();
                    report.skipped_same_type(&file.relative_path, output_ext);
                    continue;
                };

                if store.is_dry_run() {
                    tracing::info!("[DRY RUN] Would create: {}", task.output_path.display());
                    stats.record_success(0);
                    report.dry_run(&file.relative_path, &task.output_path);
                    continue;
                }

                tracing::info!(engine = self.engine.name(), "Converting to {}: {}", output_ext, task.output_path.display());
                match orchestrator.convert(&task).await {
                    Ok(success) => {
                        log_file_outcome!(
                            "SUCCESS",
                            file.relative_path,
                            success.output_path.display()
                        );
                        stats.record_success(success.bytes_written);
                        report.success(&file.relative_path, &success.output_path);
                    }
                    Err(failure) => {
                        let reason = failure.to_string();
                        stats.record_failure(&file.relative_path, &reason);
                        report.failure(&file.relative_path, &task.output_path, &reason);
                        log_file_outcome!("FAILED", file.relative_path, reason);
                    }
                }
            }
        }
    }
}

fn enter(states: &mut Vec<RunState>, state: RunState) {
    debug_assert_eq!(
        Some(&state),
        RunState::SEQUENCE.get(states.len()),
        "pipeline states must be entered in order"
    );
    states.push(state);
    match state {
        RunState::Init | RunState::Done => {
            tracing::debug!(state = %state, "{}", state.description())
        }
        _ => {
            log_phase!(state.label(), state.description());
        }
    }
}

/// Write `run_report_{timestamp}.txt`; failures are logged, not fatal
fn write_report(
    store: &dyn FileStore,
    output_root: &Path,
    report: &RunReport,
    stats: &RunStats,
) -> Option<PathBuf> {
    let path = output_root.join(format!("run_report_{}.txt", now_stamp()));
    let text = report.render(stats.total_discovered, stats);

    match store.atomic_write(&path, text.as_bytes()) {
        Ok(()) if store.is_dry_run() => None,
        Ok(()) => {
            tracing::info!("Run report saved to: {}", path.display());
            Some(path)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to write run report");
            None
        }
    }
}
