//! Retrying conversion of a single task

use super::retry::RetryPolicy;
use crate::adapters::engine::ConversionEngine;
use crate::core::store::FileStore;
use crate::domain::{ConversionFailure, ConversionTask, ExportFormat};
use crate::log_retry_attempt;
use std::path::PathBuf;

/// A written output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSuccess {
    /// Where the output landed
    pub output_path: PathBuf,

    /// Size of the exported content
    pub bytes_written: u64,

    /// Attempts used, starting at 1
    pub attempts: u32,
}

/// Converts tasks with a bounded number of attempts
///
/// Every attempt runs the same checks in order and the first failing check
/// ends the attempt:
///
/// 1. the engine returns a document handle
/// 2. the output type maps to an [`ExportFormat`]
/// 3. the handle declares that format
/// 4. the declared capability is invocable
/// 5. the export is non-empty
/// 6. the atomic write succeeds
///
/// Engine errors count as a failed attempt. Failures never escape as errors;
/// the caller gets a [`ConversionFailure`] describing the last attempt.
pub struct ConversionOrchestrator<'a> {
    engine: &'a dyn ConversionEngine,
    store: &'a dyn FileStore,
    retry_attempts: u32,
    policy: RetryPolicy,
}

impl<'a> ConversionOrchestrator<'a> {
    /// Create an orchestrator making at most `retry_attempts + 1` attempts
    pub fn new(
        engine: &'a dyn ConversionEngine,
        store: &'a dyn FileStore,
        retry_attempts: u32,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            engine,
            store,
            retry_attempts,
            policy,
        }
    }

    /// Total attempts per task
    pub fn max_attempts(&self) -> u32 {
        self.retry_attempts.saturating_add(1)
    }

    /// Convert one task
    pub async fn convert(
        &self,
        task: &ConversionTask<'_>,
    ) -> Result<ConversionSuccess, ConversionFailure> {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;

        loop {
            match self.attempt(task).await {
                Ok(bytes_written) => {
                    return Ok(ConversionSuccess {
                        output_path: task.output_path.clone(),
                        bytes_written,
                        attempts: attempt,
                    })
                }
                Err(failure) if attempt < max_attempts => {
                    log_retry_attempt!(attempt, max_attempts, failure);
                    tokio::time::sleep(self.policy.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(failure) => {
                    tracing::error!(
                        file = %task.input.relative_path,
                        attempts = attempt,
                        reason = %failure,
                        "Conversion failed (max retries reached)"
                    );
                    return Err(failure);
                }
            }
        }
    }

    async fn attempt(&self, task: &ConversionTask<'_>) -> Result<u64, ConversionFailure> {
        let handle = self
            .engine
            .convert(&task.input.absolute_path)
            .await?
            .ok_or(ConversionFailure::NoDocument)?;

        let format = ExportFormat::from_extension(&task.output_format)
            .ok_or_else(|| ConversionFailure::NoExportMapping(task.output_format.clone()))?;

        if !handle.declares(format) {
            return Err(ConversionFailure::CapabilityAbsent {
                format: format.to_string(),
                available: handle
                    .capabilities()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            });
        }

        if !handle.is_invocable(format) {
            return Err(ConversionFailure::CapabilityNotInvocable(format.to_string()));
        }

        let content = handle.export(format).await?;
        if content.is_empty() {
            return Err(ConversionFailure::EmptyContent);
        }

        self.store
            .atomic_write(&task.output_path, &content)
            .map_err(|e| ConversionFailure::Write(e.to_string()))?;

        Ok(content.len() as u64)
    }
}
