//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use docpipe::adapters::engine::{ConversionEngine, DocumentHandle};
use docpipe::config::DocpipeConfig;
use docpipe::domain::{EngineError, ExportFormat};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::time::Instant;

/// Engine that converts everything except files whose name is listed in
/// `failing`, recording when each call happened
#[derive(Default)]
pub struct ScriptedEngine {
    pub failing: BTreeSet<String>,
    pub calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedEngine {
    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn calls_for(&self, name: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ConversionEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn convert(&self, path: &Path) -> Result<Option<Box<dyn DocumentHandle>>, EngineError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls.lock().unwrap().push((name.clone(), Instant::now()));

        if self.failing.contains(&name) {
            return Err(EngineError::UnreadableInput {
                path: path.to_path_buf(),
                message: "corrupt cross-reference table".to_string(),
            });
        }

        let body = fs::read(path).map_err(|e| EngineError::UnreadableInput {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Some(Box::new(ScriptedDocument { name, body })))
    }
}

struct ScriptedDocument {
    name: String,
    body: Vec<u8>,
}

#[async_trait]
impl DocumentHandle for ScriptedDocument {
    fn capabilities(&self) -> Vec<ExportFormat> {
        ExportFormat::ALL.to_vec()
    }

    fn is_invocable(&self, _format: ExportFormat) -> bool {
        true
    }

    async fn export(&self, format: ExportFormat) -> Result<Vec<u8>, EngineError> {
        let mut out = format!("{} as {}\n", self.name, format.extension()).into_bytes();
        out.extend_from_slice(&self.body);
        Ok(out)
    }
}

/// Tier layout under one scratch root
pub struct Tiers {
    pub root: PathBuf,
    pub active: PathBuf,
    pub staging: PathBuf,
    pub queue: PathBuf,
    pub output: PathBuf,
}

impl Tiers {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            active: root.join("active"),
            staging: root.join("staging"),
            queue: root.join("queue"),
            output: root.join("outputs"),
        }
    }

    /// Configuration pointing at these tiers, with fast retries and no
    /// output snapshot
    pub fn config(&self, inputs: &[&str], outputs: &[&str]) -> DocpipeConfig {
        let mut config = DocpipeConfig::default();
        config.directories.active = self.active.clone();
        config.directories.staging = self.staging.clone();
        config.directories.queue = self.queue.clone();
        config.directories.output = self.output.clone();
        config.conversion.input_types = inputs.iter().map(|s| s.to_string()).collect();
        config.conversion.output_types = outputs.iter().map(|s| s.to_string()).collect();
        config.conversion.retry_attempts = 0;
        config.rotation.snapshot_outputs = false;
        config
    }

    /// Archive directories minted by rotation
    pub fn archives(&self) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = fs::read_dir(&self.root)
            .unwrap()
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("active_old_"))
            })
            .collect();
        found.sort();
        found
    }
}

pub fn write_file(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Relative file names directly or transitively under `dir`, sorted
pub fn list_files(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    names.sort();
    names
}

/// Every path under `dir` with the bytes of each file
pub fn tree_snapshot(dir: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .flatten()
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap().to_string_lossy().into_owned();
            let contents = e.file_type().is_file().then(|| fs::read(e.path()).unwrap());
            (rel, contents)
        })
        .collect()
}
