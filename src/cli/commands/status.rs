//! Status command implementation
//!
//! This module implements the `status` command for inspecting the tiers
//! between runs: how many files wait in each, and which archives and output
//! snapshots exist.

use crate::config::{DirectoriesConfig, DocpipeConfig};
use crate::core::pipeline::format_bytes;
use crate::domain::Result;
use clap::Args;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// File count of one directory tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierStatus {
    pub name: String,
    pub path: PathBuf,
    pub exists: bool,
    pub files: usize,
    pub bytes: u64,
}

/// Everything `status` reports
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub tiers: Vec<TierStatus>,
    pub archives: Vec<PathBuf>,
    pub snapshots: Vec<PathBuf>,
}

impl StatusReport {
    /// Inspect the configured directories
    pub fn collect(dirs: &DirectoriesConfig) -> Self {
        let tiers = [
            ("queue", &dirs.queue),
            ("staging", &dirs.staging),
            ("active", &dirs.active),
            ("output", &dirs.output),
        ]
        .into_iter()
        .map(|(name, path)| tier_status(name, path))
        .collect();

        Self {
            tiers,
            archives: siblings_with_prefix(&dirs.active, "_old_"),
            snapshots: siblings_with_prefix(&dirs.output, "_"),
        }
    }
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(
        &self,
        config_path: &str,
        loaded: Result<DocpipeConfig>,
    ) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Checking tier status");

        let config = match loaded {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2); // Configuration error exit code
            }
        };

        let report = StatusReport::collect(&config.directories);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(0);
        }

        println!("📊 Tier Status");
        println!();
        println!("{:<10} {:<8} {:<12} {}", "Tier", "Files", "Size", "Path");
        println!("{}", "-".repeat(70));
        for tier in &report.tiers {
            let size = if tier.exists {
                format_bytes(tier.bytes)
            } else {
                "missing".to_string()
            };
            println!(
                "{:<10} {:<8} {:<12} {}",
                tier.name,
                tier.files,
                size,
                tier.path.display()
            );
        }
        println!();

        print_paths("Archives", &report.archives);
        print_paths("Output snapshots", &report.snapshots);

        Ok(0)
    }
}

fn print_paths(title: &str, paths: &[PathBuf]) {
    if paths.is_empty() {
        println!("{title}: none");
    } else {
        println!("{title} ({}):", paths.len());
        for path in paths {
            println!("  {}", path.display());
        }
    }
    println!();
}

fn tier_status(name: &str, path: &Path) -> TierStatus {
    let mut files = 0;
    let mut bytes = 0u64;
    let exists = path.is_dir();

    if exists {
        for entry in WalkDir::new(path).follow_links(true).into_iter().flatten() {
            if entry.file_type().is_file() {
                files += 1;
                bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
            }
        }
    }

    TierStatus {
        name: name.to_string(),
        path: path.to_path_buf(),
        exists,
        files,
        bytes,
    }
}

/// Sibling directories named `{dir}{infix}<timestamp>`, sorted
fn siblings_with_prefix(dir: &Path, infix: &str) -> Vec<PathBuf> {
    let Some(name) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Vec::new();
    };
    let parent = match dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let prefix = format!("{name}{infix}");

    let Ok(entries) = fs::read_dir(parent) else {
        return Vec::new();
    };

    let mut found: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter(|e| {
            e.file_name()
                .to_str()
                .and_then(|n| n.strip_prefix(&prefix))
                .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        })
        .map(|e| e.path())
        .collect();
    found.sort();
    found
}
