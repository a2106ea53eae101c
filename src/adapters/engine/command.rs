//! Conversion engine backed by an external converter program
//!
//! The program is invoked once per export with an argument template. The
//! `{input}`, `{format}` and `{output}` placeholders are replaced by the
//! source path, the converter's name for the target format, and a scratch
//! output file. Without `{output}` the program's stdout is the export.

use super::traits::{ConversionEngine, DocumentHandle};
use crate::config::EngineConfig;
use crate::domain::{EngineError, ExportFormat};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

const STDERR_LIMIT: usize = 500;

#[derive(Debug)]
struct CommandSpec {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    formats: BTreeMap<ExportFormat, String>,
    resolved: Option<PathBuf>,
}

/// Engine that shells out to a converter such as `pandoc`
#[derive(Debug, Clone)]
pub struct CommandEngine {
    spec: Arc<CommandSpec>,
}

impl CommandEngine {
    /// Build an engine from configuration
    ///
    /// Format keys that are not supported extensions are ignored with a
    /// warning.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut formats = BTreeMap::new();
        for (ext, name) in &config.formats {
            match ExportFormat::from_extension(ext) {
                Some(format) => {
                    formats.insert(format, name.clone());
                }
                None => tracing::warn!(key = %ext, "Ignoring unknown engine.formats key"),
            }
        }

        let resolved = resolve_program(&config.program);
        tracing::debug!(
            program = %config.program,
            resolved = ?resolved,
            formats = formats.len(),
            "Command engine configured"
        );

        Self {
            spec: Arc::new(CommandSpec {
                program: config.program.clone(),
                args: config.args.clone(),
                timeout: Duration::from_secs(config.timeout_seconds),
                formats,
                resolved,
            }),
        }
    }

    /// Whether the converter program was found
    pub fn is_available(&self) -> bool {
        self.spec.resolved.is_some()
    }

    /// Configured program name
    pub fn program(&self) -> &str {
        &self.spec.program
    }
}

#[async_trait]
impl ConversionEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.spec.program
    }

    async fn convert(&self, path: &Path) -> Result<Option<Box<dyn DocumentHandle>>, EngineError> {
        let metadata =
            tokio::fs::metadata(path)
                .await
                .map_err(|e| EngineError::UnreadableInput {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;

        if !metadata.is_file() {
            return Err(EngineError::UnreadableInput {
                path: path.to_path_buf(),
                message: "not a regular file".to_string(),
            });
        }

        Ok(Some(Box::new(CommandDocument {
            source: path.to_path_buf(),
            spec: Arc::clone(&self.spec),
        })))
    }
}

/// Handle for one input file; exports run the converter lazily
struct CommandDocument {
    source: PathBuf,
    spec: Arc<CommandSpec>,
}

#[async_trait]
impl DocumentHandle for CommandDocument {
    fn capabilities(&self) -> Vec<ExportFormat> {
        self.spec.formats.keys().copied().collect()
    }

    fn is_invocable(&self, format: ExportFormat) -> bool {
        self.spec.resolved.is_some()
            && self
                .spec
                .formats
                .get(&format)
                .is_some_and(|name| !name.trim().is_empty())
    }

    async fn export(&self, format: ExportFormat) -> Result<Vec<u8>, EngineError> {
        let spec = &self.spec;
        let engine_format = spec
            .formats
            .get(&format)
            .ok_or_else(|| EngineError::ExportFailed {
                format: format.to_string(),
                message: "format not configured".to_string(),
            })?;

        let uses_output_file = spec.args.iter().any(|a| a.contains("{output}"));
        let scratch = if uses_output_file {
            Some(tempfile::tempdir().map_err(|e| EngineError::ExportFailed {
                format: format.to_string(),
                message: format!("cannot create scratch directory: {e}"),
            })?)
        } else {
            None
        };
        let output_file = scratch
            .as_ref()
            .map(|dir| dir.path().join(format!("export.{}", format.extension())));

        let args = render_args(
            &spec.args,
            &self.source,
            engine_format,
            output_file.as_deref(),
        );

        let program = spec
            .resolved
            .clone()
            .unwrap_or_else(|| PathBuf::from(&spec.program));

        tracing::debug!(program = %program.display(), args = ?args, "Running converter");

        let child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(spec.timeout, child)
            .await
            .map_err(|_| EngineError::Timeout(spec.timeout.as_secs()))?
            .map_err(|e| EngineError::LaunchFailed {
                program: spec.program.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr: String = stderr.trim().chars().take(STDERR_LIMIT).collect();
            return Err(EngineError::ExitStatus {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        match output_file {
            Some(file) => tokio::fs::read(&file)
                .await
                .map_err(|e| EngineError::ExportFailed {
                    format: format.to_string(),
                    message: format!("converter wrote no output file: {e}"),
                }),
            None => Ok(output.stdout),
        }
    }
}

fn render_args(
    template: &[String],
    input: &Path,
    format: &str,
    output: Option<&Path>,
) -> Vec<String> {
    let input = input.to_string_lossy();
    let output = output.map(|p| p.to_string_lossy().into_owned()).unwrap_or_default();
    template
        .iter()
        .map(|arg| {
            arg.replace("{input}", &input)
                .replace("{format}", format)
                .replace("{output}", &output)
        })
        .collect()
}

/// Find `program` either as a path or on `PATH`
fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        let full = dir.join(program);
        if full.is_file() {
            return Some(full);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{program}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_config(program: &str, args: &[&str]) -> EngineConfig {
        EngineConfig {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            timeout_seconds: 5,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_render_args_replaces_placeholders() {
        let template = vec![
            "{input}".to_string(),
            "--to={format}".to_string(),
            "-o".to_string(),
            "{output}".to_string(),
        ];
        let args = render_args(
            &template,
            Path::new("/in/a.pdf"),
            "markdown",
            Some(Path::new("/tmp/x/export.md")),
        );
        assert_eq!(args, vec!["/in/a.pdf", "--to=markdown", "-o", "/tmp/x/export.md"]);
    }

    #[test]
    fn test_unknown_format_keys_are_dropped() {
        let mut config = EngineConfig::default();
        config.formats.insert("odt".to_string(), "odt".to_string());
        let engine = CommandEngine::from_config(&config);
        assert_eq!(engine.spec.formats.len(), 5);
    }

    #[test]
    fn test_missing_program_is_not_invocable() {
        let engine = CommandEngine::from_config(&engine_config(
            "docpipe-definitely-not-installed",
            &["{input}"],
        ));
        assert!(!engine.is_available());

        let doc = CommandDocument {
            source: PathBuf::from("/in/a.pdf"),
            spec: Arc::clone(&engine.spec),
        };
        assert!(doc.declares(ExportFormat::Markdown));
        assert!(!doc.is_invocable(ExportFormat::Markdown));
    }

    #[tokio::test]
    async fn test_convert_rejects_missing_input() {
        let engine = CommandEngine::from_config(&EngineConfig::default());
        let err = engine
            .convert(Path::new("/nonexistent/docpipe/a.pdf"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::UnreadableInput { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_export_from_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.txt");
        std::fs::write(&input, "hello").unwrap();

        let engine =
            CommandEngine::from_config(&engine_config("sh", &["-c", "cat \"$0\"", "{input}"]));
        let doc = engine.convert(&input).await.unwrap().unwrap();
        let bytes = doc.export(ExportFormat::Markdown).await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_export_from_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.txt");
        std::fs::write(&input, "body").unwrap();

        let engine = CommandEngine::from_config(&engine_config(
            "sh",
            &["-c", "printf '%s:' \"$1\" > \"$2\"; cat \"$0\" >> \"$2\"", "{input}", "{format}", "{output}"],
        ));
        let doc = engine.convert(&input).await.unwrap().unwrap();
        let bytes = doc.export(ExportFormat::Html).await.unwrap();
        assert_eq!(bytes, b"html:body");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_export_nonzero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.txt");
        std::fs::write(&input, "x").unwrap();

        let engine = CommandEngine::from_config(&engine_config(
            "sh",
            &["-c", "echo 'bad header' >&2; exit 3", "{input}"],
        ));
        let doc = engine.convert(&input).await.unwrap().unwrap();
        match doc.export(ExportFormat::Text).await {
            Err(EngineError::ExitStatus { status, stderr }) => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "bad header");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_export_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.txt");
        std::fs::write(&input, "x").unwrap();

        let mut config = engine_config("sh", &["-c", "sleep 5", "{input}"]);
        config.timeout_seconds = 1;
        let engine = CommandEngine::from_config(&config);
        let doc = engine.convert(&input).await.unwrap().unwrap();
        let err = doc.export(ExportFormat::Text).await.unwrap_err();
        assert!(matches!(err, EngineError::Timeout(1)));
    }
}
