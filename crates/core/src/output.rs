//! Output boundary: turning a finished `GoFile` into text and putting that
//! text somewhere.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::GenerateError;
use crate::gocode::{Emit, GoFile};

/// Renders a Go file to source text.
pub trait SourceFormatter {
    fn format(&self, file: &GoFile) -> Result<String, GenerateError>;
}

/// The built-in gofmt-shaped renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFormatter;

impl SourceFormatter for BuiltinFormatter {
    fn format(&self, file: &GoFile) -> Result<String, GenerateError> {
        Ok(file.emit())
    }
}

/// Pipes the built-in output through a `gofmt` binary.
#[derive(Debug, Clone)]
pub struct Gofmt {
    binary: PathBuf,
}

impl Gofmt {
    /// Find `gofmt` on `PATH`.
    pub fn locate() -> Result<Self, GenerateError> {
        which::which("gofmt")
            .map(Self::with_binary)
            .map_err(|e| GenerateError::Format(format!("gofmt not found on PATH: {e}")))
    }

    /// Use a specific binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Format already-rendered source text.
    pub fn format_source(&self, source: &str) -> Result<String, GenerateError> {
        let mut child = Command::new(&self.binary)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                GenerateError::Format(format!("failed to run {}: {e}", self.binary.display()))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| GenerateError::Format("gofmt stdin is not piped".to_string()))?;
        stdin
            .write_all(source.as_bytes())
            .map_err(|e| GenerateError::Format(format!("failed to write to gofmt: {e}")))?;
        // EOF lets gofmt start writing
        drop(stdin);

        let output = child
            .wait_with_output()
            .map_err(|e| GenerateError::Format(format!("gofmt did not finish: {e}")))?;
        if !output.status.success() {
            return Err(GenerateError::Format(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| GenerateError::Format(format!("gofmt produced invalid UTF-8: {e}")))
    }
}

impl SourceFormatter for Gofmt {
    fn format(&self, file: &GoFile) -> Result<String, GenerateError> {
        self.format_source(&file.emit())
    }
}

/// Destination for generated files.
pub trait OutputWriter {
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), GenerateError>;
}

/// Writes to the filesystem, creating parent directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl OutputWriter for FsWriter {
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), GenerateError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| GenerateError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, contents).map_err(|source| GenerateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = contents.len(), "wrote file");
        Ok(())
    }
}

/// Keeps files in memory; used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Written files in path order.
    pub fn files(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().map(|(p, c)| (p.as_path(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl OutputWriter for MemoryWriter {
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), GenerateError> {
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}
