use std::io::Write;
use std::process::{Command, Stdio};

use camino::{Utf8Path, Utf8PathBuf};

use crate::manifest::{DEFAULT_EDITION, manifest_edition};

const RUSTFMT_BINARY_NAME: &str = "rustfmt";

#[derive(Debug, thiserror::Error)]
pub enum ReformatError {
    #[error("failed to run `{program}`")]
    Spawn {
        program: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` failed on `{path}`: {stderr}")]
    Failed {
        program: Utf8PathBuf,
        path: Utf8PathBuf,
        stderr: String,
    },

    #[error("`{program}` produced output that is not UTF-8")]
    NotUtf8 { program: Utf8PathBuf },
}

/// A formatting pass run over a patched file before it is handed out.
pub trait Reformat: Sync {
    fn reformat(&self, path: &Utf8Path, text: &str) -> Result<String, ReformatError>;
}

/// Leaves the patched text as it is.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl Reformat for Identity {
    fn reformat(&self, _path: &Utf8Path, text: &str) -> Result<String, ReformatError> {
        Ok(text.to_string())
    }
}

/// Pipes the patched text through `rustfmt`.
///
/// Unless an edition is set, each file is formatted with the edition of the
/// package it belongs to.
#[derive(Debug, Clone)]
pub struct Rustfmt {
    program: Utf8PathBuf,
    edition: Option<String>,
}

impl Rustfmt {
    pub fn new(program: impl Into<Utf8PathBuf>) -> Self {
        Self {
            program: program.into(),
            edition: None,
        }
    }

    /// Find `rustfmt` on the `PATH`.
    pub fn find() -> Option<Self> {
        let path = which::which(RUSTFMT_BINARY_NAME).ok()?;
        let path = Utf8PathBuf::try_from(path).ok()?;
        tracing::debug!(path = %path, "Found rustfmt in PATH");
        Some(Self::new(path))
    }

    #[must_use]
    pub fn with_edition(mut self, edition: impl Into<String>) -> Self {
        self.edition = Some(edition.into());
        self
    }

    fn edition_for(&self, path: &Utf8Path) -> String {
        self.edition
            .clone()
            .or_else(|| manifest_edition(path))
            .unwrap_or_else(|| DEFAULT_EDITION.to_string())
    }
}

impl Reformat for Rustfmt {
    fn reformat(&self, path: &Utf8Path, text: &str) -> Result<String, ReformatError> {
        let spawn_error = |source| ReformatError::Spawn {
            program: self.program.clone(),
            source,
        };

        let edition = self.edition_for(path);
        let mut child = Command::new(&self.program)
            .args(["--emit", "stdout", "--edition", &edition])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).map_err(spawn_error)?;
        }
        let output = child.wait_with_output().map_err(spawn_error)?;

        if !output.status.success() {
            return Err(ReformatError::Failed {
                program: self.program.clone(),
                path: path.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ReformatError::NotUtf8 {
            program: self.program.clone(),
        })
    }
}
