use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use snapfix::{CallSite, Registry, Settings, UpdateMode, Value};
use tempfile::TempDir;

/// A temporary project with a registry that writes fixes without formatting.
pub struct TestContext {
    _temp_dir: TempDir,
    project_dir: Utf8PathBuf,
    registry: Registry,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let project_dir = Utf8PathBuf::from_path_buf(
            temp_dir
                .path()
                .canonicalize()
                .expect("Failed to canonicalize project path"),
        )
        .expect("Path is not valid UTF-8");

        let settings = Settings::default()
            .with_update(UpdateMode::Write)
            .with_reformat(false);

        Self {
            _temp_dir: temp_dir,
            project_dir,
            registry: Registry::new(settings),
        }
    }

    pub fn with_file(path: impl AsRef<Utf8Path>, content: &str) -> Self {
        let context = Self::new();
        context.write_file(path, content);
        context
    }

    pub fn write_file(&self, path: impl AsRef<Utf8Path>, content: &str) {
        let path = self.project_dir.join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content.trim_start_matches('\n')).expect("Failed to write file");
    }

    pub fn read_file(&self, path: impl AsRef<Utf8Path>) -> String {
        fs::read_to_string(self.project_dir.join(path)).expect("Failed to read file")
    }

    pub fn site(&self, path: impl AsRef<Utf8Path>, line: usize, column: usize) -> CallSite {
        CallSite {
            file: self.project_dir.join(path),
            line,
            column,
        }
    }

    pub fn project_dir(&self) -> &Utf8Path {
        &self.project_dir
    }

    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run an assertion as `expect!` would at `site`, returning its failure message.
    pub fn check(
        &self,
        site: CallSite,
        subject: impl Into<Value>,
        phrase: &str,
        expected: Option<Value>,
    ) -> Option<String> {
        self.registry
            .check_at(Some(site), &subject.into(), phrase, expected.as_ref())
            .err()
            .map(|failure| failure.to_string())
    }

    /// Finalize the run and persist the fixes, returning the printed summary.
    pub fn finish(&self) -> String {
        let mut out = Vec::new();
        self.registry
            .finish_run(&mut out)
            .expect("Failed to persist fixes");
        String::from_utf8(out).expect("Summary is not valid UTF-8")
    }
}
