use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};

use crate::source::{ParseDiagnostic, SourceError, SourceUnit};

/// Parsed source files, read at most once per path.
///
/// A file that cannot be read or parsed is remembered as missing, so every
/// fix for it is dropped without retrying.
#[derive(Debug, Default)]
pub struct SourceCache {
    units: Mutex<HashMap<Utf8PathBuf, Option<Arc<SourceUnit>>>>,
    diagnostics: Mutex<Vec<ParseDiagnostic>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Utf8Path) -> Option<Arc<SourceUnit>> {
        let mut units = lock(&self.units);
        if let Some(unit) = units.get(path) {
            return unit.clone();
        }

        let unit = match SourceUnit::read(path) {
            Ok(unit) => Some(Arc::new(unit)),
            Err(SourceError::Parse(diagnostic)) => {
                tracing::warn!("{diagnostic}");
                lock(&self.diagnostics).push(diagnostic);
                None
            }
            Err(err) => {
                tracing::warn!(path = %path, "{err}");
                None
            }
        };
        units.insert(path.to_path_buf(), unit.clone());
        unit
    }

    /// Parse errors seen so far, in the order the files were loaded.
    pub fn diagnostics(&self) -> Vec<ParseDiagnostic> {
        lock(&self.diagnostics).clone()
    }
}

/// Lock `mutex`, recovering the data if another thread panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
