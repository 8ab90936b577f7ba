use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use camino::Utf8PathBuf;

use crate::apply::{TextEdit, apply_edits};
use crate::cache::{SourceCache, lock};
use crate::fix::FixDescriptor;
use crate::indent::detect_indent;
use crate::locate::CallSite;
use crate::reformat::{Reformat, ReformatError};
use crate::resolve::{SkipReason, build_edits};
use crate::source::ParseDiagnostic;

const BOM: char = '\u{feff}';

/// Collects fixes during a test run and turns them into patched file contents.
///
/// One coordinator is shared by every assertion in a process. It never writes
/// files; [`RunCoordinator::finalize`] returns the new contents for the caller
/// to persist.
#[derive(Debug, Default)]
pub struct RunCoordinator {
    pending: Mutex<Vec<FixDescriptor>>,
    sources: SourceCache,
    finalizer_claimed: AtomicBool,
}

/// The outcome of [`RunCoordinator::finalize`].
#[derive(Debug, Default)]
pub struct FinalizeReport {
    /// New contents of every file that changed.
    pub fixed: BTreeMap<Utf8PathBuf, String>,
    /// Fixes whose edits made it into `fixed`.
    pub num_fixed_expects: usize,
    /// Fixes that produced no edits.
    pub skipped: Vec<(CallSite, SkipReason)>,
    /// Fixes in files that could not be read or parsed.
    pub dropped: Vec<CallSite>,
    pub diagnostics: Vec<ParseDiagnostic>,
    /// Files left out of `fixed` because the formatter failed on them.
    pub reformat_failures: Vec<(Utf8PathBuf, ReformatError)>,
}

impl FinalizeReport {
    pub fn num_files(&self) -> usize {
        self.fixed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty()
    }
}

impl RunCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, fix: FixDescriptor) {
        tracing::debug!(site = %fix.site, status = ?fix.status, "Recorded fix");
        lock(&self.pending).push(fix);
    }

    /// Number of fixes waiting for [`RunCoordinator::finalize`].
    pub fn pending(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Returns `true` for the first caller only.
    ///
    /// Used to register the end of run hook once per process.
    pub fn claim_finalizer(&self) -> bool {
        !self.finalizer_claimed.swap(true, Ordering::AcqRel)
    }

    /// Drain the pending fixes and compute the patched contents of their files.
    ///
    /// Every fix for a file is resolved against the file as it was first read,
    /// then all edits for that file are applied together. Calling this again
    /// only sees fixes recorded since the previous call.
    pub fn finalize(&self, reformat: &dyn Reformat) -> FinalizeReport {
        let pending = std::mem::take(&mut *lock(&self.pending));

        let mut by_file: BTreeMap<Utf8PathBuf, Vec<FixDescriptor>> = BTreeMap::new();
        for fix in pending {
            by_file.entry(fix.site.file.clone()).or_default().push(fix);
        }

        let mut report = FinalizeReport::default();
        for (path, fixes) in by_file {
            let Some(unit) = self.sources.get(&path) else {
                report.dropped.extend(fixes.into_iter().map(|fix| fix.site));
                continue;
            };

            let indent_unit = detect_indent(unit.text());
            let mut seen = HashSet::new();
            let mut resolved: Vec<(CallSite, Vec<TextEdit>)> = Vec::new();
            for fix in fixes {
                // A call that failed several times (loops, parameterised tests)
                // is patched with the first value it saw.
                if !seen.insert(fix.site.clone()) {
                    report.skipped.push((fix.site, SkipReason::Duplicate));
                    continue;
                }
                match build_edits(&unit, &fix, &indent_unit) {
                    Ok(edits) => resolved.push((fix.site, edits)),
                    Err(reason) => {
                        tracing::debug!(site = %fix.site, "Skipping fix: {reason}");
                        report.skipped.push((fix.site, reason));
                    }
                }
            }

            let edits = resolved
                .iter()
                .flat_map(|(_, edits)| edits.iter().cloned())
                .collect();
            let applied = apply_edits(unit.text(), edits);
            if !applied.changed {
                continue;
            }

            // Identical edits lose to the earliest fix that produced them, so
            // attribute dropped edits starting from the last fix.
            let mut dropped = applied.dropped;
            let mut num_applied = 0;
            for (site, edits) in resolved.into_iter().rev() {
                let mut lost = false;
                for edit in &edits {
                    if let Some(index) = dropped.iter().position(|other| other == edit) {
                        dropped.swap_remove(index);
                        lost = true;
                    }
                }
                if lost {
                    report.skipped.push((site, SkipReason::Conflict));
                } else {
                    num_applied += 1;
                }
            }

            let text = match reformat.reformat(&path, &applied.text) {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(path = %path, "{err}");
                    report.reformat_failures.push((path, err));
                    continue;
                }
            };

            let text = if unit.has_bom() {
                format!("{BOM}{text}")
            } else {
                text
            };
            report.num_fixed_expects += num_applied;
            report.fixed.insert(path, text);
        }

        report.diagnostics = self.sources.diagnostics();
        report
    }
}
