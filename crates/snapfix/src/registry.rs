use std::io::{self, Write};
use std::panic::Location;
use std::sync::{Once, OnceLock, RwLock};

use anyhow::Result;
use snapfix_patch::{
    AssertionPhrase, BaseAssertion, CallSite, FinalizeReport, FixDescriptor, FixStatus, Identity,
    Reformat, RunCoordinator, Rustfmt,
};
use snapfix_value::Value;

use crate::adapter::{AdapterError, Adapters};
use crate::assertion::AssertionFailure;
use crate::diff::format_diff;
use crate::exit::ExitTrap;
use crate::logging::setup_tracing;
use crate::persist::{PersistOutcome, persist};
use crate::settings::Settings;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

static EXIT_TRAP: ExitTrap = ExitTrap::new();

/// The state of one test run: pending fixes, parsed sources, adapters and
/// settings.
///
/// [`Registry::global`] is the instance `expect!` reports to. Other instances
/// are independent of it and are never finalized automatically.
#[derive(Debug)]
pub struct Registry {
    coordinator: RunCoordinator,
    adapters: RwLock<Adapters>,
    settings: Settings,
    on_first_fix: Option<fn()>,
}

impl Registry {
    pub fn new(settings: Settings) -> Self {
        Self {
            coordinator: RunCoordinator::new(),
            adapters: RwLock::new(Adapters::default()),
            settings,
            on_first_fix: None,
        }
    }

    /// The process-wide registry, configured from the environment.
    ///
    /// The first fix recorded on it registers a hook that finalizes the run
    /// when the process exits.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(|| {
            setup_tracing();
            Self {
                on_first_fix: Some(install_exit_hook),
                ..Self::new(Settings::from_env())
            }
        })
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn register_adapter<F>(&self, name: impl Into<String>, adapter: F)
    where
        F: Fn(&Value) -> Result<Value, AdapterError> + Send + Sync + 'static,
    {
        self.adapters
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .register(name, adapter);
    }

    /// Number of fixes recorded and not yet finalized.
    pub fn pending(&self) -> usize {
        self.coordinator.pending()
    }

    /// Check `subject` against `expected` for the assertion called at `location`.
    pub fn check(
        &self,
        location: &Location<'_>,
        subject: &Value,
        phrase: &str,
        expected: Option<&Value>,
    ) -> Result<(), AssertionFailure> {
        self.check_at(CallSite::from_location(location), subject, phrase, expected)
    }

    /// Check an assertion whose call site is already known.
    ///
    /// A failing assertion records a fix when `site` is known. Without an
    /// expected value it always fails.
    pub fn check_at(
        &self,
        site: Option<CallSite>,
        subject: &Value,
        phrase: &str,
        expected: Option<&Value>,
    ) -> Result<(), AssertionFailure> {
        let parsed = AssertionPhrase::parse(phrase)
            .ok_or_else(|| AssertionFailure::UnknownAssertion(phrase.to_string()))?;
        let subject = match parsed.adapter() {
            Some(name) => self
                .adapters
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .apply(name, subject)?,
            None => subject.clone(),
        };
        let subject = subject.freeze();
        let actual = subject.to_text();

        let Some(expected) = expected else {
            let Some(site) = site else {
                return Err(AssertionFailure::Unlocatable);
            };
            self.record(FixDescriptor::new(
                site,
                FixStatus::Missing,
                subject,
                parsed.base(),
            ));
            return Err(AssertionFailure::Missing {
                subject: actual,
                phrase: phrase.to_string(),
            });
        };

        let expected = expected.freeze();
        let (matches, expected_text) = match parsed.base() {
            BaseAssertion::EqualSnapshot => (subject.deep_eq(&expected), expected.to_text()),
            BaseAssertion::InspectAsSnapshot => match expected.as_str() {
                Some(text) => (text == actual, text.to_string()),
                None => (false, expected.to_text()),
            },
        };
        if matches {
            return Ok(());
        }

        let diff = format_diff(&expected_text, &actual);
        if let Some(site) = site {
            self.record(FixDescriptor::new(
                site,
                FixStatus::Mismatch,
                subject,
                parsed.base(),
            ));
        }
        Err(AssertionFailure::Mismatch {
            subject: actual,
            phrase: phrase.to_string(),
            expected: expected_text,
            diff,
        })
    }

    fn record(&self, fix: FixDescriptor) {
        self.coordinator.record(fix);
        if let Some(hook) = self.on_first_fix {
            if self.coordinator.claim_finalizer() {
                hook();
            }
        }
    }

    /// Compute the fixed contents of every file with pending fixes.
    ///
    /// Nothing is written; see [`Registry::finish_run`].
    pub fn finalize(&self) -> FinalizeReport {
        match self.settings.reformat.then(Rustfmt::find).flatten() {
            Some(rustfmt) => self.coordinator.finalize(&rustfmt),
            None => self.coordinator.finalize(&Identity),
        }
    }

    /// Finalize with a specific formatter.
    pub fn finalize_with(&self, reformat: &dyn Reformat) -> FinalizeReport {
        self.coordinator.finalize(reformat)
    }

    /// Finalize, summarize and persist the run.
    pub fn finish_run(&self, out: &mut impl Write) -> Result<Option<PersistOutcome>> {
        let report = self.finalize();
        summarize(&report, out)?;
        if report.is_empty() {
            return Ok(None);
        }
        persist(&report.fixed, &self.settings, out).map(Some)
    }
}

/// Print what the run found, before anything is persisted.
pub fn summarize(report: &FinalizeReport, out: &mut impl Write) -> io::Result<()> {
    for diagnostic in &report.diagnostics {
        writeln!(out, "snapfix: {diagnostic}")?;
    }
    for (path, err) in &report.reformat_failures {
        writeln!(out, "snapfix: Could not reformat `{path}`: {err}")?;
    }
    if !report.is_empty() {
        writeln!(
            out,
            "snapfix was able to patch up {} expect call(s) in {} source file(s)",
            report.num_fixed_expects,
            report.num_files()
        )?;
    }
    Ok(())
}

/// Exit the process, unless fixed files are being written.
///
/// During the write-back the calling thread blocks and the exit is replayed
/// once the files are written.
pub fn exit(code: i32) -> ! {
    match EXIT_TRAP.request(code) {
        #[allow(clippy::exit)]
        Some(code) => std::process::exit(code),
        None => loop {
            std::thread::park();
        },
    }
}

fn install_exit_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        // SAFETY: `finish_at_exit` catches every panic and never unwinds into C.
        if unsafe { libc::atexit(finish_at_exit) } != 0 {
            tracing::warn!("Failed to register the end of run hook");
        }
    });
}

extern "C" fn finish_at_exit() {
    let replay = std::panic::catch_unwind(|| {
        let guard = EXIT_TRAP.hold();
        let mut stderr = io::stderr().lock();
        let failed = match Registry::global().finish_run(&mut stderr) {
            Ok(_) => false,
            Err(err) => {
                let _ = writeln!(stderr, "snapfix: Aborting due to error: {err:#}");
                true
            }
        };
        guard.release(failed)
    });

    if let Ok(Some(code)) = replay {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        // SAFETY: the process is already exiting; `_exit` only skips the
        // remaining exit handlers so `code` is the final status.
        unsafe { libc::_exit(code) };
    }
}
