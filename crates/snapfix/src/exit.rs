use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use snapfix_static::WRITE_FAILED_EXIT_CODE;

/// Holds back process exits while fixed files are being written.
///
/// Exit requests made through [`ExitTrap::request`] while a [`FinalizeGuard`]
/// is alive are queued and handed back when the guard is released.
#[derive(Debug, Default)]
pub struct ExitTrap {
    in_flight: AtomicBool,
    deferred: Mutex<Vec<i32>>,
}

impl ExitTrap {
    pub const fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            deferred: Mutex::new(Vec::new()),
        }
    }

    /// Returns the code to exit with now, or `None` if the exit was deferred.
    pub fn request(&self, code: i32) -> Option<i32> {
        let mut deferred = self
            .deferred
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if self.in_flight.load(Ordering::Acquire) {
            tracing::debug!(code, "Deferring exit until fixes are written");
            deferred.push(code);
            None
        } else {
            Some(code)
        }
    }

    /// Start deferring exits.
    pub fn hold(&self) -> FinalizeGuard<'_> {
        self.in_flight.store(true, Ordering::Release);
        FinalizeGuard { trap: self }
    }
}

#[must_use = "dropping the guard discards deferred exits"]
#[derive(Debug)]
pub struct FinalizeGuard<'a> {
    trap: &'a ExitTrap,
}

impl FinalizeGuard<'_> {
    /// Stop deferring and return the exit code to replay, if any.
    ///
    /// A failed write-back takes precedence over every deferred request.
    pub fn release(self, failed: bool) -> Option<i32> {
        let mut deferred = std::mem::take(
            &mut *self
                .trap
                .deferred
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        );
        self.trap.in_flight.store(false, Ordering::Release);
        if failed {
            deferred.insert(0, WRITE_FAILED_EXIT_CODE);
        }
        deferred.first().copied()
    }
}
