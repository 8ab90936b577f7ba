//! Inline snapshot assertions that fix themselves.
//!
//! ```ignore
//! use snapfix::expect;
//!
//! expect!(greeting(), "to equal snapshot");
//! ```
//!
//! An assertion without an expected value fails and remembers the value it
//! saw. When the test process exits the calling source files are patched so
//! the value appears as the third argument:
//!
//! ```ignore
//! expect!(greeting(), "to equal snapshot", "Hello, world!");
//! ```
//!
//! The same assertions can be chained off [`expect()`]. The expected argument
//! is always present there, so a new snapshot starts from an empty one:
//!
//! ```ignore
//! snapfix::expect(greeting()).to_equal_snapshot("");
//! ```
//!
//! Files are only written when `SNAPFIX_UPDATE=yes` (or `interactive`) is set;
//! otherwise the run reports what it would have changed.

mod adapter;
mod assertion;
mod diff;
mod exit;
mod logging;
mod persist;
mod registry;
mod settings;

pub use adapter::{AdapterError, AdapterFn, Adapters};
pub use assertion::{AssertionFailure, Expectation, assert_expected, assert_missing, expect};
pub use diff::{format_diff, print_changeset};
pub use exit::{ExitTrap, FinalizeGuard};
pub use logging::setup_tracing;
pub use persist::{FileChange, PersistOutcome, persist, select_changes};
pub use registry::{Registry, exit, summarize};
pub use settings::{Settings, UpdateMode};
pub use snapfix_patch::{BaseAssertion, CallSite, FinalizeReport, Identity, Reformat, unindent};
pub use snapfix_value::{Frozen, Value};

/// Assert that a value matches an inline snapshot.
///
/// The second argument names the assertion: `"to equal snapshot"` compares
/// values, `"to inspect as snapshot"` compares the textual inspection. It may
/// be preceded by an adapter such as `"when sorted"`.
#[macro_export]
macro_rules! expect {
    ($subject:expr, $phrase:expr $(,)?) => {
        $crate::assert_missing($crate::Value::from($subject), $phrase)
    };
    ($subject:expr, $phrase:expr, $expected:expr $(,)?) => {
        $crate::assert_expected(
            $crate::Value::from($subject),
            $phrase,
            $crate::Value::from($expected),
        )
    };
}
