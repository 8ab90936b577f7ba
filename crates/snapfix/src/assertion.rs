use std::panic::Location;

use snapfix_patch::BaseAssertion;
use snapfix_static::EnvVars;
use snapfix_value::Value;

use crate::adapter::AdapterError;
use crate::registry::Registry;

#[derive(Debug, thiserror::Error)]
pub enum AssertionFailure {
    #[error("unknown assertion `{0}`")]
    UnknownAssertion(String),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(
        "expected {subject} {phrase}\n\nRerun the tests with {var}=yes to update the snapshots",
        var = EnvVars::SNAPFIX_UPDATE
    )]
    Missing { subject: String, phrase: String },

    #[error("Could not figure out the location of the expect!() call to patch up")]
    Unlocatable,

    #[error("expected {subject} {phrase} {expected}\n\n{diff}")]
    Mismatch {
        subject: String,
        phrase: String,
        expected: String,
        diff: String,
    },
}

/// Fail and queue the subject as the snapshot of the calling `expect!`.
#[track_caller]
pub fn assert_missing(subject: Value, phrase: &str) {
    if let Err(failure) = Registry::global().check(Location::caller(), &subject, phrase, None) {
        panic!("{failure}");
    }
}

/// Compare the subject with the snapshot, queueing a fix when they differ.
#[track_caller]
pub fn assert_expected(subject: Value, phrase: &str, expected: Value) {
    if let Err(failure) =
        Registry::global().check(Location::caller(), &subject, phrase, Some(&expected))
    {
        panic!("{failure}");
    }
}

/// Start a chained assertion, `expect(subject).to_equal_snapshot(expected)`.
///
/// The expected argument is patched like the third argument of `expect!`. A
/// subject that can only be inspected renames the call to
/// [`Expectation::to_inspect_as_snapshot`].
pub fn expect(subject: impl Into<Value>) -> Expectation {
    Expectation {
        subject: subject.into(),
    }
}

/// The subject of a chained assertion.
#[derive(Debug)]
#[must_use = "an expectation does nothing until an assertion method is called"]
pub struct Expectation {
    subject: Value,
}

impl Expectation {
    #[track_caller]
    pub fn to_equal_snapshot(self, expected: impl Into<Value>) {
        self.assert(BaseAssertion::EqualSnapshot, &expected.into());
    }

    #[track_caller]
    pub fn to_inspect_as_snapshot(self, expected: impl Into<Value>) {
        self.assert(BaseAssertion::InspectAsSnapshot, &expected.into());
    }

    #[track_caller]
    fn assert(&self, assertion: BaseAssertion, expected: &Value) {
        if let Err(failure) = Registry::global().check(
            Location::caller(),
            &self.subject,
            assertion.name(),
            Some(expected),
        ) {
            panic!("{failure}");
        }
    }
}
