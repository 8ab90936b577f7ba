use snapfix_value::Frozen;

use crate::locate::CallSite;
use crate::phrase::BaseAssertion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixStatus {
    /// The call has no expected value yet.
    Missing,
    /// The expected value did not match the subject.
    Mismatch,
}

/// A pending correction to one assertion call.
///
/// `subject` is the value that will become the new expected value and
/// `assertion` is the base assertion the call used when it failed.
#[derive(Debug, Clone)]
pub struct FixDescriptor {
    pub site: CallSite,
    pub status: FixStatus,
    pub subject: Frozen,
    pub assertion: BaseAssertion,
}

impl FixDescriptor {
    pub const fn new(
        site: CallSite,
        status: FixStatus,
        subject: Frozen,
        assertion: BaseAssertion,
    ) -> Self {
        Self {
            site,
            status,
            subject,
            assertion,
        }
    }
}
