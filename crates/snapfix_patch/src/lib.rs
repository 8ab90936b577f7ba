//! Rewrites `expect!` calls in Rust sources so their snapshot arguments match
//! the values observed at run time.
//!
//! Failing assertions record a [`FixDescriptor`] on a [`RunCoordinator`]. At the
//! end of the run [`RunCoordinator::finalize`] parses each affected file once,
//! resolves every fix to [`TextEdit`]s and applies them in a single pass.

mod apply;
mod cache;
mod coordinator;
mod fix;
mod indent;
mod locate;
mod manifest;
mod phrase;
mod reformat;
mod render;
mod resolve;
mod source;

pub use apply::{AppliedEdits, TextEdit, apply_edits};
pub use cache::SourceCache;
pub use coordinator::{FinalizeReport, RunCoordinator};
pub use fix::{FixDescriptor, FixStatus};
pub use indent::{detect_indent, reindent, unindent};
pub use locate::{CallSite, is_vendored, locate, resolve_path};
pub use manifest::{DEFAULT_EDITION, manifest_edition};
pub use phrase::{AssertionPhrase, BaseAssertion};
pub use reformat::{Identity, Reformat, ReformatError, Rustfmt};
pub use render::{Rendered, render_snapshot, stringify};
pub use resolve::{SkipReason, build_edits};
pub use source::{
    ArgKind, ArgNode, CallKind, CallNode, LineIndex, ParseDiagnostic, Position, SourceError,
    SourceUnit, TextRange,
};
