//! The runtime values that snapshot assertions are made about.
//!
//! A [`Value`] is what the test hands to `expect!`. Before it is queued for
//! patching it is frozen into a [`Frozen`] tree, which is what the classifier,
//! the equality check and the inspector work on.

mod classify;
mod error;
mod frozen;
mod inspect;
mod value;

pub use classify::is_simple_object_tree;
pub use error::ValueError;
pub use frozen::{Frozen, FrozenObject};
pub use inspect::{Style, inspect};
pub use value::{Object, RegexLiteral, Value};
