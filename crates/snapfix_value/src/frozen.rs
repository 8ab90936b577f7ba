use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::inspect::{Style, inspect};
use crate::value::{RegexLiteral, Value};

/// An owned, thread-safe snapshot of a [`Value`].
///
/// Every reference back to a container that is still being visited is
/// replaced by [`Frozen::Circular`], so the tree is always finite.
#[derive(Debug, Clone)]
pub enum Frozen {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Bytes(Vec<u8>),
    Date(DateTime<Utc>),
    Regex(RegexLiteral),
    Array(Vec<Frozen>),
    Object(FrozenObject),
    Function(String),
    Symbol(String),
    Opaque { type_name: String, repr: String },
    Circular,
}

#[derive(Debug, Clone, Default)]
pub struct FrozenObject {
    pub constructor: Option<String>,
    pub entries: Vec<(Frozen, Frozen)>,
}

impl Value {
    /// Copy this value into a [`Frozen`] tree, marking cycles.
    pub fn freeze(&self) -> Frozen {
        Freezer::default().freeze(self)
    }
}

/// Walks a value keeping the identities of the containers on the current path.
///
/// Containers are removed from the path once their children are frozen, so a
/// container that is merely shared between two siblings is copied twice rather
/// than reported as circular.
#[derive(Default)]
struct Freezer {
    path: Vec<*const ()>,
}

impl Freezer {
    fn freeze(&mut self, value: &Value) -> Frozen {
        match value {
            Value::Undefined => Frozen::Undefined,
            Value::Null => Frozen::Null,
            Value::Bool(b) => Frozen::Bool(*b),
            Value::Number(n) => Frozen::Number(*n),
            Value::String(s) => Frozen::String(s.clone()),
            Value::Bytes(bytes) => Frozen::Bytes(bytes.clone()),
            Value::Date(date) => Frozen::Date(*date),
            Value::Regex(regex) => Frozen::Regex(regex.clone()),
            Value::Function(name) => Frozen::Function(name.clone()),
            Value::Symbol(description) => Frozen::Symbol(description.clone()),
            Value::Opaque { type_name, repr } => Frozen::Opaque {
                type_name: type_name.clone(),
                repr: repr.clone(),
            },
            Value::Array(items) => {
                let id = Rc::as_ptr(items).cast::<()>();
                if self.path.contains(&id) {
                    return Frozen::Circular;
                }
                self.path.push(id);
                let frozen = items.borrow().iter().map(|item| self.freeze(item)).collect();
                self.path.pop();
                Frozen::Array(frozen)
            }
            Value::Object(object) => {
                let id = Rc::as_ptr(object).cast::<()>();
                if self.path.contains(&id) {
                    return Frozen::Circular;
                }
                self.path.push(id);
                let object = object.borrow();
                let entries = object
                    .entries
                    .iter()
                    .map(|(key, value)| (self.freeze(key), self.freeze(value)))
                    .collect();
                self.path.pop();
                Frozen::Object(FrozenObject {
                    constructor: object.constructor.clone(),
                    entries,
                })
            }
        }
    }
}

impl Frozen {
    /// Structural equality.
    ///
    /// `NaN` equals `NaN`, arrays compare in order and object entries compare
    /// regardless of order.
    pub fn deep_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined)
            | (Self::Null, Self::Null)
            | (Self::Circular, Self::Circular) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            #[allow(clippy::float_cmp)]
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a == b,
            (Self::Function(a), Self::Function(b)) | (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (
                Self::Opaque {
                    type_name: a_type,
                    repr: a_repr,
                },
                Self::Opaque {
                    type_name: b_type,
                    repr: b_repr,
                },
            ) => a_type == b_type && a_repr == b_repr,
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.deep_eq(y))
            }
            (Self::Object(a), Self::Object(b)) => {
                a.constructor == b.constructor
                    && a.entries.len() == b.entries.len()
                    && a.entries.iter().all(|(key, value)| {
                        b.get(key).is_some_and(|other| value.deep_eq(other))
                    })
            }
            _ => false,
        }
    }

    /// The human-readable rendering used by inspect-mode snapshots.
    pub fn to_text(&self) -> String {
        inspect(self, Style::Text, "  ")
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Frozen {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other)
    }
}

impl FrozenObject {
    pub fn get(&self, key: &Frozen) -> Option<&Frozen> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate.deep_eq(key))
            .map(|(_, value)| value)
    }
}
