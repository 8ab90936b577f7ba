use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ValueError;

/// A regular expression literal, kept as its source text and flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegexLiteral {
    pub source: String,
    pub flags: String,
}

/// The entries of an object value, in insertion order.
///
/// `constructor` is `None` for plain mappings and holds the type name for
/// instances of named types.
#[derive(Clone, Default)]
pub struct Object {
    pub constructor: Option<String>,
    pub entries: Vec<(Value, Value)>,
}

/// A value an assertion is made about.
///
/// Arrays and objects are shared handles, so a value can contain itself.
/// Cloning a container clones the handle, not the contents.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Bytes(Vec<u8>),
    Date(DateTime<Utc>),
    Regex(RegexLiteral),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<Object>>),
    Function(String),
    Symbol(String),
    Opaque { type_name: String, repr: String },
}

impl Value {
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Self>,
    {
        Self::Array(Rc::new(RefCell::new(
            items.into_iter().map(Into::into).collect(),
        )))
    }

    pub fn empty_array() -> Self {
        Self::Array(Rc::default())
    }

    /// Build a plain mapping from `(key, value)` pairs.
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Self>,
        V: Into<Self>,
    {
        Self::Object(Rc::new(RefCell::new(Object {
            constructor: None,
            entries: collect_entries(entries),
        })))
    }

    pub fn empty_object() -> Self {
        Self::Object(Rc::default())
    }

    /// Build an instance of a named type, e.g. a struct.
    pub fn instance<I, K, V>(constructor: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Self>,
        V: Into<Self>,
    {
        Self::Object(Rc::new(RefCell::new(Object {
            constructor: Some(constructor.into()),
            entries: collect_entries(entries),
        })))
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn try_bytes_base64(encoded: &str) -> Result<Self, ValueError> {
        Ok(Self::Bytes(STANDARD.decode(encoded)?))
    }

    /// Decode a byte buffer from standard base64.
    ///
    /// # Panics
    ///
    /// Panics if `encoded` is not valid base64. Meant for snapshot literals,
    /// use [`Value::try_bytes_base64`] for untrusted input.
    pub fn bytes_base64(encoded: &str) -> Self {
        match Self::try_bytes_base64(encoded) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_date(rfc3339: &str) -> Result<Self, ValueError> {
        DateTime::parse_from_rfc3339(rfc3339)
            .map(|date| Self::Date(date.with_timezone(&Utc)))
            .map_err(|source| ValueError::Date {
                input: rfc3339.to_string(),
                source,
            })
    }

    /// Parse a date from an RFC 3339 timestamp.
    ///
    /// # Panics
    ///
    /// Panics if `rfc3339` is not a valid timestamp.
    pub fn date(rfc3339: &str) -> Self {
        match Self::try_date(rfc3339) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn regex(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self::Regex(RegexLiteral {
            source: source.into(),
            flags: flags.into(),
        })
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::Function(name.into())
    }

    pub fn symbol(description: impl Into<String>) -> Self {
        Self::Symbol(description.into())
    }

    pub fn opaque(type_name: impl Into<String>, repr: impl Into<String>) -> Self {
        Self::Opaque {
            type_name: type_name.into(),
            repr: repr.into(),
        }
    }

    /// Wrap anything printable with `{:?}` as an opaque value.
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Self::opaque(std::any::type_name::<T>(), format!("{value:?}"))
    }

    /// Convert any serializable value through its `serde_json` representation.
    pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, ValueError> {
        Ok(Self::from(serde_json::to_value(value)?))
    }

    /// Set `key` on an object, replacing an existing entry with the same string key.
    pub fn insert(&self, key: impl Into<Self>, value: impl Into<Self>) -> Result<(), ValueError> {
        let Self::Object(object) = self else {
            return Err(ValueError::NotAContainer {
                operation: "insert into",
                kind: self.kind(),
            });
        };
        let key = key.into();
        let value = value.into();
        let mut object = object.borrow_mut();
        let existing = match &key {
            Self::String(name) => object
                .entries
                .iter_mut()
                .find(|(k, _)| matches!(k, Self::String(other) if other == name)),
            _ => None,
        };
        match existing {
            Some((_, slot)) => *slot = value,
            None => object.entries.push((key, value)),
        }
        Ok(())
    }

    pub fn push(&self, value: impl Into<Self>) -> Result<(), ValueError> {
        let Self::Array(items) = self else {
            return Err(ValueError::NotAContainer {
                operation: "push onto",
                kind: self.kind(),
            });
        };
        items.borrow_mut().push(value.into());
        Ok(())
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Date(_) => "date",
            Self::Regex(_) => "regex",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
            Self::Symbol(_) => "symbol",
            Self::Opaque { .. } => "opaque",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

fn collect_entries<I, K, V>(entries: I) -> Vec<(Value, Value)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<Value>,
    V: Into<Value>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.freeze().deep_eq(&other.freeze())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.freeze().to_text())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("constructor", &self.constructor)
            .field("len", &self.entries.len())
            .finish()
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Undefined
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! impl_from_lossless_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Self::Number(f64::from(n))
                }
            }
        )*
    };
}

macro_rules! impl_from_wide_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Self::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_lossless_number!(i8, i16, i32, u8, u16, u32, f32, f64);
impl_from_wide_number!(i64, u64, isize, usize);

impl From<char> for Value {
    fn from(c: char) -> Self {
        Self::String(c.to_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(date: DateTime<Utc>) -> Self {
        Self::Date(date)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::array(items)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Self::array(items)
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Self::array(items.iter().cloned())
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        Self::object(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::array(items),
            serde_json::Value::Object(map) => Self::object(map),
        }
    }
}
