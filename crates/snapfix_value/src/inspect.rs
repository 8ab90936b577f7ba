use std::fmt::Write;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::SecondsFormat;
use snapfix_static::FACADE_CRATE;

use crate::frozen::{Frozen, FrozenObject};

/// Containers that fit within this many columns are kept on one line.
const PREFERRED_WIDTH: usize = 80;

/// Byte buffers longer than this are rendered as base64.
const MAX_INLINE_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Rust source that evaluates to an equal [`Value`](crate::Value).
    Literal,
    /// Human-readable text, as compared by inspect-mode snapshots.
    Text,
}

/// Render `value` without any depth limit.
///
/// Nested containers that do not fit on one line are broken up with one entry
/// per line, each level indented by `indent_unit`.
pub fn inspect(value: &Frozen, style: Style, indent_unit: &str) -> String {
    Inspector { style, indent_unit }.render(value, 0)
}

struct Inspector<'a> {
    style: Style,
    indent_unit: &'a str,
}

struct Container<'v> {
    open: String,
    close: &'static str,
    empty: String,
    pad: bool,
    items: Vec<Item<'v>>,
}

enum Item<'v> {
    Element {
        value: &'v Frozen,
        wrap: bool,
    },
    Entry {
        key: &'v Frozen,
        value: &'v Frozen,
        wrap_key: bool,
        wrap_value: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralClass {
    Integer,
    Float,
    Str,
    Bool,
    Value,
}

impl Inspector<'_> {
    fn render(&self, value: &Frozen, depth: usize) -> String {
        let Some(container) = self.container(value) else {
            return self.scalar(value);
        };
        if container.items.is_empty() {
            return container.empty;
        }

        let compact = self.join_compact(&container);
        let width = self.indent_unit.chars().count() * depth + compact.chars().count();
        if width <= PREFERRED_WIDTH && !compact.contains('\n') {
            return compact;
        }

        let inner = self.indent_unit.repeat(depth + 1);
        let mut output = container.open.clone();
        output.push('\n');
        for (index, item) in container.items.iter().enumerate() {
            output.push_str(&inner);
            output.push_str(&self.item(item, &|v: &Frozen| self.render(v, depth + 1)));
            if self.style == Style::Literal || index + 1 < container.items.len() {
                output.push(',');
            }
            output.push('\n');
        }
        output.push_str(&self.indent_unit.repeat(depth));
        output.push_str(container.close);
        output
    }

    fn compact(&self, value: &Frozen) -> String {
        match self.container(value) {
            None => self.scalar(value),
            Some(container) if container.items.is_empty() => container.empty,
            Some(container) => self.join_compact(&container),
        }
    }

    fn join_compact(&self, container: &Container<'_>) -> String {
        let items = container
            .items
            .iter()
            .map(|item| self.item(item, &|v: &Frozen| self.compact(v)))
            .collect::<Vec<_>>()
            .join(", ");
        if container.pad {
            format!("{} {items} {}", container.open, container.close)
        } else {
            format!("{}{items}{}", container.open, container.close)
        }
    }

    fn item(&self, item: &Item<'_>, render: &dyn Fn(&Frozen) -> String) -> String {
        match (self.style, item) {
            (Style::Text, Item::Element { value, .. }) => render(value),
            (Style::Text, Item::Entry { key, value, .. }) => {
                format!("{}: {}", text_key(key, render), render(value))
            }
            (Style::Literal, Item::Element { value, wrap }) => wrap_literal(render(value), *wrap),
            (
                Style::Literal,
                Item::Entry {
                    key,
                    value,
                    wrap_key,
                    wrap_value,
                },
            ) => format!(
                "({}, {})",
                wrap_literal(render(key), *wrap_key),
                wrap_literal(render(value), *wrap_value)
            ),
        }
    }

    fn container<'v>(&self, value: &'v Frozen) -> Option<Container<'v>> {
        match (self.style, value) {
            (Style::Text, Frozen::Array(items)) => Some(Container {
                open: "[".to_string(),
                close: "]",
                empty: "[]".to_string(),
                pad: false,
                items: elements(items, false),
            }),
            (Style::Text, Frozen::Object(object)) => Some(text_object(object)),
            (Style::Literal, Frozen::Array(items)) => Some(Container {
                open: format!("{FACADE_CRATE}::Value::array(["),
                close: "])",
                empty: format!("{FACADE_CRATE}::Value::empty_array()"),
                pad: false,
                items: elements(items, needs_wrap(items.iter())),
            }),
            (Style::Literal, Frozen::Object(object)) => Some(literal_object(object)),
            _ => None,
        }
    }

    fn scalar(&self, value: &Frozen) -> String {
        match self.style {
            Style::Text => text_scalar(value),
            Style::Literal => literal_scalar(value),
        }
    }
}

fn elements(items: &[Frozen], wrap_mixed: bool) -> Vec<Item<'_>> {
    items
        .iter()
        .map(|value| Item::Element {
            value,
            wrap: wrap_mixed && literal_class(value) != LiteralClass::Value,
        })
        .collect()
}

fn text_object(object: &FrozenObject) -> Container<'_> {
    let name = object.constructor.as_deref();
    let positional = object
        .entries
        .iter()
        .enumerate()
        .all(|(index, (key, _))| matches!(key, Frozen::Number(n) if *n == index as f64));

    if let (Some(name), true, false) = (name, positional, object.entries.is_empty()) {
        return Container {
            open: format!("{name}("),
            close: ")",
            empty: format!("{name}()"),
            pad: false,
            items: object
                .entries
                .iter()
                .map(|(_, value)| Item::Element { value, wrap: false })
                .collect(),
        };
    }

    let prefix = name.map(|name| format!("{name} ")).unwrap_or_default();
    Container {
        open: format!("{prefix}{{"),
        close: "}",
        empty: format!("{prefix}{{}}"),
        pad: true,
        items: entries(object, false, false),
    }
}

fn literal_object(object: &FrozenObject) -> Container<'_> {
    let wrap_key = needs_wrap(object.entries.iter().map(|(key, _)| key));
    let wrap_value = needs_wrap(object.entries.iter().map(|(_, value)| value));
    let items = entries(object, wrap_key, wrap_value);

    match &object.constructor {
        None => Container {
            open: format!("{FACADE_CRATE}::Value::object(["),
            close: "])",
            empty: format!("{FACADE_CRATE}::Value::empty_object()"),
            pad: false,
            items,
        },
        Some(name) => Container {
            open: format!("{FACADE_CRATE}::Value::instance({name:?}, ["),
            close: "])",
            empty: format!(
                "{FACADE_CRATE}::Value::instance({name:?}, Vec::<(&str, {FACADE_CRATE}::Value)>::new())"
            ),
            pad: false,
            items,
        },
    }
}

fn entries(object: &FrozenObject, wrap_keys: bool, wrap_values: bool) -> Vec<Item<'_>> {
    object
        .entries
        .iter()
        .map(|(key, value)| Item::Entry {
            key,
            value,
            wrap_key: wrap_keys && literal_class(key) != LiteralClass::Value,
            wrap_value: wrap_values && literal_class(value) != LiteralClass::Value,
        })
        .collect()
}

/// Array and tuple literals need a single element type, so mixed elements are
/// lifted into `Value` explicitly.
fn needs_wrap<'v>(mut values: impl Iterator<Item = &'v Frozen>) -> bool {
    let Some(first) = values.next().map(literal_class) else {
        return false;
    };
    values.any(|value| literal_class(value) != first)
}

fn literal_class(value: &Frozen) -> LiteralClass {
    match value {
        Frozen::Bool(_) => LiteralClass::Bool,
        Frozen::String(_) => LiteralClass::Str,
        Frozen::Number(n) if is_small_integer(*n) => LiteralClass::Integer,
        Frozen::Number(_) => LiteralClass::Float,
        _ => LiteralClass::Value,
    }
}

fn wrap_literal(rendered: String, wrap: bool) -> String {
    if wrap {
        format!("{FACADE_CRATE}::Value::from({rendered})")
    } else {
        rendered
    }
}

fn is_small_integer(n: f64) -> bool {
    n.fract() == 0.0 && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX)
}

fn text_key(key: &Frozen, render: &dyn Fn(&Frozen) -> String) -> String {
    match key {
        Frozen::String(name) if is_identifier(name) => name.clone(),
        Frozen::String(name) => format!("{name:?}"),
        other => format!("[{}]", render(other)),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn text_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        String::from(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{}", n as i64)
    } else {
        format!("{n:?}")
    }
}

fn literal_number(n: f64) -> String {
    if n.is_nan() {
        "f64::NAN".to_string()
    } else if n.is_infinite() {
        String::from(if n > 0.0 { "f64::INFINITY" } else { "f64::NEG_INFINITY" })
    } else if is_small_integer(n) {
        format!("{}", n as i64)
    } else {
        format!("{n:?}")
    }
}

fn hex_bytes(bytes: &[u8]) -> String {
    let mut output = String::new();
    for (index, byte) in bytes.iter().enumerate() {
        if index > 0 {
            output.push_str(", ");
        }
        let _ = write!(output, "0x{byte:02X}");
    }
    output
}

fn rfc3339(date: &chrono::DateTime<chrono::Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn text_scalar(value: &Frozen) -> String {
    match value {
        Frozen::Undefined => "undefined".to_string(),
        Frozen::Null => "null".to_string(),
        Frozen::Bool(b) => b.to_string(),
        Frozen::Number(n) => text_number(*n),
        Frozen::String(s) => format!("{s:?}"),
        Frozen::Bytes(bytes) => format!("Bytes([{}])", hex_bytes(bytes)),
        Frozen::Date(date) => format!("Date({})", rfc3339(date)),
        Frozen::Regex(regex) => format!("/{}/{}", regex.source, regex.flags),
        Frozen::Function(name) if name.is_empty() => "[Function]".to_string(),
        Frozen::Function(name) => format!("[Function: {name}]"),
        Frozen::Symbol(description) => format!("Symbol({description})"),
        Frozen::Opaque { repr, .. } => repr.clone(),
        Frozen::Circular => "[Circular]".to_string(),
        Frozen::Array(_) | Frozen::Object(_) => unreachable!("containers are not scalars"),
    }
}

fn literal_scalar(value: &Frozen) -> String {
    match value {
        Frozen::Undefined => format!("{FACADE_CRATE}::Value::Undefined"),
        Frozen::Null => format!("{FACADE_CRATE}::Value::Null"),
        Frozen::Bool(b) => b.to_string(),
        Frozen::Number(n) => literal_number(*n),
        Frozen::String(s) => format!("{s:?}"),
        Frozen::Bytes(bytes) if bytes.is_empty() => format!("{FACADE_CRATE}::Value::bytes(b\"\")"),
        Frozen::Bytes(bytes) if bytes.len() > MAX_INLINE_BYTES => format!(
            "{FACADE_CRATE}::Value::bytes_base64({:?})",
            STANDARD.encode(bytes)
        ),
        Frozen::Bytes(bytes) => format!("{FACADE_CRATE}::Value::bytes([{}])", hex_bytes(bytes)),
        Frozen::Date(date) => format!("{FACADE_CRATE}::Value::date({:?})", rfc3339(date)),
        Frozen::Regex(regex) => format!(
            "{FACADE_CRATE}::Value::regex({:?}, {:?})",
            regex.source, regex.flags
        ),
        Frozen::Function(name) => format!("{FACADE_CRATE}::Value::function({name:?})"),
        Frozen::Symbol(description) => format!("{FACADE_CRATE}::Value::symbol({description:?})"),
        Frozen::Opaque { type_name, repr } => {
            format!("{FACADE_CRATE}::Value::opaque({type_name:?}, {repr:?})")
        }
        Frozen::Circular => format!("{FACADE_CRATE}::Value::Undefined /* [Circular] */"),
        Frozen::Array(_) | Frozen::Object(_) => unreachable!("containers are not scalars"),
    }
}
