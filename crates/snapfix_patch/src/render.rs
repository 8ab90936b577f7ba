use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use snapfix_static::FACADE_CRATE;
use snapfix_value::{Frozen, Style, inspect, is_simple_object_tree};

use crate::indent::reindent;
use crate::phrase::BaseAssertion;

/// Strings already laid out as a block start with newlines and indentation.
static PRE_FORMATTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\n*[ \t]").unwrap());

/// Source text for a snapshot argument, and the assertion it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub base: BaseAssertion,
}

/// Render `subject` as the expected value of a `base` assertion.
///
/// Subjects that cannot be written as a literal switch the assertion to
/// [`BaseAssertion::InspectAsSnapshot`] and render their textual inspection
/// instead. Every line after the first is prefixed with `call_indent`.
pub fn render_snapshot(
    subject: &Frozen,
    base: BaseAssertion,
    indent_unit: &str,
    call_indent: &str,
) -> Rendered {
    let (text, base) = match (base, subject) {
        (BaseAssertion::EqualSnapshot, Frozen::String(value)) => {
            (stringify(value, indent_unit), base)
        }
        (BaseAssertion::EqualSnapshot, _) if is_simple_object_tree(subject) => {
            (inspect(subject, Style::Literal, indent_unit), base)
        }
        _ => (
            stringify(&subject.to_text(), indent_unit),
            BaseAssertion::InspectAsSnapshot,
        ),
    };

    Rendered {
        text: reindent(&text, call_indent),
        base,
    }
}

/// Render a string as a Rust expression that evaluates to it.
///
/// Multi-line strings become an `unindent` block unless they already start
/// with indentation.
pub fn stringify(value: &str, indent_unit: &str) -> String {
    if value.contains('\n') && !PRE_FORMATTED.is_match(value) {
        block(value, indent_unit)
    } else {
        format!("{value:?}")
    }
}

fn block(value: &str, indent_unit: &str) -> String {
    let raw = !value.chars().any(|c| c.is_control() && c != '\n' && c != '\t');
    let hashes = if raw { "#".repeat(raw_hashes(value)) } else { String::new() };

    let mut output = format!("{FACADE_CRATE}::unindent(");
    if raw {
        let _ = write!(output, "r{hashes}");
    }
    output.push_str("\"\n");
    for line in value.split('\n') {
        if !line.is_empty() {
            output.push_str(indent_unit);
            if raw {
                output.push_str(line);
            } else {
                output.push_str(&escape_line(line));
            }
        }
        output.push('\n');
    }
    let _ = write!(output, "\"{hashes})");
    output
}

/// The fewest `#` that let a raw string hold `value`.
fn raw_hashes(value: &str) -> usize {
    value
        .match_indices('"')
        .map(|(index, _)| value[index + 1..].chars().take_while(|&c| c == '#').count() + 1)
        .max()
        .unwrap_or(0)
}

/// Escape a line for an ordinary string literal, without the quotes.
fn escape_line(line: &str) -> String {
    let quoted = format!("{line:?}");
    quoted[1..quoted.len() - 1].to_string()
}
