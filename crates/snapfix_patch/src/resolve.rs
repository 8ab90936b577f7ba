use snapfix_static::ASSERTION_MACRO;
use unicode_width::UnicodeWidthChar;

use crate::apply::TextEdit;
use crate::fix::{FixDescriptor, FixStatus};
use crate::phrase::{AssertionPhrase, BaseAssertion};
use crate::render::render_snapshot;
use crate::source::{CallKind, CallNode, SourceUnit};

/// Width rustc gives a tab when it reports display columns.
const TAB_WIDTH: usize = 4;

/// Why a fix produced no edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("no snapshot assertion starts at line {line}, column {column}")]
    NoMatchingCall { line: usize, column: usize },

    #[error("expected {expected} arguments, found {found}")]
    ArgumentCount { expected: usize, found: usize },

    #[error("the assertion phrase is not a string literal")]
    PhraseNotALiteral,

    #[error("`{phrase}` does not end with `{expected}`")]
    PhraseMismatch { phrase: String, expected: String },

    #[error("`{method}` was called, not `{expected}`")]
    MethodMismatch {
        method: String,
        expected: &'static str,
    },

    #[error("another fix already patches this call")]
    Duplicate,

    #[error("the edits overlap those of another fix")]
    Conflict,
}

/// Compute the edits that bring the call recorded by `fix` up to date.
///
/// The call is the first snapshot assertion, in pre-order, whose callee starts
/// at the recorded line and column. That is either an `expect` macro or
/// function call taking a phrase, or a `to_equal_snapshot` /
/// `to_inspect_as_snapshot` method call, which is located by its method name.
pub fn build_edits(
    unit: &SourceUnit,
    fix: &FixDescriptor,
    indent_unit: &str,
) -> Result<Vec<TextEdit>, SkipReason> {
    let call = unit
        .calls()
        .iter()
        .find(|call| is_assertion(call) && starts_at(unit, call, fix))
        .ok_or(SkipReason::NoMatchingCall {
            line: fix.site.line,
            column: fix.site.column,
        })?;

    match call.kind {
        CallKind::Method => method_edits(unit, call, fix, indent_unit),
        CallKind::Macro | CallKind::Function => phrase_edits(unit, call, fix, indent_unit),
    }
}

fn is_assertion(call: &CallNode) -> bool {
    match call.kind {
        CallKind::Method => BaseAssertion::from_method_name(&call.callee).is_some(),
        CallKind::Macro | CallKind::Function => call.callee == ASSERTION_MACRO,
    }
}

/// `expect!(subject, phrase)` gains a third argument, and
/// `expect!(subject, phrase, expected)` has its third argument replaced.
fn phrase_edits(
    unit: &SourceUnit,
    call: &CallNode,
    fix: &FixDescriptor,
    indent_unit: &str,
) -> Result<Vec<TextEdit>, SkipReason> {
    let expected_args = match fix.status {
        FixStatus::Missing => 2,
        FixStatus::Mismatch => 3,
    };
    if call.args.len() != expected_args {
        return Err(SkipReason::ArgumentCount {
            expected: expected_args,
            found: call.args.len(),
        });
    }

    let phrase_arg = &call.args[1];
    let literal = phrase_arg.as_str().ok_or(SkipReason::PhraseNotALiteral)?;
    let phrase = AssertionPhrase::parse(literal)
        .filter(|phrase| phrase.base() == fix.assertion)
        .ok_or_else(|| SkipReason::PhraseMismatch {
            phrase: literal.to_string(),
            expected: fix.assertion.to_string(),
        })?;

    let anchor = call.args.get(2).unwrap_or(phrase_arg);
    let call_indent = unit.line_indent(anchor.start.line);
    let rendered = render_snapshot(&fix.subject, fix.assertion, indent_unit, call_indent);

    let mut edits = Vec::with_capacity(2);
    if rendered.base != phrase.base() {
        let renamed = phrase.with_base(rendered.base).to_string();
        edits.push(TextEdit::replace(phrase_arg.range, format!("{renamed:?}")));
    }
    match fix.status {
        FixStatus::Missing => edits.push(TextEdit::insert(
            phrase_arg.range.end,
            format!(", {}", rendered.text),
        )),
        FixStatus::Mismatch => edits.push(TextEdit::replace(call.args[2].range, rendered.text)),
    }
    Ok(edits)
}

/// `expect(subject).to_equal_snapshot(expected)` always carries its expected
/// value, so it is replaced whatever the status. The method is renamed when
/// the subject can only be compared by inspection.
fn method_edits(
    unit: &SourceUnit,
    call: &CallNode,
    fix: &FixDescriptor,
    indent_unit: &str,
) -> Result<Vec<TextEdit>, SkipReason> {
    if BaseAssertion::from_method_name(&call.callee) != Some(fix.assertion) {
        return Err(SkipReason::MethodMismatch {
            method: call.callee.clone(),
            expected: fix.assertion.method_name(),
        });
    }
    let [expected] = call.args.as_slice() else {
        return Err(SkipReason::ArgumentCount {
            expected: 1,
            found: call.args.len(),
        });
    };

    let call_indent = unit.line_indent(expected.start.line);
    let rendered = render_snapshot(&fix.subject, fix.assertion, indent_unit, call_indent);

    let mut edits = Vec::with_capacity(2);
    if rendered.base != fix.assertion {
        edits.push(TextEdit::replace(call.callee_range, rendered.base.method_name()));
    }
    edits.push(TextEdit::replace(expected.range, rendered.text));
    Ok(edits)
}

fn starts_at(unit: &SourceUnit, call: &CallNode, fix: &FixDescriptor) -> bool {
    if call.start.line != fix.site.line {
        return false;
    }
    if call.start.column + 1 == fix.site.column {
        return true;
    }
    unit.line(call.start.line).is_some_and(|line| {
        display_column(line, call.start.column) + 1 == fix.site.column
    })
}

/// The display column rustc reports for the `column`th character of `line`.
///
/// Tabs are 4 wide, wide characters 2 and combining marks 0. Characters
/// without a width, such as control characters, count as 1.
fn display_column(line: &str, column: usize) -> usize {
    line.chars()
        .take(column)
        .map(|c| match c {
            '\t' => TAB_WIDTH,
            c => c.width().unwrap_or(1),
        })
        .sum()
}
