use std::fmt::Write;
use std::io;

use colored::{ColoredString, Colorize};
use similar::{Algorithm, ChangeTag, TextDiff};

/// Lines of unchanged context shown around each change.
const CONTEXT_LINES: usize = 3;

/// Width used when the terminal size is unknown.
const FALLBACK_WIDTH: usize = 80;

/// Render a line diff from `old` to `new`, with changed words underlined.
fn render_diff(output: &mut String, old: &str, new: &str, width: usize) {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Patience)
        .diff_lines(old, new);
    let groups = diff.grouped_ops(CONTEXT_LINES);
    if groups.is_empty() {
        return;
    }

    let rule_width = width.saturating_sub(8);
    let _ = writeln!(output, "───────┬{:─<rule_width$}", "");

    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            let _ = writeln!(output, "   ┈┈┈┈┼{:┈<rule_width$}", "");
        }
        for op in group {
            for change in diff.iter_inline_changes(op) {
                let tag = change.tag();
                let line_number = change
                    .new_index()
                    .or(change.old_index())
                    .map_or_else(|| "     ".to_string(), |n| format!("{:>5}", n + 1));

                let mut content = String::new();
                for (emphasized, value) in change.iter_strings_lossy() {
                    let styled = paint(tag, &value);
                    if emphasized && tag != ChangeTag::Equal {
                        let _ = write!(content, "{}", styled.underline());
                    } else {
                        let _ = write!(content, "{styled}");
                    }
                }

                let marker = match tag {
                    ChangeTag::Delete => "-".red(),
                    ChangeTag::Insert => "+".green(),
                    ChangeTag::Equal => " ".normal(),
                };
                let _ = write!(output, "{} │ {marker}{content}", line_number.dimmed());
                if change.missing_newline() {
                    let _ = writeln!(output);
                }
            }
        }
    }

    let _ = writeln!(output, "───────┴{:─<rule_width$}", "");
}

fn paint(tag: ChangeTag, value: &str) -> ColoredString {
    match tag {
        ChangeTag::Delete => value.red(),
        ChangeTag::Insert => value.green(),
        ChangeTag::Equal => value.dimmed(),
    }
}

/// A diff sized for assertion messages.
pub fn format_diff(old: &str, new: &str) -> String {
    let mut output = String::new();
    render_diff(&mut output, old, new, 40);
    output
}

/// Write a diff that spans the terminal.
pub fn print_changeset(out: &mut impl io::Write, old: &str, new: &str) -> io::Result<()> {
    let width = terminal_size::terminal_size()
        .map_or(FALLBACK_WIDTH, |(width, _)| width.0 as usize);
    let mut output = String::new();
    render_diff(&mut output, old, new, width);
    write!(out, "{output}")
}
