use std::collections::HashMap;

/// Used when a file has no indented lines to learn from.
const DEFAULT_INDENT_WIDTH: usize = 4;

/// The leading spaces and tabs of `line`.
pub fn leading_whitespace(line: &str) -> &str {
    let content = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - content.len()]
}

/// Detect the indentation unit of a file.
///
/// Files indented mostly with tabs get a tab. Otherwise the most common
/// increase in leading spaces between consecutive non-blank lines wins, with
/// ties going to the smaller width.
pub fn detect_indent(text: &str) -> String {
    let mut tab_lines = 0usize;
    let mut space_lines = 0usize;
    let mut steps: HashMap<usize, usize> = HashMap::new();
    let mut previous = 0usize;

    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        let indent = leading_whitespace(line);
        if indent.starts_with('\t') {
            tab_lines += 1;
            continue;
        }
        if !indent.is_empty() {
            space_lines += 1;
        }
        let width = indent.len();
        if width > previous {
            *steps.entry(width - previous).or_default() += 1;
        }
        previous = width;
    }

    if tab_lines > space_lines {
        return "\t".to_string();
    }

    let width = steps
        .into_iter()
        .max_by(|(a_width, a_count), (b_width, b_count)| {
            a_count.cmp(b_count).then(b_width.cmp(a_width))
        })
        .map_or(DEFAULT_INDENT_WIDTH, |(width, _)| width);
    " ".repeat(width)
}

/// Prefix every non-empty line after the first with `indent`.
pub fn reindent(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_string();
    }
    let mut output = String::with_capacity(text.len());
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            output.push('\n');
            if !line.is_empty() {
                output.push_str(indent);
            }
        }
        output.push_str(line);
    }
    output
}

/// Undo the block layout of a multi-line snapshot literal.
///
/// Removes one leading newline, the closing line if it only holds
/// indentation, and the indentation shared by all non-blank lines.
/// Whitespace-only lines shorter than that indentation become empty.
pub fn unindent(text: &str) -> String {
    let body = text.strip_prefix('\n').unwrap_or(text);
    let body = match body.rfind('\n') {
        Some(index) if body[index + 1..].chars().all(|c| c == ' ' || c == '\t') => &body[..index],
        _ => body,
    };

    let common = body
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line).len())
        .min()
        .unwrap_or(0);

    body.split('\n')
        .map(|line| line.get(common..).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}
