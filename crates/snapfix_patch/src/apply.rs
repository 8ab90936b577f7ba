use crate::source::TextRange;

/// Replace `range` of a file with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            range: TextRange::empty(offset),
            replacement: text.into(),
        }
    }

    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        Self {
            range,
            replacement: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedEdits {
    pub text: String,
    pub changed: bool,
    /// Edits that were not applied because they overlapped an earlier edit or
    /// did not fall on character boundaries.
    pub dropped: Vec<TextEdit>,
}

/// Apply `edits` to `text` in one pass.
///
/// Edits are ordered by position first, so the result does not depend on the
/// order they were produced in. An edit that overlaps one before it, or that
/// starts where an earlier edit starts, is dropped.
pub fn apply_edits(text: &str, mut edits: Vec<TextEdit>) -> AppliedEdits {
    edits.sort_by_key(|edit| (edit.range.start, edit.range.end));

    let mut accepted: Vec<TextEdit> = Vec::with_capacity(edits.len());
    let mut dropped = Vec::new();
    for edit in edits {
        let in_bounds = edit.range.start <= edit.range.end
            && text.is_char_boundary(edit.range.start)
            && text.is_char_boundary(edit.range.end);
        let conflicts = accepted.last().is_some_and(|previous| {
            edit.range.start < previous.range.end || edit.range.start == previous.range.start
        });
        if !in_bounds || conflicts {
            tracing::warn!(
                start = edit.range.start,
                end = edit.range.end,
                "Dropping conflicting edit"
            );
            dropped.push(edit);
        } else {
            accepted.push(edit);
        }
    }

    let changed = !accepted.is_empty();
    let mut output = text.to_string();
    for edit in accepted.iter().rev() {
        output.replace_range(edit.range.start..edit.range.end, &edit.replacement);
    }

    AppliedEdits {
        text: output,
        changed,
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_no_edits() {
        let applied = apply_edits("abc", Vec::new());
        assert_eq!(applied.text, "abc");
        assert!(!applied.changed);
    }

    #[test]
    fn test_order_does_not_matter() {
        let text = "one two three";
        let edits = vec![
            TextEdit::replace(TextRange::new(8, 13), "3"),
            TextEdit::insert(0, ">"),
            TextEdit::replace(TextRange::new(4, 7), "2"),
        ];
        let mut reversed = edits.clone();
        reversed.reverse();

        assert_eq!(apply_edits(text, edits).text, ">one 2 3");
        assert_eq!(apply_edits(text, reversed).text, ">one 2 3");
    }

    #[test]
    fn test_adjacent_edits_are_kept() {
        let applied = apply_edits(
            "ab",
            vec![
                TextEdit::replace(TextRange::new(0, 1), "A"),
                TextEdit::insert(1, "-"),
            ],
        );
        assert_eq!(applied.text, "A-b");
        assert!(applied.dropped.is_empty());
    }

    #[test]
    fn test_overlapping_edit_is_dropped() {
        let applied = apply_edits(
            "abcdef",
            vec![
                TextEdit::replace(TextRange::new(0, 4), "X"),
                TextEdit::replace(TextRange::new(2, 6), "Y"),
            ],
        );
        assert_eq!(applied.text, "Xef");
        assert_eq!(applied.dropped, [TextEdit::replace(TextRange::new(2, 6), "Y")]);
    }

    #[test]
    fn test_duplicate_insertions_are_dropped() {
        let applied = apply_edits(
            "ab",
            vec![TextEdit::insert(1, ", 1"), TextEdit::insert(1, ", 1")],
        );
        assert_eq!(applied.text, "a, 1b");
        assert_eq!(applied.dropped.len(), 1);
    }

    #[test]
    fn test_edit_inside_a_character_is_dropped() {
        let applied = apply_edits("ø", vec![TextEdit::insert(1, "x")]);
        assert_eq!(applied.text, "ø");
        assert!(!applied.changed);
    }
}
