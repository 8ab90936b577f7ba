use std::fmt;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use proc_macro2::{LineColumn, Span, TokenStream};
use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::{Expr, ExprLit, Lit, Token};

const BOM: char = '\u{feff}';

/// A 1-based line and a 0-based column counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl From<LineColumn> for Position {
    fn from(value: LineColumn) -> Self {
        Self {
            line: value.line,
            column: value.column,
        }
    }
}

/// A half-open byte range into [`SourceUnit::text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub const fn len(self) -> usize {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// `expect!(..)`
    Macro,
    /// `expect(..)`
    Function,
    /// `receiver.to_equal_snapshot(..)`
    Method,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgKind {
    /// A plain or raw string literal, with its value.
    Str(String),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgNode {
    pub kind: ArgKind,
    pub range: TextRange,
    pub start: Position,
}

impl ArgNode {
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ArgKind::Str(value) => Some(value),
            ArgKind::Other => None,
        }
    }
}

/// A call-like expression, recorded in pre-order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallNode {
    pub kind: CallKind,
    /// The last path segment of the callee, or the method name.
    pub callee: String,
    /// Where `callee` itself is written.
    pub callee_range: TextRange,
    /// Position of the first token of the callee path. For method calls, the
    /// position of the method name.
    pub start: Position,
    pub args: Vec<ArgNode>,
}

/// Where a file failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub path: Utf8PathBuf,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: parsing error: {}",
            self.path, self.line, self.column, self.message
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read `{path}`")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Parse(ParseDiagnostic),
}

/// Byte offsets of the start of every line.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        Self { line_starts }
    }

    /// The text of a 1-based line, without its line terminator.
    pub fn line<'t>(&self, text: &'t str, line: usize) -> Option<&'t str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map_or(text.len(), |next| next - 1);
        let content = text.get(start..end)?;
        Some(content.strip_suffix('\r').unwrap_or(content))
    }

    pub fn offset(&self, text: &str, position: Position) -> Option<usize> {
        let start = *self.line_starts.get(position.line.checked_sub(1)?)?;
        let content = self.line(text, position.line)?;
        let within = content
            .char_indices()
            .nth(position.column)
            .map_or(content.len(), |(index, _)| index);
        Some(start + within)
    }
}

/// A parsed source file.
///
/// `text` is the file contents without a leading byte order mark. All ranges
/// and positions refer to it.
#[derive(Debug)]
pub struct SourceUnit {
    path: Utf8PathBuf,
    text: String,
    has_bom: bool,
    line_index: LineIndex,
    calls: Vec<CallNode>,
}

impl SourceUnit {
    pub fn read(path: &Utf8Path) -> Result<Self, SourceError> {
        let raw = fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path.to_path_buf(), raw)
    }

    pub fn parse(path: Utf8PathBuf, raw: String) -> Result<Self, SourceError> {
        let (text, has_bom) = match raw.strip_prefix(BOM) {
            Some(rest) => (rest.to_string(), true),
            None => (raw, false),
        };

        let file = match syn::parse_file(&neutralize_shebang(&text)) {
            Ok(file) => file,
            Err(err) => {
                let start = err.span().start();
                return Err(SourceError::Parse(ParseDiagnostic {
                    path,
                    line: start.line,
                    column: start.column + 1,
                    message: err.to_string(),
                }));
            }
        };

        let line_index = LineIndex::new(&text);
        let mut collector = CallCollector {
            text: &text,
            line_index: &line_index,
            calls: Vec::new(),
        };
        collector.visit_file(&file);
        let calls = collector.calls;

        tracing::debug!(%path, calls = calls.len(), "Parsed source file");

        Ok(Self {
            path,
            text,
            has_bom,
            line_index,
            calls,
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn has_bom(&self) -> bool {
        self.has_bom
    }

    pub fn calls(&self) -> &[CallNode] {
        &self.calls
    }

    pub fn line(&self, line: usize) -> Option<&str> {
        self.line_index.line(&self.text, line)
    }

    /// The leading spaces and tabs of a 1-based line.
    pub fn line_indent(&self, line: usize) -> &str {
        self.line(line).map_or("", crate::indent::leading_whitespace)
    }
}

/// Replace an interpreter directive with a comment of the same length.
///
/// `#![...]` is an inner attribute, not a directive, and is left alone.
fn neutralize_shebang(text: &str) -> std::borrow::Cow<'_, str> {
    match text.strip_prefix("#!") {
        Some(rest) if !rest.trim_start().starts_with('[') => {
            std::borrow::Cow::Owned(format!("//{rest}"))
        }
        _ => std::borrow::Cow::Borrowed(text),
    }
}

struct CallCollector<'a> {
    text: &'a str,
    line_index: &'a LineIndex,
    calls: Vec<CallNode>,
}

impl CallCollector<'_> {
    fn range(&self, tokens: TokenStream) -> Option<(Position, TextRange)> {
        let mut iter = tokens.into_iter();
        let first = iter.next()?;
        let last = iter.last().unwrap_or_else(|| first.clone());
        let start = Position::from(first.span().start());
        let end = Position::from(last.span().end());
        Some((
            start,
            TextRange::new(
                self.line_index.offset(self.text, start)?,
                self.line_index.offset(self.text, end)?,
            ),
        ))
    }

    fn span_range(&self, span: Span) -> Option<(Position, TextRange)> {
        let start = Position::from(span.start());
        let end = Position::from(span.end());
        Some((
            start,
            TextRange::new(
                self.line_index.offset(self.text, start)?,
                self.line_index.offset(self.text, end)?,
            ),
        ))
    }

    fn args<'e>(&self, args: impl IntoIterator<Item = &'e Expr>) -> Option<Vec<ArgNode>> {
        args.into_iter().map(|expr| self.arg(expr)).collect()
    }

    fn arg(&self, expr: &Expr) -> Option<ArgNode> {
        let (start, range) = self.range(expr.to_token_stream())?;
        let kind = match expr {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) => ArgKind::Str(lit.value()),
            _ => ArgKind::Other,
        };
        Some(ArgNode { kind, range, start })
    }

    fn record<'e>(
        &mut self,
        kind: CallKind,
        path: &syn::Path,
        args: impl IntoIterator<Item = &'e Expr>,
    ) {
        let Some(callee) = path.segments.last() else {
            return;
        };
        let Some((start, _)) = self.range(path.to_token_stream()) else {
            return;
        };
        let Some((_, callee_range)) = self.span_range(callee.ident.span()) else {
            return;
        };
        let Some(args) = self.args(args) else {
            return;
        };
        self.calls.push(CallNode {
            kind,
            callee: callee.ident.to_string(),
            callee_range,
            start,
            args,
        });
    }
}

impl<'ast> Visit<'ast> for CallCollector<'_> {
    fn visit_macro(&mut self, mac: &'ast syn::Macro) {
        // Bodies that are not a comma separated list of expressions (`vec![0; n]`,
        // `macro_rules!` definitions, ...) are skipped.
        let Ok(args) = mac.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) else {
            return;
        };
        self.record(CallKind::Macro, &mac.path, &args);
        for arg in &args {
            Visit::visit_expr(self, arg);
        }
    }

    fn visit_expr_call(&mut self, call: &'ast syn::ExprCall) {
        if let Expr::Path(func) = &*call.func {
            self.record(CallKind::Function, &func.path, &call.args);
        }
        visit::visit_expr_call(self, call);
    }

    fn visit_expr_method_call(&mut self, call: &'ast syn::ExprMethodCall) {
        if let (Some((start, callee_range)), Some(args)) =
            (self.span_range(call.method.span()), self.args(&call.args))
        {
            self.calls.push(CallNode {
                kind: CallKind::Method,
                callee: call.method.to_string(),
                callee_range,
                start,
                args,
            });
        }
        visit::visit_expr_method_call(self, call);
    }
}
