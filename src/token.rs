//! The token definition for the issue query language.

/// A token is a single unit of the language, with a specific kind and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

/// The kind of a token.
///
/// Text payloads are raw slices of the input: quotes and escape sequences are
/// kept exactly as typed.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    // Terms
    FreeText(&'a str), // word or "quoted phrase"
    Key(&'a str),      // the `label` in `label:bug`
    Value(&'a str),    // the `bug` in `label:bug`, possibly quoted

    // Punctuation
    Colon,    // :
    Negation, // leading - of a key:value term

    // Special
    EndOfInput,
}

impl<'a> TokenKind<'a> {
    /// The raw input text this kind carries, if any.
    pub fn text(&self) -> Option<&'a str> {
        match self {
            TokenKind::FreeText(s) | TokenKind::Key(s) | TokenKind::Value(s) => Some(*s),
            TokenKind::Colon | TokenKind::Negation | TokenKind::EndOfInput => None,
        }
    }
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
