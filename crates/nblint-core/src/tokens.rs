//! Lexical tokenizing of SQL cells.
//!
//! Two independent passes run over every SQL cell:
//!
//! - a word pass, which splits each line on whitespace (parentheses count as
//!   whitespace) and records every occurrence of every word, and
//! - a string-literal pass, run once per quote character, which pairs quote
//!   characters as alternating open/close markers.
//!
//! The results are merged so string literals own their span, then ordered by
//! document position. Columns and lengths are in UTF-16 code units.

use crate::keywords;
use crate::notebook::{self, Cell};

/// Width of the `# MAGIC` prefix that the notebook format puts in front of
/// every line of a SQL cell. Continuation lines of a multi-line string
/// literal are positioned right after it.
pub const MAGIC_PREFIX_WIDTH: u32 = 7;

/// Words that are cell syntax rather than SQL content.
const WORD_STOPLIST: [&str; 3] = ["spaces", "#", "magic"];

/// Classification of a raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenKind {
    /// Not (yet) classified.
    #[default]
    Plain,
    /// A SQL statement keyword.
    SqlKeyword,
    /// A SQL function or operator.
    SqlFunction,
    /// A quoted string literal.
    StringLiteral,
}

impl TokenKind {
    /// Index of this kind in the semantic token legend.
    pub fn legend_index(self) -> u32 {
        match self {
            TokenKind::Plain => 0,
            TokenKind::SqlKeyword => 1,
            TokenKind::SqlFunction => 2,
            TokenKind::StringLiteral => 3,
        }
    }
}

/// A token at an absolute document position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub value: String,
    pub line: u32,
    pub column: u32,
    pub length: u32,
    pub kind: TokenKind,
}

impl RawToken {
    fn new(value: &str, line: u32, column: u32, length: u32, kind: TokenKind) -> Self {
        Self {
            value: value.to_string(),
            line,
            column,
            length,
            kind,
        }
    }

    /// Exclusive end column.
    pub fn end_column(&self) -> u32 {
        self.column + self.length
    }

    /// Whether two tokens on the same line share at least one column.
    pub fn overlaps(&self, other: &RawToken) -> bool {
        self.line == other.line
            && self.column < other.end_column()
            && other.column < self.end_column()
    }

    /// Final classification: keyword table first, then function table,
    /// otherwise the kind the token was created with.
    pub fn classify(&self) -> TokenKind {
        if keywords::is_keyword(&self.value) {
            TokenKind::SqlKeyword
        } else if keywords::is_function(&self.value) {
            TokenKind::SqlFunction
        } else {
            self.kind
        }
    }
}

/// Tokenize every SQL cell of a document into one ordered token sequence.
///
/// Documents without the notebook header produce no tokens.
pub fn tokenize_document(text: &str) -> Vec<RawToken> {
    if !notebook::is_notebook(text) {
        tracing::debug!("not a notebook, skipping semantic tokens");
        return Vec::new();
    }

    let tokens = notebook::query_cells(text)
        .iter()
        .flat_map(tokenize_cell)
        .collect();
    order_tokens(tokens)
}

/// Tokenize a single cell, with string literals merged over the words.
///
/// The result is not ordered.
pub fn tokenize_cell(cell: &Cell<'_>) -> Vec<RawToken> {
    let mut strings = string_tokens(cell, '"');
    strings.extend(string_tokens(cell, '\''));
    merge_tokens(word_tokens(cell), strings)
}

/// Word pass: every whitespace-delimited word of every line.
pub fn word_tokens(cell: &Cell<'_>) -> Vec<RawToken> {
    cell.lines()
        .flat_map(|(line_no, line)| {
            split_words_with_columns(line)
                .into_iter()
                .filter(|(word, _)| !is_stopword(word))
                .map(move |(word, column)| {
                    RawToken::new(word, line_no, column, utf16_len(word), TokenKind::Plain)
                })
        })
        .collect()
}

/// Split a line into words with their starting columns.
///
/// Whitespace and parentheses delimit words.
pub fn split_words_with_columns(line: &str) -> Vec<(&str, u32)> {
    let mut words = Vec::new();
    let mut start: Option<(usize, u32)> = None;
    let mut column = 0u32;

    for (idx, ch) in line.char_indices() {
        let delimiter = ch.is_whitespace() || ch == '(' || ch == ')';
        match (delimiter, start) {
            (true, Some((from, from_column))) => {
                words.push((&line[from..idx], from_column));
                start = None;
            }
            (false, None) => start = Some((idx, column)),
            _ => {}
        }
        column += ch.len_utf16() as u32;
    }

    if let Some((from, from_column)) = start {
        words.push((&line[from..], from_column));
    }
    words
}

fn is_stopword(word: &str) -> bool {
    WORD_STOPLIST.iter().any(|stop| word.eq_ignore_ascii_case(stop))
}

/// String-literal pass for one quote character.
///
/// Quote characters alternate between opening and closing a literal; an
/// unpaired trailing quote is ignored. The literal text runs from the
/// opening quote up to, not including, the closing quote.
pub fn string_tokens(cell: &Cell<'_>, quote: char) -> Vec<RawToken> {
    let quotes: Vec<usize> = cell.text.match_indices(quote).map(|(idx, _)| idx).collect();
    let lines: Vec<&str> = cell.text.split('\n').collect();
    let mut tokens = Vec::new();

    for pair in quotes.chunks_exact(2) {
        let (open, close) = (pair[0], pair[1]);
        let literal = &cell.text[open..close];
        let line = cell.start_line + cell.text[..open].matches('\n').count() as u32;

        let mut pieces = literal.split('\n');
        let first = pieces.next().unwrap_or_default();
        let column = locate_literal_column(&lines, first);
        let continuation: Vec<&str> = pieces.collect();

        if continuation.is_empty() {
            push_literal(&mut tokens, first, line, column, utf16_len(first) + 1);
            continue;
        }

        push_literal(
            &mut tokens,
            first,
            line,
            column,
            utf16_len(first) + 1 + MAGIC_PREFIX_WIDTH,
        );
        for (offset, piece) in continuation.iter().enumerate() {
            let length = (utf16_len(piece) + 1).saturating_sub(MAGIC_PREFIX_WIDTH);
            push_literal(
                &mut tokens,
                piece,
                line + 1 + offset as u32,
                MAGIC_PREFIX_WIDTH,
                length,
            );
        }
    }

    tokens
}

fn push_literal(tokens: &mut Vec<RawToken>, value: &str, line: u32, column: u32, length: u32) {
    if length > 0 {
        tokens.push(RawToken::new(
            value,
            line,
            column,
            length,
            TokenKind::StringLiteral,
        ));
    }
}

/// Column of a literal's first line, found by searching the cell's lines.
///
/// This is a heuristic: the first line of the cell containing `needle` wins,
/// so a literal whose text also appears on an earlier line of the same cell
/// is positioned on that earlier line's column. Precise offset tracking
/// would replace this function without touching its callers.
pub fn locate_literal_column(lines: &[&str], needle: &str) -> u32 {
    lines
        .iter()
        .find_map(|line| line.find(needle).map(|idx| utf16_len(&line[..idx])))
        .unwrap_or(0)
}

/// Combine word tokens with string-literal tokens.
///
/// String literals win their own span: any word token that overlaps a
/// literal on the same line is dropped. Literals are never tested against
/// each other.
pub fn merge_tokens(words: Vec<RawToken>, strings: Vec<RawToken>) -> Vec<RawToken> {
    let mut merged: Vec<RawToken> = words
        .into_iter()
        .filter(|word| !strings.iter().any(|literal| literal.overlaps(word)))
        .collect();
    merged.extend(strings);
    merged
}

/// Stable sort by (line, column); only the first token at any position survives.
pub fn order_tokens(mut tokens: Vec<RawToken>) -> Vec<RawToken> {
    tokens.sort_by_key(|t| (t.line, t.column));
    tokens.dedup_by_key(|t| (t.line, t.column));
    tokens
}

fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}
