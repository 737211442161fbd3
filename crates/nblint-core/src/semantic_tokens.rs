//! Delta encoding of semantic tokens.
//!
//! The semantic-highlighting wire format sends five integers per token:
//! `[delta_line, delta_start, length, token_type, token_modifiers]`.
//! `delta_start` is relative to the previous token only when both are on
//! the same line; after a line change it is the absolute column.

use crate::tokens::{self, RawToken};

/// Token types advertised in the legend, indexed by [`tokens::TokenKind::legend_index`].
pub const TOKEN_TYPES: [&str; 4] = ["namespace", "property", "method", "string"];

/// Token modifiers advertised in the legend. None are defined.
pub const TOKEN_MODIFIERS: [&str; 0] = [];

/// A token in its relative wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodedToken {
    pub delta_line: u32,
    pub delta_column: u32,
    pub length: u32,
    pub kind: u32,
    pub modifiers: u32,
}

impl EncodedToken {
    /// The five integers in wire order.
    pub fn to_array(self) -> [u32; 5] {
        [
            self.delta_line,
            self.delta_column,
            self.length,
            self.kind,
            self.modifiers,
        ]
    }
}

/// Encode an ordered token sequence.
///
/// The input must already be sorted by (line, column), as produced by
/// [`tokens::order_tokens`].
pub fn encode_tokens(tokens: &[RawToken]) -> Vec<EncodedToken> {
    let mut prev_line = 0u32;
    let mut prev_column = 0u32;

    tokens
        .iter()
        .map(|token| {
            let (delta_line, delta_column) = if token.line == prev_line {
                (0, token.column - prev_column)
            } else {
                (token.line - prev_line, token.column)
            };
            prev_line = token.line;
            prev_column = token.column;

            EncodedToken {
                delta_line,
                delta_column,
                length: token.length,
                kind: token.classify().legend_index(),
                modifiers: 0,
            }
        })
        .collect()
}

/// Flatten encoded tokens into the integer array sent to the client.
pub fn flatten(encoded: &[EncodedToken]) -> Vec<u32> {
    encoded.iter().flat_map(|t| t.to_array()).collect()
}

/// Full pipeline: split, tokenize, merge, order and encode a document.
///
/// Returns `None` for documents that are not notebook-formatted.
pub fn semantic_tokens(text: &str) -> Option<Vec<EncodedToken>> {
    if !crate::notebook::is_notebook(text) {
        return None;
    }
    let ordered = tokens::tokenize_document(text);
    tracing::debug!(count = ordered.len(), "encoding semantic tokens");
    Some(encode_tokens(&ordered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::Cell;
    use crate::tokens::{order_tokens, tokenize_cell};

    /// Prefix-sum the deltas back into absolute (line, column) pairs.
    fn decode(encoded: &[EncodedToken]) -> Vec<(u32, u32)> {
        let mut line = 0;
        let mut column = 0;
        encoded
            .iter()
            .map(|t| {
                if t.delta_line == 0 {
                    column += t.delta_column;
                } else {
                    line += t.delta_line;
                    column = t.delta_column;
                }
                (line, column)
            })
            .collect()
    }

    #[test]
    fn select_line_example() {
        let cell = Cell::new("  select * from t", 10);
        let encoded = encode_tokens(&order_tokens(tokenize_cell(&cell)));
        insta::assert_snapshot!(
            format!("{:?}", flatten(&encoded)),
            @"[10, 2, 6, 1, 0, 0, 7, 1, 2, 0, 0, 2, 4, 1, 0, 0, 5, 1, 0, 0]"
        );
    }

    #[test]
    fn delta_round_trip_reconstructs_positions() {
        let cell = Cell::new(
            "# MAGIC %sql\n# MAGIC select a, 'b'\n\n# MAGIC   from t where x = \"y z\"",
            4,
        );
        let ordered = order_tokens(tokenize_cell(&cell));
        let absolute: Vec<(u32, u32)> = ordered.iter().map(|t| (t.line, t.column)).collect();
        assert_eq!(decode(&encode_tokens(&ordered)), absolute);
    }

    #[test]
    fn first_token_on_line_zero_is_relative_to_origin() {
        let cell = Cell::new("select", 0);
        let encoded = encode_tokens(&order_tokens(tokenize_cell(&cell)));
        assert_eq!(encoded[0].to_array(), [0, 0, 6, 1, 0]);
    }

    #[test]
    fn string_literals_use_string_legend_entry() {
        let cell = Cell::new("'abc'", 0);
        let encoded = encode_tokens(&order_tokens(tokenize_cell(&cell)));
        assert_eq!(encoded.len(), 1);
        assert_eq!(TOKEN_TYPES[encoded[0].kind as usize], "string");
    }

    #[test]
    fn non_notebook_yields_none() {
        assert_eq!(semantic_tokens("select * from t"), None);
    }

    #[test]
    fn notebook_without_sql_cells_yields_empty_stream() {
        let doc = "# Databricks notebook source\nx = 1\n# COMMAND ----------\nprint(x)";
        assert_eq!(semantic_tokens(doc), Some(Vec::new()));
    }

    #[test]
    fn encoding_is_idempotent() {
        let doc = "# Databricks notebook source\n\
                   # COMMAND ----------\n\
                   # MAGIC %sql\n\
                   # MAGIC select count(*) from t where name = 'x'";
        let first = semantic_tokens(doc).map(|t| flatten(&t));
        let second = semantic_tokens(doc).map(|t| flatten(&t));
        assert!(first.as_ref().is_some_and(|data| !data.is_empty()));
        assert_eq!(first, second);
    }
}
