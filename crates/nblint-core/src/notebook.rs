//! Notebook cell splitting.
//!
//! A notebook source file is a plain Python file whose first line carries the
//! notebook header. Cells are separated by a `# COMMAND ----------` line, and
//! a cell whose lines are prefixed with `# MAGIC %sql` holds SQL instead of
//! Python.
//!
//! All marker matching is case-insensitive. Matching runs on an ASCII-lowercased
//! copy of the text, which has exactly the same byte offsets as the original,
//! so cells are always sliced out of the original text.

/// Header marking a document as notebook-formatted.
pub const NOTEBOOK_HEADER: &str = "# databricks notebook source";

/// Line separating two cells.
pub const CELL_SEPARATOR: &str = "# command ----------";

/// Magic comment marking a SQL cell.
pub const SQL_CELL_MARKER: &str = "# magic %sql";

/// A contiguous region of a notebook document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell<'a> {
    /// The cell's text, sliced from the original document.
    pub text: &'a str,
    /// Document line on which the cell's first character sits.
    pub start_line: u32,
    /// Number of physical lines in `text`.
    pub line_count: u32,
    /// Whether the cell carries the SQL magic marker.
    pub is_query: bool,
}

impl<'a> Cell<'a> {
    /// Create a free-standing cell starting at `start_line`.
    pub fn new(text: &'a str, start_line: u32) -> Self {
        Self {
            text,
            start_line,
            line_count: line_count(text),
            is_query: text.to_ascii_lowercase().contains(SQL_CELL_MARKER),
        }
    }

    /// Iterate over the cell's physical lines with their document line numbers.
    pub fn lines(&self) -> impl Iterator<Item = (u32, &'a str)> + '_ {
        let start = self.start_line;
        self.text
            .split('\n')
            .enumerate()
            .map(move |(i, line)| (start + i as u32, line))
    }

    /// Document line of the last physical line in the cell.
    pub fn end_line(&self) -> u32 {
        self.start_line + self.line_count.saturating_sub(1)
    }
}

/// Check whether a document is notebook-formatted.
pub fn is_notebook(text: &str) -> bool {
    text.to_ascii_lowercase().contains(NOTEBOOK_HEADER)
}

/// Split a document into its cells, in order.
///
/// The separator shares its physical line with the tail of the preceding
/// piece and the head of the following piece, so each boundary line is
/// counted once when accumulating start lines.
pub fn split_cells(text: &str) -> Vec<Cell<'_>> {
    let lowered = text.to_ascii_lowercase();

    let mut bounds = Vec::new();
    let mut offset = 0;
    for (idx, _) in lowered.match_indices(CELL_SEPARATOR) {
        bounds.push(offset..idx);
        offset = idx + CELL_SEPARATOR.len();
    }
    bounds.push(offset..text.len());

    let mut start_line = 0u32;
    bounds
        .into_iter()
        .map(|range| {
            let body = &text[range.clone()];
            let cell = Cell {
                text: body,
                start_line,
                line_count: line_count(body),
                is_query: lowered[range].contains(SQL_CELL_MARKER),
            };
            start_line += cell.line_count - 1;
            cell
        })
        .collect()
}

/// The SQL cells of a document, in order.
pub fn query_cells(text: &str) -> Vec<Cell<'_>> {
    split_cells(text)
        .into_iter()
        .filter(|cell| cell.is_query)
        .collect()
}

fn line_count(text: &str) -> u32 {
    text.split('\n').count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTEBOOK: &str = "# Databricks notebook source\n\
x = 1\n\
\n\
# COMMAND ----------\n\
\n\
# MAGIC %sql\n\
# MAGIC select * from t\n\
\n\
# COMMAND ----------\n\
\n\
print(x)\n\
\n\
# COMMAND ----------\n\
\n\
# MAGIC %sql\n\
# MAGIC select 1";

    #[test]
    fn detects_notebook_header_case_insensitively() {
        assert!(is_notebook("# Databricks notebook source\nx = 1"));
        assert!(is_notebook("# DATABRICKS NOTEBOOK SOURCE"));
        assert!(!is_notebook("import os\n# COMMAND ----------\n"));
    }

    #[test]
    fn splits_on_separator() {
        let cells = split_cells(NOTEBOOK);
        assert_eq!(cells.len(), 4);
        assert_eq!(
            cells.iter().map(|c| c.is_query).collect::<Vec<_>>(),
            vec![false, true, false, true]
        );
    }

    #[test]
    fn cell_start_lines_match_document_lines() {
        let doc_lines: Vec<&str> = NOTEBOOK.split('\n').collect();
        for cell in split_cells(NOTEBOOK) {
            // Empty pieces are the halves of a separator line.
            for (line_no, line) in cell.lines().filter(|(_, l)| !l.is_empty()) {
                assert_eq!(doc_lines[line_no as usize], line, "cell line {line_no}");
            }
        }
    }

    #[test]
    fn query_cells_keep_original_case() {
        let cells = query_cells(NOTEBOOK);
        assert_eq!(cells.len(), 2);
        assert!(cells[0].text.contains("# MAGIC select * from t"));
        assert_eq!(cells[0].start_line, 3);
        assert_eq!(cells[0].end_line(), 8);
        assert_eq!(cells[1].start_line, 12);
    }

    #[test]
    fn document_without_separator_is_one_cell() {
        let cells = split_cells("a\nb\nc");
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].line_count, 3);
        assert_eq!(cells[0].start_line, 0);
    }

    #[test]
    fn free_standing_cell_detects_marker() {
        let cell = Cell::new("# MAGIC %sql\n# MAGIC select 1", 4);
        assert!(cell.is_query);
        assert_eq!(cell.line_count, 2);
        assert_eq!(cell.end_line(), 5);
    }
}
