//! Hover text from cached linter output.

use crate::diagnostics::split_at_marker;
use crate::lint::FINDING_MARKER;

/// Outputs meaning "nothing to report".
pub const ALL_CLEAR_SENTINELS: [&str; 2] = ["All checks passed!", "All checks passed successfully"];

/// Find the finding for a 1-based line and render it as a single line.
///
/// The fields after `LINE:COLUMN:` are joined with spaces. The first
/// matching finding wins. Lines whose line number does not parse are skipped.
pub fn hover_text(cached: &str, line: u32) -> Option<String> {
    if ALL_CLEAR_SENTINELS.contains(&cached.trim()) {
        return None;
    }

    cached
        .lines()
        .filter(|l| l.contains(FINDING_MARKER))
        .find_map(|l| {
            let (_, rest) = split_at_marker(l)?;
            let fields: Vec<&str> = rest.split(':').collect();
            match fields[0].trim().parse::<u32>() {
                Ok(found) if found == line => Some(
                    fields
                        .iter()
                        .skip(2)
                        .map(|f| f.trim())
                        .collect::<Vec<_>>()
                        .join(" "),
                ),
                Ok(_) => None,
                Err(err) => {
                    tracing::warn!(line = l, %err, "skipping malformed tool output");
                    None
                }
            }
        })
}
