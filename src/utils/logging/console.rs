//! Console output utilities
//!
//! Renders query results as a left-aligned plain-text table with a heading
//! row and a separator line.

use itertools::Itertools;

/// Render `rows` under `headings` with columns padded to their widest cell
///
/// Rows shorter than the heading list are padded with empty cells; trailing
/// empty cells are dropped from the line.
#[must_use]
pub fn render_table(headings: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headings.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&format_line(&widths, headings.iter().copied()));
    out.push('\n');
    out.push_str(&widths.iter().map(|&w| "-".repeat(w)).join("-+-"));
    out.push('\n');
    for row in rows {
        out.push_str(&format_line(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out
}

fn format_line<'a>(widths: &[usize], mut cells: impl Iterator<Item = &'a str>) -> String {
    let cells: Vec<&str> = widths.iter().map(|_| cells.next().unwrap_or("")).collect();
    let used = cells.iter().rposition(|cell| !cell.is_empty()).map_or(0, |last| last + 1);
    widths
        .iter()
        .zip(cells)
        .take(used)
        .map(|(&width, cell)| format!("{cell:<width$}"))
        .join(" | ")
        .trim_end()
        .to_string()
}
