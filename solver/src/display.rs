//! Column-aligned text rendering of 2-D grids.
//!
//! Floats print with 2 decimals, policy entries as `(label, value)`. Rows may
//! be ragged; missing cells render empty.

use crate::policy_table::PolicyTable;
use crate::sweep::SweepResult;
use crate::types::{Action, PolicyEntry};

/// Anything that can occupy a table cell.
pub trait Cell {
    fn cell(&self) -> String;
}

impl Cell for f64 {
    fn cell(&self) -> String {
        format!("{:.2}", self)
    }
}

impl Cell for Action {
    fn cell(&self) -> String {
        self.label().to_string()
    }
}

impl Cell for PolicyEntry {
    fn cell(&self) -> String {
        format!("({}, {:.2})", self.action.label(), self.expected_value)
    }
}

impl Cell for usize {
    fn cell(&self) -> String {
        self.to_string()
    }
}

impl Cell for u32 {
    fn cell(&self) -> String {
        self.to_string()
    }
}

impl Cell for String {
    fn cell(&self) -> String {
        self.clone()
    }
}

impl Cell for &str {
    fn cell(&self) -> String {
        (*self).to_string()
    }
}

/// Render rows with every column left-aligned to its widest cell.
pub fn render_table<C: Cell>(rows: &[Vec<C>]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(Cell::cell).collect())
        .collect();

    let mut widths: Vec<usize> = Vec::new();
    for row in &cells {
        for (c, text) in row.iter().enumerate() {
            if c >= widths.len() {
                widths.push(0);
            }
            widths[c] = widths[c].max(text.chars().count());
        }
    }

    let mut out = String::new();
    for row in &cells {
        let mut line = String::new();
        for (c, width) in widths.iter().enumerate() {
            if c > 0 {
                line.push(' ');
            }
            let text = row.get(c).map(String::as_str).unwrap_or("");
            line.push_str(&format!("{:<width$}", text, width = width));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Whole policy table, one line per heads count.
pub fn render_policy_table(table: &PolicyTable) -> String {
    render_table(table.rows())
}

/// Action letters only, one line per heads count: a compact view of the
/// decision surface.
pub fn render_decision_map(table: &PolicyTable) -> String {
    let rows: Vec<Vec<Action>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|e| e.action).collect())
        .collect();
    render_table(&rows)
}

/// Sweep grid with a leading win-amount column.
pub fn render_sweep(result: &SweepResult) -> String {
    let rows: Vec<Vec<String>> = result
        .rows()
        .iter()
        .enumerate()
        .map(|(win, row)| {
            std::iter::once(format!("{win}:"))
                .chain(row.iter().map(Cell::cell))
                .collect()
        })
        .collect();
    render_table(&rows)
}
