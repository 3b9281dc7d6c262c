//! Terminal rendering

use std::fmt::Write;

use crate::constants::CHART_WIDTH;
use crate::report::Summary;
use crate::table::Table;

/// Widest cell shown before truncation
const MAX_CELL_WIDTH: usize = 24;

fn clip(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL_WIDTH {
        cell.to_string()
    } else {
        let mut clipped: String = cell.chars().take(MAX_CELL_WIDTH - 1).collect();
        clipped.push('…');
        clipped
    }
}

/// Aligned text table with a row-index column
pub fn table(table: &Table) -> String {
    let headers: Vec<String> = table.headers().iter().map(|h| clip(h)).collect();
    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|c| clip(c)).collect())
        .collect();

    let index_width = table.len().saturating_sub(1).to_string().len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let _ = write!(out, "{:>w$}", "", w = index_width);
    for (h, w) in headers.iter().zip(&widths) {
        let _ = write!(out, "  {:<w$}", h, w = w);
    }
    out.push('\n');

    for (idx, row) in rows.iter().enumerate() {
        let _ = write!(out, "{:>w$}", idx, w = index_width);
        for (cell, w) in row.iter().zip(&widths) {
            let _ = write!(out, "  {:<w$}", cell, w = w);
        }
        out.push('\n');
    }
    out
}

pub fn metrics(summary: &Summary) -> String {
    format!(
        "Total analysed: {}\nAuthentic:      {}\nCounterfeit:    {}\nFraud rate:     {:.1}%\n",
        summary.total, summary.authentic, summary.counterfeit, summary.fraud_rate
    )
}

/// Two-bar chart scaled to the larger count
pub fn chart(summary: &Summary) -> String {
    if summary.total == 0 {
        return String::new();
    }

    let max = summary.authentic.max(summary.counterfeit).max(1);
    let bar = |count: usize| "█".repeat(count * CHART_WIDTH / max);

    format!(
        "Authentic   │{} {}\nCounterfeit │{} {}\n",
        bar(summary.authentic),
        summary.authentic,
        bar(summary.counterfeit),
        summary.counterfeit
    )
}

pub fn alert(summary: &Summary) -> String {
    if summary.counterfeit > 0 {
        format!("⚠️  {} counterfeit banknote(s) detected!", summary.counterfeit)
    } else {
        "🎉 No counterfeit banknote detected!".to_string()
    }
}
