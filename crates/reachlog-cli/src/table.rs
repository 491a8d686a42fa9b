//! Plain-text table rendering for dataset rows.

use reachlog_core::{DailyRecord, Metric};

/// Renders `records` as a fixed-width table: date, weekday, then one column
/// per metric in schema order. Widths fit the widest cell in each column.
pub(crate) fn render_records(records: &[&DailyRecord]) -> String {
    let mut header = vec!["Date".to_string(), "Day".to_string()];
    header.extend(Metric::ALL.into_iter().map(|m| m.name().to_string()));

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            let mut row = vec![record.date().to_string(), record.weekday().to_string()];
            row.extend(record.metrics().iter().map(|(_, v)| v.to_string()));
            row
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            rows.iter()
                .map(|row| row[col].len())
                .chain(std::iter::once(header[col].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    std::iter::once(&header)
        .chain(rows.iter())
        .map(|row| {
            let line = row
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(col, (cell, &width))| {
                    // Text columns align left, counts align right.
                    if col < 2 {
                        format!("{cell:<width$}")
                    } else {
                        format!("{cell:>width$}")
                    }
                })
                .collect::<Vec<_>>()
                .join("  ");
            format!("{}\n", line.trim_end())
        })
        .collect()
}
