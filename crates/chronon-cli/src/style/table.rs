//! Table formatting using comfy-table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

fn styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    if super::no_color() {
        Cell::new(text)
    } else {
        Cell::new(text).add_attribute(Attribute::Bold).fg(Color::Cyan)
    }
}

/// Creates a key-value summary table (two columns: metric and value).
pub fn summary_table(title: &str, entries: &[(&str, String)]) -> Table {
    let mut table = styled_table();
    table.set_header(vec![header_cell(title), header_cell("")]);

    for (key, value) in entries {
        let key_cell = if super::no_color() {
            Cell::new(key)
        } else {
            Cell::new(key).fg(Color::DarkGrey)
        };
        table.add_row(vec![
            key_cell,
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// Creates a percentile table with nanosecond and microsecond columns.
pub fn latency_table(rows: &[(&str, u64)]) -> Table {
    let mut table = styled_table();
    table.set_header(vec![
        header_cell("Percentile"),
        header_cell("ns"),
        header_cell("µs"),
    ]);

    for (label, ns) in rows {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(ns).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", *ns as f64 / 1000.0)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}
