use comfy_table::{Attribute, Cell, CellAlignment, Table, modifiers, presets};

use crate::{model::MergedRateRow, projection::RateSnapshot};

/// One line per class with the flat and time-of-use totals in effect.
pub fn build_current_table(snapshot: &RateSnapshot) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec!["Class", "Since", "Season", "Flat total", "Time-of-use totals"]);

    for (class, rates) in snapshot {
        let flat = rates.current.flat.as_ref();
        let tou = rates.current.tou.as_ref().map_or_else(String::new, |tou| {
            let lines: Vec<_> =
                tou.period_rates.iter().map(|(period, total)| format!("{period}: {}", total.normalize())).collect();
            lines.join("\n")
        });
        table.add_row(vec![
            Cell::new(class).add_attribute(Attribute::Bold),
            Cell::new(flat.map_or_else(String::new, |row| row.effective_date.to_string())),
            Cell::new(flat.map_or_else(String::new, |row| row.season.to_string())),
            Cell::new(flat.map_or_else(String::new, flat_total)).set_alignment(CellAlignment::Right),
            Cell::new(tou),
        ]);
    }
    table
}

fn flat_total(row: &MergedRateRow) -> String {
    row.total_rate.normalize().to_string()
}
