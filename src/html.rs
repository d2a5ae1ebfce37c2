//! Static HTML report of the merged rate tables.
//!
//! Rows are shown newest first. Only the first `max_rows` rows of each table
//! are visible until "Show More" is pressed.

use std::fmt::{self, Write};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::model::{MergedRateRow, RateClass};

pub const DEFAULT_MAX_ROWS: usize = 20;

/// Tab order of the report.
pub const REPORT_CLASSES: [RateClass; 3] = [RateClass::RS, RateClass::RH, RateClass::RA];

const STYLE: &str = r"
body { font-family: Arial, sans-serif; padding: 20px; line-height: 1.5; }
h1 { margin-bottom: 10px; }
h2 { margin-top: 30px; }
.tab { cursor: pointer; padding: 10px 20px; border: 1px solid #ccc; display: inline-block; margin-right: 5px; border-radius: 4px; background-color: #f9f9f9; }
.tab.active { background-color: #e6e6e6; }
.section { display: none; margin-top: 20px; }
.section.active { display: block; }
table { border-collapse: collapse; width: 100%; margin-top: 10px; }
th, td { border: 1px solid #ccc; padding: 6px 8px; text-align: left; font-size: 0.95em; }
th { background-color: #f2f2f2; color: #333; }
.info { background-color: #ffffe0; padding: 15px; border-left: 5px solid #ffcc00; margin-bottom: 20px; }
.tou-alt { background-color: #e8e8e8; }
.extra-row { display: none; }
.show-more-btn { margin: 5px 0 15px 0; padding: 5px 10px; cursor: pointer; }
footer { margin-top: 40px; font-size: 0.85em; color: #555; }
";

const INFO: &str = r#"<div class="info">
<p>A <strong>best-effort estimate</strong> of residential electricity rates, shown in <strong>&cent;/kWh</strong>.</p>
<p>Distribution rates are not published as a single figure. They are assembled from the tariff and
<strong>may not match your actual bill</strong>. The utility's billing and tariffs are the authoritative source.</p>
<details>
<summary><strong>Calculation Notes</strong></summary>
<p><strong>Distribution rates</strong> for the RS, RA and RH classes include:</p>
<ul>
<li><strong>Rider No. 5</strong>: Universal Service Charge</li>
<li><strong>Rider No. 10</strong>: State Tax Adjustment, applied as a percentage</li>
<li><strong>Rider No. 15A</strong>: Phase IV Energy Efficiency and Conservation Surcharge</li>
</ul>
<p><strong>Supply and Transmission rates</strong> are taken directly from the tariff. Their sum is the
published Price to Compare, so it is not shown as its own column.</p>
</details>
<details>
<summary><strong>Resources</strong></summary>
<ul>
<li><a href="https://duquesnelight.com/service-reliability/service-map/rates/tariff-resources" target="_blank">Tariff Resources</a></li>
<li><a href="https://duquesnelight.com/service-reliability/service-map/rates/residential-rates" target="_blank">Residential Rates</a></li>
<li><a href="https://duquesnelight.com/energy-money-savings/electric-vehicles/charge-smart-and-save/time-of-use-supply-rate" target="_blank">Time-of-Use Supply Rates</a></li>
</ul>
</details>
</div>"#;

const FOOTER: &str = "<footer><p>An independent project, not affiliated with or endorsed by the utility. \
All figures are informational estimates. Contact the utility directly with questions about your bill or service.</p></footer>";

const SCRIPT: &str = r"
const tabs = document.querySelectorAll('.tab');
const sections = document.querySelectorAll('.section');
tabs.forEach(tab => {
    tab.addEventListener('click', () => {
        tabs.forEach(t => t.classList.remove('active'));
        sections.forEach(s => s.classList.remove('active'));
        tab.classList.add('active');
        document.getElementById('section-' + tab.dataset.class).classList.add('active');
    });
});
tabs[0].click();

function showMore(btn) {
    const table = btn.closest('table');
    table.querySelectorAll('.extra-row').forEach(r => r.style.display = 'table-row');
    btn.style.display = 'none';
}
";

pub fn render_report(flat: &[MergedRateRow], tou: &[MergedRateRow], max_rows: usize) -> Result<String, fmt::Error> {
    let mut html = String::new();
    writeln!(html, "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">")?;
    writeln!(html, "<title>Residential Electric Rates</title>\n<style>{STYLE}</style>\n</head>\n<body>")?;
    writeln!(html, "<h1>Residential Electric Rates</h1>")?;
    writeln!(html, "{INFO}")?;

    writeln!(html, "<div id=\"tabs\">")?;
    for class in REPORT_CLASSES {
        writeln!(html, "<div class=\"tab\" data-class=\"{class}\">{}</div>", class.description())?;
    }
    writeln!(html, "</div>")?;

    for class in REPORT_CLASSES {
        writeln!(html, "<div class=\"section\" id=\"section-{class}\">")?;
        write_flat_table(&mut html, class, &newest_first(flat, class), max_rows)?;
        write_tou_table(&mut html, class, &newest_first(tou, class), max_rows)?;
        writeln!(html, "</div>")?;
    }

    writeln!(html, "<script>{SCRIPT}</script>\n{FOOTER}\n</body>\n</html>")?;
    Ok(html)
}

fn newest_first(rows: &[MergedRateRow], class: RateClass) -> Vec<&MergedRateRow> {
    let mut selected: Vec<_> = rows.iter().filter(|row| row.class == class).collect();
    selected.sort_by(|a, b| b.effective_date.cmp(&a.effective_date));
    selected
}

fn write_flat_table(html: &mut String, class: RateClass, rows: &[&MergedRateRow], max_rows: usize) -> fmt::Result {
    writeln!(html, "<h2>Flat Rates ({})</h2>\n<table>", class.description())?;
    writeln!(
        html,
        "<tr><th>Effective Date</th><th>Season</th><th>Distribution (&cent;/kWh)</th><th>Supply (&cent;/kWh)</th>\
         <th>Transmission (&cent;/kWh)</th><th>Total (&cent;/kWh)</th></tr>"
    )?;
    for (index, row) in rows.iter().enumerate() {
        let row_class = if index >= max_rows { "extra-row" } else { "" };
        writeln!(
            html,
            "<tr class='{row_class}'><td>{}</td><td>{}</td>{}</tr>",
            row.effective_date,
            row.season,
            rate_cells(row)
        )?;
    }
    write_show_more(html, rows.len(), max_rows, 6)?;
    writeln!(html, "</table>")
}

/// Seasoned classes shade every other effective-date group so the periods of
/// one date read as a block.
fn write_tou_table(html: &mut String, class: RateClass, rows: &[&MergedRateRow], max_rows: usize) -> fmt::Result {
    let shaded = class.season_policy().splits_seasons();
    writeln!(html, "<h2>Time-of-Use Rates ({})</h2>\n<table>", class.description())?;
    writeln!(
        html,
        "<tr><th>Effective Date</th><th>Season</th><th>Period</th><th>Distribution (&cent;/kWh)</th>\
         <th>Supply (&cent;/kWh)</th><th>Transmission (&cent;/kWh)</th><th>Total (&cent;/kWh)</th></tr>"
    )?;

    let mut alternate = false;
    let mut last_date: Option<NaiveDate> = None;
    for (index, row) in rows.iter().enumerate() {
        if last_date.is_some_and(|date| date != row.effective_date) {
            alternate = !alternate;
        }
        last_date = Some(row.effective_date);

        let mut classes = Vec::new();
        if shaded && alternate {
            classes.push("tou-alt");
        }
        if index >= max_rows {
            classes.push("extra-row");
        }
        writeln!(
            html,
            "<tr class='{}'><td>{}</td><td>{}</td><td>{}</td>{}</tr>",
            classes.join(" "),
            row.effective_date,
            row.season,
            escape(row.period.as_deref().unwrap_or_default()),
            rate_cells(row)
        )?;
    }
    write_show_more(html, rows.len(), max_rows, 7)?;
    writeln!(html, "</table>")
}

fn write_show_more(html: &mut String, n_rows: usize, max_rows: usize, colspan: usize) -> fmt::Result {
    if n_rows > max_rows {
        writeln!(
            html,
            "<tr><td colspan='{colspan}'><button class='show-more-btn' onclick='showMore(this)'>Show More</button></td></tr>"
        )?;
    }
    Ok(())
}

fn rate_cells(row: &MergedRateRow) -> String {
    [row.distribution_rate, row.supply_rate, row.transmission_rate, row.total_rate]
        .iter()
        .map(|rate| format!("<td>{}</td>", display_rate(*rate)))
        .collect()
}

/// Fixed four places, the same text as the CSV tables.
fn display_rate(rate: Decimal) -> String {
    format!("{rate:.4}")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Season;

    fn row(day: u32, class: RateClass, season: Season, period: Option<&str>) -> MergedRateRow {
        let rate: Decimal = "1.2500".parse().unwrap();
        MergedRateRow {
            effective_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            class,
            season,
            period: period.map(str::to_string),
            distribution_rate: rate,
            supply_rate: rate,
            transmission_rate: rate,
            total_rate: rate * Decimal::from(3),
        }
    }

    #[test]
    fn tabs_follow_report_order() {
        let html = render_report(&[], &[], DEFAULT_MAX_ROWS).unwrap();
        let rs = html.find("data-class=\"RS\"").unwrap();
        let rh = html.find("data-class=\"RH\"").unwrap();
        let ra = html.find("data-class=\"RA\"").unwrap();
        assert!(rs < rh && rh < ra);
        assert!(!html.contains("Show More</button>"));
        assert!(html.contains("<summary><strong>Calculation Notes</strong></summary>"));
        assert!(html.contains("<summary><strong>Resources</strong></summary>"));
        assert!(html.contains("<footer>"));
    }

    #[test]
    fn rates_render_with_four_places() {
        assert_eq!(display_rate("3".parse().unwrap()), "3.0000");
        assert_eq!(display_rate("5.865".parse().unwrap()), "5.8650");
    }

    #[test]
    fn rows_beyond_limit_are_hidden() {
        let flat: Vec<_> = (1..=5).map(|day| row(day, RateClass::RS, Season::All, None)).collect();
        let html = render_report(&flat, &[], 3).unwrap();

        assert_eq!(html.matches("<tr class='extra-row'>").count(), 2);
        assert_eq!(html.matches("Show More</button>").count(), 1);
        let newest = html.find("<td>2024-01-05</td>").unwrap();
        let oldest = html.find("<td>2024-01-01</td>").unwrap();
        assert!(newest < oldest);
        assert!(html.contains("<td>1.2500</td><td>1.2500</td><td>1.2500</td><td>3.7500</td>"));
    }

    #[test]
    fn seasoned_tou_groups_alternate_shading() {
        let tou = vec![
            row(1, RateClass::RA, Season::Winter, Some("Peak")),
            row(1, RateClass::RA, Season::Winter, Some("Off-Peak")),
            row(2, RateClass::RA, Season::Winter, Some("Peak")),
        ];
        let html = render_report(&[], &tou, DEFAULT_MAX_ROWS).unwrap();
        assert_eq!(html.matches("<tr class='tou-alt'>").count(), 2);

        let unshaded: Vec<_> = tou.iter().map(|r| MergedRateRow { class: RateClass::RS, ..r.clone() }).collect();
        let html = render_report(&[], &unshaded, DEFAULT_MAX_ROWS).unwrap();
        assert!(!html.contains("tou-alt'>"));
    }

    #[test]
    fn periods_are_escaped() {
        let tou = vec![row(1, RateClass::RS, Season::All, Some("<Peak & Co>"))];
        let html = render_report(&[], &tou, DEFAULT_MAX_ROWS).unwrap();
        assert!(html.contains("<td>&lt;Peak &amp; Co&gt;</td>"));
    }
}
