use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use csv::WriterBuilder;
use log::info;

use crate::{
    error::{RateError, RateResult},
    model::MergedRateRow,
    projection::RateSnapshot,
    timeline::TimelineKind,
};

pub fn header(kind: TimelineKind) -> Vec<&'static str> {
    let mut columns = vec!["Effective Date", "Class", "Season"];
    if kind == TimelineKind::TimeOfUse {
        columns.push("Period");
    }
    columns.extend(["Distribution Rate", "Supply Rate", "Transmission Rate", "Total Rate"]);
    columns
}

fn record(kind: TimelineKind, row: &MergedRateRow) -> Vec<String> {
    let mut fields = vec![row.effective_date.to_string(), row.class.to_string(), row.season.to_string()];
    if kind == TimelineKind::TimeOfUse {
        fields.push(row.period.clone().unwrap_or_default());
    }
    fields.extend([
        row.distribution_rate.to_string(),
        row.supply_rate.to_string(),
        row.transmission_rate.to_string(),
        row.total_rate.to_string(),
    ]);
    fields
}

pub fn write_rates_csv<W: Write>(writer: W, kind: TimelineKind, rows: &[MergedRateRow]) -> csv::Result<()> {
    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(header(kind))?;
    for row in rows {
        csv_writer.write_record(record(kind, row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_snapshot_json<W: Write>(writer: W, snapshot: &RateSnapshot) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, snapshot)
}

pub fn save_rates_csv(path: &Path, kind: TimelineKind, rows: &[MergedRateRow]) -> RateResult<()> {
    let file = create(path)?;
    write_rates_csv(file, kind, rows).map_err(|source| RateError::Csv { path: path.to_path_buf(), source })?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn save_snapshot_json(path: &Path, snapshot: &RateSnapshot) -> RateResult<()> {
    let mut file = create(path)?;
    write_snapshot_json(&mut file, snapshot)?;
    file.flush().map_err(|source| RateError::Io { path: path.to_path_buf(), source })?;
    info!("Wrote snapshot of {} classes to {}", snapshot.len(), path.display());
    Ok(())
}

pub fn save_text(path: &Path, text: &str) -> RateResult<()> {
    let io_error = |source| RateError::Io { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, text).map_err(io_error)?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Opens `path` for writing, creating missing parent directories.
fn create(path: &Path) -> RateResult<BufWriter<File>> {
    let io_error = |source| RateError::Io { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    Ok(BufWriter::new(File::create(path).map_err(io_error)?))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        model::{RateClass, Season},
        projection::project,
    };

    fn scenario_row(period: Option<&str>) -> MergedRateRow {
        MergedRateRow {
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            class: RateClass::RS,
            season: Season::All,
            period: period.map(str::to_string),
            distribution_rate: "5.8650".parse::<Decimal>().unwrap(),
            supply_rate: "3.0000".parse().unwrap(),
            transmission_rate: "1.0000".parse().unwrap(),
            total_rate: "9.8650".parse().unwrap(),
        }
    }

    fn csv_text(kind: TimelineKind, rows: &[MergedRateRow]) -> String {
        let mut buffer = Vec::new();
        write_rates_csv(&mut buffer, kind, rows).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn flat_csv_layout() {
        assert_eq!(
            csv_text(TimelineKind::Flat, &[scenario_row(None)]),
            "Effective Date,Class,Season,Distribution Rate,Supply Rate,Transmission Rate,Total Rate\n\
             2024-01-01,RS,All,5.8650,3.0000,1.0000,9.8650\n"
        );
    }

    #[test]
    fn tou_csv_puts_period_after_season() {
        let text = csv_text(TimelineKind::TimeOfUse, &[scenario_row(Some("Peak"))]);
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Effective Date,Class,Season,Period,Distribution Rate,Supply Rate,Transmission Rate,Total Rate")
        );
        assert_eq!(lines.next(), Some("2024-01-01,RS,All,Peak,5.8650,3.0000,1.0000,9.8650"));
    }

    #[test]
    fn snapshot_json_uses_column_names_and_floats() {
        let flat = [scenario_row(None)];
        let tou = [scenario_row(Some("Peak"))];
        let snapshot = project(&flat, &tou, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        let mut buffer = Vec::new();
        write_snapshot_json(&mut buffer, &snapshot).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        let rs = &json["RS"];
        assert_eq!(rs["current"]["flat"]["Effective Date"], "2024-01-01");
        assert_eq!(rs["current"]["flat"]["Total Rate"], 9.865);
        assert!(rs["current"]["flat"].get("Period").is_none());
        assert_eq!(rs["current"]["tou"], serde_json::json!({ "Peak": 9.865 }));
        assert_eq!(rs["history"].as_array().unwrap().len(), 1);
        assert_eq!(rs["tou_history"][0]["Period"], "Peak");
    }
}
