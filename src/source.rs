//! Readers for the three tariff CSV files.
//!
//! Rows are read as text and keep their line number so that the normalizer
//! can point at the offending cell when a value does not parse.

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, Trim};
use log::info;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{RateError, RateResult};

/// One row of the distribution tariff, dates as `YYYY-MM-DD`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDistributionRow {
    #[serde(skip)]
    pub line: u64,
    #[serde(rename = "Effective Date (YYYY-MM-DD)", alias = "Effective Date")]
    pub effective_date: String,
    #[serde(rename = "Class")]
    pub class: String,
    #[serde(rename = "Season")]
    pub season: String,
    #[serde(rename = "Base Rate")]
    pub base_rate: String,
    #[serde(rename = "Rider 5")]
    pub rider_5: String,
    #[serde(rename = "Rider 15a")]
    pub rider_15a: String,
    #[serde(rename = "Rider 10 (%)")]
    pub rider_10_percent: String,
}

/// One row of a supply tariff, dates as `MM/DD/YYYY`. `period` is only
/// present in the time-of-use file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSupplyRow {
    #[serde(skip)]
    pub line: u64,
    #[serde(rename = "Effective Date (MM/DD/YYYY)", alias = "Effective Date")]
    pub effective_date: String,
    #[serde(rename = "Class")]
    pub class: String,
    #[serde(rename = "Rate")]
    pub rate: String,
    #[serde(rename = "Transmission")]
    pub transmission: String,
    #[serde(skip)]
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTouSupplyRow {
    #[serde(rename = "Effective Date (MM/DD/YYYY)", alias = "Effective Date")]
    effective_date: String,
    #[serde(rename = "Class")]
    class: String,
    #[serde(rename = "Rate")]
    rate: String,
    #[serde(rename = "Transmission")]
    transmission: String,
    #[serde(rename = "Period")]
    period: String,
}

/// A parsed file together with the path its rows came from.
#[derive(Debug, Clone)]
pub struct SourceTable<T> {
    pub path: PathBuf,
    pub rows: Vec<T>,
}

pub fn read_distribution(path: &Path) -> RateResult<SourceTable<RawDistributionRow>> {
    let rows = read_rows(path, open(path)?, |mut row: RawDistributionRow, line| {
        row.line = line;
        row
    })?;
    info!("Read {} distribution rows from {}", rows.len(), path.display());
    Ok(SourceTable { path: path.to_path_buf(), rows })
}

pub fn read_supply(path: &Path) -> RateResult<SourceTable<RawSupplyRow>> {
    let rows = read_rows(path, open(path)?, |mut row: RawSupplyRow, line| {
        row.line = line;
        row
    })?;
    info!("Read {} flat supply rows from {}", rows.len(), path.display());
    Ok(SourceTable { path: path.to_path_buf(), rows })
}

pub fn read_supply_tou(path: &Path) -> RateResult<SourceTable<RawSupplyRow>> {
    let rows = read_rows(path, open(path)?, |tou: RawTouSupplyRow, line| RawSupplyRow {
        line,
        effective_date: tou.effective_date,
        class: tou.class,
        rate: tou.rate,
        transmission: tou.transmission,
        period: Some(tou.period),
    })?;
    info!("Read {} time-of-use supply rows from {}", rows.len(), path.display());
    Ok(SourceTable { path: path.to_path_buf(), rows })
}

fn open(path: &Path) -> RateResult<File> {
    File::open(path).map_err(|source| RateError::Io { path: path.to_path_buf(), source })
}

/// Deserializes every record, failing on the first bad one: a partially read
/// tariff is worse than none.
pub(crate) fn read_rows<R, D, T>(
    path: &Path,
    reader: R,
    finish: impl Fn(D, u64) -> T,
) -> RateResult<Vec<T>>
where
    R: Read,
    D: DeserializeOwned,
{
    let csv_error = |source: csv::Error| RateError::Csv { path: path.to_path_buf(), source };
    let mut csv_reader = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_reader(reader);
    let headers = csv_reader.headers().map_err(csv_error)?.clone();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(csv_error)?;
        let line = record.position().map_or(0, csv::Position::line);
        let raw: D = record.deserialize(Some(&headers)).map_err(csv_error)?;
        rows.push(finish(raw, line));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<D: DeserializeOwned>(text: &str) -> RateResult<Vec<(D, u64)>> {
        read_rows(Path::new("test.csv"), text.as_bytes(), |row, line| (row, line))
    }

    #[test]
    fn distribution_accepts_both_date_headers() {
        let documented = "Effective Date (YYYY-MM-DD),Class,Season,Base Rate,Rider 5,Rider 15a,Rider 10 (%)\n\
                          2024-01-01,RS,All,5.00,0.50,0.25,2\n";
        let plain = "Effective Date,Class,Season,Base Rate,Rider 5,Rider 15a,Rider 10 (%)\n\
                     2024-01-01, RS ,All,5.00,0.50,0.25,2\n";
        for text in [documented, plain] {
            let rows: Vec<(RawDistributionRow, u64)> = parse(text).unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].0.effective_date, "2024-01-01");
            assert_eq!(rows[0].0.class, "RS");
            assert_eq!(rows[0].1, 2);
        }
    }

    #[test]
    fn missing_column_is_fatal() {
        let text = "Effective Date,Class,Rate\n01/01/2024,RS,3.00\n";
        let result: RateResult<Vec<(RawSupplyRow, u64)>> = parse(text);
        assert!(matches!(result, Err(RateError::Csv { .. })));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = read_distribution(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(error.to_string().contains("does/not/exist.csv"));
    }
}
