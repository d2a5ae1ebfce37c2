//! Turns raw tariff rows into rate change records.

use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    error::{RateError, RateResult},
    model::{DistributionRecord, RateClass, Season, SupplyRecord},
    source::{RawDistributionRow, RawSupplyRow, SourceTable},
};

pub const DISTRIBUTION_DATE_FORMAT: &str = "%Y-%m-%d";
pub const SUPPLY_DATE_FORMAT: &str = "%m/%d/%Y";

/// `(base + rider 5 + rider 15a) × (1 + rider 10 / 100)`, or `None` when the
/// result does not fit in a `Decimal`.
pub fn distribution_rate(
    base: Decimal,
    rider_5: Decimal,
    rider_15a: Decimal,
    rider_10_percent: Decimal,
) -> Option<Decimal> {
    let multiplier = Decimal::ONE.checked_add(rider_10_percent.checked_div(Decimal::ONE_HUNDRED)?)?;
    base.checked_add(rider_5)?.checked_add(rider_15a)?.checked_mul(multiplier)
}

pub fn normalize_distribution(
    table: &SourceTable<RawDistributionRow>,
) -> RateResult<Vec<DistributionRecord>> {
    let path = table.path.as_path();
    table
        .rows
        .iter()
        .map(|row| {
            let cell = Cell { path, line: row.line };
            Ok(DistributionRecord {
                effective_date: cell.date("Effective Date", &row.effective_date, DISTRIBUTION_DATE_FORMAT)?,
                class: cell.class(&row.class)?,
                season: cell.season(&row.season)?,
                distribution_rate: distribution_rate(
                    cell.number("Base Rate", &row.base_rate)?,
                    cell.number("Rider 5", &row.rider_5)?,
                    cell.number("Rider 15a", &row.rider_15a)?,
                    cell.number("Rider 10 (%)", &row.rider_10_percent)?,
                )
                .ok_or_else(|| cell.overflow())?,
            })
        })
        .collect()
}

/// Supply filings are not split by season, so each row is published under
/// every season its class is keyed by.
pub fn normalize_supply(table: &SourceTable<RawSupplyRow>) -> RateResult<Vec<SupplyRecord>> {
    let path = table.path.as_path();
    let mut records = Vec::with_capacity(table.rows.len() * 2);
    for row in &table.rows {
        let cell = Cell { path, line: row.line };
        let effective_date = cell.date("Effective Date", &row.effective_date, SUPPLY_DATE_FORMAT)?;
        let class = cell.class(&row.class)?;
        let supply_rate = cell.number("Rate", &row.rate)?;
        let transmission_rate = cell.number("Transmission", &row.transmission)?;
        for &season in class.season_policy().supply_seasons() {
            records.push(SupplyRecord {
                effective_date,
                class,
                season,
                period: row.period.clone(),
                supply_rate,
                transmission_rate,
            });
        }
    }
    Ok(records)
}

/// Location of the row being parsed, for error reporting.
#[derive(Clone, Copy)]
struct Cell<'a> {
    path: &'a Path,
    line: u64,
}

impl Cell<'_> {
    fn date(self, column: &'static str, value: &str, format: &'static str) -> RateResult<NaiveDate> {
        NaiveDate::parse_from_str(value, format).map_err(|_| RateError::InvalidDate {
            path: self.path.to_path_buf(),
            line: self.line,
            column,
            value: value.to_string(),
            format,
        })
    }

    fn number(self, column: &'static str, value: &str) -> RateResult<Decimal> {
        value.parse().map_err(|_| RateError::InvalidNumber {
            path: self.path.to_path_buf(),
            line: self.line,
            column,
            value: value.to_string(),
        })
    }

    fn overflow(self) -> RateError {
        RateError::RateOverflow { path: self.path.to_path_buf(), line: self.line }
    }

    fn class(self, value: &str) -> RateResult<RateClass> {
        RateClass::from_code(value).ok_or_else(|| RateError::UnknownClass {
            path: self.path.to_path_buf(),
            line: self.line,
            value: value.to_string(),
        })
    }

    fn season(self, value: &str) -> RateResult<Season> {
        Season::from_name(value).ok_or_else(|| RateError::UnknownSeason {
            path: self.path.to_path_buf(),
            line: self.line,
            value: value.to_string(),
        })
    }
}
