//! Per-class view of the timelines: the rates in effect today and the full
//! history behind them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::model::{MergedRateRow, RateClass, Season, rate_to_f64};

pub type RateSnapshot = BTreeMap<RateClass, ClassRates>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassRates {
    pub current: CurrentRates,
    pub history: Vec<MergedRateRow>,
    pub tou_history: Vec<MergedRateRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentRates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flat: Option<MergedRateRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tou: Option<TouSnapshot>,
}

/// The simultaneous time-of-use rates in effect, as period → total rate.
///
/// Serializes as one flat object: an optional `Season` entry followed by one
/// entry per period.
#[derive(Debug, Clone, PartialEq)]
pub struct TouSnapshot {
    pub effective_date: NaiveDate,
    pub season: Option<Season>,
    pub period_rates: BTreeMap<String, Decimal>,
}

impl Serialize for TouSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(season) = self.season {
            map.serialize_entry("Season", &season)?;
        }
        for (period, rate) in &self.period_rates {
            map.serialize_entry(period, &rate_to_f64::<S::Error>(*rate)?)?;
        }
        map.end()
    }
}

/// The latest row dated on or before `today`. When every row lies in the
/// future, the earliest one stands in.
pub fn current_row(history: &[MergedRateRow], today: NaiveDate) -> Option<&MergedRateRow> {
    history
        .iter()
        .filter(|row| row.effective_date <= today)
        .max_by_key(|row| row.effective_date)
        .or_else(|| {
            let earliest = history.iter().min_by_key(|row| row.effective_date);
            if let Some(row) = earliest {
                warn!("{}: no rate in effect on {today}, using the earliest from {}", row.class, row.effective_date);
            }
            earliest
        })
}

/// Collects every time-of-use row that takes effect together with the
/// current one.
pub fn current_tou(tou_history: &[MergedRateRow], today: NaiveDate) -> Option<TouSnapshot> {
    let current = current_row(tou_history, today)?;
    let season = current.class.season_policy().snapshot_season(current.season);
    let period_rates = tou_history
        .iter()
        .filter(|row| row.effective_date == current.effective_date)
        .filter(|row| season.is_none_or(|season| row.season == season))
        .filter_map(|row| {
            let period = row.period.clone()?;
            Some((period, row.total_rate))
        })
        .collect();
    Some(TouSnapshot { effective_date: current.effective_date, season, period_rates })
}

pub fn project(flat: &[MergedRateRow], tou: &[MergedRateRow], today: NaiveDate) -> RateSnapshot {
    let mut histories: BTreeMap<RateClass, (Vec<MergedRateRow>, Vec<MergedRateRow>)> = BTreeMap::new();
    for row in flat {
        histories.entry(row.class).or_default().0.push(row.clone());
    }
    for row in tou {
        histories.entry(row.class).or_default().1.push(row.clone());
    }

    histories
        .into_iter()
        .map(|(class, (mut history, mut tou_history))| {
            history.sort_by_key(|row| row.effective_date);
            tou_history.sort_by_key(|row| row.effective_date);
            let current = CurrentRates {
                flat: current_row(&history, today).cloned(),
                tou: current_tou(&tou_history, today),
            };
            (class, ClassRates { current, history, tou_history })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn row(on: NaiveDate, class: RateClass, season: Season, period: Option<&str>, total: &str) -> MergedRateRow {
        let total: Decimal = total.parse().unwrap();
        MergedRateRow {
            effective_date: on,
            class,
            season,
            period: period.map(str::to_string),
            distribution_rate: Decimal::ZERO,
            supply_rate: total,
            transmission_rate: Decimal::ZERO,
            total_rate: total,
        }
    }

    #[test]
    fn current_is_latest_past_row() {
        let history = vec![
            row(date(2024, 1, 1), RateClass::RS, Season::All, None, "1"),
            row(date(2024, 6, 1), RateClass::RS, Season::All, None, "2"),
            row(date(2024, 9, 1), RateClass::RS, Season::All, None, "3"),
        ];
        assert_eq!(current_row(&history, date(2024, 8, 31)).unwrap().effective_date, date(2024, 6, 1));
        assert_eq!(current_row(&history, date(2024, 9, 1)).unwrap().effective_date, date(2024, 9, 1));
    }

    #[test]
    fn future_only_history_falls_back_to_earliest() {
        let history = vec![
            row(date(2025, 3, 1), RateClass::RA, Season::Winter, None, "2"),
            row(date(2025, 5, 1), RateClass::RA, Season::Summer, None, "3"),
        ];
        assert_eq!(current_row(&history, date(2024, 1, 1)).unwrap().effective_date, date(2025, 3, 1));
        assert!(current_row(&[], date(2024, 1, 1)).is_none());
    }

    #[test]
    fn seasoned_tou_snapshot_keeps_season() {
        let tou = vec![
            row(date(2024, 1, 1), RateClass::RH, Season::Winter, Some("Off-Peak"), "5"),
            row(date(2024, 1, 1), RateClass::RH, Season::Winter, Some("Peak"), "9"),
            row(date(2024, 5, 1), RateClass::RH, Season::Summer, Some("Off-Peak"), "6"),
            row(date(2024, 5, 1), RateClass::RH, Season::Summer, Some("Peak"), "11"),
        ];
        let snapshot = current_tou(&tou, date(2024, 7, 4)).unwrap();
        assert_eq!(snapshot.season, Some(Season::Summer));
        assert_eq!(
            snapshot.period_rates,
            BTreeMap::from([("Off-Peak".into(), Decimal::from(6)), ("Peak".into(), Decimal::from(11))])
        );
    }

    #[test]
    fn unseasoned_tou_snapshot_omits_season() {
        let tou = vec![
            row(date(2024, 1, 1), RateClass::RS, Season::All, Some("Off-Peak"), "5"),
            row(date(2024, 1, 1), RateClass::RS, Season::All, Some("Peak"), "9.5"),
        ];
        let snapshot = current_tou(&tou, date(2024, 2, 1)).unwrap();
        assert_eq!(snapshot.season, None);
        assert_eq!(snapshot.period_rates.len(), 2);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json, serde_json::json!({ "Off-Peak": 5.0, "Peak": 9.5 }));
    }

    #[test]
    fn seasoned_tou_snapshot_json_leads_with_season() {
        let tou = vec![row(date(2024, 5, 1), RateClass::RA, Season::Summer, Some("Peak"), "11.5000")];
        let snapshot = current_tou(&tou, date(2024, 6, 1)).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"Season":"Summer","Peak":11.5}"#);
    }

    #[test]
    fn project_groups_by_class() {
        let flat = vec![
            row(date(2024, 1, 1), RateClass::RA, Season::Winter, None, "1"),
            row(date(2024, 1, 1), RateClass::RS, Season::All, None, "2"),
            row(date(2024, 5, 1), RateClass::RA, Season::Summer, None, "3"),
        ];
        let tou = vec![row(date(2024, 1, 1), RateClass::RS, Season::All, Some("Peak"), "4")];
        let snapshot = project(&flat, &tou, date(2024, 6, 1));

        assert_eq!(snapshot.keys().copied().collect::<Vec<_>>(), [RateClass::RA, RateClass::RS]);
        let ra = &snapshot[&RateClass::RA];
        assert_eq!(ra.history.len(), 2);
        assert_eq!(ra.current.flat.as_ref().unwrap().season, Season::Summer);
        assert!(ra.current.tou.is_none());
        assert_eq!(snapshot[&RateClass::RS].current.tou.as_ref().unwrap().period_rates["Peak"], Decimal::from(4));
    }
}
