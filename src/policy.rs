//! How a rate class relates to the calendar.
//!
//! RS rates change only when a new rate is filed. RA and RH carry separate
//! Summer and Winter rates, so their effective rate also changes on the first
//! day of each season.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::model::{RateClass, Season};

/// First month of the summer season.
pub const SUMMER_START_MONTH: u32 = 5;
/// First month of the winter season.
pub const WINTER_START_MONTH: u32 = 11;

/// May through October is summer, the rest is winter.
pub fn calendar_season(date: NaiveDate) -> Season {
    if (SUMMER_START_MONTH..WINTER_START_MONTH).contains(&date.month()) {
        Season::Summer
    } else {
        Season::Winter
    }
}

pub trait SeasonPolicy: Sync {
    /// Seasons a single supply filing is published under.
    fn supply_seasons(&self) -> &'static [Season];

    /// Extra candidate dates on which the rate may change without a filing.
    fn boundary_dates(&self, years: &BTreeSet<i32>) -> Vec<NaiveDate>;

    /// Whether a group keyed by `group_season` reports a row on `date`.
    fn admits(&self, group_season: Season, date: NaiveDate) -> bool;

    /// Season printed on a row emitted for `group_season` on `date`.
    fn row_season(&self, group_season: Season, date: NaiveDate) -> Season;

    /// Whether the class carries separate rates per season.
    fn splits_seasons(&self) -> bool;

    /// Season that simultaneous time-of-use rows must share to belong to the
    /// same current snapshot, or `None` if the date alone decides.
    fn snapshot_season(&self, row_season: Season) -> Option<Season> {
        self.splits_seasons().then_some(row_season)
    }
}

/// Policy for classes with one year-round rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnseasonedPolicy;

impl SeasonPolicy for UnseasonedPolicy {
    fn supply_seasons(&self) -> &'static [Season] {
        &[Season::All]
    }

    fn boundary_dates(&self, _years: &BTreeSet<i32>) -> Vec<NaiveDate> {
        Vec::new()
    }

    fn admits(&self, _group_season: Season, _date: NaiveDate) -> bool {
        true
    }

    fn row_season(&self, group_season: Season, _date: NaiveDate) -> Season {
        group_season
    }

    fn splits_seasons(&self) -> bool {
        false
    }
}

/// Policy for classes with separate summer and winter rates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonedPolicy;

impl SeasonPolicy for SeasonedPolicy {
    fn supply_seasons(&self) -> &'static [Season] {
        &[Season::Summer, Season::Winter]
    }

    fn boundary_dates(&self, years: &BTreeSet<i32>) -> Vec<NaiveDate> {
        years
            .iter()
            .flat_map(|&year| {
                [
                    NaiveDate::from_ymd_opt(year, SUMMER_START_MONTH, 1),
                    NaiveDate::from_ymd_opt(year, WINTER_START_MONTH, 1),
                ]
            })
            .flatten()
            .collect()
    }

    fn admits(&self, group_season: Season, date: NaiveDate) -> bool {
        calendar_season(date) == group_season
    }

    fn row_season(&self, _group_season: Season, date: NaiveDate) -> Season {
        calendar_season(date)
    }

    fn splits_seasons(&self) -> bool {
        true
    }
}

impl RateClass {
    pub fn season_policy(self) -> &'static dyn SeasonPolicy {
        match self {
            Self::RS => &UnseasonedPolicy,
            Self::RA | Self::RH => &SeasonedPolicy,
        }
    }
}
