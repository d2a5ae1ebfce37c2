//! Merges distribution and supply histories into one dated rate timeline.
//!
//! Reconciliation runs in two phases. Records are first grouped by
//! `(class, season[, period])`; each group that has both a distribution and a
//! supply history is then walked over its candidate dates, pairing the latest
//! rate of each component in effect on that date.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Days, NaiveDate};
use log::{debug, info};

use crate::{
    error::RateResult,
    model::{DistributionRecord, Effective, MergedRateRow, RateClass, Season, SupplyRecord},
};

pub const DEFAULT_LOOKAHEAD_DAYS: u64 = 60;

/// Which supply tariff a timeline is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineKind {
    Flat,
    TimeOfUse,
}

/// The run date and how far past it the timeline may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    pub run_date: NaiveDate,
    pub lookahead_days: u64,
}

impl Horizon {
    pub const fn new(run_date: NaiveDate) -> Self {
        Self { run_date, lookahead_days: DEFAULT_LOOKAHEAD_DAYS }
    }

    /// Last date a row may carry.
    pub fn cutoff(&self) -> NaiveDate {
        self.run_date.checked_add_days(Days::new(self.lookahead_days)).unwrap_or(NaiveDate::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupKey {
    pub class: RateClass,
    pub season: Season,
    pub period: Option<String>,
}

/// Both component histories of one group, in input order.
#[derive(Debug, Default)]
pub struct GroupHistory<'a> {
    pub distribution: Vec<&'a DistributionRecord>,
    pub supply: Vec<&'a SupplyRecord>,
}

impl GroupHistory<'_> {
    pub fn is_complete(&self) -> bool {
        !self.distribution.is_empty() && !self.supply.is_empty()
    }
}

/// Groups the records by key.
///
/// Time-of-use groups are keyed by the supply periods; distribution rates
/// have no period and apply to every period of their class and season. Flat
/// groups also include keys only the distribution history knows about, so
/// that they are reported as skipped.
pub fn group_histories<'a>(
    kind: TimelineKind,
    distribution: &'a [DistributionRecord],
    supply: &'a [SupplyRecord],
) -> BTreeMap<GroupKey, GroupHistory<'a>> {
    let mut groups: BTreeMap<GroupKey, GroupHistory<'a>> = BTreeMap::new();
    for record in supply {
        let key = GroupKey { class: record.class, season: record.season, period: record.period.clone() };
        groups.entry(key).or_default().supply.push(record);
    }
    if kind == TimelineKind::Flat {
        for record in distribution {
            groups.entry(GroupKey { class: record.class, season: record.season, period: None }).or_default();
        }
    }
    for (key, history) in &mut groups {
        history.distribution = distribution
            .iter()
            .filter(|record| record.class == key.class && record.season == key.season)
            .collect();
    }
    groups
}

/// The record with the latest effective date on or before `date`. Among
/// records sharing that date, the one declared last wins.
pub fn applicable_as_of<'a, T: Effective>(records: &[&'a T], date: NaiveDate) -> Option<&'a T> {
    records
        .iter()
        .copied()
        .filter(|record| record.effective_date() <= date)
        .max_by_key(|record| record.effective_date())
}

/// Rows of a single group, ascending by date.
pub fn reconcile_group(
    key: &GroupKey,
    history: &GroupHistory<'_>,
    cutoff: NaiveDate,
) -> RateResult<Vec<MergedRateRow>> {
    let policy = key.class.season_policy();

    let mut dates: BTreeSet<NaiveDate> = history
        .distribution
        .iter()
        .map(|record| record.effective_date)
        .chain(history.supply.iter().map(|record| record.effective_date))
        .collect();
    let years: BTreeSet<i32> = dates.iter().map(NaiveDate::year).collect();
    dates.extend(policy.boundary_dates(&years));

    dates
        .into_iter()
        .take_while(|&date| date <= cutoff)
        .filter(|&date| policy.admits(key.season, date))
        .filter_map(|date| {
            let Some(distribution) = applicable_as_of(&history.distribution, date) else {
                debug!("{key:?}: no distribution rate in effect on {date}");
                return None;
            };
            let Some(supply) = applicable_as_of(&history.supply, date) else {
                debug!("{key:?}: no supply rate in effect on {date}");
                return None;
            };
            Some(MergedRateRow::combine(date, policy.row_season(key.season, date), distribution, supply))
        })
        .collect()
}

/// Reconciles every complete group and sorts the result by
/// `(date, class, season, period)`.
pub fn build_timeline(
    kind: TimelineKind,
    distribution: &[DistributionRecord],
    supply: &[SupplyRecord],
    horizon: Horizon,
) -> RateResult<Vec<MergedRateRow>> {
    let cutoff = horizon.cutoff();
    let groups = group_histories(kind, distribution, supply);

    let mut rows = Vec::new();
    for (key, history) in &groups {
        if !history.is_complete() {
            debug!(
                "Skipping {key:?}: {} distribution and {} supply records",
                history.distribution.len(),
                history.supply.len(),
            );
            continue;
        }
        rows.extend(reconcile_group(key, history, cutoff)?);
    }
    rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    info!("Built {kind:?} timeline: {} rows from {} groups, cutoff {cutoff}", rows.len(), groups.len());
    Ok(rows)
}
