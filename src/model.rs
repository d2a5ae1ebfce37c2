use std::fmt;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Serialize, Serializer, ser};

use crate::error::{RateError, RateResult};

/// Decimal places kept on every published rate.
pub const RATE_SCALE: u32 = 4;

/// Residential rate classes. Variant order follows the class codes
/// alphabetically, which is the order merged tables are sorted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RateClass {
    RA,
    RH,
    RS,
}

impl RateClass {
    pub const ALL: [Self; 3] = [Self::RA, Self::RH, Self::RS];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "RA" => Some(Self::RA),
            "RH" => Some(Self::RH),
            "RS" => Some(Self::RS),
            _ => None,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::RA => "RA",
            Self::RH => "RH",
            Self::RS => "RS",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::RA => "Residential Service Add-On Heat Pump",
            Self::RH => "Residential Service Heating",
            Self::RS => "Residential Service",
        }
    }
}

impl fmt::Display for RateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Season key of a rate. `All` is used by classes whose rates are not split
/// by season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Season {
    All,
    Summer,
    Winter,
}

impl Season {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "All" => Some(Self::All),
            "Summer" => Some(Self::Summer),
            "Winter" => Some(Self::Winter),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Summer => "Summer",
            Self::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything carrying the date it takes effect on.
pub trait Effective {
    fn effective_date(&self) -> NaiveDate;
}

/// A distribution rate change, reduced to one computed rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionRecord {
    pub effective_date: NaiveDate,
    pub class: RateClass,
    pub season: Season,
    pub distribution_rate: Decimal,
}

impl Effective for DistributionRecord {
    fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }
}

/// A supply rate change, flat (`period` is `None`) or time-of-use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyRecord {
    pub effective_date: NaiveDate,
    pub class: RateClass,
    pub season: Season,
    pub period: Option<String>,
    pub supply_rate: Decimal,
    pub transmission_rate: Decimal,
}

impl Effective for SupplyRecord {
    fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }
}

/// The combined rate in effect on `effective_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedRateRow {
    #[serde(rename = "Effective Date")]
    pub effective_date: NaiveDate,
    #[serde(rename = "Class")]
    pub class: RateClass,
    #[serde(rename = "Season")]
    pub season: Season,
    #[serde(rename = "Period", skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(rename = "Distribution Rate", serialize_with = "serialize_rate")]
    pub distribution_rate: Decimal,
    #[serde(rename = "Supply Rate", serialize_with = "serialize_rate")]
    pub supply_rate: Decimal,
    #[serde(rename = "Transmission Rate", serialize_with = "serialize_rate")]
    pub transmission_rate: Decimal,
    #[serde(rename = "Total Rate", serialize_with = "serialize_rate")]
    pub total_rate: Decimal,
}

impl MergedRateRow {
    /// Combines the two components in effect on `effective_date`. The total is
    /// summed before rounding.
    pub fn combine(
        effective_date: NaiveDate,
        season: Season,
        distribution: &DistributionRecord,
        supply: &SupplyRecord,
    ) -> RateResult<Self> {
        let total = distribution
            .distribution_rate
            .checked_add(supply.supply_rate)
            .and_then(|sum| sum.checked_add(supply.transmission_rate))
            .ok_or(RateError::TotalOverflow { class: supply.class, season, effective_date })?;
        Ok(Self {
            effective_date,
            class: supply.class,
            season,
            period: supply.period.clone(),
            distribution_rate: round_rate(distribution.distribution_rate),
            supply_rate: round_rate(supply.supply_rate),
            transmission_rate: round_rate(supply.transmission_rate),
            total_rate: round_rate(total),
        })
    }

    pub fn sort_key(&self) -> (NaiveDate, RateClass, Season, Option<&str>) {
        (self.effective_date, self.class, self.season, self.period.as_deref())
    }
}

/// Quantizes to [`RATE_SCALE`] places, rounding half to even. `3.00` becomes
/// `3.0000`.
pub fn round_rate(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(RATE_SCALE);
    rounded
}

/// Nearest `f64` to `rate`, for JSON output.
pub fn rate_to_f64<E: ser::Error>(rate: Decimal) -> Result<f64, E> {
    rate.to_f64().ok_or_else(|| E::custom(format_args!("rate {rate} has no f64 form")))
}

fn serialize_rate<S: Serializer>(rate: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(rate_to_f64::<S::Error>(*rate)?)
}
