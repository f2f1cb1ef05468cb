use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A staking pool and its fee history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub address: String,
    #[serde(default)]
    pub vault_address: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// First day the pool no longer accepts stake
    #[serde(default)]
    pub closed: Option<NaiveDate>,
    #[serde(default)]
    pub fee_schedule: Vec<FeeScheduleEntry>,
    #[serde(default)]
    pub temporary_reductions: Vec<TemporaryReduction>,
}

impl Pool {
    /// Closed pools are skipped from their closure day onward
    pub fn is_closed_on(&self, date: NaiveDate) -> bool {
        self.closed.is_some_and(|closed| closed <= date)
    }

    pub fn active_reductions(&self, date: NaiveDate) -> impl Iterator<Item = &TemporaryReduction> {
        self.temporary_reductions
            .iter()
            .filter(move |r| r.is_active_on(date))
    }

    /// Sum of all reduction percents active on `date`
    pub fn total_reduction(&self, date: NaiveDate) -> f64 {
        self.active_reductions(date).map(|r| r.percent).sum()
    }

    /// Does `reference` name this pool (address, vault address or display name)?
    pub fn matches(&self, reference: &str) -> bool {
        self.address == reference
            || self.vault_address.as_deref() == Some(reference)
            || self.name.eq_ignore_ascii_case(reference)
    }
}

/// One step of a pool's fee history, valid up to and including `until`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeScheduleEntry {
    #[serde(default)]
    pub rule: Option<FeeRule>,
    #[serde(default)]
    pub max_percent: Option<f64>,
    /// Share of the gross reward the pool hands to its stakers before the
    /// daily figures are recorded. Only meaningful when `rule` is `None`.
    #[serde(default)]
    pub worker_given_percent: Option<f64>,
    #[serde(default)]
    pub until: Option<NaiveDate>,
}

impl FeeScheduleEntry {
    pub fn is_open_ended(&self) -> bool {
        self.until.is_none()
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.until.map_or(true, |until| until >= date)
    }

    /// Cap a fee percent at this entry's `max_percent`, if any
    pub fn cap(&self, percent: f64) -> f64 {
        match self.max_percent {
            Some(max) => percent.min(max),
            None => percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeeRule {
    /// Percent of the gross yield
    Percent { value: PercentValue },
    /// Flat cost, converted to an effective percent when applied
    Cost {
        amount: f64,
        unit: CostUnit,
        per: CostBasis,
    },
}

/// `0.1` or `[0.05, 0.1]` in JSON
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PercentValue {
    Flat(f64),
    Range(f64, f64),
}

impl PercentValue {
    /// Subtract `reduction` from every value, never going below zero
    pub fn reduced_by(self, reduction: f64) -> Self {
        match self {
            PercentValue::Flat(p) => PercentValue::Flat((p - reduction).max(0.0)),
            PercentValue::Range(min, max) => {
                PercentValue::Range((min - reduction).max(0.0), (max - reduction).max(0.0))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostUnit {
    Satori,
    Usd,
}

impl std::fmt::Display for CostUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostUnit::Satori => write!(f, "SATORI"),
            CostUnit::Usd => write!(f, "USD"),
        }
    }
}

/// What a flat cost is charged against: a fixed stake size or the day's full stake
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CostBasis {
    Stake(f64),
    FullStake,
}

const FULL_STAKE: &str = "full_stake";

impl Serialize for CostBasis {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CostBasis::Stake(amount) => serializer.serialize_f64(*amount),
            CostBasis::FullStake => serializer.serialize_str(FULL_STAKE),
        }
    }
}

impl<'de> Deserialize<'de> for CostBasis {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Stake(f64),
            Keyword(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Stake(amount) => Ok(CostBasis::Stake(amount)),
            Raw::Keyword(k) if k == FULL_STAKE => Ok(CostBasis::FullStake),
            Raw::Keyword(k) => Err(serde::de::Error::custom(format!(
                "unknown cost basis '{}', expected a stake amount or \"{}\"",
                k, FULL_STAKE
            ))),
        }
    }
}

/// Time-bounded discount on a pool's percent fee (inclusive on both ends)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryReduction {
    pub from: NaiveDate,
    pub until: NaiveDate,
    pub percent: f64,
    pub reason: String,
}

impl TemporaryReduction {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.until
    }
}
