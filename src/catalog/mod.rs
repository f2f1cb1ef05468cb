//! Pool Catalog
//!
//! Immutable registry of pools and their fee-schedule histories. Loaded once,
//! validated and normalised on construction, then passed explicitly to whoever
//! needs it:
//! - fee schedule entries sorted by cutoff date, open-ended entry last
//! - at most one open-ended entry per pool
//! - all percents within [0, 1]

pub mod types;

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use crate::error::CatalogError;

pub use types::{
    CostBasis, CostUnit, FeeRule, FeeScheduleEntry, PercentValue, Pool, TemporaryReduction,
};

#[derive(Debug, Clone, Default)]
pub struct PoolCatalog {
    pools: Vec<Pool>,
}

impl PoolCatalog {
    pub fn new(pools: Vec<Pool>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut normalised = Vec::with_capacity(pools.len());

        for mut pool in pools {
            if pool.address.trim().is_empty() {
                return Err(CatalogError::EmptyAddress);
            }
            if !seen.insert(pool.address.clone()) {
                return Err(CatalogError::DuplicatePool(pool.address));
            }

            normalise_schedule(&mut pool)?;
            validate_reductions(&pool)?;

            debug!(
                "Loaded pool {} ({}) with {} fee entries, {} reductions",
                pool.name,
                pool.address,
                pool.fee_schedule.len(),
                pool.temporary_reductions.len()
            );
            normalised.push(pool);
        }

        Ok(Self { pools: normalised })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let pools: Vec<Pool> = serde_json::from_str(json)?;
        Self::new(pools)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&raw)?;
        info!("Loaded {} pools from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn list_pools(&self) -> &[Pool] {
        &self.pools
    }

    pub fn get(&self, address: &str) -> Option<&Pool> {
        self.pools.iter().find(|p| p.address == address)
    }

    /// Resolve pool references (address, vault address or name), keeping the caller's order.
    /// A pool referenced more than once is selected once, at its first position.
    pub fn select<S: AsRef<str>>(&self, refs: &[S]) -> Result<Vec<&Pool>, CatalogError> {
        let mut selected: Vec<&Pool> = Vec::with_capacity(refs.len());
        for r in refs {
            let r = r.as_ref();
            let pool = self
                .pools
                .iter()
                .find(|p| p.matches(r))
                .ok_or_else(|| CatalogError::UnknownPool(r.to_string()))?;

            if selected.iter().any(|p| p.address == pool.address) {
                debug!("Pool {} referenced more than once, ignoring '{}'", pool.address, r);
                continue;
            }
            selected.push(pool);
        }
        Ok(selected)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

fn normalise_schedule(pool: &mut Pool) -> Result<(), CatalogError> {
    // None sorts after every date
    pool.fee_schedule.sort_by(|a, b| match (a.until, b.until) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let open_ended = pool.fee_schedule.iter().filter(|e| e.is_open_ended()).count();
    if open_ended > 1 {
        return Err(CatalogError::MultipleOpenEnded(pool.address.clone()));
    }

    for pair in pool.fee_schedule.windows(2) {
        if let (Some(a), Some(b)) = (pair[0].until, pair[1].until) {
            if a == b {
                return Err(CatalogError::DuplicateCutoff {
                    pool: pool.address.clone(),
                    until: a,
                });
            }
        }
    }

    for entry in &pool.fee_schedule {
        validate_entry(&pool.address, entry)?;
    }

    Ok(())
}

fn validate_entry(pool: &str, entry: &FeeScheduleEntry) -> Result<(), CatalogError> {
    if let Some(max) = entry.max_percent {
        check_percent(pool, "max_percent", max)?;
    }
    if let Some(given) = entry.worker_given_percent {
        check_percent(pool, "worker_given_percent", given)?;
    }

    match &entry.rule {
        None => Ok(()),
        Some(FeeRule::Percent { value: PercentValue::Flat(p) }) => {
            check_percent(pool, "percent", *p)
        }
        Some(FeeRule::Percent { value: PercentValue::Range(min, max) }) => {
            check_percent(pool, "percent min", *min)?;
            check_percent(pool, "percent max", *max)?;
            if min > max {
                return Err(CatalogError::InvalidPercent {
                    pool: pool.to_string(),
                    field: "percent range",
                    value: *min,
                });
            }
            Ok(())
        }
        Some(FeeRule::Cost { amount, per, .. }) => {
            if !amount.is_finite() || *amount < 0.0 {
                return Err(CatalogError::InvalidCost {
                    pool: pool.to_string(),
                    reason: format!("amount {} must be a non-negative number", amount),
                });
            }
            if let CostBasis::Stake(stake) = per {
                if !stake.is_finite() || *stake <= 0.0 {
                    return Err(CatalogError::InvalidCost {
                        pool: pool.to_string(),
                        reason: format!("per-stake basis {} must be positive", stake),
                    });
                }
            }
            Ok(())
        }
    }
}

fn validate_reductions(pool: &Pool) -> Result<(), CatalogError> {
    for r in &pool.temporary_reductions {
        if r.from > r.until {
            return Err(CatalogError::InvalidReduction {
                pool: pool.address.clone(),
                reason: r.reason.clone(),
                detail: format!("starts {} after it ends {}", r.from, r.until),
            });
        }
        if !(0.0..=1.0).contains(&r.percent) {
            return Err(CatalogError::InvalidReduction {
                pool: pool.address.clone(),
                reason: r.reason.clone(),
                detail: format!("percent {} outside [0, 1]", r.percent),
            });
        }
    }
    Ok(())
}

fn check_percent(pool: &str, field: &'static str, value: f64) -> Result<(), CatalogError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CatalogError::InvalidPercent {
            pool: pool.to_string(),
            field,
            value,
        })
    }
}
