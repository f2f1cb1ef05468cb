//! Fee Applier
//!
//! Converts a pool's gross daily yield into net yield under the fee rule in
//! effect. Handles:
//! - flat percent fees, capped at the entry's `max_percent`
//! - percent ranges (two independent results, one per bound)
//! - flat costs in SATORI or USD, charged per fixed stake or per full stake
//!
//! Division guards: a cost fee on zero (or negative) net is 0%, a zero price
//! yields a zero per-SATORI fee amount and converts USD costs to nothing.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use super::resolver;
use crate::catalog::{CostBasis, CostUnit, FeeRule, FeeScheduleEntry, PercentValue, Pool};

/// Where a fee figure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeOutcome {
    /// A percent or cost rule was applied
    Applied,
    /// No schedule entry covers the day; passthrough
    NotFound,
    /// Entry has no rule; the pool's share is already taken out of the daily figures
    Embedded,
}

impl std::fmt::Display for FeeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeeOutcome::Applied => write!(f, "applied"),
            FeeOutcome::NotFound => write!(f, "not found"),
            FeeOutcome::Embedded => write!(f, "embedded"),
        }
    }
}

/// Net yield for one stake size after fees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeeResult {
    pub fee_percent: f64,
    pub fee_amount_per_satori: f64,
    /// Net daily earnings for the simulated stake
    pub net: f64,
    /// Net daily earnings for the day's full stake
    pub net_per_full_stake: f64,
    pub outcome: FeeOutcome,
}

impl FeeResult {
    fn passthrough(net: f64, net_per_full_stake: f64, outcome: FeeOutcome) -> Self {
        Self {
            fee_percent: 0.0,
            fee_amount_per_satori: 0.0,
            net,
            net_per_full_stake,
            outcome,
        }
    }
}

/// Result of applying a fee: one figure, or one per range bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppliedFee {
    Single(FeeResult),
    /// `low` comes from the lower percent bound, `high` from the upper one
    Range { low: FeeResult, high: FeeResult },
}

impl AppliedFee {
    pub fn is_range(&self) -> bool {
        matches!(self, AppliedFee::Range { .. })
    }

    /// Order by resulting net earnings: (min branch, max branch).
    ///
    /// Fee percent and net move in opposite directions only while gross
    /// earnings are positive, so ordering is done on the net figure itself.
    pub fn by_net(&self) -> (FeeResult, Option<FeeResult>) {
        match *self {
            AppliedFee::Single(result) => (result, None),
            AppliedFee::Range { low, high } => {
                if low.net <= high.net {
                    (low, Some(high))
                } else {
                    (high, Some(low))
                }
            }
        }
    }

    /// Figure for the min branch
    pub fn min(&self) -> FeeResult {
        self.by_net().0
    }

    /// Figure for the max branch (same as `min` for single results)
    pub fn max(&self) -> FeeResult {
        let (min, max) = self.by_net();
        max.unwrap_or(min)
    }
}

/// Inputs for one pool-day
#[derive(Debug, Clone, Copy)]
pub struct FeeInput {
    /// Gross earnings per staking power
    pub gross_epsp: f64,
    pub current_stake: f64,
    pub full_stake: f64,
    /// Spot price in USD
    pub price: f64,
}

/// Resolve `pool`'s fee for `date` and apply it
pub fn apply(pool: &Pool, date: NaiveDate, input: FeeInput) -> AppliedFee {
    match resolver::resolve(pool, date) {
        Some(entry) => apply_entry(&entry, input),
        None => {
            let (net, net_per_full_stake) = gross(input);
            AppliedFee::Single(FeeResult::passthrough(net, net_per_full_stake, FeeOutcome::NotFound))
        }
    }
}

/// Apply an already resolved schedule entry
pub fn apply_entry(entry: &FeeScheduleEntry, input: FeeInput) -> AppliedFee {
    let (net, net_per_full_stake) = gross(input);

    match &entry.rule {
        None => AppliedFee::Single(FeeResult::passthrough(
            net,
            net_per_full_stake,
            FeeOutcome::Embedded,
        )),
        Some(FeeRule::Percent { value: PercentValue::Flat(p) }) => {
            AppliedFee::Single(percent_result(entry.cap(*p), input, net, net_per_full_stake))
        }
        Some(FeeRule::Percent { value: PercentValue::Range(min, max) }) => AppliedFee::Range {
            low: percent_result(entry.cap(*min), input, net, net_per_full_stake),
            high: percent_result(entry.cap(*max), input, net, net_per_full_stake),
        },
        Some(FeeRule::Cost { amount, unit, per }) => {
            let cost_full = cost_for_full_stake(*amount, *unit, *per, input);
            let cost_current = if input.full_stake > 0.0 {
                cost_full * input.current_stake / input.full_stake
            } else {
                0.0
            };

            let fee_percent = if net > 0.0 {
                entry.cap(cost_current / net)
            } else {
                debug!("Cost fee on non-positive net {}; charging 0%", net);
                0.0
            };

            AppliedFee::Single(percent_result(fee_percent, input, net, net_per_full_stake))
        }
    }
}

/// Flat cost expressed in SATORI for the day's full stake
pub fn cost_for_full_stake(amount: f64, unit: CostUnit, per: CostBasis, input: FeeInput) -> f64 {
    let amount_satori = match unit {
        CostUnit::Satori => amount,
        CostUnit::Usd if input.price > 0.0 => amount / input.price,
        CostUnit::Usd => {
            warn!("USD cost of {} with non-positive price {}; treating as 0 SATORI", amount, input.price);
            0.0
        }
    };

    match per {
        CostBasis::FullStake => amount_satori,
        CostBasis::Stake(stake) => amount_satori * input.full_stake / stake,
    }
}

fn gross(input: FeeInput) -> (f64, f64) {
    (
        input.gross_epsp * input.current_stake,
        input.gross_epsp * input.full_stake,
    )
}

fn percent_result(p: f64, input: FeeInput, net: f64, net_per_full_stake: f64) -> FeeResult {
    let fee_amount_per_satori = if input.price > 0.0 {
        input.gross_epsp * p / input.price
    } else {
        0.0
    };

    FeeResult {
        fee_percent: p,
        fee_amount_per_satori,
        net: net * (1.0 - p),
        net_per_full_stake: net_per_full_stake * (1.0 - p),
        outcome: FeeOutcome::Applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PoolCatalog, TemporaryReduction};

    const EPS: f64 = 1e-9;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn entry(rule: Option<FeeRule>, max_percent: Option<f64>) -> FeeScheduleEntry {
        FeeScheduleEntry {
            rule,
            max_percent,
            worker_given_percent: None,
            until: None,
        }
    }

    fn input(gross_epsp: f64, current_stake: f64) -> FeeInput {
        FeeInput {
            gross_epsp,
            current_stake,
            full_stake: 15_000.0,
            price: 0.05,
        }
    }

    fn single(applied: AppliedFee) -> FeeResult {
        match applied {
            AppliedFee::Single(r) => r,
            other => panic!("expected single result, got {:?}", other),
        }
    }

    #[test]
    fn test_flat_percent() {
        let e = entry(Some(FeeRule::Percent { value: PercentValue::Flat(0.1) }), None);
        let r = single(apply_entry(&e, input(0.01, 100.0)));

        assert!((r.net - 0.9).abs() < EPS);
        assert!((r.net_per_full_stake - 0.01 * 15_000.0 * 0.9).abs() < EPS);
        assert!((r.fee_amount_per_satori - 0.01 * 0.1 / 0.05).abs() < EPS);
        assert_eq!(r.fee_percent, 0.1);
        assert_eq!(r.outcome, FeeOutcome::Applied);
    }

    #[test]
    fn test_flat_percent_property() {
        for f in [0.0, 0.05, 0.25, 0.5, 1.0] {
            for gross_epsp in [0.0001, 0.002, 0.04] {
                let e = entry(Some(FeeRule::Percent { value: PercentValue::Flat(f) }), None);
                let i = input(gross_epsp, 1234.5);
                let r = single(apply_entry(&e, i));
                assert!((r.net - gross_epsp * i.current_stake * (1.0 - f)).abs() < EPS);
                assert!((r.net_per_full_stake - gross_epsp * i.full_stake * (1.0 - f)).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_max_percent_caps_fee() {
        let e = entry(Some(FeeRule::Percent { value: PercentValue::Flat(0.3) }), Some(0.2));
        let r = single(apply_entry(&e, input(0.01, 100.0)));
        assert_eq!(r.fee_percent, 0.2);
        assert!((r.net - 0.8).abs() < EPS);
    }

    #[test]
    fn test_range_ordered_by_net() {
        let e = entry(
            Some(FeeRule::Percent { value: PercentValue::Range(0.05, 0.15) }),
            Some(0.1),
        );
        let applied = apply_entry(&e, input(0.01, 100.0));
        assert!(applied.is_range());

        let (min, max) = applied.by_net();
        let max = max.unwrap();
        assert!(min.net <= max.net);
        // Upper bound capped at 10%
        assert_eq!(min.fee_percent, 0.1);
        assert_eq!(max.fee_percent, 0.05);
        assert!((min.net - 0.9).abs() < EPS);
        assert!((max.net - 0.95).abs() < EPS);
        assert_eq!(applied.min(), min);
        assert_eq!(applied.max(), max);
    }

    #[test]
    fn test_range_min_not_above_max_for_positive_gross() {
        for (lo, hi) in [(0.0, 0.0), (0.01, 0.2), (0.3, 0.9), (0.5, 1.0)] {
            let e = entry(Some(FeeRule::Percent { value: PercentValue::Range(lo, hi) }), None);
            let (min, max) = apply_entry(&e, input(0.003, 5000.0)).by_net();
            assert!(min.net <= max.unwrap().net);
        }
    }

    #[test]
    fn test_cost_per_full_stake_usd() {
        // 0.1 USD per full stake at 0.05 USD => 2 SATORI for 15000, 0.2 SATORI for 1500
        let e = entry(
            Some(FeeRule::Cost {
                amount: 0.1,
                unit: CostUnit::Usd,
                per: CostBasis::FullStake,
            }),
            None,
        );
        let i = input(0.001, 1500.0);
        assert!((cost_for_full_stake(0.1, CostUnit::Usd, CostBasis::FullStake, i) - 2.0).abs() < EPS);

        let r = single(apply_entry(&e, i));
        let net = 0.001 * 1500.0;
        assert!((r.fee_percent - 0.2 / net).abs() < EPS);
        assert!((r.net - (net - 0.2)).abs() < EPS);
    }

    #[test]
    fn test_cost_per_fixed_stake_satori() {
        // 1 SATORI per 5000 staked, full stake 15000 => 3 SATORI for the full stake
        let i = input(0.001, 3000.0);
        let cost = cost_for_full_stake(1.0, CostUnit::Satori, CostBasis::Stake(5000.0), i);
        assert!((cost - 3.0).abs() < EPS);

        let e = entry(
            Some(FeeRule::Cost {
                amount: 1.0,
                unit: CostUnit::Satori,
                per: CostBasis::Stake(5000.0),
            }),
            None,
        );
        let r = single(apply_entry(&e, i));
        // 3 * 3000/15000 = 0.6 SATORI against 3 SATORI gross
        assert!((r.fee_percent - 0.2).abs() < EPS);
        assert!((r.net - 2.4).abs() < EPS);
    }

    #[test]
    fn test_cost_fee_capped() {
        let e = entry(
            Some(FeeRule::Cost {
                amount: 100.0,
                unit: CostUnit::Satori,
                per: CostBasis::FullStake,
            }),
            Some(0.25),
        );
        let r = single(apply_entry(&e, input(0.001, 1500.0)));
        assert_eq!(r.fee_percent, 0.25);
    }

    #[test]
    fn test_cost_fee_on_zero_net_is_zero() {
        let e = entry(
            Some(FeeRule::Cost {
                amount: 0.1,
                unit: CostUnit::Usd,
                per: CostBasis::FullStake,
            }),
            None,
        );
        let r = single(apply_entry(&e, input(0.0, 1500.0)));
        assert_eq!(r.fee_percent, 0.0);
        assert_eq!(r.net, 0.0);
        assert!(r.fee_percent.is_finite() && r.net.is_finite());
    }

    #[test]
    fn test_zero_price_guards() {
        let e = entry(
            Some(FeeRule::Cost {
                amount: 0.1,
                unit: CostUnit::Usd,
                per: CostBasis::FullStake,
            }),
            None,
        );
        let mut i = input(0.001, 1500.0);
        i.price = 0.0;

        let r = single(apply_entry(&e, i));
        assert_eq!(r.fee_percent, 0.0);
        assert_eq!(r.fee_amount_per_satori, 0.0);
    }

    #[test]
    fn test_missing_rule_and_missing_schedule_pass_through() {
        let mut e = entry(None, None);
        e.worker_given_percent = Some(0.8);
        let embedded = single(apply_entry(&e, input(0.01, 100.0)));
        assert_eq!(embedded.outcome, FeeOutcome::Embedded);
        assert_eq!(embedded.fee_percent, 0.0);
        assert!((embedded.net - 1.0).abs() < EPS);

        let pool = Pool {
            address: "p".to_string(),
            vault_address: None,
            name: "P".to_string(),
            description: None,
            url: None,
            closed: None,
            fee_schedule: vec![FeeScheduleEntry {
                until: Some(day(1, 31)),
                ..entry(Some(FeeRule::Percent { value: PercentValue::Flat(0.1) }), None)
            }],
            temporary_reductions: vec![],
        };
        let missing = single(apply(&pool, day(2, 1), input(0.01, 100.0)));
        assert_eq!(missing.outcome, FeeOutcome::NotFound);
        assert!((missing.net - 1.0).abs() < EPS);
        assert_eq!(missing.fee_percent, 0.0);
    }

    #[test]
    fn test_apply_uses_reduced_percent() {
        let pool = Pool {
            address: "p".to_string(),
            vault_address: None,
            name: "P".to_string(),
            description: None,
            url: None,
            closed: None,
            fee_schedule: vec![entry(Some(FeeRule::Percent { value: PercentValue::Flat(0.1) }), None)],
            temporary_reductions: vec![TemporaryReduction {
                from: day(5, 1),
                until: day(5, 31),
                percent: 0.04,
                reason: "anniversary".to_string(),
            }],
        };
        let catalog = PoolCatalog::new(vec![pool]).unwrap();
        let pool = &catalog.list_pools()[0];

        let r = single(apply(pool, day(5, 10), input(0.01, 100.0)));
        assert!((r.fee_percent - 0.06).abs() < EPS);
        assert!((r.net - 0.94).abs() < EPS);

        let r = single(apply(pool, day(6, 1), input(0.01, 100.0)));
        assert!((r.net - 0.9).abs() < EPS);
    }
}
