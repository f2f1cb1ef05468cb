//! Comparison output
//!
//! One [`DailyComparison`] row per simulated day, serialisable as-is for chart
//! code, plus an end-of-run [`ComparisonSummary`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::state::Branch;
use crate::fees::{FeeOutcome, FeeResult};

/// One simulated day across the worker and every open pool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyComparison {
    pub date: NaiveDate,
    /// Stake required to run one worker (the reference pool's full stake)
    pub stake: f64,
    pub price: f64,
    pub worker: WorkerDay,
    /// Keyed by pool address; pools closed on this day are absent
    pub pools: BTreeMap<String, PoolDay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkerDay {
    pub current_amount: f64,
    pub total_rewards: f64,
    pub daily_reward: f64,
    pub neuron_count: u64,
    pub reward_avg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoolDay {
    pub min: BranchDay,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<BranchDay>,
}

/// Branch state after the day plus the fee figures that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BranchDay {
    pub current_amount: f64,
    pub total_earnings: f64,
    pub daily_earnings: f64,
    pub fee_percent: f64,
    pub fee_amount_per_satori: f64,
    pub net_per_full_stake: f64,
    pub outcome: FeeOutcome,
}

impl BranchDay {
    pub fn new(branch: &Branch, fee: &FeeResult) -> Self {
        Self {
            current_amount: branch.current_amount,
            total_earnings: branch.total_earnings,
            daily_earnings: fee.net,
            fee_percent: fee.fee_percent,
            fee_amount_per_satori: fee.fee_amount_per_satori,
            net_per_full_stake: fee.net_per_full_stake,
            outcome: fee.outcome,
        }
    }
}

/// Final position of one trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Standing {
    pub final_amount: f64,
    pub total_earnings: f64,
    /// Earnings as a percent of the starting amount
    pub roi_pct: f64,
}

impl Standing {
    fn new(final_amount: f64, total_earnings: f64, starting_amount: f64) -> Self {
        let roi_pct = if starting_amount > 0.0 {
            total_earnings / starting_amount * 100.0
        } else {
            0.0
        };
        Self {
            final_amount,
            total_earnings,
            roi_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolStanding {
    pub address: String,
    /// Last day the pool took part (earlier than the run's end if it closed)
    pub last_day: NaiveDate,
    pub min: Standing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Standing>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub from: NaiveDate,
    pub until: NaiveDate,
    pub days: usize,
    pub starting_amount: f64,
    pub worker: Standing,
    /// Best min-branch final amount first
    pub pools: Vec<PoolStanding>,
}

impl ComparisonSummary {
    /// Summarise a run; `None` for an empty run
    pub fn from_rows(rows: &[DailyComparison], starting_amount: f64) -> Option<Self> {
        let first = rows.first()?;
        let last = rows.last()?;

        let mut latest: BTreeMap<&str, (NaiveDate, &PoolDay)> = BTreeMap::new();
        for row in rows {
            for (address, day) in &row.pools {
                latest.insert(address.as_str(), (row.date, day));
            }
        }

        let mut pools: Vec<PoolStanding> = latest
            .into_iter()
            .map(|(address, (last_day, day))| PoolStanding {
                address: address.to_string(),
                last_day,
                min: Standing::new(day.min.current_amount, day.min.total_earnings, starting_amount),
                max: day
                    .max
                    .map(|m| Standing::new(m.current_amount, m.total_earnings, starting_amount)),
            })
            .collect();

        pools.sort_by(|a, b| {
            b.min
                .final_amount
                .partial_cmp(&a.min.final_amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Some(Self {
            from: first.date,
            until: last.date,
            days: rows.len(),
            starting_amount,
            worker: Standing::new(
                last.worker.current_amount,
                last.worker.total_rewards,
                starting_amount,
            ),
            pools,
        })
    }
}
