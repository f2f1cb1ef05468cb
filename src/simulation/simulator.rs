//! Earnings Simulator
//!
//! Folds over consecutive days, compounding a hypothetical stake in every
//! selected pool and in a self-managed worker. Per day:
//! - fetch price, worker reward average and each open pool's record (concurrently)
//! - run the worker step against the reference pool's full stake
//! - apply each pool's fee to its min branch, and to its max branch once ranged
//!
//! Days are processed strictly in order; each depends on the previous day's amounts.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::try_join_all;
use tracing::{debug, error, info};

use super::alignment::{aligned_dates, date_window};
use super::report::{BranchDay, DailyComparison, PoolDay, WorkerDay};
use super::state::{PoolTracking, SimulationState};
use crate::catalog::{Pool, PoolCatalog};
use crate::error::SimulationError;
use crate::fees::{self, FeeInput};
use crate::source::{DailyPoolRecord, DataSource};

/// Day-by-day compounding simulator over a shared data source
pub struct EarningsSimulator<S: ?Sized> {
    source: Arc<S>,
}

impl<S: ?Sized> Clone for EarningsSimulator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

/// Inputs for one pool on one day
struct PoolDayInput {
    record: DailyPoolRecord,
    price: f64,
}

impl<S> EarningsSimulator<S>
where
    S: DataSource + ?Sized,
{
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Simulate `days` days ending at `date`, starting every trajectory at `starting_amount`.
    ///
    /// Every pool must report each day of the window (the first pool is the
    /// reference and its full stake is the worker stake requirement). Any
    /// alignment violation or missing upstream figure aborts the run with no rows.
    pub async fn run(
        &self,
        pools: &[&Pool],
        date: NaiveDate,
        days: u32,
        starting_amount: f64,
    ) -> Result<Vec<DailyComparison>, SimulationError> {
        if pools.is_empty() {
            return Err(SimulationError::NoPools);
        }
        if days == 0 {
            return Err(SimulationError::ZeroDays);
        }

        let window = date_window(date, days);
        info!(
            "Simulating {} pools over {} days ({} to {}), starting amount {}",
            pools.len(),
            days,
            window.0,
            window.1,
            starting_amount
        );

        let histories = try_join_all(pools.iter().map(|pool| async move {
            let records = self
                .source
                .list_pool_records(&pool.address, window.0, window.1)
                .await?;
            Ok::<_, SimulationError>((*pool, records))
        }))
        .await?;

        let dates = aligned_dates(&histories, window)?;
        let mut state = SimulationState::new(pools.len(), starting_amount);
        let mut rows = Vec::with_capacity(dates.len());

        for day in dates {
            rows.push(self.step(pools, day, &mut state).await?);
        }

        info!("Simulation finished: {} rows", rows.len());
        Ok(rows)
    }

    async fn step(
        &self,
        pools: &[&Pool],
        date: NaiveDate,
        state: &mut SimulationState,
    ) -> Result<DailyComparison, SimulationError> {
        let (price, reward_avg, records) = futures::try_join!(
            self.fetch_price(date),
            self.fetch_reward_avg(date),
            self.fetch_records(pools, date),
        )?;

        // Reference pool supplies the worker stake requirement
        let stake = match &records[0] {
            Some(record) => record.max_delegated_stake,
            None => return Err(missing_record(pools[0], date)),
        };

        let worker_step = state.worker.step(stake, reward_avg);
        let worker = WorkerDay {
            current_amount: state.worker.current_amount,
            total_rewards: state.worker.total_rewards,
            daily_reward: worker_step.daily_reward,
            neuron_count: worker_step.neuron_count,
            reward_avg,
        };

        let mut pool_days = BTreeMap::new();
        for ((pool, record), tracking) in pools.iter().zip(records).zip(state.pools.iter_mut()) {
            if pool.is_closed_on(date) {
                continue;
            }
            let record = record.ok_or_else(|| missing_record(pool, date))?;

            let pool_day = advance_pool(pool, date, PoolDayInput { record, price }, tracking);
            pool_days.insert(pool.address.clone(), pool_day);
        }

        debug!(
            "{}: stake {} price {} worker {:.4} ({} neurons), {} pools",
            date,
            stake,
            price,
            worker.current_amount,
            worker.neuron_count,
            pool_days.len()
        );

        Ok(DailyComparison {
            date,
            stake,
            price,
            worker,
            pools: pool_days,
        })
    }

    async fn fetch_price(&self, date: NaiveDate) -> Result<f64, SimulationError> {
        self.source
            .get_spot_price(date)
            .await?
            .ok_or_else(|| SimulationError::UpstreamDataMissing {
                what: "spot price".to_string(),
                date,
            })
    }

    async fn fetch_reward_avg(&self, date: NaiveDate) -> Result<f64, SimulationError> {
        self.source
            .get_daily_worker_reward_average(date)
            .await?
            .ok_or_else(|| SimulationError::UpstreamDataMissing {
                what: "worker reward average".to_string(),
                date,
            })
    }

    /// Records for every pool in selection order; closed pools other than the
    /// reference are not fetched
    async fn fetch_records(
        &self,
        pools: &[&Pool],
        date: NaiveDate,
    ) -> Result<Vec<Option<DailyPoolRecord>>, SimulationError> {
        let fetches = pools.iter().enumerate().map(|(i, pool)| async move {
            if i > 0 && pool.is_closed_on(date) {
                return Ok(None);
            }
            self.source.get_daily_pool_record(&pool.address, date).await
        });

        Ok(try_join_all(fetches).await?)
    }
}

/// Apply one day of fees to a pool's branches.
///
/// The max branch is seeded from the min branch's state *before* today's
/// earnings on the first ranged day, then follows its own stake from then on.
fn advance_pool(
    pool: &Pool,
    date: NaiveDate,
    input: PoolDayInput,
    tracking: &mut PoolTracking,
) -> PoolDay {
    let fee_input = |current_stake: f64| FeeInput {
        gross_epsp: input.record.earnings_per_staking_power,
        current_stake,
        full_stake: input.record.max_delegated_stake,
        price: input.price,
    };

    let applied = fees::apply(pool, date, fee_input(tracking.min.current_amount));
    let min_fee = applied.min();

    let max_day = match tracking.max.as_mut() {
        Some(max_branch) => {
            let max_fee = fees::apply(pool, date, fee_input(max_branch.current_amount)).max();
            max_branch.accrue(max_fee.net);
            Some(BranchDay::new(max_branch, &max_fee))
        }
        None if applied.is_range() => {
            debug!("Pool {} ranged from {}", pool.address, date);
            let max_fee = applied.max();
            let mut seeded = tracking.min;
            seeded.accrue(max_fee.net);
            tracking.max = Some(seeded);
            Some(BranchDay::new(&seeded, &max_fee))
        }
        None => None,
    };

    tracking.min.accrue(min_fee.net);

    PoolDay {
        min: BranchDay::new(&tracking.min, &min_fee),
        max: max_day,
    }
}

fn missing_record(pool: &Pool, date: NaiveDate) -> SimulationError {
    SimulationError::UpstreamDataMissing {
        what: format!("daily record for pool {}", pool.address),
        date,
    }
}

/// Presentation-layer entry point.
///
/// Resolves `pool_refs` against the catalog and runs the simulation. A date
/// alignment violation is logged and yields an empty comparison; every other
/// failure is returned.
pub async fn run_comparison<S, R>(
    catalog: &PoolCatalog,
    source: Arc<S>,
    pool_refs: &[R],
    date: NaiveDate,
    days: u32,
    starting_amount: f64,
) -> Result<Vec<DailyComparison>, SimulationError>
where
    S: DataSource + ?Sized,
    R: AsRef<str>,
{
    let pools = catalog.select(pool_refs)?;
    let simulator = EarningsSimulator::new(source);

    match simulator.run(&pools, date, days, starting_amount).await {
        Err(e @ SimulationError::DateAlignment { .. }) => {
            error!("Comparison aborted: {}", e);
            Ok(Vec::new())
        }
        other => other,
    }
}
