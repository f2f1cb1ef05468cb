//! Per-run compounding state
//!
//! Owned by a single simulation run and dropped with it. Nothing here is shared
//! between runs, so concurrent simulations need no synchronization.

use serde::Serialize;

/// Running amount and accumulated earnings of one compounding trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Branch {
    pub current_amount: f64,
    pub total_earnings: f64,
}

impl Branch {
    pub fn new(starting_amount: f64) -> Self {
        Self {
            current_amount: starting_amount,
            total_earnings: 0.0,
        }
    }

    /// Compound one day of net earnings
    pub fn accrue(&mut self, net: f64) {
        self.current_amount += net;
        self.total_earnings += net;
    }
}

/// Tracking for one pool.
///
/// Starts Unranged (only `min`). The first day the pool's fee resolves to a
/// range, `max` is seeded from `min` and from then on both evolve
/// independently; `max` is never dropped or merged back.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolTracking {
    pub min: Branch,
    pub max: Option<Branch>,
}

impl PoolTracking {
    pub fn new(starting_amount: f64) -> Self {
        Self {
            min: Branch::new(starting_amount),
            max: None,
        }
    }
}

/// Self-managed worker: stake is split into as many full worker stakes as fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkerTracking {
    pub current_amount: f64,
    pub total_rewards: f64,
}

/// Result of one worker day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkerStep {
    pub neuron_count: u64,
    pub daily_reward: f64,
}

impl WorkerTracking {
    pub fn new(starting_amount: f64) -> Self {
        Self {
            current_amount: starting_amount,
            total_rewards: 0.0,
        }
    }

    /// Run one day: `floor(current / stake_requirement)` workers each earn `reward_avg`.
    /// A non-positive requirement runs no workers.
    pub fn step(&mut self, stake_requirement: f64, reward_avg: f64) -> WorkerStep {
        let neuron_count = if stake_requirement > 0.0 {
            (self.current_amount / stake_requirement).floor().max(0.0) as u64
        } else {
            0
        };
        let daily_reward = neuron_count as f64 * reward_avg;

        self.current_amount += daily_reward;
        self.total_rewards += daily_reward;

        WorkerStep {
            neuron_count,
            daily_reward,
        }
    }
}

/// Everything a run compounds, indexed like the run's pool selection
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub worker: WorkerTracking,
    pub pools: Vec<PoolTracking>,
}

impl SimulationState {
    pub fn new(pool_count: usize, starting_amount: f64) -> Self {
        Self {
            worker: WorkerTracking::new(starting_amount),
            pools: vec![PoolTracking::new(starting_amount); pool_count],
        }
    }
}
