//! Data Source boundary
//!
//! The simulator never talks to a database directly; it pulls daily aggregates
//! through this trait. Implementations are expected to cache and retry on
//! their own side, nothing here retries.

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

pub use memory::InMemoryDataSource;

/// Daily aggregate for one pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoolRecord {
    pub date: NaiveDate,
    /// Largest delegated stake seen that day (the "full stake")
    pub max_delegated_stake: f64,
    /// Gross reward per unit of staked SATORI
    pub earnings_per_staking_power: f64,
}

/// Supplier of daily pool, worker and price figures
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn get_daily_pool_record(
        &self,
        pool_address: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyPoolRecord>, SourceError>;

    /// All records for a pool between `from` and `until` (inclusive), ordered by date
    async fn list_pool_records(
        &self,
        pool_address: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<DailyPoolRecord>, SourceError>;

    /// Average reward of a self-managed worker for the day
    async fn get_daily_worker_reward_average(
        &self,
        date: NaiveDate,
    ) -> Result<Option<f64>, SourceError>;

    /// SATORI spot price in USD
    async fn get_spot_price(&self, date: NaiveDate) -> Result<Option<f64>, SourceError>;
}
