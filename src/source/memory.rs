//! In-memory data source
//!
//! Concurrent map backed implementation of [`DataSource`], fed either
//! programmatically or from a JSON dataset file:
//!
//! ```json
//! {
//!   "pools": { "<address>": [ { "date": "2024-05-01", "max_delegated_stake": 15000.0, "earnings_per_staking_power": 0.001 } ] },
//!   "worker_rewards": { "2024-05-01": 0.5 },
//!   "prices": { "2024-05-01": 0.05 }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::Deserialize;
use tracing::info;

use super::{DailyPoolRecord, DataSource};
use crate::error::SourceError;

#[derive(Debug, Default)]
pub struct InMemoryDataSource {
    pools: DashMap<String, BTreeMap<NaiveDate, DailyPoolRecord>>,
    worker_rewards: DashMap<NaiveDate, f64>,
    prices: DashMap<NaiveDate, f64>,
}

#[derive(Debug, Deserialize)]
struct Dataset {
    #[serde(default)]
    pools: HashMap<String, Vec<DailyPoolRecord>>,
    #[serde(default)]
    worker_rewards: HashMap<NaiveDate, f64>,
    #[serde(default)]
    prices: HashMap<NaiveDate, f64>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, SourceError> {
        let dataset: Dataset = serde_json::from_str(json)?;
        let source = Self::new();

        for (address, records) in dataset.pools {
            for record in records {
                source.insert_pool_record(&address, record);
            }
        }
        for (date, reward) in dataset.worker_rewards {
            source.insert_worker_reward(date, reward);
        }
        for (date, price) in dataset.prices {
            source.insert_price(date, price);
        }

        Ok(source)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let source = Self::from_json_str(&raw)?;
        info!(
            "Loaded dataset from {}: {} pools, {} price days, {} worker reward days",
            path.display(),
            source.pools.len(),
            source.prices.len(),
            source.worker_rewards.len()
        );
        Ok(source)
    }

    /// Insert or replace the record for `address` on `record.date`
    pub fn insert_pool_record(&self, address: &str, record: DailyPoolRecord) {
        self.pools
            .entry(address.to_string())
            .or_default()
            .insert(record.date, record);
    }

    pub fn insert_worker_reward(&self, date: NaiveDate, reward_avg: f64) {
        self.worker_rewards.insert(date, reward_avg);
    }

    pub fn insert_price(&self, date: NaiveDate, price: f64) {
        self.prices.insert(date, price);
    }

    pub fn remove_pool_record(&self, address: &str, date: NaiveDate) -> Option<DailyPoolRecord> {
        self.pools.get_mut(address)?.remove(&date)
    }
}

#[async_trait]
impl DataSource for InMemoryDataSource {
    async fn get_daily_pool_record(
        &self,
        pool_address: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyPoolRecord>, SourceError> {
        Ok(self
            .pools
            .get(pool_address)
            .and_then(|records| records.get(&date).copied()))
    }

    async fn list_pool_records(
        &self,
        pool_address: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<DailyPoolRecord>, SourceError> {
        if from > until {
            return Ok(Vec::new());
        }

        Ok(self
            .pools
            .get(pool_address)
            .map(|records| records.range(from..=until).map(|(_, r)| *r).collect())
            .unwrap_or_default())
    }

    async fn get_daily_worker_reward_average(
        &self,
        date: NaiveDate,
    ) -> Result<Option<f64>, SourceError> {
        Ok(self.worker_rewards.get(&date).map(|r| *r))
    }

    async fn get_spot_price(&self, date: NaiveDate) -> Result<Option<f64>, SourceError> {
        Ok(self.prices.get(&date).map(|p| *p))
    }
}
