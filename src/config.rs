//! SATORI Pool Simulator Configuration

use std::env;
use std::path::PathBuf;

use tracing::Level;

/// One simulated day, in milliseconds. Daily records must be exactly this far apart.
pub const MS_PER_DAY: i64 = 86_400_000;

// Defaults for the comparison CLI
pub const DEFAULT_DAYS: u32 = 30;
pub const DEFAULT_STARTING_AMOUNT: f64 = 10_000.0;
pub const DEFAULT_POOLS_FILE: &str = "data/pools.json";
pub const DEFAULT_DATA_FILE: &str = "data/daily.json";

/// Runtime configuration for the simulator binary
#[derive(Debug, Clone)]
pub struct Config {
    /// Pool catalog (fee schedules, reductions)
    pub pools_file: PathBuf,
    /// Daily dataset backing the in-memory data source
    pub data_file: PathBuf,
    pub default_days: u32,
    pub default_starting_amount: f64,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        dotenvy::dotenv().ok();

        let default_days = match env::var("SATORI_DEFAULT_DAYS") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| eyre::eyre!("SATORI_DEFAULT_DAYS must be a positive integer: {}", e))?,
            Err(_) => DEFAULT_DAYS,
        };

        let default_starting_amount = match env::var("SATORI_DEFAULT_AMOUNT") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| eyre::eyre!("SATORI_DEFAULT_AMOUNT must be a number: {}", e))?,
            Err(_) => DEFAULT_STARTING_AMOUNT,
        };

        let log_level = match env::var("SATORI_LOG_LEVEL") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| eyre::eyre!("SATORI_LOG_LEVEL must be one of trace, debug, info, warn, error"))?,
            Err(_) => Level::WARN,
        };

        Ok(Self {
            pools_file: env::var("SATORI_POOLS_FILE")
                .unwrap_or_else(|_| DEFAULT_POOLS_FILE.to_string())
                .into(),
            data_file: env::var("SATORI_DATA_FILE")
                .unwrap_or_else(|_| DEFAULT_DATA_FILE.to_string())
                .into(),
            default_days,
            default_starting_amount,
            log_level,
        })
    }
}
