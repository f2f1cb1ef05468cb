//! Error types for catalog loading, data access and simulation runs

use chrono::NaiveDate;

/// Pool catalog failed to load or violated a schedule invariant
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read pool catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse pool catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("pool with empty address")]
    EmptyAddress,
    #[error("pool {0} is defined more than once")]
    DuplicatePool(String),
    #[error("pool {0} has more than one open-ended fee schedule entry")]
    MultipleOpenEnded(String),
    #[error("pool {pool} has two fee schedule entries ending on {until}")]
    DuplicateCutoff { pool: String, until: NaiveDate },
    #[error("pool {pool}: {field} = {value} is not a valid percent in [0, 1]")]
    InvalidPercent {
        pool: String,
        field: &'static str,
        value: f64,
    },
    #[error("pool {pool}: invalid cost rule ({reason})")]
    InvalidCost { pool: String, reason: String },
    #[error("pool {pool}: invalid temporary reduction '{reason}' ({detail})")]
    InvalidReduction {
        pool: String,
        reason: String,
        detail: String,
    },
    #[error("unknown pool: {0}")]
    UnknownPool(String),
}

/// The external data source could not answer a query
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse dataset: {0}")]
    Json(#[from] serde_json::Error),
    #[error("data source backend error: {0}")]
    Backend(String),
}

/// A simulation run aborted. No partial rows are ever returned alongside these.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("no pools selected")]
    NoPools,
    #[error("number of simulated days must be greater than 0")]
    ZeroDays,
    #[error(
        "date alignment violated by pool {pool} at index {index}: expected {}, found {}",
        fmt_day(.expected),
        fmt_day(.found)
    )]
    DateAlignment {
        pool: String,
        index: usize,
        expected: Option<NaiveDate>,
        found: Option<NaiveDate>,
    },
    #[error("missing upstream data: {what} for {date}")]
    UpstreamDataMissing { what: String, date: NaiveDate },
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

fn fmt_day(day: &Option<NaiveDate>) -> String {
    match day {
        Some(d) => d.to_string(),
        None => "nothing".to_string(),
    }
}
