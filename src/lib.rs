//! SATORI pool economics simulator
//!
//! Compares the compounded earnings of staking SATORI in one or more pools,
//! each with its own historical fee schedule, against running a self-managed
//! worker, one day at a time.

pub mod catalog;
pub mod config;
pub mod display;
pub mod error;
pub mod fees;
pub mod simulation;
pub mod source;

pub use catalog::{Pool, PoolCatalog};
pub use error::{CatalogError, SimulationError, SourceError};
pub use simulation::{run_comparison, ComparisonSummary, DailyComparison, EarningsSimulator};
pub use source::{DailyPoolRecord, DataSource, InMemoryDataSource};
