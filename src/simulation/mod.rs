//! Pool Earnings Simulation
//!
//! Day-by-day comparison of staking in one or more pools against running a
//! self-managed worker:
//! - date alignment across the selected pools
//! - per-run compounding state (min/max branches per pool, worker)
//! - the day fold itself, pulling figures through a [`DataSource`](crate::source::DataSource)
//! - serialisable per-day rows and an end-of-run summary

pub mod alignment;
pub mod report;
pub mod simulator;
pub mod state;

// Re-exports for external use
pub use alignment::{aligned_dates, date_window, window_days};
pub use report::{BranchDay, ComparisonSummary, DailyComparison, PoolDay, PoolStanding, Standing, WorkerDay};
pub use simulator::{run_comparison, EarningsSimulator};
pub use state::{Branch, PoolTracking, SimulationState, WorkerTracking, WorkerStep};
