//! Pool fee handling: schedule resolution and gross→net conversion

pub mod applier;
pub mod resolver;

pub use applier::{apply, apply_entry, AppliedFee, FeeInput, FeeOutcome, FeeResult};
pub use resolver::{resolve, resolve_with_trace, ResolvedEntry};
