//! Fee Schedule Resolver
//!
//! Picks the fee schedule entry in effect for a pool on a given day and folds
//! any active temporary reductions into percent rules. Cost rules and entries
//! without a rule are returned untouched.

use chrono::NaiveDate;
use tracing::debug;

use crate::catalog::{FeeRule, FeeScheduleEntry, Pool};

/// How an entry was resolved, for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntry {
    /// Index into the pool's (sorted) fee schedule
    pub index: usize,
    /// Entry with reductions already applied
    pub entry: FeeScheduleEntry,
    /// Sum of reductions subtracted from percent values (0 for non-percent rules)
    pub reduction: f64,
}

/// Resolve the fee schedule entry in effect for `pool` on `date`.
///
/// Returns `None` when no entry covers the date, which callers treat as a 0% fee.
pub fn resolve(pool: &Pool, date: NaiveDate) -> Option<FeeScheduleEntry> {
    resolve_with_trace(pool, date).map(|resolved| resolved.entry)
}

pub fn resolve_with_trace(pool: &Pool, date: NaiveDate) -> Option<ResolvedEntry> {
    let Some((index, entry)) = pool
        .fee_schedule
        .iter()
        .enumerate()
        .find(|(_, e)| e.covers(date))
    else {
        debug!("No fee schedule entry for pool {} on {}", pool.address, date);
        return None;
    };

    match &entry.rule {
        Some(FeeRule::Percent { value }) => {
            let reduction = pool.total_reduction(date);
            if reduction > 0.0 {
                debug!(
                    "Pool {} on {}: percent fee reduced by {:.4}",
                    pool.address, date, reduction
                );
            }

            let mut reduced = entry.clone();
            reduced.rule = Some(FeeRule::Percent {
                value: value.reduced_by(reduction),
            });

            Some(ResolvedEntry {
                index,
                entry: reduced,
                reduction,
            })
        }
        Some(FeeRule::Cost { .. }) | None => Some(ResolvedEntry {
            index,
            entry: entry.clone(),
            reduction: 0.0,
        }),
    }
}
