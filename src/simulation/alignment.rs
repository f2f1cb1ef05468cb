//! Date alignment across pools
//!
//! Every pool in a comparison must report the same consecutive run of days,
//! covering the whole requested window. The first selected pool is the
//! reference and must have a record for every day of the window; a gap, a
//! late start or an early end in any pool aborts the whole run.

use chrono::{Duration, NaiveDate};

use crate::catalog::Pool;
use crate::config::MS_PER_DAY;
use crate::error::SimulationError;
use crate::source::DailyPoolRecord;

/// Inclusive window of `days` days ending at `date`
pub fn date_window(date: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    let span = i64::from(days.saturating_sub(1));
    (date - Duration::days(span), date)
}

/// Every day of the window, in order
pub fn window_days(window: (NaiveDate, NaiveDate)) -> Vec<NaiveDate> {
    let step = Duration::milliseconds(MS_PER_DAY);
    let mut days = Vec::new();
    let mut day = window.0;
    while day <= window.1 {
        days.push(day);
        day += step;
    }
    days
}

/// Validate the pools' record histories and return the shared day sequence.
///
/// `histories` pairs each pool with its records inside the window, in
/// selection order. The reference must match the window day for day. Records
/// on or after a pool's closure day are ignored for the other pools, which
/// are only expected to match the window before closing.
pub fn aligned_dates(
    histories: &[(&Pool, Vec<DailyPoolRecord>)],
    window: (NaiveDate, NaiveDate),
) -> Result<Vec<NaiveDate>, SimulationError> {
    let Some((reference, reference_records)) = histories.first() else {
        return Err(SimulationError::NoPools);
    };

    let dates = window_days(window);
    check_sequence(
        &reference.address,
        dates.iter().copied(),
        reference_records.iter().map(|r| r.date),
    )?;

    for (pool, records) in histories.iter().skip(1) {
        let expected = dates.iter().copied().filter(|d| !pool.is_closed_on(*d));
        let found = records
            .iter()
            .map(|r| r.date)
            .filter(|d| !pool.is_closed_on(*d));

        check_sequence(&pool.address, expected, found)?;
    }

    Ok(dates)
}

fn check_sequence(
    pool: &str,
    expected: impl Iterator<Item = NaiveDate>,
    found: impl Iterator<Item = NaiveDate>,
) -> Result<(), SimulationError> {
    let mut expected = expected.fuse();
    let mut found = found.fuse();
    let mut index = 0;

    loop {
        match (expected.next(), found.next()) {
            (None, None) => return Ok(()),
            (e, f) if e == f => index += 1,
            (e, f) => {
                return Err(SimulationError::DateAlignment {
                    pool: pool.to_string(),
                    index,
                    expected: e,
                    found: f,
                })
            }
        }
    }
}
