use std::time::{SystemTime, UNIX_EPOCH};

use crate::time::TimeSource;

/// The system wall clock, read through [`SystemTime::now`].
///
/// Unlike a monotonic timer this clock follows external adjustments, which is
/// exactly what the generator's rollback check guards against. A reading
/// before 1970 is reported as `0`, which the generator rejects as out of
/// range for any non-zero epoch.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}
