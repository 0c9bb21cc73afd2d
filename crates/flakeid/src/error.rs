/// A result type defaulting to the crate's [`enum@Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Which node identifier was rejected at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdentifierField {
    Datacenter,
    Machine,
}

impl core::fmt::Display for IdentifierField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Datacenter => f.write_str("datacenter_id"),
            Self::Machine => f.write_str("machine_id"),
        }
    }
}

/// All error variants that `flakeid` can emit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A datacenter or machine identifier fell outside `0..=31`.
    ///
    /// Only produced at construction. The generator is never created, so the
    /// caller has to rebuild it with valid identifiers.
    #[error("{field} must be in 0..={max}, got {value}")]
    InvalidIdentifierRange {
        field: IdentifierField,
        value: i64,
        max: u64,
    },

    /// The clock reported a millisecond earlier than the one used for the
    /// previously issued ID.
    ///
    /// Transient: no state was mutated and a later call succeeds once the
    /// clock has caught up with `last`.
    #[error("clock moved backwards: now {now}ms < last issued {last}ms")]
    ClockRollback { now: u64, last: u64 },

    /// The clock is before the generator epoch, or far enough past it that
    /// the offset no longer fits the 41-bit timestamp field.
    #[error("timestamp {now}ms is not representable relative to epoch {epoch}ms")]
    TimestampOutOfRange { now: u64, epoch: u64 },

    /// A thread panicked while holding the generator lock.
    ///
    /// `parking_lot` mutexes do not poison, so this variant only exists when
    /// the `parking-lot` feature is disabled.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
