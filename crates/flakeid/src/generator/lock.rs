use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::{Error, IdentifierField, Result},
    generator::{IdGenStatus, Mutex, MutexGuard},
    id::SnowflakeId,
    time::{DEFAULT_EPOCH, SystemClock, TimeSource},
};

/// Mutable generator state guarded by the generator lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct State {
    /// Wall-clock millisecond of the last issued ID, `None` until the first.
    pub(crate) last_timestamp: Option<u64>,
    pub(crate) sequence: u64,
}

/// A lock-based ID generator bound to one `(datacenter_id, machine_id)` pair.
///
/// The state lives in an [`Arc<Mutex<_>>`]; clones share it, so a generator
/// can be handed to many threads and still issue every ID exactly once. The
/// whole of [`Generator::next_id`] runs inside the lock, including the spin
/// that waits out an exhausted millisecond.
///
/// Uniqueness across processes requires every process to use a distinct
/// `(datacenter_id, machine_id)` pair. The generator does not check that.
///
/// State is not persisted. A process restarted while its clock is behind the
/// last ID it issued before the restart will not notice the rollback.
///
/// # Example
///
/// ```
/// use flakeid::Generator;
///
/// let generator = Generator::new(3, 7).unwrap();
/// let a = generator.next_id().unwrap();
/// let b = generator.next_id().unwrap();
/// assert!(a < b);
/// ```
#[derive(Clone, Debug)]
pub struct Generator<T = SystemClock>
where
    T: TimeSource,
{
    datacenter_id: u64,
    machine_id: u64,
    epoch: u64,
    #[cfg(feature = "cache-padded")]
    pub(crate) state: Arc<crossbeam_utils::CachePadded<Mutex<State>>>,
    #[cfg(not(feature = "cache-padded"))]
    pub(crate) state: Arc<Mutex<State>>,
    time: T,
}

impl Generator<SystemClock> {
    /// Creates a generator on the system wall clock with [`DEFAULT_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifierRange`] if either identifier is
    /// greater than 31.
    pub fn new(datacenter_id: u64, machine_id: u64) -> Result<Self> {
        Self::with_clock(datacenter_id, machine_id, SystemClock)
    }
}

impl<T> Generator<T>
where
    T: TimeSource,
{
    /// Creates a generator reading time from `time`, using [`DEFAULT_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifierRange`] if either identifier is
    /// greater than 31.
    pub fn with_clock(datacenter_id: u64, machine_id: u64, time: T) -> Result<Self> {
        Self::with_epoch(datacenter_id, machine_id, DEFAULT_EPOCH, time)
    }

    /// Creates a generator with an explicit epoch, in milliseconds since the
    /// Unix epoch.
    ///
    /// The epoch fixes the 69-year window in which IDs can be minted; it must
    /// stay the same for the lifetime of the ID space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifierRange`] if either identifier is
    /// greater than 31.
    pub fn with_epoch(datacenter_id: u64, machine_id: u64, epoch: u64, time: T) -> Result<Self> {
        let datacenter_id = check_identifier(
            IdentifierField::Datacenter,
            i64::try_from(datacenter_id).unwrap_or(i64::MAX),
        )?;
        let machine_id = check_identifier(
            IdentifierField::Machine,
            i64::try_from(machine_id).unwrap_or(i64::MAX),
        )?;
        Ok(Self {
            datacenter_id,
            machine_id,
            epoch,
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(
                State::default(),
            ))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(State::default())),
            time,
        })
    }

    pub fn datacenter_id(&self) -> u64 {
        self.datacenter_id
    }

    pub fn machine_id(&self) -> u64 {
        self.machine_id
    }

    /// The epoch all timestamp offsets are relative to.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Generates the next ID, spinning if the current millisecond is
    /// exhausted.
    ///
    /// The clock is read while holding the lock, so concurrent callers observe
    /// a single linear order of `(timestamp, sequence)` pairs. When all 4096
    /// sequence values of a millisecond are used up, the call busy-waits
    /// *with the lock held* until the clock ticks forward. That normally takes
    /// well under a millisecond; releasing the lock instead would let other
    /// callers into the exhausted millisecond.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRollback`] if the clock reads earlier than the last
    ///   issued timestamp. No state is changed; retrying after the clock has
    ///   caught up succeeds.
    /// - [`Error::TimestampOutOfRange`] if the clock is before the epoch or
    ///   past the 41-bit window.
    /// - [`Error::LockPoisoned`] if another thread panicked inside the lock
    ///   (only without the `parking-lot` feature).
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "trace",
            skip(self),
            fields(datacenter_id = self.datacenter_id, machine_id = self.machine_id)
        )
    )]
    pub fn next_id(&self) -> Result<SnowflakeId> {
        let mut state = self.lock()?;
        let mut now = self.time.current_millis();

        let sequence = match state.last_timestamp {
            Some(last) if now < last => return Err(Self::cold_clock_rollback(now, last)),
            Some(last) if now == last => {
                let next = (state.sequence + 1) & SnowflakeId::SEQUENCE_MASK;
                if next == 0 {
                    now = self.spin_until_after(last);
                }
                next
            }
            _ => 0,
        };

        self.commit(&mut state, now, sequence)
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// Behaves like [`Generator::next_id`] except that an exhausted millisecond
    /// returns [`IdGenStatus::Pending`] instead of spinning. A pending result
    /// leaves the state untouched.
    ///
    /// # Errors
    ///
    /// Same as [`Generator::next_id`].
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "trace",
            skip(self),
            fields(datacenter_id = self.datacenter_id, machine_id = self.machine_id)
        )
    )]
    pub fn poll_id(&self) -> Result<IdGenStatus> {
        let mut state = self.lock()?;
        let now = self.time.current_millis();

        let sequence = match state.last_timestamp {
            Some(last) if now < last => return Err(Self::cold_clock_rollback(now, last)),
            Some(last) if now == last => {
                if state.sequence < SnowflakeId::max_sequence() {
                    state.sequence + 1
                } else {
                    return Ok(IdGenStatus::Pending {
                        yield_until: last + 1,
                    });
                }
            }
            _ => 0,
        };

        let id = self.commit(&mut state, now, sequence)?;
        Ok(IdGenStatus::Ready { id })
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, State>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    /// Packs the ID and only then records `now`/`sequence`, so a rejected
    /// timestamp leaves the state as it was.
    fn commit(&self, state: &mut State, now: u64, sequence: u64) -> Result<SnowflakeId> {
        let offset = self.offset(now)?;
        state.last_timestamp = Some(now);
        state.sequence = sequence;
        Ok(SnowflakeId::from_components(
            offset,
            self.datacenter_id,
            self.machine_id,
            sequence,
        ))
    }

    fn offset(&self, now: u64) -> Result<u64> {
        match now.checked_sub(self.epoch) {
            Some(offset) if offset <= SnowflakeId::max_timestamp() => Ok(offset),
            _ => Err(self.cold_out_of_range(now)),
        }
    }

    /// Re-reads the clock until it moves past `last`.
    fn spin_until_after(&self, last: u64) -> u64 {
        #[cfg(feature = "tracing")]
        tracing::debug!(last, "sequence exhausted, spinning for next millisecond");

        loop {
            let now = self.time.current_millis();
            if now > last {
                return now;
            }
            core::hint::spin_loop();
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_rollback(now: u64, last: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, last, behind_ms = last - now, "clock moved backwards");

        Error::ClockRollback { now, last }
    }

    #[cold]
    #[inline(never)]
    fn cold_out_of_range(&self, now: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::error!(now, epoch = self.epoch, "timestamp outside the 41-bit window");

        Error::TimestampOutOfRange {
            now,
            epoch: self.epoch,
        }
    }
}

/// Validates a datacenter or machine identifier against the 5-bit field.
pub(crate) fn check_identifier(field: IdentifierField, value: i64) -> Result<u64> {
    let max = match field {
        IdentifierField::Datacenter => SnowflakeId::max_datacenter_id(),
        IdentifierField::Machine => SnowflakeId::max_machine_id(),
    };
    match u64::try_from(value) {
        Ok(v) if v <= max => Ok(v),
        _ => Err(Error::InvalidIdentifierRange { field, value, max }),
    }
}
