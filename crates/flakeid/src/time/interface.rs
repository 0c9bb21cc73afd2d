use std::sync::Arc;

/// Default generator epoch: Sunday, October 20, 2019 01:00:32 UTC.
///
/// With a 41-bit offset field, IDs remain representable until roughly 2089.
pub const DEFAULT_EPOCH: u64 = 1_571_533_232_000;

/// A trait for wall-clock sources used by the generator.
///
/// Implementations return **milliseconds since the Unix epoch**. The
/// generator subtracts its own epoch, so a clock can be shared between
/// generators configured with different epochs.
///
/// Readings are allowed to go backwards (NTP steps, VM migration); the
/// generator detects that and reports [`Error::ClockRollback`].
///
/// # Example
///
/// ```
/// use flakeid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
///
/// [`Error::ClockRollback`]: crate::Error::ClockRollback
pub trait TimeSource {
    /// Returns the current time in milliseconds since 1970-01-01 UTC.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
