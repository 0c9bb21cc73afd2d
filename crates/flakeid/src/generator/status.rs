use crate::SnowflakeId;

/// Represents the result of a non-blocking attempt to generate an ID.
///
/// This type models the outcome of [`Generator::poll_id`]:
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means all 4096 sequence values of the current
///   millisecond are spent and the caller should back off until the clock
///   reaches `yield_until`.
///
/// # Example
///
/// ```
/// use flakeid::{Generator, IdGenStatus};
///
/// let generator = Generator::new(1, 1).unwrap();
/// let id = loop {
///     match generator.poll_id().unwrap() {
///         IdGenStatus::Ready { id } => break id,
///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
///     }
/// };
/// assert_eq!(id.machine_id(), 1);
/// ```
///
/// [`Generator::poll_id`]: crate::Generator::poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: SnowflakeId,
    },
    /// The sequence for the current millisecond is exhausted.
    Pending {
        /// The earliest wall-clock millisecond (since the Unix epoch) at which
        /// generation can resume.
        yield_until: u64,
    },
}
