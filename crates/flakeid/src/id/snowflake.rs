use core::fmt;

/// A packed 64-bit identifier with datacenter and machine fields.
///
/// - 1 bit reserved (sign, always zero)
/// - 41 bits timestamp (ms since the generator epoch)
/// - 5 bits datacenter ID
/// - 5 bits machine ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63        63 62            22 21             17 16          12 11             0
///              +-----------+----------------+-----------------+--------------+---------------+
///  Field:      | sign (1)  | timestamp (41) | datacenter (5)  | machine (5)  | sequence (12) |
///              +-----------+----------------+-----------------+--------------+---------------+
///              |<------------------- MSB ---------- 64 bits ---------- LSB ------------------>|
/// ```
///
/// The 41-bit timestamp covers roughly 69 years past the epoch. Ordering on
/// the raw value orders IDs by time first, then by node, then by sequence.
///
/// # Example
///
/// ```
/// use flakeid::SnowflakeId;
///
/// let id = SnowflakeId::from_components(1000, 2, 3, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.datacenter_id(), 2);
/// assert_eq!(id.machine_id(), 3);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(SnowflakeId::from_raw(id.to_raw()), id);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Width of the timestamp field.
    pub const TIMESTAMP_BITS: u32 = 41;
    /// Width of the datacenter ID field.
    pub const DATACENTER_ID_BITS: u32 = 5;
    /// Width of the machine ID field.
    pub const MACHINE_ID_BITS: u32 = 5;
    /// Width of the sequence field.
    pub const SEQUENCE_BITS: u32 = 12;

    /// Bitmask for the 41-bit timestamp field. Occupies bits 22 through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Bitmask for the 5-bit datacenter ID field. Occupies bits 17 through
    /// 21.
    pub const DATACENTER_ID_MASK: u64 = (1 << Self::DATACENTER_ID_BITS) - 1;

    /// Bitmask for the 5-bit machine ID field. Occupies bits 12 through 16.
    pub const MACHINE_ID_MASK: u64 = (1 << Self::MACHINE_ID_BITS) - 1;

    /// Bitmask for the 12-bit sequence field. Occupies bits 0 through 11.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Shift placing the sequence at bit 0.
    pub const SEQUENCE_SHIFT: u32 = 0;

    /// Shift placing the machine ID at bit 12.
    pub const MACHINE_ID_SHIFT: u32 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;

    /// Shift placing the datacenter ID at bit 17.
    pub const DATACENTER_ID_SHIFT: u32 = Self::MACHINE_ID_SHIFT + Self::MACHINE_ID_BITS;

    /// Shift placing the timestamp at bit 22.
    pub const TIMESTAMP_SHIFT: u32 = Self::DATACENTER_ID_SHIFT + Self::DATACENTER_ID_BITS;

    /// Packs the four fields into an ID.
    ///
    /// Each component is masked to its field width, so out-of-range values
    /// never bleed into neighbouring fields or the sign bit.
    pub const fn from_components(
        timestamp: u64,
        datacenter_id: u64,
        machine_id: u64,
        sequence: u64,
    ) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let datacenter_id =
            (datacenter_id & Self::DATACENTER_ID_MASK) << Self::DATACENTER_ID_SHIFT;
        let machine_id = (machine_id & Self::MACHINE_ID_MASK) << Self::MACHINE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | datacenter_id | machine_id | sequence,
        }
    }

    /// Extracts the timestamp offset (ms since the generator epoch).
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the datacenter ID.
    pub const fn datacenter_id(&self) -> u64 {
        (self.id >> Self::DATACENTER_ID_SHIFT) & Self::DATACENTER_ID_MASK
    }

    /// Extracts the machine ID.
    pub const fn machine_id(&self) -> u64 {
        (self.id >> Self::MACHINE_ID_SHIFT) & Self::MACHINE_ID_MASK
    }

    /// Extracts the sequence number.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    pub const fn max_datacenter_id() -> u64 {
        Self::DATACENTER_ID_MASK
    }

    pub const fn max_machine_id() -> u64 {
        Self::MACHINE_ID_MASK
    }

    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// Reconstructs the absolute wall-clock time of this ID, in milliseconds
    /// since the Unix epoch, given the epoch of the generator that minted it.
    pub const fn unix_millis(&self, epoch: u64) -> u64 {
        epoch + self.timestamp()
    }

    /// Returns the raw packed value.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Wraps a raw packed value.
    ///
    /// The sign bit is not checked; use [`SnowflakeId::try_from_i64`] when the
    /// value comes from a signed column.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the ID as a signed integer.
    ///
    /// The sign bit is never set by the generator, so the value is always
    /// non-negative and converts losslessly.
    pub const fn to_i64(&self) -> i64 {
        (self.id & !(1 << 63)) as i64
    }

    /// Wraps a signed value, returning `None` if the sign bit is set.
    pub const fn try_from_i64(raw: i64) -> Option<Self> {
        if raw < 0 {
            None
        } else {
            Some(Self::from_raw(raw as u64))
        }
    }

    /// Returns the ID as a zero-padded 20-digit string so that lexical and
    /// numeric order agree.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl From<SnowflakeId> for i64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_i64()
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp())
            .field("datacenter_id", &self.datacenter_id())
            .field("machine_id", &self.machine_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_shift_table() {
        assert_eq!(SnowflakeId::SEQUENCE_SHIFT, 0);
        assert_eq!(SnowflakeId::MACHINE_ID_SHIFT, 12);
        assert_eq!(SnowflakeId::DATACENTER_ID_SHIFT, 17);
        assert_eq!(SnowflakeId::TIMESTAMP_SHIFT, 22);
        assert_eq!(
            SnowflakeId::TIMESTAMP_SHIFT + SnowflakeId::TIMESTAMP_BITS,
            63,
            "top bit is reserved for the sign"
        );
    }

    #[test]
    fn fields_and_bounds() {
        let ts = SnowflakeId::max_timestamp();
        let dc = SnowflakeId::max_datacenter_id();
        let mid = SnowflakeId::max_machine_id();
        let seq = SnowflakeId::max_sequence();

        assert_eq!(dc, 31);
        assert_eq!(mid, 31);
        assert_eq!(seq, 4095);

        let id = SnowflakeId::from_components(ts, dc, mid, seq);
        assert_eq!(id.timestamp(), ts);
        assert_eq!(id.datacenter_id(), dc);
        assert_eq!(id.machine_id(), mid);
        assert_eq!(id.sequence(), seq);
        assert_eq!(id.to_raw(), i64::MAX as u64);
        assert_eq!(id.to_i64(), i64::MAX);
    }

    #[test]
    fn packs_like_shift_formula() {
        let (ts, dc, mid, seq) = (123_456_789_u64, 2_u64, 3_u64, 77_u64);
        let expected = (ts << 22) | (dc << 17) | (mid << 12) | seq;
        let id = SnowflakeId::from_components(ts, dc, mid, seq);
        assert_eq!(id.to_raw(), expected);
    }

    #[test]
    fn oversized_components_do_not_bleed() {
        let id = SnowflakeId::from_components(0, 32, 32, 4096);
        assert_eq!(id.to_raw(), 0);

        let id = SnowflakeId::from_components(1 << 41, 0, 0, 0);
        assert_eq!(id.to_raw(), 0);
    }

    #[test]
    fn ordering_follows_timestamp_then_sequence() {
        let a = SnowflakeId::from_components(10, 31, 31, 4095);
        let b = SnowflakeId::from_components(11, 0, 0, 0);
        let c = SnowflakeId::from_components(11, 0, 0, 1);
        assert!(a < b && b < c);
        assert!(a.to_padded_string() < b.to_padded_string());
    }

    #[test]
    fn signed_conversions() {
        let id = SnowflakeId::from_components(42, 1, 2, 3);
        assert_eq!(SnowflakeId::try_from_i64(id.to_i64()), Some(id));
        assert_eq!(SnowflakeId::try_from_i64(-1), None);
        assert_eq!(i64::from(id), id.to_i64());
        assert_eq!(u64::from(id), id.to_raw());
    }

    #[test]
    fn unix_millis_adds_epoch() {
        let id = SnowflakeId::from_components(500, 0, 0, 0);
        assert_eq!(id.unix_millis(crate::DEFAULT_EPOCH), crate::DEFAULT_EPOCH + 500);
    }

    #[test]
    fn padded_string_is_twenty_digits() {
        let id = SnowflakeId::from_raw(42);
        assert_eq!(id.to_padded_string(), "00000000000000000042");
        assert_eq!(id.to_string(), "42");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_is_transparent() {
        let id = SnowflakeId::from_components(7, 1, 1, 9);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, id.to_raw().to_string());
        let back: SnowflakeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
