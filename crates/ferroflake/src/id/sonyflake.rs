use core::fmt;

use super::{Decomposed, decompose, encode};

/// Number of bits holding elapsed time units since the epoch.
pub const TIME_UNIT_BITS: u32 = 39;

/// Number of bits holding the per-tick sequence counter.
pub const SEQUENCE_BITS: u32 = 8;

/// Number of bits holding the machine ID.
pub const MACHINE_ID_BITS: u32 = 16;

/// A 63-bit Sonyflake-style ID.
///
/// - 1 bit reserved (always zero)
/// - 39 bits time unit (ticks since the epoch, 10 ms by default)
/// - 8 bits sequence
/// - 16 bits machine ID
///
/// ```text
///  Bit Index:  63           63 62            24 23            16 15              0
///              +--------------+----------------+----------------+-----------------+
///  Field:      | reserved (1) | time unit (39) |  sequence (8)  | machine ID (16) |
///              +--------------+----------------+----------------+-----------------+
///              |<----------- MSB ----------- 64 bits ----------- LSB ------------>|
/// ```
///
/// Ordering on the raw value orders first by time unit, then by sequence, so
/// IDs from one generator compare in issue order.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SonyflakeId {
    id: u64,
}

impl SonyflakeId {
    /// Bitmask for the 39-bit time unit field, before shifting.
    pub const TIME_UNIT_MASK: u64 = (1 << TIME_UNIT_BITS) - 1;

    /// Bitmask for the 8-bit sequence field, before shifting.
    pub const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

    /// Bitmask for the 16-bit machine ID field.
    pub const MACHINE_ID_MASK: u64 = (1 << MACHINE_ID_BITS) - 1;

    /// Time unit occupies bits 24 through 62.
    pub const TIME_UNIT_SHIFT: u32 = SEQUENCE_BITS + MACHINE_ID_BITS;

    /// Sequence occupies bits 16 through 23.
    pub const SEQUENCE_SHIFT: u32 = MACHINE_ID_BITS;

    /// Machine ID occupies bits 0 through 15.
    pub const MACHINE_ID_SHIFT: u32 = 0;

    /// Packs the three components into an ID. Out of range inputs are
    /// truncated to their field width.
    pub const fn from(time_unit: u64, sequence: u64, machine_id: u16) -> Self {
        Self {
            id: encode(time_unit, sequence, machine_id),
        }
    }

    /// Same as [`SonyflakeId::from`], with debug assertions on each field.
    pub fn from_components(time_unit: u64, sequence: u64, machine_id: u16) -> Self {
        debug_assert!(time_unit <= Self::TIME_UNIT_MASK, "time unit overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self::from(time_unit, sequence, machine_id)
    }

    /// Extracts the time unit.
    pub const fn time_unit(&self) -> u64 {
        (self.id >> Self::TIME_UNIT_SHIFT) & Self::TIME_UNIT_MASK
    }

    /// Extracts the sequence number.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Extracts the machine ID.
    pub const fn machine_id(&self) -> u16 {
        ((self.id >> Self::MACHINE_ID_SHIFT) & Self::MACHINE_ID_MASK) as u16
    }

    /// Largest time unit the 39-bit field can hold.
    pub const fn max_time_unit() -> u64 {
        Self::TIME_UNIT_MASK
    }

    /// Largest sequence number within one time unit.
    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// Largest machine ID.
    pub const fn max_machine_id() -> u16 {
        Self::MACHINE_ID_MASK as u16
    }

    /// Returns true if the sequence can still be incremented within the
    /// current time unit.
    pub const fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::SEQUENCE_MASK
    }

    /// Returns the ID that follows this one within the same time unit.
    pub fn increment_sequence(&self) -> Self {
        Self::from_components(self.time_unit(), self.sequence() + 1, self.machine_id())
    }

    /// Returns the first ID of a newer time unit.
    pub fn rollover_to_time_unit(&self, time_unit: u64) -> Self {
        Self::from_components(time_unit, 0, self.machine_id())
    }

    /// Returns the packed `u64`.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Wraps a packed `u64` without validation.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Projects the ID into its components.
    pub const fn decompose(&self) -> Decomposed {
        decompose(self.id)
    }
}

impl From<SonyflakeId> for u64 {
    fn from(id: SonyflakeId) -> Self {
        id.id
    }
}

impl fmt::Display for SonyflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SonyflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SonyflakeId")
            .field("id", &format_args!("0x{:016x} ({})", self.id, self.id))
            .field("time_unit", &self.time_unit())
            .field("sequence", &self.sequence())
            .field("machine_id", &self.machine_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_and_bounds() {
        let ts = SonyflakeId::max_time_unit();
        let seq = SonyflakeId::max_sequence();
        let mid = SonyflakeId::max_machine_id();

        let id = SonyflakeId::from(ts, seq, mid);
        assert_eq!(id.time_unit(), ts);
        assert_eq!(id.sequence(), seq);
        assert_eq!(id.machine_id(), mid);
        assert_eq!(SonyflakeId::from_components(ts, seq, mid), id);
        // reserved top bit stays clear
        assert_eq!(id.to_raw() >> 63, 0);
        assert_eq!(id.to_raw(), (1 << 63) - 1);
    }

    #[test]
    fn layout_widths_fill_63_bits() {
        assert_eq!(TIME_UNIT_BITS + SEQUENCE_BITS + MACHINE_ID_BITS, 63);
        assert_eq!(SonyflakeId::TIME_UNIT_SHIFT, 24);
        assert_eq!(SonyflakeId::SEQUENCE_SHIFT, 16);
    }

    #[test]
    fn orders_by_time_unit_then_sequence() {
        let a = SonyflakeId::from(10, SonyflakeId::max_sequence(), 0xffff);
        let b = SonyflakeId::from(11, 0, 0);
        let c = SonyflakeId::from(11, 1, 0);
        assert!(a < b && b < c);
    }

    #[test]
    fn increment_and_rollover() {
        let id = SonyflakeId::from(5, 3, 42);
        let next = id.increment_sequence();
        assert_eq!((next.time_unit(), next.sequence(), next.machine_id()), (5, 4, 42));

        let rolled = next.rollover_to_time_unit(9);
        assert_eq!((rolled.time_unit(), rolled.sequence(), rolled.machine_id()), (9, 0, 42));

        assert!(!SonyflakeId::from(5, SonyflakeId::max_sequence(), 42).has_sequence_room());
    }

    #[test]
    fn display_is_decimal_raw() {
        let id = SonyflakeId::from_raw(1_234_567_890);
        assert_eq!(id.to_string(), "1234567890");
        assert_eq!(u64::from(id), 1_234_567_890);
    }

    #[test]
    #[should_panic(expected = "time unit overflow")]
    fn time_unit_overflow_panics() {
        SonyflakeId::from_components(SonyflakeId::max_time_unit() + 1, 0, 0);
    }

    #[test]
    #[should_panic(expected = "sequence overflow")]
    fn sequence_overflow_panics() {
        SonyflakeId::from_components(0, SonyflakeId::max_sequence() + 1, 0);
    }
}
