use super::{MACHINE_ID_BITS, SEQUENCE_BITS, SonyflakeId};

/// The components of an ID, as reported to clients.
///
/// Serializes as `{"id", "timeUnit", "sequence", "machineID"}`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decomposed {
    pub id: u64,
    #[cfg_attr(feature = "serde", serde(rename = "timeUnit"))]
    pub time_unit: u64,
    pub sequence: u64,
    #[cfg_attr(feature = "serde", serde(rename = "machineID"))]
    pub machine_id: u16,
}

/// Packs `(time_unit, sequence, machine_id)` into a raw ID.
///
/// Each input is masked to its field width first.
pub const fn encode(time_unit: u64, sequence: u64, machine_id: u16) -> u64 {
    let time_unit = time_unit & SonyflakeId::TIME_UNIT_MASK;
    let sequence = sequence & SonyflakeId::SEQUENCE_MASK;
    (time_unit << (SEQUENCE_BITS + MACHINE_ID_BITS))
        | (sequence << MACHINE_ID_BITS)
        | machine_id as u64
}

/// Splits a raw ID back into its components. Inverse of [`encode`] for
/// in-range inputs.
pub const fn decompose(id: u64) -> Decomposed {
    Decomposed {
        id,
        time_unit: (id >> (SEQUENCE_BITS + MACHINE_ID_BITS)) & SonyflakeId::TIME_UNIT_MASK,
        sequence: (id >> MACHINE_ID_BITS) & SonyflakeId::SEQUENCE_MASK,
        machine_id: (id & SonyflakeId::MACHINE_ID_MASK) as u16,
    }
}
