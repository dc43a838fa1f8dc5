//! Data codeword assembly: headers, payload, terminator and pad bytes.

use crate::capacity::{CapacityEntry, ECLevel, Version};
use crate::segment::{BitBuffer, Mode, Segment};

/// Parameters chosen for one symbol.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EncodingPlan {
    pub mode: Mode,
    pub version: Version,
    pub ec_level: ECLevel,
    /// Width of the character-count indicator at this version.
    pub char_count_bits: u8,
}

impl EncodingPlan {
    pub fn new(mode: Mode, entry: &CapacityEntry) -> Self {
        Self {
            mode,
            version: entry.version,
            ec_level: entry.ec_level,
            char_count_bits: mode.num_char_count_bits(entry.version),
        }
    }

    pub fn capacity(&self) -> &'static CapacityEntry {
        CapacityEntry::get(self.version, self.ec_level)
    }
}

/// Builds exactly `capacity.data_codewords()` bytes for `segment`.
///
/// # Panics
///
/// Panics if the segment does not fit the plan's capacity; version selection
/// guarantees it does.
pub fn assemble(plan: &EncodingPlan, segment: &Segment) -> Vec<u8> {
    let datacapacitybits = plan.capacity().data_bits;
    let mut bb = BitBuffer::with_capacity(datacapacitybits);
    bb.append_bits(plan.mode.mode_bits(), 4);
    let numchars = u32::try_from(segment.num_chars()).unwrap_or(u32::MAX);
    bb.append_bits(numchars, plan.char_count_bits);
    bb.extend(segment.bits());
    assert!(bb.len() <= datacapacitybits, "Segment exceeds planned capacity");

    // Add terminator and pad up to a byte if applicable
    let numzerobits = (datacapacitybits - bb.len()).min(4);
    bb.append_bits(0, numzerobits as u8);
    let numzerobits = bb.len().wrapping_neg() & 7;
    bb.append_bits(0, numzerobits as u8);
    debug_assert_eq!(bb.len() % 8, 0);

    // Pad with alternating bytes until data capacity is reached
    for &padbyte in [0xec, 0x11].iter().cycle() {
        if bb.len() >= datacapacitybits {
            break;
        }
        bb.append_bits(padbyte, 8);
    }
    debug_assert_eq!(bb.len(), datacapacitybits);
    bb.into_bytes()
}
