//! On-storage layout.
//!
//! ```text
//! 0                CONFIG_RECORD_SIZE                                      capacity
//! | ConfigRecord   | SampleRecord | SampleRecord | ... | erased ...        |
//! ```
//!
//! All integers are stored little endian. Sample records are densely packed, the first slot
//! whose tag isn't [`RECORD_MARKER`] terminates the log.

use core::fmt::{Debug, Formatter};
use core::mem::size_of;

/// Marks a slot as holding a written sample record.
pub const RECORD_MARKER: u8 = b'V';

/// Value every byte of the record region holds after a clear.
pub const ERASE_VALUE: u8 = 0x00;

pub const CONFIG_RECORD_SIZE: usize = size_of::<u32>() + size_of::<u32>();
pub const SAMPLE_RECORD_SIZE: usize = size_of::<u8>() + size_of::<i16>() + size_of::<i16>();

/// Offset of the first sample record.
pub const RECORD_REGION_START: usize = CONFIG_RECORD_SIZE;

const _: () = assert!(CONFIG_RECORD_SIZE == 8, "config record layout changed");
const _: () = assert!(SAMPLE_RECORD_SIZE == 5, "sample record layout changed");
const _: () = assert!(
    RECORD_MARKER != ERASE_VALUE,
    "an erased slot must never look like a written record"
);

/// Bytes of the configuration record exactly as they are found at offset 0.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) struct ConfigRecord {
    pub(crate) millivolts_per_unit: u32,
    pub(crate) sleep_cycles: u32,
}

impl ConfigRecord {
    pub(crate) fn from_bytes(raw: &[u8; CONFIG_RECORD_SIZE]) -> Self {
        let [a, b, c, d, e, f, g, h] = *raw;
        Self {
            millivolts_per_unit: u32::from_le_bytes([a, b, c, d]),
            sleep_cycles: u32::from_le_bytes([e, f, g, h]),
        }
    }

    pub(crate) fn to_bytes(self) -> [u8; CONFIG_RECORD_SIZE] {
        let mut raw = [0u8; CONFIG_RECORD_SIZE];
        raw[..4].copy_from_slice(&self.millivolts_per_unit.to_le_bytes());
        raw[4..].copy_from_slice(&self.sleep_cycles.to_le_bytes());
        raw
    }
}

impl Debug for ConfigRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!(
            "ConfigRecord {{ millivolts_per_unit: {}, sleep_cycles: {} }}",
            self.millivolts_per_unit, self.sleep_cycles
        ))
    }
}

/// One logged observation: the two raw readings as captured, without calibration applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleRecord {
    pub reading_a: i16,
    pub reading_b: i16,
}

impl SampleRecord {
    pub const fn new(reading_a: i16, reading_b: i16) -> Self {
        Self {
            reading_a,
            reading_b,
        }
    }

    pub(crate) fn to_bytes(self) -> [u8; SAMPLE_RECORD_SIZE] {
        let [a0, a1] = self.reading_a.to_le_bytes();
        let [b0, b1] = self.reading_b.to_le_bytes();
        [RECORD_MARKER, a0, a1, b0, b1]
    }

    /// Returns `None` for a slot whose tag is not the marker, i.e. the end of the log.
    pub(crate) fn from_bytes(raw: &[u8; SAMPLE_RECORD_SIZE]) -> Option<Self> {
        match *raw {
            [RECORD_MARKER, a0, a1, b0, b1] => Some(Self {
                reading_a: i16::from_le_bytes([a0, a1]),
                reading_b: i16::from_le_bytes([b0, b1]),
            }),
            _ => None,
        }
    }
}
