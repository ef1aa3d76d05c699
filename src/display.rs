use crate::raw::SampleRecord;
use core::fmt;

/// A sample scaled by the calibration factor, as it is shown to the user.
///
/// Computed in `i64`: the product of an `i16` reading and a `u32` factor always fits, so there
/// is neither rounding nor overflow.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibrated {
    pub a: i64,
    pub b: i64,
}

impl Calibrated {
    pub fn project(record: SampleRecord, millivolts_per_unit: u32) -> Self {
        Self {
            a: scale(record.reading_a, millivolts_per_unit),
            b: scale(record.reading_b, millivolts_per_unit),
        }
    }
}

pub(crate) fn scale(reading: i16, millivolts_per_unit: u32) -> i64 {
    i64::from(reading) * i64::from(millivolts_per_unit)
}

/// Renders as `a,b`, the format of a dump line.
impl fmt::Display for Calibrated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.a, self.b)
    }
}
