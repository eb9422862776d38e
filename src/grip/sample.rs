use std::{fmt, str::FromStr};

use crate::gpio::MAX_DIGITAL_VAL;

/// Number of force sensors in the grip ball, one per finger.
pub const FINGER_COUNT: usize = 4;

/// One frame of raw finger readings, in pin order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GripSample([u16; FINGER_COUNT]);

#[derive(Debug, PartialEq, Eq)]
pub enum ParseSampleError {
    Empty,
    WrongFieldCount(usize),
    InvalidReading(String),
    OutOfRange(u32),
}

impl GripSample {
    pub const fn new(readings: [u16; FINGER_COUNT]) -> Self {
        GripSample(readings)
    }

    pub fn readings(&self) -> &[u16; FINGER_COUNT] {
        &self.0
    }

    pub fn any_at_or_above(&self, threshold: u16) -> bool {
        self.0.iter().any(|reading| *reading >= threshold)
    }
}

/// Wire encoding: decimal readings joined by commas, e.g. `120,340,0,4095`.
impl fmt::Display for GripSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (first, rest) = self.0.split_first().ok_or(fmt::Error)?;
        write!(f, "{first}")?;
        for reading in rest {
            write!(f, ",{reading}")?;
        }
        Ok(())
    }
}

impl FromStr for GripSample {
    type Err = ParseSampleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseSampleError::Empty);
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != FINGER_COUNT {
            return Err(ParseSampleError::WrongFieldCount(fields.len()));
        }

        let mut readings = [0u16; FINGER_COUNT];
        for (reading, field) in readings.iter_mut().zip(fields) {
            let value: u32 = field
                .parse()
                .map_err(|_| ParseSampleError::InvalidReading(field.to_string()))?;
            if value > MAX_DIGITAL_VAL as u32 {
                return Err(ParseSampleError::OutOfRange(value));
            }
            *reading = value as u16;
        }
        Ok(GripSample(readings))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test0_readings_are_joined_by_commas() {
        let sample = GripSample::new([120, 340, 0, 4095]);
        assert_eq!(sample.to_string(), "120,340,0,4095");
    }

    #[test]
    fn test1_encoding_has_no_leading_or_trailing_comma() {
        let text = GripSample::new([0, 0, 0, 0]).to_string();
        assert_eq!(text, "0,0,0,0");
        assert!(!text.starts_with(',') && !text.ends_with(','));
        assert_eq!(text.matches(',').count(), FINGER_COUNT - 1);
    }

    #[test]
    fn test2_parses_a_received_line() {
        let sample: GripSample = " 1500, 2147,2473 ,2659\n".parse().unwrap();
        assert_eq!(sample.readings(), &[1500, 2147, 2473, 2659]);
    }

    #[test]
    fn test3_rejects_malformed_lines() {
        assert_eq!("".parse::<GripSample>(), Err(ParseSampleError::Empty));
        assert_eq!("  \r\n".parse::<GripSample>(), Err(ParseSampleError::Empty));
        assert_eq!(
            "1,2,3".parse::<GripSample>(),
            Err(ParseSampleError::WrongFieldCount(3))
        );
        assert_eq!(
            "1,2,3,4,".parse::<GripSample>(),
            Err(ParseSampleError::WrongFieldCount(5))
        );
        assert_eq!(
            "1,two,3,4".parse::<GripSample>(),
            Err(ParseSampleError::InvalidReading("two".to_string()))
        );
        assert_eq!(
            "1,-2,3,4".parse::<GripSample>(),
            Err(ParseSampleError::InvalidReading("-2".to_string()))
        );
        assert_eq!(
            "1,2,3,4096".parse::<GripSample>(),
            Err(ParseSampleError::OutOfRange(4096))
        );
    }

    #[test]
    fn test4_threshold_is_inclusive() {
        let sample = GripSample::new([10, 1999, 2000, 5]);
        assert!(sample.any_at_or_above(2000));
        assert!(!sample.any_at_or_above(2001));
    }
}
