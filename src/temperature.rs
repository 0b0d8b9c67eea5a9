//! Temperature register codec (11h-12h).
//!
//! The MSB is the signed integer part; the top two bits of the LSB add
//! quarter degrees. Together they form a 10-bit two's complement value, so
//! `{0xFF, 0xC0}` is -1 + 0.75 = -0.25 °C.

use crate::registers::{TemperatureFraction, TEMPERATURE_LEN};

/// Decoded temperature.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureReading {
    /// Signed integer part, taken straight from the MSB
    pub integer: i8,
    /// Hundredths added to `integer`: 0, 25, 50 or 75
    pub fraction: u8,
}

impl TemperatureReading {
    /// Temperature in hundredths of a degree Celsius.
    #[must_use]
    pub fn centi_degrees(&self) -> i16 {
        i16::from(self.integer) * 100 + i16::from(self.fraction)
    }

    /// Temperature in degrees Celsius.
    #[cfg(feature = "temperature_f32")]
    #[must_use]
    pub fn to_f32(&self) -> f32 {
        f32::from(self.integer) + f32::from(self.fraction) / 100.0
    }
}

#[must_use]
pub fn decode_temperature(bytes: [u8; TEMPERATURE_LEN]) -> TemperatureReading {
    TemperatureReading {
        integer: bytes[0] as i8,
        fraction: TemperatureFraction(bytes[1]).quarters() * 25,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_degree_scaling() {
        let reading = decode_temperature([0x17, 0b0100_0000]);
        assert_eq!(reading.integer, 23);
        assert_eq!(reading.fraction, 25);
        assert_eq!(reading.centi_degrees(), 2325);

        let reading = decode_temperature([0x19, 0b1000_0000]);
        assert_eq!(reading.fraction, 50);
    }

    #[test]
    fn test_negative_temperature() {
        let reading = decode_temperature([0xFF, 0b1100_0000]);
        assert_eq!(reading.integer, -1);
        assert_eq!(reading.fraction, 75);
        assert_eq!(reading.centi_degrees(), -25);

        let reading = decode_temperature([0x80, 0x00]);
        assert_eq!(reading.integer, -128);
        assert_eq!(reading.centi_degrees(), -12800);
    }

    #[test]
    fn test_low_bits_of_lsb_are_ignored() {
        assert_eq!(
            decode_temperature([0x05, 0x3F]),
            TemperatureReading {
                integer: 5,
                fraction: 0
            }
        );
    }

    #[cfg(feature = "temperature_f32")]
    #[test]
    fn test_to_f32() {
        let reading = decode_temperature([0x17, 0b0100_0000]);
        assert!((reading.to_f32() - 23.25).abs() < f32::EPSILON);

        let reading = decode_temperature([0xFF, 0b1100_0000]);
        assert!((reading.to_f32() + 0.25).abs() < f32::EPSILON);
    }
}
