//! Alarm register codec for the DS3231.
//!
//! The two alarms do not share a layout. Alarm 1 is a 4-byte block at 07h
//! (seconds, minutes, hours, day/date); alarm 2 is a 3-byte block at 0Bh with
//! no seconds register at all, so its minutes byte sits where alarm 1 keeps
//! seconds. Each block has its own typed view ([`Alarm1Registers`],
//! [`Alarm2Registers`]) and the codec picks one from [`AlarmSelect`].
//!
//! Only the register layout is handled here. Deciding when an alarm fires,
//! enabling its interrupt and clearing its flag are left to the caller.
//!
//! # Masks
//!
//! Bit 7 of every alarm register is a mask bit (AxM1-AxM4). A set mask bit
//! excludes that field from the match. Masked fields are still encoded and
//! validated like unmasked ones.

use crate::datetime::{decode_bcd, decode_hours, make_bcd, make_hours, CodecError, Field};
use crate::registers::{
    AlarmDayDate, AlarmHours, AlarmMinutes, AlarmSeconds, DayDateSelect, RegisterBlock,
    TimeRepresentation, ALARM1_LEN, ALARM2_LEN,
};

/// Which of the two alarms a block belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmSelect {
    /// Alarm 1, with seconds
    Alarm1,
    /// Alarm 2, minute resolution
    Alarm2,
}

impl AlarmSelect {
    #[must_use]
    pub const fn block(self) -> RegisterBlock {
        match self {
            AlarmSelect::Alarm1 => RegisterBlock::Alarm1,
            AlarmSelect::Alarm2 => RegisterBlock::Alarm2,
        }
    }
}

/// The four alarm mask bits. A set bit means "don't care" for that field.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmMask {
    /// A1M1. Alarm 2 has no such bit.
    pub second: bool,
    /// AxM2
    pub minute: bool,
    /// AxM3
    pub hour: bool,
    /// AxM4
    pub day_date: bool,
}

/// Decoded alarm registers.
///
/// For alarm 2 `second` and `mask.second` do not exist on the device: they
/// decode as 0 / `false` and are ignored by the encoder.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmSpec {
    pub second: u8,
    pub minute: u8,
    /// 0-23
    pub hour: u8,
    /// Day of week (1-7) or date of month (1-31) depending on `day_date_select`
    pub day_or_date: u8,
    pub day_date_select: DayDateSelect,
    pub mask: AlarmMask,
}

impl Default for AlarmSpec {
    fn default() -> Self {
        AlarmSpec {
            second: 0,
            minute: 0,
            hour: 0,
            day_or_date: 1,
            day_date_select: DayDateSelect::Date,
            mask: AlarmMask::default(),
        }
    }
}

/// Typed view over the alarm 1 block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Alarm1Registers {
    pub seconds: AlarmSeconds,
    pub minutes: AlarmMinutes,
    pub hours: AlarmHours,
    pub day_date: AlarmDayDate,
}

impl From<[u8; ALARM1_LEN]> for Alarm1Registers {
    fn from(data: [u8; ALARM1_LEN]) -> Self {
        Alarm1Registers {
            seconds: AlarmSeconds(data[0]),
            minutes: AlarmMinutes(data[1]),
            hours: AlarmHours(data[2]),
            day_date: AlarmDayDate(data[3]),
        }
    }
}

impl From<Alarm1Registers> for [u8; ALARM1_LEN] {
    fn from(raw: Alarm1Registers) -> Self {
        [raw.seconds.0, raw.minutes.0, raw.hours.0, raw.day_date.0]
    }
}

/// Typed view over the alarm 2 block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Alarm2Registers {
    pub minutes: AlarmMinutes,
    pub hours: AlarmHours,
    pub day_date: AlarmDayDate,
}

impl From<[u8; ALARM2_LEN]> for Alarm2Registers {
    fn from(data: [u8; ALARM2_LEN]) -> Self {
        Alarm2Registers {
            minutes: AlarmMinutes(data[0]),
            hours: AlarmHours(data[1]),
            day_date: AlarmDayDate(data[2]),
        }
    }
}

impl From<Alarm2Registers> for [u8; ALARM2_LEN] {
    fn from(raw: Alarm2Registers) -> Self {
        [raw.minutes.0, raw.hours.0, raw.day_date.0]
    }
}

/// An encoded alarm block, ready to be written at its block address.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmImage {
    Alarm1([u8; ALARM1_LEN]),
    Alarm2([u8; ALARM2_LEN]),
}

impl AlarmImage {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AlarmImage::Alarm1(bytes) => &bytes[..],
            AlarmImage::Alarm2(bytes) => &bytes[..],
        }
    }

    #[must_use]
    pub fn select(&self) -> AlarmSelect {
        match self {
            AlarmImage::Alarm1(_) => AlarmSelect::Alarm1,
            AlarmImage::Alarm2(_) => AlarmSelect::Alarm2,
        }
    }
}

/// Fields present in both alarm blocks.
struct CommonFields {
    minute: u8,
    hour: u8,
    day_or_date: u8,
    day_date_select: DayDateSelect,
    minute_mask: bool,
    hour_mask: bool,
    day_date_mask: bool,
}

fn decode_common(
    minutes: AlarmMinutes,
    hours: AlarmHours,
    day_date: AlarmDayDate,
) -> Result<CommonFields, CodecError> {
    let minute = decode_bcd(minutes.tens(), minutes.ones(), 0, 59, Field::Minute)?;
    let hour = decode_hours(
        hours.time_representation(),
        hours.pm_or_twenty_hours(),
        hours.ten_hours(),
        hours.ones(),
    )?;
    let day_date_select = day_date.day_date_select();
    let day_or_date = match day_date_select {
        DayDateSelect::Day => {
            let day = day_date.ones();
            if !(1..=7).contains(&day) {
                return Err(CodecError::MalformedRegisterData(Field::DayOrDate));
            }
            day
        }
        DayDateSelect::Date => {
            decode_bcd(day_date.tens(), day_date.ones(), 1, 31, Field::DayOrDate)?
        }
    };
    Ok(CommonFields {
        minute,
        hour,
        day_or_date,
        day_date_select,
        minute_mask: minutes.mask(),
        hour_mask: hours.mask(),
        day_date_mask: day_date.mask(),
    })
}

fn encode_common(spec: &AlarmSpec) -> Result<(AlarmMinutes, AlarmHours, AlarmDayDate), CodecError> {
    let mut minutes = AlarmMinutes::default();
    let (tens, ones) = make_bcd(spec.minute, 0, 59, Field::Minute)?;
    minutes.set_mask(spec.mask.minute);
    minutes.set_tens(tens);
    minutes.set_ones(ones);

    let mut hours = AlarmHours::default();
    let (twenty, ten, ones) = make_hours(spec.hour)?;
    hours.set_mask(spec.mask.hour);
    hours.set_time_representation(TimeRepresentation::TwentyFourHour);
    hours.set_pm_or_twenty_hours(twenty);
    hours.set_ten_hours(ten);
    hours.set_ones(ones);

    let mut day_date = AlarmDayDate::default();
    day_date.set_mask(spec.mask.day_date);
    day_date.set_day_date_select(spec.day_date_select);
    match spec.day_date_select {
        DayDateSelect::Day => {
            if !(1..=7).contains(&spec.day_or_date) {
                return Err(CodecError::FieldOutOfRange(Field::DayOrDate));
            }
            day_date.set_ones(spec.day_or_date);
        }
        DayDateSelect::Date => {
            let (tens, ones) = make_bcd(spec.day_or_date, 1, 31, Field::DayOrDate)?;
            day_date.set_tens(tens);
            day_date.set_ones(ones);
        }
    }

    Ok((minutes, hours, day_date))
}

impl Alarm1Registers {
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedRegisterData`] for invalid BCD or
    /// out-of-range fields.
    pub fn decode(&self) -> Result<AlarmSpec, CodecError> {
        let second = decode_bcd(self.seconds.tens(), self.seconds.ones(), 0, 59, Field::Second)?;
        let common = decode_common(self.minutes, self.hours, self.day_date)?;
        Ok(AlarmSpec {
            second,
            minute: common.minute,
            hour: common.hour,
            day_or_date: common.day_or_date,
            day_date_select: common.day_date_select,
            mask: AlarmMask {
                second: self.seconds.mask(),
                minute: common.minute_mask,
                hour: common.hour_mask,
                day_date: common.day_date_mask,
            },
        })
    }

    /// # Errors
    ///
    /// Returns [`CodecError::FieldOutOfRange`] if a field is out of range.
    pub fn encode(spec: &AlarmSpec) -> Result<Self, CodecError> {
        let mut seconds = AlarmSeconds::default();
        let (tens, ones) = make_bcd(spec.second, 0, 59, Field::Second)?;
        seconds.set_mask(spec.mask.second);
        seconds.set_tens(tens);
        seconds.set_ones(ones);
        let (minutes, hours, day_date) = encode_common(spec)?;
        Ok(Alarm1Registers {
            seconds,
            minutes,
            hours,
            day_date,
        })
    }
}

impl Alarm2Registers {
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedRegisterData`] for invalid BCD or
    /// out-of-range fields.
    pub fn decode(&self) -> Result<AlarmSpec, CodecError> {
        let common = decode_common(self.minutes, self.hours, self.day_date)?;
        Ok(AlarmSpec {
            second: 0,
            minute: common.minute,
            hour: common.hour,
            day_or_date: common.day_or_date,
            day_date_select: common.day_date_select,
            mask: AlarmMask {
                second: false,
                minute: common.minute_mask,
                hour: common.hour_mask,
                day_date: common.day_date_mask,
            },
        })
    }

    /// Encodes everything but the seconds, which alarm 2 does not have.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::FieldOutOfRange`] if a field is out of range.
    pub fn encode(spec: &AlarmSpec) -> Result<Self, CodecError> {
        let (minutes, hours, day_date) = encode_common(spec)?;
        Ok(Alarm2Registers {
            minutes,
            hours,
            day_date,
        })
    }
}

/// Decodes an alarm block read from `which`'s address.
///
/// # Errors
///
/// Returns [`CodecError::MalformedRegisterData`] when `bytes` is not exactly
/// the length of the selected block, or when a field is invalid.
pub fn decode_alarm(bytes: &[u8], which: AlarmSelect) -> Result<AlarmSpec, CodecError> {
    let wrong_length = CodecError::MalformedRegisterData(Field::BlockLength);
    match which {
        AlarmSelect::Alarm1 => {
            let block: [u8; ALARM1_LEN] = bytes.try_into().map_err(|_| wrong_length)?;
            Alarm1Registers::from(block).decode()
        }
        AlarmSelect::Alarm2 => {
            let block: [u8; ALARM2_LEN] = bytes.try_into().map_err(|_| wrong_length)?;
            Alarm2Registers::from(block).decode()
        }
    }
}

/// Encodes `spec` into the block layout of `which`. Hours are always written
/// in 24-hour format.
///
/// # Errors
///
/// Returns [`CodecError::FieldOutOfRange`] if a field is out of range.
pub fn encode_alarm(spec: &AlarmSpec, which: AlarmSelect) -> Result<AlarmImage, CodecError> {
    Ok(match which {
        AlarmSelect::Alarm1 => AlarmImage::Alarm1(Alarm1Registers::encode(spec)?.into()),
        AlarmSelect::Alarm2 => AlarmImage::Alarm2(Alarm2Registers::encode(spec)?.into()),
    })
}
