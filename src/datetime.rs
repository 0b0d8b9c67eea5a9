//! Time block codec for the DS3231.
//!
//! The DS3231 stores the wall clock in 7 consecutive BCD registers (seconds,
//! minutes, hours, day, date, month/century, year). [`decode_time`] and
//! [`encode_time`] translate between that block and a [`WallClockReading`]
//! without touching the bus, so they can be tested and reused on their own.
//!
//! # Conventions
//!
//! - Hours are always written in 24-hour format; 12-hour values left on the
//!   device by someone else are still decoded correctly.
//! - The year is stored as two digits plus a century bit on top of a fixed
//!   base of 2000. Only 2000-2099 can be written.
//! - Bits the datasheet marks as unused are ignored when decoding and written
//!   as zero when encoding.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::registers::{
    Date, Day, Hours, Minutes, Month, Seconds, TimeRepresentation, Year, TIME_LEN,
};

/// Year represented by a zero year register with the century bit clear.
pub const BASE_YEAR: u16 = 2000;
/// Last year [`encode_time`] accepts.
pub const LAST_WRITABLE_YEAR: u16 = BASE_YEAR + 99;

/// Register field a codec error refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Second,
    Minute,
    Hour,
    Weekday,
    Day,
    Month,
    Year,
    /// Alarm day-of-week or date-of-month
    DayOrDate,
    /// The buffer length does not match the register block
    BlockLength,
}

/// Errors raised by the register codec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// A register held a BCD digit above 9 or a value outside the field's
    /// range. The whole block should be treated as untrustworthy.
    MalformedRegisterData(Field),
    /// The year cannot be stored in the 2000-2099 century.
    YearOutOfRange(i32),
    /// A value handed to an encoder is outside the field's range.
    FieldOutOfRange(Field),
}

/// A decoded wall clock value.
///
/// `hour` is always 0-23 and `weekday` is the device's raw 1-7 index
/// (1 = Sunday when produced from a `chrono` value).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallClockReading {
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    pub weekday: u8,
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

impl WallClockReading {
    /// Converts the reading into a `chrono` value. The weekday is not
    /// checked against the date.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::FieldOutOfRange`] if the fields do not form a
    /// real calendar date and time (for example 31 April).
    pub fn to_naive_datetime(&self) -> Result<NaiveDateTime, CodecError> {
        let date = NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .ok_or(CodecError::FieldOutOfRange(Field::Day))?;
        date.and_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )
        .ok_or(CodecError::FieldOutOfRange(Field::Hour))
    }
}

impl TryFrom<&NaiveDateTime> for WallClockReading {
    type Error = CodecError;

    fn try_from(datetime: &NaiveDateTime) -> Result<Self, Self::Error> {
        let narrow = |value: u32, field: Field| {
            u8::try_from(value).map_err(|_| CodecError::FieldOutOfRange(field))
        };
        Ok(WallClockReading {
            second: narrow(datetime.second(), Field::Second)?,
            minute: narrow(datetime.minute(), Field::Minute)?,
            hour: narrow(datetime.hour(), Field::Hour)?,
            weekday: narrow(datetime.weekday().number_from_sunday(), Field::Weekday)?,
            day: narrow(datetime.day(), Field::Day)?,
            month: narrow(datetime.month(), Field::Month)?,
            year: u16::try_from(datetime.year())
                .map_err(|_| CodecError::YearOutOfRange(datetime.year()))?,
        })
    }
}

/// Supplier of the authoritative current time.
pub trait TimeSource {
    /// The current time, or `None` when the source has no usable time yet.
    fn now(&mut self) -> Option<WallClockReading>;
}

impl<F> TimeSource for F
where
    F: FnMut() -> Option<WallClockReading>,
{
    fn now(&mut self) -> Option<WallClockReading> {
        self()
    }
}

/// Where a part reports that its oscillator is not running.
///
/// The DS3231 keeps this in the EOSC bit of the control register. DS1307-style
/// parts use the CH bit (bit 7) of the seconds register instead, which is an
/// unused bit on the DS3231.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OscillatorFlag {
    /// EOSC, bit 7 of the control register
    #[default]
    ControlEosc,
    /// CH, bit 7 of the seconds register
    ClockHalt,
}

/// Typed view over the 7-byte time block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimeRegisters {
    pub seconds: Seconds,
    pub minutes: Minutes,
    pub hours: Hours,
    pub day: Day,
    pub date: Date,
    pub month: Month,
    pub year: Year,
}

impl From<[u8; TIME_LEN]> for TimeRegisters {
    fn from(data: [u8; TIME_LEN]) -> Self {
        TimeRegisters {
            seconds: Seconds(data[0]),
            minutes: Minutes(data[1]),
            hours: Hours(data[2]),
            day: Day(data[3]),
            date: Date(data[4]),
            month: Month(data[5]),
            year: Year(data[6]),
        }
    }
}

impl From<TimeRegisters> for [u8; TIME_LEN] {
    fn from(raw: TimeRegisters) -> [u8; TIME_LEN] {
        [
            raw.seconds.0,
            raw.minutes.0,
            raw.hours.0,
            raw.day.0,
            raw.date.0,
            raw.month.0,
            raw.year.0,
        ]
    }
}

/// Combines two BCD digits, rejecting digits above 9 and values outside
/// `min..=max`.
pub(crate) fn decode_bcd(
    tens: u8,
    ones: u8,
    min: u8,
    max: u8,
    field: Field,
) -> Result<u8, CodecError> {
    if tens > 9 || ones > 9 {
        return Err(CodecError::MalformedRegisterData(field));
    }
    let value = tens * 10 + ones;
    if !(min..=max).contains(&value) {
        return Err(CodecError::MalformedRegisterData(field));
    }
    Ok(value)
}

/// Splits `value` into `(tens, ones)` BCD digits.
pub(crate) fn make_bcd(value: u8, min: u8, max: u8, field: Field) -> Result<(u8, u8), CodecError> {
    if !(min..=max).contains(&value) {
        return Err(CodecError::FieldOutOfRange(field));
    }
    Ok((value / 10, value % 10))
}

/// Decodes the hour fields shared by the time and alarm hour registers into
/// 0-23.
pub(crate) fn decode_hours(
    representation: TimeRepresentation,
    pm_or_twenty_hours: u8,
    ten_hours: u8,
    ones: u8,
) -> Result<u8, CodecError> {
    if ones > 9 {
        return Err(CodecError::MalformedRegisterData(Field::Hour));
    }
    match representation {
        TimeRepresentation::TwentyFourHour => {
            let hour = 20 * pm_or_twenty_hours + 10 * ten_hours + ones;
            if hour > 23 {
                return Err(CodecError::MalformedRegisterData(Field::Hour));
            }
            Ok(hour)
        }
        TimeRepresentation::TwelveHour => {
            let hour = 10 * ten_hours + ones;
            if !(1..=12).contains(&hour) {
                return Err(CodecError::MalformedRegisterData(Field::Hour));
            }
            let is_pm = pm_or_twenty_hours != 0;
            Ok(match (hour, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, false) => h,
                (h, true) => h + 12,
            })
        }
    }
}

/// Splits a 0-23 hour into the 24-hour register fields
/// `(twenty_hours, ten_hours, ones)`.
pub(crate) fn make_hours(hour: u8) -> Result<(u8, u8, u8), CodecError> {
    if hour > 23 {
        return Err(CodecError::FieldOutOfRange(Field::Hour));
    }
    Ok((u8::from(hour >= 20), u8::from((10..20).contains(&hour)), hour % 10))
}

/// Decodes the raw time block.
///
/// # Errors
///
/// Returns [`CodecError::MalformedRegisterData`] if any BCD digit is above 9
/// or a decoded field is outside its range (including a weekday of 0).
pub fn decode_time(bytes: [u8; TIME_LEN]) -> Result<WallClockReading, CodecError> {
    let raw = TimeRegisters::from(bytes);

    let second = decode_bcd(raw.seconds.tens(), raw.seconds.ones(), 0, 59, Field::Second)?;
    let minute = decode_bcd(raw.minutes.tens(), raw.minutes.ones(), 0, 59, Field::Minute)?;
    let hour = decode_hours(
        raw.hours.time_representation(),
        raw.hours.pm_or_twenty_hours(),
        raw.hours.ten_hours(),
        raw.hours.ones(),
    )?;
    let weekday = raw.day.day();
    if !(1..=7).contains(&weekday) {
        return Err(CodecError::MalformedRegisterData(Field::Weekday));
    }
    let day = decode_bcd(raw.date.tens(), raw.date.ones(), 1, 31, Field::Day)?;
    let month = decode_bcd(raw.month.tens(), raw.month.ones(), 1, 12, Field::Month)?;
    let year_in_century = decode_bcd(raw.year.tens(), raw.year.ones(), 0, 99, Field::Year)?;
    let century_offset = if raw.month.century() { 100 } else { 0 };

    Ok(WallClockReading {
        second,
        minute,
        hour,
        weekday,
        day,
        month,
        year: BASE_YEAR + century_offset + u16::from(year_in_century),
    })
}

/// Encodes a reading into the raw time block, in 24-hour format with every
/// unused bit (including CH) cleared.
///
/// # Errors
///
/// Returns [`CodecError::YearOutOfRange`] for years outside 2000-2099 and
/// [`CodecError::FieldOutOfRange`] for any other field outside its range.
pub fn encode_time(reading: &WallClockReading) -> Result<[u8; TIME_LEN], CodecError> {
    if !(BASE_YEAR..=LAST_WRITABLE_YEAR).contains(&reading.year) {
        return Err(CodecError::YearOutOfRange(i32::from(reading.year)));
    }

    let seconds = {
        let (tens, ones) = make_bcd(reading.second, 0, 59, Field::Second)?;
        let mut value = Seconds::default();
        value.set_tens(tens);
        value.set_ones(ones);
        value
    };
    let minutes = {
        let (tens, ones) = make_bcd(reading.minute, 0, 59, Field::Minute)?;
        let mut value = Minutes::default();
        value.set_tens(tens);
        value.set_ones(ones);
        value
    };
    let hours = {
        let (twenty, ten, ones) = make_hours(reading.hour)?;
        let mut value = Hours::default();
        value.set_time_representation(TimeRepresentation::TwentyFourHour);
        value.set_pm_or_twenty_hours(twenty);
        value.set_ten_hours(ten);
        value.set_ones(ones);
        value
    };
    let day = {
        if !(1..=7).contains(&reading.weekday) {
            return Err(CodecError::FieldOutOfRange(Field::Weekday));
        }
        let mut value = Day::default();
        value.set_day(reading.weekday);
        value
    };
    let date = {
        let (tens, ones) = make_bcd(reading.day, 1, 31, Field::Day)?;
        let mut value = Date::default();
        value.set_tens(tens);
        value.set_ones(ones);
        value
    };
    let month = {
        let (tens, ones) = make_bcd(reading.month, 1, 12, Field::Month)?;
        let mut value = Month::default();
        value.set_tens(tens);
        value.set_ones(ones);
        value
    };
    let year = {
        let offset = u8::try_from(reading.year - BASE_YEAR)
            .map_err(|_| CodecError::YearOutOfRange(i32::from(reading.year)))?;
        let (tens, ones) = make_bcd(offset, 0, 99, Field::Year)?;
        let mut value = Year::default();
        value.set_tens(tens);
        value.set_ones(ones);
        value
    };

    Ok(TimeRegisters {
        seconds,
        minutes,
        hours,
        day,
        date,
        month,
        year,
    }
    .into())
}

/// Reports the CH bit of a raw time block (see [`OscillatorFlag::ClockHalt`]).
#[must_use]
pub fn clock_halted(bytes: &[u8; TIME_LEN]) -> bool {
    Seconds(bytes[0]).clock_halt()
}
