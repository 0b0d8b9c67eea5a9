//! Register map and bitfield views for the DS3231.
//!
//! The device exposes a handful of contiguous register blocks. Each block has a
//! fixed address and a fixed length ([`RegisterBlock`]); the bytes of a block
//! are looked at through the typed bitfield wrappers defined here. Bits the
//! datasheet marks as unused have no accessor, so a register assembled from
//! `Default` and its setters always carries zero in those positions.

use bitfield::bitfield;

/// Number of bytes in the time block (seconds through year).
pub const TIME_LEN: usize = 7;
/// Number of bytes in the alarm 1 block (seconds through day/date).
pub const ALARM1_LEN: usize = 4;
/// Number of bytes in the alarm 2 block (minutes through day/date).
pub const ALARM2_LEN: usize = 3;
/// Number of bytes in the temperature block (MSB, LSB).
pub const TEMPERATURE_LEN: usize = 2;
/// Largest block the driver ever moves in one transaction.
pub const MAX_BLOCK_LEN: usize = TIME_LEN;

/// Contiguous register blocks of the DS3231 and where they live.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterBlock {
    /// Seconds, minutes, hours, day, date, month/century, year
    Time,
    /// Alarm 1 seconds, minutes, hours, day/date
    Alarm1,
    /// Alarm 2 minutes, hours, day/date
    Alarm2,
    /// Control register
    Control,
    /// Control/status register
    Status,
    /// Aging offset register
    AgingOffset,
    /// Temperature MSB and LSB
    Temperature,
}

impl RegisterBlock {
    /// First register address of the block.
    #[must_use]
    pub const fn address(self) -> u8 {
        match self {
            RegisterBlock::Time => 0x00,
            RegisterBlock::Alarm1 => 0x07,
            RegisterBlock::Alarm2 => 0x0B,
            RegisterBlock::Control => 0x0E,
            RegisterBlock::Status => 0x0F,
            RegisterBlock::AgingOffset => 0x10,
            RegisterBlock::Temperature => 0x11,
        }
    }

    /// Length of the block in bytes.
    #[must_use]
    pub const fn byte_len(self) -> usize {
        match self {
            RegisterBlock::Time => TIME_LEN,
            RegisterBlock::Alarm1 => ALARM1_LEN,
            RegisterBlock::Alarm2 => ALARM2_LEN,
            RegisterBlock::Temperature => TEMPERATURE_LEN,
            RegisterBlock::Control | RegisterBlock::Status | RegisterBlock::AgingOffset => 1,
        }
    }
}

/// Hour format selected by bit 6 of an hours register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// 24-hour format (0-23)
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl From<u8> for TimeRepresentation {
    fn from(v: u8) -> Self {
        if v & 0x01 == 0 {
            TimeRepresentation::TwentyFourHour
        } else {
            TimeRepresentation::TwelveHour
        }
    }
}
impl From<TimeRepresentation> for u8 {
    fn from(v: TimeRepresentation) -> Self {
        v as u8
    }
}

/// Oscillator state as controlled by the EOSC bit. The bit is inverted on the
/// device: a set bit means the oscillator stops when running on battery.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oscillator {
    /// Oscillator is running
    Enabled = 0,
    /// Oscillator is stopped
    Disabled = 1,
}
impl From<u8> for Oscillator {
    fn from(v: u8) -> Self {
        if v & 0x01 == 0 {
            Oscillator::Enabled
        } else {
            Oscillator::Disabled
        }
    }
}
impl From<Oscillator> for u8 {
    fn from(v: Oscillator) -> Self {
        v as u8
    }
}

/// Function of the INT/SQW pin (INTCN bit).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptControl {
    /// Output square wave on INT/SQW pin
    SquareWave = 0,
    /// Output interrupt signal on INT/SQW pin
    Interrupt = 1,
}
impl From<u8> for InterruptControl {
    fn from(v: u8) -> Self {
        if v & 0x01 == 0 {
            InterruptControl::SquareWave
        } else {
            InterruptControl::Interrupt
        }
    }
}
impl From<InterruptControl> for u8 {
    fn from(v: InterruptControl) -> Self {
        v as u8
    }
}

/// Rate select bits RS2:RS1.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareWaveFrequency {
    /// 1 Hz
    Hz1 = 0b00,
    /// 1.024 kHz
    Hz1024 = 0b01,
    /// 4.096 kHz
    Hz4096 = 0b10,
    /// 8.192 kHz
    Hz8192 = 0b11,
}
impl From<u8> for SquareWaveFrequency {
    fn from(v: u8) -> Self {
        match v & 0b11 {
            0b00 => SquareWaveFrequency::Hz1,
            0b01 => SquareWaveFrequency::Hz1024,
            0b10 => SquareWaveFrequency::Hz4096,
            _ => SquareWaveFrequency::Hz8192,
        }
    }
}
impl From<SquareWaveFrequency> for u8 {
    fn from(v: SquareWaveFrequency) -> Self {
        v as u8
    }
}

/// DY/DT bit of an alarm day/date register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DayDateSelect {
    /// Match against date of the month (1-31)
    Date = 0,
    /// Match against day of the week (1-7)
    Day = 1,
}
impl From<u8> for DayDateSelect {
    fn from(v: u8) -> Self {
        if v & 0x01 == 0 {
            DayDateSelect::Date
        } else {
            DayDateSelect::Day
        }
    }
}
impl From<DayDateSelect> for u8 {
    fn from(v: DayDateSelect) -> Self {
        v as u8
    }
}

// Generates the From<u8> and Into<u8> implementations for a register type
macro_rules! from_register_u8 {
    ($($typ:ident),+ $(,)?) => {
        $(
            impl From<u8> for $typ {
                fn from(v: u8) -> Self {
                    paste::paste!([< $typ >](v))
                }
            }
            impl From<$typ> for u8 {
                fn from(v: $typ) -> Self {
                    v.0
                }
            }
        )+
    };
}

bitfield! {
    /// Seconds register, 00h.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Seconds(u8);
    impl Debug;
    /// Clock halt on DS1307-style parts, unused on the DS3231
    pub clock_halt, set_clock_halt: 7;
    pub tens, set_tens: 6, 4;
    pub ones, set_ones: 3, 0;
}

bitfield! {
    /// Minutes register, 01h.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Minutes(u8);
    impl Debug;
    pub tens, set_tens: 6, 4;
    pub ones, set_ones: 3, 0;
}

bitfield! {
    /// Hours register, 02h.
    ///
    /// In 24-hour mode bits 5:4 together hold the tens digit (0-2). In
    /// 12-hour mode bit 5 is the PM flag and only bit 4 is a tens digit.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5, 5;
    pub ten_hours, set_ten_hours: 4, 4;
    pub ones, set_ones: 3, 0;
}

bitfield! {
    /// Day of week register, 03h.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Day(u8);
    impl Debug;
    pub day, set_day: 2, 0;
}

bitfield! {
    /// Date register, 04h.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Date(u8);
    impl Debug;
    pub tens, set_tens: 5, 4;
    pub ones, set_ones: 3, 0;
}

bitfield! {
    /// Month/century register, 05h.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Month(u8);
    impl Debug;
    pub century, set_century: 7;
    pub tens, set_tens: 4, 4;
    pub ones, set_ones: 3, 0;
}

bitfield! {
    /// Year register, 06h.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Year(u8);
    impl Debug;
    pub tens, set_tens: 7, 4;
    pub ones, set_ones: 3, 0;
}

bitfield! {
    /// Control register, 0Eh.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control(u8);
    impl Debug;
    pub from into Oscillator, oscillator, set_oscillator: 7, 7;
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    pub convert_temperature, set_convert_temperature: 5;
    pub from into SquareWaveFrequency, square_wave_frequency, set_square_wave_frequency: 4, 3;
    pub from into InterruptControl, interrupt_control, set_interrupt_control: 2, 2;
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}

bitfield! {
    /// Control/status register, 0Fh. Bits 6:4 are unused.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    pub enable_32khz_output, set_enable_32khz_output: 3;
    pub busy, set_busy: 2;
    pub alarm2_flag, set_alarm2_flag: 1;
    pub alarm1_flag, set_alarm1_flag: 0;
}

bitfield! {
    /// Temperature LSB, 12h. Only the top two bits carry data.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct TemperatureFraction(u8);
    impl Debug;
    pub quarters, set_quarters: 7, 6;
}

bitfield! {
    /// Alarm 1 seconds register, 07h.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmSeconds(u8);
    impl Debug;
    /// A1M1
    pub mask, set_mask: 7;
    pub tens, set_tens: 6, 4;
    pub ones, set_ones: 3, 0;
}

bitfield! {
    /// Alarm minutes register, 08h (alarm 1) or 0Bh (alarm 2).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmMinutes(u8);
    impl Debug;
    /// A1M2 / A2M2
    pub mask, set_mask: 7;
    pub tens, set_tens: 6, 4;
    pub ones, set_ones: 3, 0;
}

bitfield! {
    /// Alarm hours register, 09h (alarm 1) or 0Ch (alarm 2).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmHours(u8);
    impl Debug;
    /// A1M3 / A2M3
    pub mask, set_mask: 7;
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5, 5;
    pub ten_hours, set_ten_hours: 4, 4;
    pub ones, set_ones: 3, 0;
}

bitfield! {
    /// Alarm day/date register, 0Ah (alarm 1) or 0Dh (alarm 2).
    ///
    /// With DY/DT set the low nibble is a day of week and the tens bits are
    /// unused.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmDayDate(u8);
    impl Debug;
    /// A1M4 / A2M4
    pub mask, set_mask: 7;
    pub from into DayDateSelect, day_date_select, set_day_date_select: 6, 6;
    pub tens, set_tens: 5, 4;
    pub ones, set_ones: 3, 0;
}

from_register_u8!(
    Seconds,
    Minutes,
    Hours,
    Day,
    Date,
    Month,
    Year,
    Control,
    Status,
    TemperatureFraction,
    AlarmSeconds,
    AlarmMinutes,
    AlarmHours,
    AlarmDayDate,
);
