#![cfg_attr(not(test), no_std)]
//! DS3231 real-time clock driver with a clock synchronisation engine.
//!
//! The crate is split in two halves:
//!
//! * a pure register codec ([`datetime`], [`control`], [`temperature`],
//!   [`alarm`]) translating between register images and typed values, and
//! * the [`DS3231`] engine, which moves those images over a [`RegisterBus`]
//!   and gates time reads on the oscillator state.
//!
//! ```rust,ignore
//! use ds3231_sync::{DS3231, TimeRead, DEFAULT_ADDRESS};
//!
//! let mut rtc = DS3231::new(i2c, DEFAULT_ADDRESS);
//! rtc.setup()?;
//! if let TimeRead::Time(now) = rtc.poll()? {
//!     // push `now` into the host clock
//! }
//! ```
//!
//! # Features
//!
//! * `async` adds [`asynch::DS3231`] over `embedded-hal-async`
//! * `log` / `defmt` route the internal logging to the matching crate
//! * `temperature_f32` adds [`TemperatureReading::to_f32`]

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        #[allow(unused_macros)]
        macro_rules! debug { ($($arg:tt)*) => { ::defmt::debug!($($arg)*) }; }
        #[allow(unused_macros)]
        macro_rules! info { ($($arg:tt)*) => { ::defmt::info!($($arg)*) }; }
        #[allow(unused_macros)]
        macro_rules! warn { ($($arg:tt)*) => { ::defmt::warn!($($arg)*) }; }
        #[allow(unused_macros)]
        macro_rules! error { ($($arg:tt)*) => { ::defmt::error!($($arg)*) }; }
    } else if #[cfg(feature = "log")] {
        #[allow(unused_macros)]
        macro_rules! debug { ($($arg:tt)*) => { ::log::debug!($($arg)*) }; }
        #[allow(unused_macros)]
        macro_rules! info { ($($arg:tt)*) => { ::log::info!($($arg)*) }; }
        #[allow(unused_macros)]
        macro_rules! warn { ($($arg:tt)*) => { ::log::warn!($($arg)*) }; }
        #[allow(unused_macros)]
        macro_rules! error { ($($arg:tt)*) => { ::log::error!($($arg)*) }; }
    } else {
        // Logging disabled: evaluate nothing but keep the arguments "used"
        #[allow(unused_macros)]
        macro_rules! debug { ($($arg:expr),* $(,)?) => {{ $( let _ = &$arg; )* }}; }
        #[allow(unused_macros)]
        macro_rules! info { ($($arg:expr),* $(,)?) => {{ $( let _ = &$arg; )* }}; }
        #[allow(unused_macros)]
        macro_rules! warn { ($($arg:expr),* $(,)?) => {{ $( let _ = &$arg; )* }}; }
        #[allow(unused_macros)]
        macro_rules! error { ($($arg:expr),* $(,)?) => {{ $( let _ = &$arg; )* }}; }
    }
}

pub mod alarm;
#[cfg(feature = "async")]
pub mod asynch;
pub mod bus;
pub mod control;
pub mod datetime;
pub mod registers;
pub mod temperature;

use embedded_hal::i2c::I2c;

pub use alarm::{decode_alarm, encode_alarm, AlarmImage, AlarmMask, AlarmSelect, AlarmSpec};
pub use bus::{I2cBus, RegisterBus, DEFAULT_ADDRESS};
pub use control::{decode_control, decode_status, encode_control, ControlFlags, StatusFlags};
pub use datetime::{
    clock_halted, decode_time, encode_time, CodecError, Field, OscillatorFlag, TimeSource,
    WallClockReading,
};
pub use registers::RegisterBlock;
pub use temperature::{decode_temperature, TemperatureReading};

use registers::{ALARM1_LEN, ALARM2_LEN, TEMPERATURE_LEN, TIME_LEN};

/// Errors returned by the driver.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DS3231Error<E> {
    /// The bus transaction failed
    Transport(E),
    /// Register contents could not be decoded, or a value could not be encoded
    Codec(CodecError),
    /// The time source reported that it has no valid time
    InvalidTime,
}

impl<E> From<CodecError> for DS3231Error<E> {
    fn from(e: CodecError) -> Self {
        DS3231Error::Codec(e)
    }
}

/// Outcome of a time read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRead {
    /// The oscillator is running and the registers decoded to this time
    Time(WallClockReading),
    /// The oscillator is stopped, so the time registers were not trusted
    Suppressed,
}

impl TimeRead {
    #[must_use]
    pub fn time(self) -> Option<WallClockReading> {
        match self {
            TimeRead::Time(reading) => Some(reading),
            TimeRead::Suppressed => None,
        }
    }
}

/// Driver configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Where the oscillator state is read from
    pub oscillator_flag: OscillatorFlag,
    /// Control flags written by `setup`
    pub initial_control: ControlFlags,
}

/// Last register images successfully read from or written to the device.
///
/// Only used for diagnostics. A failed operation never touches it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMirror {
    pub time: Option<[u8; TIME_LEN]>,
    pub alarm1: Option<[u8; ALARM1_LEN]>,
    pub alarm2: Option<[u8; ALARM2_LEN]>,
    pub control: Option<u8>,
    pub status: Option<u8>,
    pub aging_offset: Option<u8>,
    pub temperature: Option<[u8; TEMPERATURE_LEN]>,
}

impl RegisterMirror {
    /// Records a completed time read. `control` is only present when the
    /// control register took part in it.
    pub(crate) fn store_time_read(&mut self, time: [u8; TIME_LEN], control: Option<u8>) {
        self.time = Some(time);
        if control.is_some() {
            self.control = control;
        }
    }

    pub(crate) fn store_alarm(&mut self, image: &AlarmImage) {
        match *image {
            AlarmImage::Alarm1(bytes) => self.alarm1 = Some(bytes),
            AlarmImage::Alarm2(bytes) => self.alarm2 = Some(bytes),
        }
    }
}

/// Turns the raw time block into a [`TimeRead`] once the oscillator state is
/// known.
pub(crate) fn finish_time_read(
    bytes: [u8; TIME_LEN],
    halted: bool,
) -> Result<TimeRead, CodecError> {
    if halted {
        warn!("DS3231: oscillator stopped, time registers not trusted");
        return Ok(TimeRead::Suppressed);
    }
    match decode_time(bytes) {
        Ok(reading) => {
            debug!("DS3231: time {:?}", reading);
            Ok(TimeRead::Time(reading))
        }
        Err(e) => {
            error!("DS3231: malformed time registers {:?}: {:?}", bytes, e);
            Err(e)
        }
    }
}

/// DS3231 clock driver.
///
/// Every operation takes `&mut self` and runs its bus transactions one after
/// the other. Nothing is retried.
pub struct DS3231<B> {
    bus: B,
    config: Config,
    mirror: RegisterMirror,
}

impl<I2C: I2c> DS3231<I2cBus<I2C>> {
    /// Creates a driver for the device at `address` with the default
    /// configuration.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self::with_bus(I2cBus::new(i2c, address), Config::default())
    }
}

impl<B: RegisterBus> DS3231<B> {
    /// Creates a driver on top of any [`RegisterBus`].
    pub fn with_bus(bus: B, config: Config) -> Self {
        Self {
            bus,
            config,
            mirror: RegisterMirror::default(),
        }
    }

    /// Configuration the driver was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Last register images that made it through a successful operation.
    pub fn mirror(&self) -> &RegisterMirror {
        &self.mirror
    }

    /// Consumes the driver and returns the bus.
    pub fn release(self) -> B {
        self.bus
    }

    fn read_block<const N: usize>(
        &mut self,
        block: RegisterBlock,
    ) -> Result<[u8; N], DS3231Error<B::Error>> {
        debug_assert_eq!(N, block.byte_len());
        let mut data = [0u8; N];
        if let Err(e) = self.bus.read(block.address(), &mut data) {
            error!("DS3231: failed to read {:?} registers", block);
            return Err(DS3231Error::Transport(e));
        }
        debug!("DS3231: read {:?}: {:?}", block, data);
        Ok(data)
    }

    fn write_block(
        &mut self,
        block: RegisterBlock,
        bytes: &[u8],
    ) -> Result<(), DS3231Error<B::Error>> {
        debug!("DS3231: write {:?}: {:?}", block, bytes);
        if let Err(e) = self.bus.write(block.address(), bytes) {
            error!("DS3231: failed to write {:?} registers", block);
            return Err(DS3231Error::Transport(e));
        }
        Ok(())
    }

    /// Writes the configured initial control flags, then reads the time once.
    pub fn setup(&mut self) -> Result<TimeRead, DS3231Error<B::Error>> {
        info!("DS3231: setting up");
        let flags = self.config.initial_control;
        self.write_control(&flags)?;
        self.read_time()
    }

    /// Periodic update hook. Same as [`DS3231::read_time`].
    pub fn poll(&mut self) -> Result<TimeRead, DS3231Error<B::Error>> {
        self.read_time()
    }

    /// Logs the bus address and configuration at info level.
    pub fn dump_config(&self) {
        info!("DS3231:");
        info!("  address: {:?}", self.bus.address());
        info!("  oscillator flag: {:?}", self.config.oscillator_flag);
        info!("  initial control: {:?}", self.config.initial_control);
    }

    /// Reads the time registers.
    ///
    /// Returns [`TimeRead::Suppressed`] when the oscillator is stopped. The
    /// control register is read fresh every time unless the time block itself
    /// carries the halt bit.
    pub fn read_time(&mut self) -> Result<TimeRead, DS3231Error<B::Error>> {
        let bytes: [u8; TIME_LEN] = self.read_block(RegisterBlock::Time)?;
        let control = match self.config.oscillator_flag {
            OscillatorFlag::ControlEosc => {
                let [byte] = self.read_block::<1>(RegisterBlock::Control)?;
                Some(byte)
            }
            OscillatorFlag::ClockHalt => None,
        };
        let halted = match control {
            Some(byte) => decode_control(byte).oscillator_stopped(),
            None => clock_halted(&bytes),
        };
        let outcome = finish_time_read(bytes, halted)?;
        self.mirror.store_time_read(bytes, control);
        Ok(outcome)
    }

    /// Writes `reading` as one block, always in 24-hour format.
    pub fn write_time(&mut self, reading: &WallClockReading) -> Result<(), DS3231Error<B::Error>> {
        let bytes = encode_time(reading).map_err(|e| {
            error!("DS3231: can't encode {:?}: {:?}", reading, e);
            e
        })?;
        self.write_block(RegisterBlock::Time, &bytes)?;
        self.mirror.time = Some(bytes);
        info!("DS3231: time set to {:?}", reading);
        Ok(())
    }

    /// Copies the time from `source` into the device.
    ///
    /// Nothing is written when the source has no valid time.
    pub fn write_time_from<S: TimeSource>(
        &mut self,
        source: &mut S,
    ) -> Result<(), DS3231Error<B::Error>> {
        let Some(reading) = source.now() else {
            error!("DS3231: system time is not valid, not writing");
            return Err(DS3231Error::InvalidTime);
        };
        self.write_time(&reading)
    }

    pub fn read_temperature(&mut self) -> Result<TemperatureReading, DS3231Error<B::Error>> {
        let bytes: [u8; TEMPERATURE_LEN] = self.read_block(RegisterBlock::Temperature)?;
        self.mirror.temperature = Some(bytes);
        let reading = decode_temperature(bytes);
        debug!("DS3231: temperature {:?}", reading);
        Ok(reading)
    }

    pub fn read_control(&mut self) -> Result<ControlFlags, DS3231Error<B::Error>> {
        let [byte] = self.read_block::<1>(RegisterBlock::Control)?;
        self.mirror.control = Some(byte);
        Ok(decode_control(byte))
    }

    pub fn write_control(&mut self, flags: &ControlFlags) -> Result<(), DS3231Error<B::Error>> {
        let byte = encode_control(flags);
        self.write_block(RegisterBlock::Control, &[byte])?;
        self.mirror.control = Some(byte);
        Ok(())
    }

    pub fn read_status(&mut self) -> Result<StatusFlags, DS3231Error<B::Error>> {
        let [byte] = self.read_block::<1>(RegisterBlock::Status)?;
        self.mirror.status = Some(byte);
        Ok(decode_status(byte))
    }

    /// Reads the signed aging offset trim.
    pub fn read_aging_offset(&mut self) -> Result<i8, DS3231Error<B::Error>> {
        let [byte] = self.read_block::<1>(RegisterBlock::AgingOffset)?;
        self.mirror.aging_offset = Some(byte);
        Ok(byte as i8)
    }

    pub fn write_aging_offset(&mut self, offset: i8) -> Result<(), DS3231Error<B::Error>> {
        let byte = offset as u8;
        self.write_block(RegisterBlock::AgingOffset, &[byte])?;
        self.mirror.aging_offset = Some(byte);
        Ok(())
    }

    pub fn read_alarm(&mut self, which: AlarmSelect) -> Result<AlarmSpec, DS3231Error<B::Error>> {
        let spec = match which {
            AlarmSelect::Alarm1 => {
                let bytes: [u8; ALARM1_LEN] = self.read_block(which.block())?;
                let spec = decode_alarm(&bytes, which)?;
                self.mirror.alarm1 = Some(bytes);
                spec
            }
            AlarmSelect::Alarm2 => {
                let bytes: [u8; ALARM2_LEN] = self.read_block(which.block())?;
                let spec = decode_alarm(&bytes, which)?;
                self.mirror.alarm2 = Some(bytes);
                spec
            }
        };
        Ok(spec)
    }

    /// Encodes `spec` and writes it to the selected alarm block.
    pub fn write_alarm(
        &mut self,
        spec: &AlarmSpec,
        which: AlarmSelect,
    ) -> Result<(), DS3231Error<B::Error>> {
        let image = encode_alarm(spec, which).map_err(|e| {
            error!("DS3231: can't encode {:?}: {:?}", which, e);
            e
        })?;
        self.write_block(which.block(), image.as_bytes())?;
        self.mirror.store_alarm(&image);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{DayDateSelect, Oscillator};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = 0x68;
    // 2024-03-14 15:30:45, Thursday (5)
    const TIME_BYTES: [u8; TIME_LEN] = [0x45, 0x30, 0x15, 0x05, 0x14, 0x03, 0x24];

    fn reading() -> WallClockReading {
        WallClockReading {
            second: 45,
            minute: 30,
            hour: 15,
            weekday: 5,
            day: 14,
            month: 3,
            year: 2024,
        }
    }

    fn setup(expectations: &[I2cTrans]) -> DS3231<I2cBus<I2cMock>> {
        DS3231::new(I2cMock::new(expectations), DEVICE_ADDRESS)
    }

    fn setup_with(expectations: &[I2cTrans], config: Config) -> DS3231<I2cBus<I2cMock>> {
        DS3231::with_bus(I2cBus::new(I2cMock::new(expectations), DEVICE_ADDRESS), config)
    }

    fn finish(dev: DS3231<I2cBus<I2cMock>>) {
        dev.release().release().done();
    }

    fn time_read() -> I2cTrans {
        I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00], TIME_BYTES.to_vec())
    }

    fn control_read(byte: u8) -> I2cTrans {
        I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0E], vec![byte])
    }

    #[test]
    fn test_read_time_checks_control_after_time() {
        let mut dev = setup(&[time_read(), control_read(0x04)]);
        assert_eq!(dev.read_time().unwrap(), TimeRead::Time(reading()));
        assert_eq!(dev.mirror().time, Some(TIME_BYTES));
        assert_eq!(dev.mirror().control, Some(0x04));
        finish(dev);
    }

    #[test]
    fn test_read_time_suppressed_when_oscillator_stopped() {
        let mut dev = setup(&[time_read(), control_read(0x84)]);
        let outcome = dev.read_time().unwrap();
        assert_eq!(outcome, TimeRead::Suppressed);
        assert_eq!(outcome.time(), None);
        finish(dev);
    }

    #[test]
    fn test_suppressed_read_skips_decoding() {
        // Garbage in the time block does not matter while the oscillator is off
        let mut dev = setup(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00], vec![0xFF; 7]),
            control_read(0x80),
        ]);
        assert_eq!(dev.read_time().unwrap(), TimeRead::Suppressed);
        finish(dev);
    }

    #[test]
    fn test_read_time_is_never_cached() {
        let mut dev = setup(&[
            time_read(),
            control_read(0x04),
            time_read(),
            control_read(0x84),
        ]);
        assert!(matches!(dev.poll().unwrap(), TimeRead::Time(_)));
        assert_eq!(dev.poll().unwrap(), TimeRead::Suppressed);
        finish(dev);
    }

    #[test]
    fn test_clock_halt_flag_needs_no_control_read() {
        let config = Config {
            oscillator_flag: OscillatorFlag::ClockHalt,
            ..Config::default()
        };
        let mut halted = TIME_BYTES;
        halted[0] |= 0x80;
        let mut dev = setup_with(
            &[
                time_read(),
                I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00], halted.to_vec()),
            ],
            config,
        );
        assert_eq!(dev.read_time().unwrap(), TimeRead::Time(reading()));
        assert_eq!(dev.read_time().unwrap(), TimeRead::Suppressed);
        assert_eq!(dev.mirror().control, None);
        finish(dev);
    }

    #[test]
    fn test_read_time_malformed() {
        let mut bytes = TIME_BYTES;
        bytes[1] = 0x3A;
        let mut dev = setup(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00], bytes.to_vec()),
            control_read(0x04),
        ]);
        assert_eq!(
            dev.read_time(),
            Err(DS3231Error::Codec(CodecError::MalformedRegisterData(
                Field::Minute
            )))
        );
        finish(dev);
    }

    #[test]
    fn test_read_time_transport_failure_stops_sequence() {
        let mut dev = setup(&[time_read().with_error(ErrorKind::Other)]);
        assert_eq!(
            dev.read_time(),
            Err(DS3231Error::Transport(ErrorKind::Other))
        );
        assert_eq!(*dev.mirror(), RegisterMirror::default());
        finish(dev);
    }

    #[test]
    fn test_control_failure_leaves_time_mirror() {
        let mut dev = setup(&[
            time_read(),
            control_read(0x04),
            time_read(),
            control_read(0x04).with_error(ErrorKind::Other),
        ]);
        dev.read_time().unwrap();
        let before = *dev.mirror();
        assert!(dev.read_time().is_err());
        assert_eq!(*dev.mirror(), before);
        finish(dev);
    }

    #[test]
    fn test_malformed_time_leaves_mirror() {
        let mut bytes = TIME_BYTES;
        bytes[1] = 0x3A;
        let mut dev = setup(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00], bytes.to_vec()),
            control_read(0x04),
        ]);
        assert!(matches!(dev.read_time(), Err(DS3231Error::Codec(_))));
        assert_eq!(*dev.mirror(), RegisterMirror::default());
        finish(dev);
    }

    #[test]
    fn test_malformed_alarm_leaves_mirror() {
        let mut dev = setup(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x07], vec![0x0A, 0x00, 0x00, 0x01]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0B], vec![0x00, 0x24, 0x01]),
        ]);
        assert_eq!(
            dev.read_alarm(AlarmSelect::Alarm1),
            Err(DS3231Error::Codec(CodecError::MalformedRegisterData(
                Field::Second
            )))
        );
        assert!(dev.read_alarm(AlarmSelect::Alarm2).is_err());
        assert_eq!(dev.mirror().alarm1, None);
        assert_eq!(dev.mirror().alarm2, None);
        finish(dev);
    }

    #[test]
    fn test_write_time_single_block() {
        let mut frame = vec![0x00];
        frame.extend_from_slice(&TIME_BYTES);
        let mut dev = setup(&[I2cTrans::write(DEVICE_ADDRESS, frame)]);
        dev.write_time(&reading()).unwrap();
        assert_eq!(dev.mirror().time, Some(TIME_BYTES));
        finish(dev);
    }

    #[test]
    fn test_write_time_rejects_year_without_bus_traffic() {
        let mut dev = setup(&[]);
        let late = WallClockReading {
            year: 2100,
            ..reading()
        };
        assert_eq!(
            dev.write_time(&late),
            Err(DS3231Error::Codec(CodecError::YearOutOfRange(2100)))
        );
        assert_eq!(dev.mirror().time, None);
        finish(dev);
    }

    #[test]
    fn test_write_failure_leaves_mirror() {
        let mut frame = vec![0x00];
        frame.extend_from_slice(&TIME_BYTES);
        let mut dev =
            setup(&[I2cTrans::write(DEVICE_ADDRESS, frame).with_error(ErrorKind::Other)]);
        assert_eq!(
            dev.write_time(&reading()),
            Err(DS3231Error::Transport(ErrorKind::Other))
        );
        assert_eq!(dev.mirror().time, None);
        finish(dev);
    }

    #[test]
    fn test_write_time_from_invalid_source() {
        let mut dev = setup(&[]);
        let mut source = || -> Option<WallClockReading> { None };
        assert_eq!(
            dev.write_time_from(&mut source),
            Err(DS3231Error::InvalidTime)
        );
        finish(dev);
    }

    #[test]
    fn test_write_time_from_valid_source() {
        let mut frame = vec![0x00];
        frame.extend_from_slice(&TIME_BYTES);
        let mut dev = setup(&[I2cTrans::write(DEVICE_ADDRESS, frame)]);
        let mut calls = 0;
        let mut source = || -> Option<WallClockReading> {
            calls += 1;
            Some(reading())
        };
        dev.write_time_from(&mut source).unwrap();
        assert_eq!(calls, 1);
        finish(dev);
    }

    #[test]
    fn test_read_temperature() {
        let mut dev = setup(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![0x11],
            vec![0x17, 0x40],
        )]);
        let temperature = dev.read_temperature().unwrap();
        assert_eq!(temperature.integer, 23);
        assert_eq!(temperature.fraction, 25);
        assert_eq!(dev.mirror().temperature, Some([0x17, 0x40]));
        finish(dev);
    }

    #[test]
    fn test_setup_writes_control_then_reads_time() {
        let mut dev = setup(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, 0x04]),
            time_read(),
            control_read(0x04),
        ]);
        assert_eq!(dev.setup().unwrap(), TimeRead::Time(reading()));
        dev.dump_config();
        finish(dev);
    }

    #[test]
    fn test_setup_fails_on_control_write() {
        let mut dev = setup(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, 0x04]).with_error(ErrorKind::Other),
        ]);
        assert_eq!(dev.setup(), Err(DS3231Error::Transport(ErrorKind::Other)));
        finish(dev);
    }

    #[test]
    fn test_setup_uses_configured_flags() {
        let config = Config {
            initial_control: ControlFlags {
                oscillator: Oscillator::Disabled,
                ..ControlFlags::initial()
            },
            ..Config::default()
        };
        let mut dev = setup_with(
            &[
                I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, 0x84]),
                time_read(),
                control_read(0x84),
            ],
            config,
        );
        assert_eq!(dev.setup().unwrap(), TimeRead::Suppressed);
        finish(dev);
    }

    #[test]
    fn test_control_and_status() {
        let mut dev = setup(&[
            control_read(0x3C),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, 0x3C]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0F], vec![0x88]),
        ]);
        let flags = dev.read_control().unwrap();
        assert!(flags.convert_temperature);
        dev.write_control(&flags).unwrap();
        let status = dev.read_status().unwrap();
        assert!(status.oscillator_stop_flag);
        assert!(status.enable_32khz_output);
        assert_eq!(dev.mirror().status, Some(0x88));
        finish(dev);
    }

    #[test]
    fn test_aging_offset_is_signed() {
        let mut dev = setup(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x10], vec![0xFE]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x10, 0x05]),
        ]);
        assert_eq!(dev.read_aging_offset().unwrap(), -2);
        dev.write_aging_offset(5).unwrap();
        assert_eq!(dev.mirror().aging_offset, Some(0x05));
        finish(dev);
    }

    #[test]
    fn test_write_alarm_targets_selected_block() {
        let spec = AlarmSpec {
            second: 15,
            minute: 30,
            hour: 15,
            day_or_date: 14,
            day_date_select: DayDateSelect::Date,
            mask: AlarmMask::default(),
        };
        let mut dev = setup(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x07, 0x15, 0x30, 0x15, 0x14]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0B, 0x30, 0x15, 0x14]),
        ]);
        dev.write_alarm(&spec, AlarmSelect::Alarm1).unwrap();
        dev.write_alarm(&spec, AlarmSelect::Alarm2).unwrap();
        assert_eq!(dev.mirror().alarm1, Some([0x15, 0x30, 0x15, 0x14]));
        assert_eq!(dev.mirror().alarm2, Some([0x30, 0x15, 0x14]));
        finish(dev);
    }

    #[test]
    fn test_write_alarm_rejects_bad_field() {
        let mut dev = setup(&[]);
        let spec = AlarmSpec {
            hour: 24,
            ..AlarmSpec::default()
        };
        assert!(matches!(
            dev.write_alarm(&spec, AlarmSelect::Alarm2),
            Err(DS3231Error::Codec(_))
        ));
        finish(dev);
    }

    #[test]
    fn test_read_alarm() {
        let mut dev = setup(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x07], vec![0x80, 0x30, 0x15, 0x14]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0B], vec![0x45, 0x07, 0x43]),
        ]);
        let alarm1 = dev.read_alarm(AlarmSelect::Alarm1).unwrap();
        assert!(alarm1.mask.second);
        assert_eq!(alarm1.minute, 30);
        assert_eq!(alarm1.day_or_date, 14);

        let alarm2 = dev.read_alarm(AlarmSelect::Alarm2).unwrap();
        assert_eq!(alarm2.minute, 45);
        assert_eq!(alarm2.hour, 7);
        assert_eq!(alarm2.day_date_select, DayDateSelect::Day);
        assert_eq!(alarm2.day_or_date, 3);
        finish(dev);
    }
}
