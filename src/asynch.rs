//! Async variant of the DS3231 driver.
//!
//! Offers the same operations as [`crate::DS3231`] as `async fn`s over
//! `embedded-hal-async`. Only available with the `async` feature.
//!
//! ```rust,ignore
//! use ds3231_sync::asynch::DS3231;
//!
//! let mut rtc = DS3231::new(i2c, 0x68);
//! rtc.setup().await?;
//! let temperature = rtc.read_temperature().await?;
//! ```

use embedded_hal_async::i2c::I2c;

use crate::alarm::{decode_alarm, encode_alarm, AlarmSelect, AlarmSpec};
use crate::bus::{write_frame, I2cBus};
use crate::control::{decode_control, decode_status, encode_control, ControlFlags, StatusFlags};
use crate::datetime::{clock_halted, encode_time, OscillatorFlag, TimeSource, WallClockReading};
use crate::registers::{RegisterBlock, ALARM1_LEN, ALARM2_LEN, TEMPERATURE_LEN, TIME_LEN};
use crate::temperature::{decode_temperature, TemperatureReading};
use crate::{finish_time_read, Config, DS3231Error, RegisterMirror, TimeRead};

/// Async counterpart of [`crate::RegisterBus`].
#[allow(async_fn_in_trait)]
pub trait AsyncRegisterBus {
    type Error: core::fmt::Debug;

    async fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Same contract as [`crate::RegisterBus::write`]: one transaction of at
    /// most [`crate::registers::MAX_BLOCK_LEN`] bytes.
    async fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error>;

    fn address(&self) -> Option<u8> {
        None
    }
}

impl<I2C: I2c> AsyncRegisterBus for I2cBus<I2C> {
    type Error = I2C::Error;

    async fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[address], buffer).await
    }

    async fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        let (frame, len) = write_frame(address, bytes);
        self.i2c.write(self.address, &frame[..len]).await
    }

    fn address(&self) -> Option<u8> {
        Some(self.address)
    }
}

/// DS3231 clock driver, async flavour.
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

impl<B: AsyncRegisterBus> DS3231<B> {
    /// Creates a driver on top of any [`AsyncRegisterBus`].
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

    async fn read_block<const N: usize>(
        &mut self,
        block: RegisterBlock,
    ) -> Result<[u8; N], DS3231Error<B::Error>> {
        debug_assert_eq!(N, block.byte_len());
        let mut data = [0u8; N];
        if let Err(e) = self.bus.read(block.address(), &mut data).await {
            error!("DS3231: failed to read {:?} registers", block);
            return Err(DS3231Error::Transport(e));
        }
        debug!("DS3231: read {:?}: {:?}", block, data);
        Ok(data)
    }

    async fn write_block(
        &mut self,
        block: RegisterBlock,
        bytes: &[u8],
    ) -> Result<(), DS3231Error<B::Error>> {
        debug!("DS3231: write {:?}: {:?}", block, bytes);
        if let Err(e) = self.bus.write(block.address(), bytes).await {
            error!("DS3231: failed to write {:?} registers", block);
            return Err(DS3231Error::Transport(e));
        }
        Ok(())
    }

    /// Writes the configured initial control flags, then reads the time once.
    pub async fn setup(&mut self) -> Result<TimeRead, DS3231Error<B::Error>> {
        info!("DS3231: setting up");
        let flags = self.config.initial_control;
        self.write_control(&flags).await?;
        self.read_time().await
    }

    /// Periodic update hook. Same as [`DS3231::read_time`].
    pub async fn poll(&mut self) -> Result<TimeRead, DS3231Error<B::Error>> {
        self.read_time().await
    }

    /// Logs the bus address and configuration at info level.
    pub fn dump_config(&self) {
        info!("DS3231 (async):");
        info!("  address: {:?}", self.bus.address());
        info!("  oscillator flag: {:?}", self.config.oscillator_flag);
        info!("  initial control: {:?}", self.config.initial_control);
    }

    /// Reads the time registers, gated on the oscillator state like
    /// [`crate::DS3231::read_time`].
    pub async fn read_time(&mut self) -> Result<TimeRead, DS3231Error<B::Error>> {
        let bytes: [u8; TIME_LEN] = self.read_block(RegisterBlock::Time).await?;
        let control = match self.config.oscillator_flag {
            OscillatorFlag::ControlEosc => {
                let [byte] = self.read_block::<1>(RegisterBlock::Control).await?;
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

    pub async fn write_time(
        &mut self,
        reading: &WallClockReading,
    ) -> Result<(), DS3231Error<B::Error>> {
        let bytes = encode_time(reading).map_err(|e| {
            error!("DS3231: can't encode {:?}: {:?}", reading, e);
            e
        })?;
        self.write_block(RegisterBlock::Time, &bytes).await?;
        self.mirror.time = Some(bytes);
        info!("DS3231: time set to {:?}", reading);
        Ok(())
    }

    pub async fn write_time_from<S: TimeSource>(
        &mut self,
        source: &mut S,
    ) -> Result<(), DS3231Error<B::Error>> {
        let Some(reading) = source.now() else {
            error!("DS3231: system time is not valid, not writing");
            return Err(DS3231Error::InvalidTime);
        };
        self.write_time(&reading).await
    }

    pub async fn read_temperature(&mut self) -> Result<TemperatureReading, DS3231Error<B::Error>> {
        let bytes: [u8; TEMPERATURE_LEN] = self.read_block(RegisterBlock::Temperature).await?;
        self.mirror.temperature = Some(bytes);
        Ok(decode_temperature(bytes))
    }

    pub async fn read_control(&mut self) -> Result<ControlFlags, DS3231Error<B::Error>> {
        let [byte] = self.read_block::<1>(RegisterBlock::Control).await?;
        self.mirror.control = Some(byte);
        Ok(decode_control(byte))
    }

    pub async fn write_control(
        &mut self,
        flags: &ControlFlags,
    ) -> Result<(), DS3231Error<B::Error>> {
        let byte = encode_control(flags);
        self.write_block(RegisterBlock::Control, &[byte]).await?;
        self.mirror.control = Some(byte);
        Ok(())
    }

    pub async fn read_status(&mut self) -> Result<StatusFlags, DS3231Error<B::Error>> {
        let [byte] = self.read_block::<1>(RegisterBlock::Status).await?;
        self.mirror.status = Some(byte);
        Ok(decode_status(byte))
    }

    pub async fn read_aging_offset(&mut self) -> Result<i8, DS3231Error<B::Error>> {
        let [byte] = self.read_block::<1>(RegisterBlock::AgingOffset).await?;
        self.mirror.aging_offset = Some(byte);
        Ok(byte as i8)
    }

    pub async fn write_aging_offset(&mut self, offset: i8) -> Result<(), DS3231Error<B::Error>> {
        let byte = offset as u8;
        self.write_block(RegisterBlock::AgingOffset, &[byte]).await?;
        self.mirror.aging_offset = Some(byte);
        Ok(())
    }

    pub async fn read_alarm(
        &mut self,
        which: AlarmSelect,
    ) -> Result<AlarmSpec, DS3231Error<B::Error>> {
        let spec = match which {
            AlarmSelect::Alarm1 => {
                let bytes: [u8; ALARM1_LEN] = self.read_block(which.block()).await?;
                let spec = decode_alarm(&bytes, which)?;
                self.mirror.alarm1 = Some(bytes);
                spec
            }
            AlarmSelect::Alarm2 => {
                let bytes: [u8; ALARM2_LEN] = self.read_block(which.block()).await?;
                let spec = decode_alarm(&bytes, which)?;
                self.mirror.alarm2 = Some(bytes);
                spec
            }
        };
        Ok(spec)
    }

    pub async fn write_alarm(
        &mut self,
        spec: &AlarmSpec,
        which: AlarmSelect,
    ) -> Result<(), DS3231Error<B::Error>> {
        let image = encode_alarm(spec, which).map_err(|e| {
            error!("DS3231: can't encode {:?}: {:?}", which, e);
            e
        })?;
        self.write_block(which.block(), image.as_bytes()).await?;
        self.mirror.store_alarm(&image);
        Ok(())
    }
}
