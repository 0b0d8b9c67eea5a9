//! Register bus transport.
//!
//! The driver never talks to I2C directly. It moves whole register blocks
//! through [`RegisterBus`], which only knows how to read or write a run of
//! bytes starting at a register address. [`I2cBus`] implements it for any
//! `embedded-hal` I2C bus.

use embedded_hal::i2c::I2c;

use crate::registers::MAX_BLOCK_LEN;

/// Default 7-bit I2C address of the DS3231.
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Addressed multi-byte access to the device registers.
pub trait RegisterBus {
    type Error: core::fmt::Debug;

    /// Fills `buffer` with the registers starting at `address`.
    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes `bytes` to the registers starting at `address` in a single
    /// transaction. `bytes` must not be longer than [`MAX_BLOCK_LEN`].
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Device address on the bus, when the transport has one.
    fn address(&self) -> Option<u8> {
        None
    }
}

/// An I2C bus paired with the device address.
#[derive(Debug)]
pub struct I2cBus<I2C> {
    pub(crate) i2c: I2C,
    pub(crate) address: u8,
}

impl<I2C> I2cBus<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    #[must_use]
    pub fn device_address(&self) -> u8 {
        self.address
    }

    /// Gives the I2C bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

/// Builds the I2C frame for one write: register pointer followed by data.
///
/// Register blocks are at most [`MAX_BLOCK_LEN`] bytes. Anything past that
/// is a caller bug and is cut off rather than sent as a second transaction.
pub(crate) fn write_frame(address: u8, bytes: &[u8]) -> ([u8; MAX_BLOCK_LEN + 1], usize) {
    debug_assert!(bytes.len() <= MAX_BLOCK_LEN);
    let len = bytes.len().min(MAX_BLOCK_LEN);
    let mut frame = [0u8; MAX_BLOCK_LEN + 1];
    frame[0] = address;
    frame[1..=len].copy_from_slice(&bytes[..len]);
    (frame, len + 1)
}

impl<I2C: I2c> RegisterBus for I2cBus<I2C> {
    type Error = I2C::Error;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[address], buffer)
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        let (frame, len) = write_frame(address, bytes);
        self.i2c.write(self.address, &frame[..len])
    }

    fn address(&self) -> Option<u8> {
        Some(self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    #[test]
    fn test_read_sets_register_pointer() {
        let mock = I2cMock::new(&[I2cTrans::write_read(
            DEFAULT_ADDRESS,
            vec![0x11],
            vec![0x19, 0x40],
        )]);
        let mut bus = I2cBus::new(mock, DEFAULT_ADDRESS);

        let mut buffer = [0u8; 2];
        bus.read(0x11, &mut buffer).unwrap();
        assert_eq!(buffer, [0x19, 0x40]);
        bus.release().done();
    }

    #[test]
    fn test_write_prefixes_register_address() {
        let mock = I2cMock::new(&[I2cTrans::write(0x57, vec![0x0E, 0x04])]);
        let mut bus = I2cBus::new(mock, 0x57);
        assert_eq!(bus.device_address(), 0x57);
        assert_eq!(RegisterBus::address(&bus), Some(0x57));

        bus.write(0x0E, &[0x04]).unwrap();
        bus.release().done();
    }

    #[test]
    fn test_full_block_is_one_transaction() {
        let mock = I2cMock::new(&[I2cTrans::write(
            DEFAULT_ADDRESS,
            vec![0x00, 1, 2, 3, 4, 5, 6, 7],
        )]);
        let mut bus = I2cBus::new(mock, DEFAULT_ADDRESS);

        bus.write(0x00, &[1, 2, 3, 4, 5, 6, 7]).unwrap();
        bus.release().done();
    }

    #[test]
    fn test_failed_write_is_reported_once() {
        let mock = I2cMock::new(&[
            I2cTrans::write(DEFAULT_ADDRESS, vec![0x07, 1, 2, 3, 4])
                .with_error(ErrorKind::Other),
        ]);
        let mut bus = I2cBus::new(mock, DEFAULT_ADDRESS);

        assert_eq!(bus.write(0x07, &[1, 2, 3, 4]), Err(ErrorKind::Other));
        bus.release().done();
    }

    #[test]
    fn test_write_frame_layout() {
        let (frame, len) = write_frame(0x0B, &[0x30, 0x15, 0x14]);
        assert_eq!(&frame[..len], &[0x0B, 0x30, 0x15, 0x14]);

        let (frame, len) = write_frame(0x0E, &[]);
        assert_eq!(&frame[..len], &[0x0E]);
    }

    #[test]
    fn test_errors_are_passed_through() {
        let mock = I2cMock::new(&[
            I2cTrans::write_read(DEFAULT_ADDRESS, vec![0x00], vec![0; 7])
                .with_error(ErrorKind::Other),
        ]);
        let mut bus = I2cBus::new(mock, DEFAULT_ADDRESS);

        let mut buffer = [0u8; 7];
        assert_eq!(bus.read(0x00, &mut buffer), Err(ErrorKind::Other));
        bus.release().done();
    }
}
