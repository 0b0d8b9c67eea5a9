//! Control (0Eh) and status (0Fh) register codec.

use crate::registers::{Control, InterruptControl, Oscillator, SquareWaveFrequency, Status};

/// Decoded control register.
///
/// Every field maps to exactly one bit (or the two rate select bits), so the
/// codec is a straight bit-for-bit translation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlFlags {
    /// EOSC. `Disabled` means the oscillator stops on battery power and the
    /// time registers cannot be trusted.
    pub oscillator: Oscillator,
    /// BBSQW
    pub battery_backed_square_wave: bool,
    /// CONV
    pub convert_temperature: bool,
    /// RS2:RS1
    pub square_wave_frequency: SquareWaveFrequency,
    /// INTCN
    pub interrupt_control: InterruptControl,
    /// A2IE
    pub alarm2_interrupt_enable: bool,
    /// A1IE
    pub alarm1_interrupt_enable: bool,
}

impl ControlFlags {
    /// Flags written once during setup: oscillator running, INT/SQW pin in
    /// interrupt mode, alarm interrupts off, no battery-backed square wave and
    /// rate select cleared.
    #[must_use]
    pub const fn initial() -> Self {
        ControlFlags {
            oscillator: Oscillator::Enabled,
            battery_backed_square_wave: false,
            convert_temperature: false,
            square_wave_frequency: SquareWaveFrequency::Hz1,
            interrupt_control: InterruptControl::Interrupt,
            alarm2_interrupt_enable: false,
            alarm1_interrupt_enable: false,
        }
    }

    /// True when the oscillator is reported as stopped.
    #[must_use]
    pub fn oscillator_stopped(&self) -> bool {
        self.oscillator == Oscillator::Disabled
    }
}

impl Default for ControlFlags {
    fn default() -> Self {
        Self::initial()
    }
}

/// Decoded status register. Only read by this crate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusFlags {
    /// OSF
    pub oscillator_stop_flag: bool,
    /// EN32kHz
    pub enable_32khz_output: bool,
    /// BSY
    pub busy: bool,
    /// A2F
    pub alarm2_fired: bool,
    /// A1F
    pub alarm1_fired: bool,
}

#[must_use]
pub fn decode_control(byte: u8) -> ControlFlags {
    let raw = Control(byte);
    ControlFlags {
        oscillator: raw.oscillator(),
        battery_backed_square_wave: raw.battery_backed_square_wave(),
        convert_temperature: raw.convert_temperature(),
        square_wave_frequency: raw.square_wave_frequency(),
        interrupt_control: raw.interrupt_control(),
        alarm2_interrupt_enable: raw.alarm2_interrupt_enable(),
        alarm1_interrupt_enable: raw.alarm1_interrupt_enable(),
    }
}

#[must_use]
pub fn encode_control(flags: &ControlFlags) -> u8 {
    let mut raw = Control::default();
    raw.set_oscillator(flags.oscillator);
    raw.set_battery_backed_square_wave(flags.battery_backed_square_wave);
    raw.set_convert_temperature(flags.convert_temperature);
    raw.set_square_wave_frequency(flags.square_wave_frequency);
    raw.set_interrupt_control(flags.interrupt_control);
    raw.set_alarm2_interrupt_enable(flags.alarm2_interrupt_enable);
    raw.set_alarm1_interrupt_enable(flags.alarm1_interrupt_enable);
    raw.into()
}

/// Decodes the status register, ignoring the unused bits 6:4.
#[must_use]
pub fn decode_status(byte: u8) -> StatusFlags {
    let raw = Status(byte);
    StatusFlags {
        oscillator_stop_flag: raw.oscillator_stop_flag(),
        enable_32khz_output: raw.enable_32khz_output(),
        busy: raw.busy(),
        alarm2_fired: raw.alarm2_flag(),
        alarm1_fired: raw.alarm1_flag(),
    }
}
