//! Hardware access contract between the failover core and the board.
//!
//! The core never touches registers itself; everything physical goes through
//! this trait. A firmware build implements it on top of the MCU's pin and ADC
//! peripherals, and a host build can implement it over a simulation (see
//! `demos/simulation.rs`) or the test mock.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

/// Board access used by [`FailoverController`](crate::controller::FailoverController).
///
/// Naming follows the usual split: `configure_*` methods are one-time pin
/// mode setup, while `set_*` methods drive an output. `read_*` methods
/// acquire a measured value. Blocking waits come from the [`DelayNs`]
/// supertrait, so an implementation on a real HAL can reuse its existing
/// delay provider.
pub trait PowerBoardHal: DelayNs {
    /// Error produced by the underlying hardware access.
    type Error: core::fmt::Debug;

    /// Switch the ADC to the external reference on the AREF pin.
    ///
    /// Called exactly once, before any sense channel is read. The reference
    /// selection only latches during an ADC power cycle, so implementations
    /// are expected to power the peripheral down around the change and back
    /// up afterwards.
    fn select_external_adc_reference(&mut self) -> Result<(), Self::Error>;

    /// Configure a relay switch channel as a push-pull output.
    fn configure_switch_output(&mut self, channel: u8) -> Result<(), Self::Error>;

    /// Configure a voltage sense channel as an analog input.
    fn configure_sense_input(&mut self, channel: u8) -> Result<(), Self::Error>;

    /// Drive a switch channel fully high or low.
    ///
    /// `PinState::High` energises the relay coil at full drive.
    fn set_switch_level(&mut self, channel: u8, level: PinState) -> Result<(), Self::Error>;

    /// Drive a switch channel at a reduced duty cycle (0-255 domain).
    ///
    /// Used for the soft-start hold level after a relay has pulled in.
    fn set_switch_duty(&mut self, channel: u8, duty: u8) -> Result<(), Self::Error>;

    /// Acquire one raw ADC sample from a sense channel.
    fn read_sense_raw(&mut self, channel: u8) -> Result<u16, Self::Error>;
}
