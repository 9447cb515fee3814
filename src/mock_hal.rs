//! We use this mocking module in unit tests to emulate the power board.
//!
//! Besides answering sense reads from pre-scripted samples, the mock records
//! every hardware access in call order, so tests can assert relay sequencing
//! (break-before-make, settle delays, hold duty) against the recorded list.
//! Simulated faults are raised before anything is recorded, so the log only
//! ever holds accesses that took effect.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use strum::IntoEnumIterator;

use crate::board::SENSE_SCALING;
use crate::hal::PowerBoardHal;
use crate::source::{SOURCE_COUNT, Source};

/// One recorded hardware access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalOp {
    /// ADC switched to the external reference.
    AdcReference,
    /// Switch channel configured as an output.
    ConfigureOutput(u8),
    /// Sense channel configured as an analog input.
    ConfigureInput(u8),
    /// Switch channel driven to a level.
    SwitchLevel(u8, PinState),
    /// Switch channel driven at a duty out of 255.
    SwitchDuty(u8, u8),
    /// Raw sample taken from a sense channel.
    SenseRead(u8),
    /// Blocking wait, in whole milliseconds.
    Delay(u32),
}

/// Our mock type used to emulate the power distribution board.
pub struct MockHal {
    /// Recorded hardware accesses, in call order.
    ops: heapless::Vec<HalOp, 128>,
    /// Pre-scripted raw samples, one script per source.
    samples: [heapless::Vec<u16, 16>; SOURCE_COUNT],
    /// Current position in each source's sample script.
    positions: [usize; SOURCE_COUNT],
    /// Flag to simulate ADC read errors.
    should_error_on_read: bool,
    /// Flag to simulate switch level drive errors.
    should_error_on_level: bool,
    /// Flag to simulate switch duty drive errors.
    should_error_on_duty: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MockHalError {
    /// Channel not wired to any source on this board.
    UnknownChannel(u8),
    /// Sense read on a source with no scripted samples.
    NothingScripted(u8),
    /// Simulated conversion failure.
    SimulatedFault,
    /// Script capacity exceeded while scripting samples.
    ScriptFull,
    /// Operation log capacity exceeded.
    LogFull,
}

impl MockHal {
    /// Create a new MockHal with an empty log and no scripted samples.
    pub fn new() -> Self {
        Self {
            ops: heapless::Vec::new(),
            samples: [const { heapless::Vec::new() }; SOURCE_COUNT],
            positions: [0; SOURCE_COUNT],
            should_error_on_read: false,
            should_error_on_level: false,
            should_error_on_duty: false,
        }
    }

    /// Script a source to read as one fixed line voltage.
    pub fn set_source_volts(&mut self, source: Source, volts: f32) -> Result<(), MockHalError> {
        self.set_source_volts_sequence(source, &[volts])
    }

    /// Script a source's successive reads; the last value repeats forever.
    ///
    /// Replaces any earlier script for the source and rewinds its position.
    pub fn set_source_volts_sequence(
        &mut self,
        source: Source,
        volts: &[f32],
    ) -> Result<(), MockHalError> {
        let script = &mut self.samples[source.index()];
        script.clear();
        self.positions[source.index()] = 0;

        for &value in volts {
            script
                .push(SENSE_SCALING.volts_to_raw(value))
                .map_err(|_| MockHalError::ScriptFull)?;
        }

        Ok(())
    }

    /// Get the hardware accesses recorded so far, in call order.
    pub fn ops(&self) -> &[HalOp] {
        &self.ops
    }

    /// Clear the operation log without touching the sample scripts.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Configure whether sense reads should fail with a simulated fault.
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }

    /// Configure whether switch level drives should fail with a simulated
    /// fault.
    pub fn set_level_error(&mut self, should_error: bool) {
        self.should_error_on_level = should_error;
    }

    /// Configure whether switch duty drives should fail with a simulated
    /// fault.
    pub fn set_duty_error(&mut self, should_error: bool) {
        self.should_error_on_duty = should_error;
    }

    fn record(&mut self, op: HalOp) -> Result<(), MockHalError> {
        self.ops.push(op).map_err(|_| MockHalError::LogFull)
    }

    fn source_for_sense_channel(channel: u8) -> Result<Source, MockHalError> {
        Source::iter()
            .find(|source| source.channels().sense == channel)
            .ok_or(MockHalError::UnknownChannel(channel))
    }
}

impl DelayNs for MockHal {
    fn delay_ns(&mut self, ns: u32) {
        // Rounded up to whole milliseconds so sub-ms waits stay visible.
        self.record(HalOp::Delay(ns.div_ceil(1_000_000)))
            .expect("mock op log full");
    }

    fn delay_us(&mut self, us: u32) {
        self.record(HalOp::Delay(us.div_ceil(1_000)))
            .expect("mock op log full");
    }

    fn delay_ms(&mut self, ms: u32) {
        self.record(HalOp::Delay(ms)).expect("mock op log full");
    }
}

impl PowerBoardHal for MockHal {
    type Error = MockHalError;

    fn select_external_adc_reference(&mut self) -> Result<(), Self::Error> {
        self.record(HalOp::AdcReference)
    }

    fn configure_switch_output(&mut self, channel: u8) -> Result<(), Self::Error> {
        self.record(HalOp::ConfigureOutput(channel))
    }

    fn configure_sense_input(&mut self, channel: u8) -> Result<(), Self::Error> {
        self.record(HalOp::ConfigureInput(channel))
    }

    fn set_switch_level(&mut self, channel: u8, level: PinState) -> Result<(), Self::Error> {
        if self.should_error_on_level {
            return Err(MockHalError::SimulatedFault);
        }
        self.record(HalOp::SwitchLevel(channel, level))
    }

    fn set_switch_duty(&mut self, channel: u8, duty: u8) -> Result<(), Self::Error> {
        if self.should_error_on_duty {
            return Err(MockHalError::SimulatedFault);
        }
        self.record(HalOp::SwitchDuty(channel, duty))
    }

    fn read_sense_raw(&mut self, channel: u8) -> Result<u16, Self::Error> {
        if self.should_error_on_read {
            return Err(MockHalError::SimulatedFault);
        }
        self.record(HalOp::SenseRead(channel))?;

        let source = Self::source_for_sense_channel(channel)?;
        let script = &self.samples[source.index()];
        if script.is_empty() {
            return Err(MockHalError::NothingScripted(channel));
        }

        let index = self.positions[source.index()].min(script.len() - 1);
        let sample = script[index];
        self.positions[source.index()] = index + 1;
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sense_channel(source: Source) -> u8 {
        source.channels().sense
    }

    #[test]
    fn test_new_mock_records_nothing() {
        let mock = MockHal::new();
        assert_eq!(mock.ops().len(), 0);
        assert_eq!(mock.should_error_on_read, false);
        assert_eq!(mock.should_error_on_level, false);
        assert_eq!(mock.should_error_on_duty, false);
    }

    #[test]
    fn test_scripted_volts_come_back_as_raw_counts() {
        let mut mock = MockHal::new();
        mock.set_source_volts(Source::Battery1, 35.0).unwrap();

        let channel = sense_channel(Source::Battery1);
        let raw = mock.read_sense_raw(channel).unwrap();

        assert_eq!(raw, SENSE_SCALING.volts_to_raw(35.0));
        assert_eq!(mock.ops(), &[HalOp::SenseRead(channel)]);
    }

    #[test]
    fn test_sample_sequences_advance_then_hold_the_last_value() {
        let mut mock = MockHal::new();
        mock.set_source_volts_sequence(Source::Battery2, &[35.0, 25.0])
            .unwrap();

        let channel = sense_channel(Source::Battery2);
        let first = mock.read_sense_raw(channel).unwrap();
        let second = mock.read_sense_raw(channel).unwrap();
        let third = mock.read_sense_raw(channel).unwrap();

        assert_eq!(first, SENSE_SCALING.volts_to_raw(35.0));
        assert_eq!(second, SENSE_SCALING.volts_to_raw(25.0));
        // Exhausted scripts repeat their final value.
        assert_eq!(third, second);
    }

    #[test]
    fn test_each_source_keeps_an_independent_script() {
        let mut mock = MockHal::new();
        mock.set_source_volts_sequence(Source::Battery1, &[35.0, 20.0])
            .unwrap();
        mock.set_source_volts(Source::Battery3, 31.0).unwrap();

        // Draining battery 3 must not advance battery 1's script.
        let b3 = sense_channel(Source::Battery3);
        mock.read_sense_raw(b3).unwrap();
        mock.read_sense_raw(b3).unwrap();

        let b1 = sense_channel(Source::Battery1);
        assert_eq!(
            mock.read_sense_raw(b1).unwrap(),
            SENSE_SCALING.volts_to_raw(35.0)
        );
    }

    #[test]
    fn test_rescripting_rewinds_the_position() {
        let mut mock = MockHal::new();
        let channel = sense_channel(Source::Battery1);

        mock.set_source_volts_sequence(Source::Battery1, &[35.0, 25.0])
            .unwrap();
        mock.read_sense_raw(channel).unwrap();

        mock.set_source_volts_sequence(Source::Battery1, &[33.0, 23.0])
            .unwrap();
        assert_eq!(
            mock.read_sense_raw(channel).unwrap(),
            SENSE_SCALING.volts_to_raw(33.0)
        );
    }

    #[test]
    fn test_unknown_sense_channel_is_rejected() {
        let mut mock = MockHal::new();
        let result = mock.read_sense_raw(42);
        assert_eq!(result, Err(MockHalError::UnknownChannel(42)));
    }

    #[test]
    fn test_unscripted_source_is_rejected() {
        let mut mock = MockHal::new();
        let channel = sense_channel(Source::Battery2);
        let result = mock.read_sense_raw(channel);
        assert_eq!(result, Err(MockHalError::NothingScripted(channel)));
    }

    #[test]
    fn test_read_error_simulation() {
        let mut mock = MockHal::new();
        mock.set_source_volts(Source::Battery1, 35.0).unwrap();
        mock.set_read_error(true);

        let channel = sense_channel(Source::Battery1);
        assert_eq!(
            mock.read_sense_raw(channel),
            Err(MockHalError::SimulatedFault)
        );
        // A failed read must not show up in the log.
        assert!(mock.ops().is_empty());

        mock.set_read_error(false);
        assert!(mock.read_sense_raw(channel).is_ok());
    }

    #[test]
    fn test_drive_error_simulation() {
        let mut mock = MockHal::new();
        let channel = Source::Battery1.channels().switch;

        mock.set_level_error(true);
        assert_eq!(
            mock.set_switch_level(channel, PinState::High),
            Err(MockHalError::SimulatedFault)
        );
        // A failed drive must not show up in the log either.
        assert!(mock.ops().is_empty());

        mock.set_level_error(false);
        assert!(mock.set_switch_level(channel, PinState::High).is_ok());

        mock.set_duty_error(true);
        assert_eq!(
            mock.set_switch_duty(channel, 155),
            Err(MockHalError::SimulatedFault)
        );
        assert_eq!(mock.ops(), &[HalOp::SwitchLevel(channel, PinState::High)]);

        mock.set_duty_error(false);
        assert!(mock.set_switch_duty(channel, 155).is_ok());
    }

    #[test]
    fn test_delays_are_recorded_in_whole_milliseconds() {
        let mut mock = MockHal::new();
        mock.delay_ms(5);
        mock.delay_us(1_500);
        mock.delay_ns(1);

        assert_eq!(
            mock.ops(),
            &[HalOp::Delay(5), HalOp::Delay(2), HalOp::Delay(1)]
        );
    }

    #[test]
    fn test_clear_ops_keeps_the_scripts() {
        let mut mock = MockHal::new();
        mock.set_source_volts(Source::Battery1, 35.0).unwrap();
        let channel = sense_channel(Source::Battery1);
        mock.read_sense_raw(channel).unwrap();

        mock.clear_ops();

        assert!(mock.ops().is_empty());
        assert!(mock.read_sense_raw(channel).is_ok());
    }
}
