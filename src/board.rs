//! Channel assignments and electrical constants of the distribution board.
//!
//! Everything in here is fixed by the board layout and the relay datasheet,
//! so it is all build-time constants. Channel numbers follow the controller
//! core's Arduino-style pin numbering.

use crate::scaling::SenseScaling;
use crate::source::Source;
use fugit::MillisDurationU32;

/// Hardware channel assignments for one battery input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceChannels {
    /// Output channel driving the relay that ties this input to the bus.
    pub switch: u8,
    /// Analog input channel on this input's sense divider tap.
    pub sense: u8,
}

/// Relay enable channel for battery 1. (PB1)
pub const B1_SWITCH_CHANNEL: u8 = 9;
/// Relay enable channel for battery 2. (PB2)
pub const B2_SWITCH_CHANNEL: u8 = 10;
/// Relay enable channel for battery 3. (PA7)
pub const B3_SWITCH_CHANNEL: u8 = 7;

/// Voltage sense channel for battery 1. (PA3)
pub const B1_SENSE_CHANNEL: u8 = 3;
/// Voltage sense channel for battery 2. (PA2)
pub const B2_SENSE_CHANNEL: u8 = 2;
/// Voltage sense channel for battery 3. (PA1)
pub const B3_SENSE_CHANNEL: u8 = 1;

impl Source {
    /// Board wiring for this input.
    pub const fn channels(self) -> SourceChannels {
        match self {
            Source::Battery1 => SourceChannels {
                switch: B1_SWITCH_CHANNEL,
                sense: B1_SENSE_CHANNEL,
            },
            Source::Battery2 => SourceChannels {
                switch: B2_SWITCH_CHANNEL,
                sense: B2_SENSE_CHANNEL,
            },
            Source::Battery3 => SourceChannels {
                switch: B3_SWITCH_CHANNEL,
                sense: B3_SENSE_CHANNEL,
            },
        }
    }
}

/// Worst-case contact close time of the bus relays, from the datasheet.
pub const RELAY_OPERATE_TIME: MillisDurationU32 = MillisDurationU32::millis(10);
/// Worst-case contact open time of the bus relays, from the datasheet.
pub const RELAY_RELEASE_TIME: MillisDurationU32 = MillisDurationU32::millis(5);

/// Steady-state drive level (out of 255) applied once a relay has pulled in.
///
/// Full drive is only needed during pull-in; backing off afterwards limits
/// inrush into the downstream bus and keeps the coil cool.
pub const RELAY_HOLD_DUTY: u8 = 155;

/// External ADC reference presented on the AREF pin, volts.
pub const ADC_REFERENCE_VOLTS: f32 = 5.0;
/// Full-scale count of the 10-bit ADC.
pub const ADC_FULL_SCALE: f32 = 1023.0;
/// Tap voltage represented by one ADC count (~0.0048875855 V).
pub const VOLTS_PER_COUNT: f32 = ADC_REFERENCE_VOLTS / ADC_FULL_SCALE;
/// Each sense tap sits behind a 120k over 10k divider.
// @TODO switch to per-channel ratios once the production dividers are measured.
pub const SENSE_DIVIDER_RATIO: f32 = 13.0;

/// Calibration shared by all three sense channels.
pub const SENSE_SCALING: SenseScaling =
    SenseScaling::new(VOLTS_PER_COUNT, SENSE_DIVIDER_RATIO);

/// An input at or below this line voltage is considered depleted.
pub const LOW_VOLTAGE_THRESHOLD: f32 = 30.0;

/// Interval between checks of the active input's voltage.
pub const POLL_INTERVAL: MillisDurationU32 = MillisDurationU32::millis(200);
