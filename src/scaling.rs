//! Scaling model for the battery voltage sense inputs.
//!
//! Each battery line is divided down by a resistive divider before it reaches
//! an ADC pin, so a raw sample has to be scaled twice on the way back to
//! volts: once from ADC counts to the voltage at the divider tap, and once
//! through the divider ratio to the voltage on the battery line itself.

/// Linear calibration for converting raw sense samples to a line voltage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SenseScaling {
    /// Volts at the divider tap per ADC count (reference voltage / full scale).
    pub volts_per_count: f32,
    /// Division ratio of the sense divider, e.g. 13 for 120k over 10k.
    pub divider_ratio: f32,
}

impl SenseScaling {
    /// Create a new `SenseScaling` with the given factors.
    ///
    /// # Arguments
    ///
    /// * `volts_per_count` - Tap voltage represented by one ADC count.
    /// * `divider_ratio` - (R_top + R_bottom) / R_bottom of the sense divider.
    pub const fn new(volts_per_count: f32, divider_ratio: f32) -> Self {
        Self {
            volts_per_count,
            divider_ratio,
        }
    }

    /// Convert one raw ADC sample to the battery-line voltage in volts.
    #[inline]
    pub const fn raw_to_volts(&self, raw: u16) -> f32 {
        raw as f32 * self.volts_per_count * self.divider_ratio
    }

    /// Convert a battery-line voltage back to the nearest-below raw sample.
    ///
    /// Truncates like the ADC itself does; mainly useful for presenting a
    /// wanted line voltage to the controller from a mock or a simulation.
    #[inline]
    pub const fn volts_to_raw(&self, volts: f32) -> u16 {
        (volts / (self.volts_per_count * self.divider_ratio)) as u16
    }
}
