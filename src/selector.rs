//! Pure selection policy for the battery inputs.
//!
//! Everything here is a value computation: readings go in, a verdict comes
//! out. The relay sequencing that acts on a verdict lives in
//! [`controller`](crate::controller), so these rules stay testable without
//! any hardware mock at all.

use strum::IntoEnumIterator;

use crate::source::{SOURCE_COUNT, Source};

/// Lifecycle position of the source selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    /// Startup selection has not run yet; every switch is open.
    Uninitialized,
    /// The contained source is engaged and feeding the bus.
    Active(Source),
    /// Every source measured at or below the cutoff. Terminal: every switch
    /// is open and the controller will not act again.
    Halted,
}

impl SelectorState {
    /// The engaged source, if one is.
    pub fn active_source(&self) -> Option<Source> {
        match self {
            SelectorState::Active(source) => Some(*source),
            _ => None,
        }
    }

    pub fn is_halted(&self) -> bool {
        matches!(self, SelectorState::Halted)
    }
}

/// One voltage per source, all taken in the same measurement pass.
///
/// Never held across polls. The controller builds a fresh set whenever it
/// needs the full picture, so a verdict is always computed from samples of
/// the same instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceReadings {
    volts: [f32; SOURCE_COUNT],
}

impl SourceReadings {
    /// Wrap readings taken in priority order (`Battery1` first).
    pub const fn new(volts: [f32; SOURCE_COUNT]) -> Self {
        Self { volts }
    }

    /// The sampled line voltage of one source.
    pub fn volts(&self, source: Source) -> f32 {
        self.volts[source.index()]
    }

    /// True when no source clears the cutoff, i.e. the whole pack is spent.
    pub fn all_at_or_below(&self, threshold: f32) -> bool {
        self.volts.iter().all(|volts| *volts <= threshold)
    }

    /// First source in priority order strictly above the cutoff.
    ///
    /// This is the startup rule: declaration order breaks any ambiguity, so
    /// a board full of healthy batteries always comes up on `Battery1`.
    pub fn first_above(&self, threshold: f32) -> Option<Source> {
        Source::iter().find(|source| self.volts(*source) > threshold)
    }

    /// Replacement for a sagging active source, or `None` when the whole
    /// pack is at or below the cutoff and the only move left is halting.
    ///
    /// The higher-voltage of the two remaining candidates wins even when it
    /// is itself at or below the cutoff: a marginal battery still beats a
    /// flat one, and only total depletion takes the bus down. An exact tie
    /// goes to the candidate earlier in priority order.
    pub fn failover_target(&self, active: Source, threshold: f32) -> Option<Source> {
        if self.all_at_or_below(threshold) {
            return None;
        }
        let [first, second] = active.candidates();
        if self.volts(second) > self.volts(first) {
            Some(second)
        } else {
            Some(first)
        }
    }
}
