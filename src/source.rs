//! This module identifies the three battery inputs of the distribution board.

use strum::EnumCount;
use strum_macros::{EnumCount as EnumCountMacro, EnumIter};

/// One of the three battery inputs feeding the power bus.
///
/// Declaration order is the selection priority order: startup selection walks
/// `Battery1` first, and failover tie-breaks prefer the earlier variant. The
/// discriminant is the identity tag printed on the board silkscreen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumCountMacro, EnumIter)]
#[repr(u8)]
pub enum Source {
    Battery1 = 1,
    Battery2 = 2,
    Battery3 = 3,
}

/// Number of battery inputs on the board.
pub const SOURCE_COUNT: usize = Source::COUNT;

impl Source {
    /// Dense `0..SOURCE_COUNT` index, for per-source arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// The two non-active inputs considered during failover, in priority order.
    pub const fn candidates(self) -> [Source; 2] {
        match self {
            Source::Battery1 => [Source::Battery2, Source::Battery3],
            Source::Battery2 => [Source::Battery1, Source::Battery3],
            Source::Battery3 => [Source::Battery1, Source::Battery2],
        }
    }
}

impl From<Source> for u8 {
    fn from(value: Source) -> Self {
        value as u8
    }
}
