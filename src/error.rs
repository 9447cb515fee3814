//! Our error types for the failover controller.

use thiserror::Error;

pub type Result<T, H> = core::result::Result<T, Error<H>>;

/// Custom error type for battery failover control.
///
/// Total depletion is deliberately not in here: running out of batteries is a
/// designed terminal state reported through
/// [`SelectorState::Halted`](crate::selector::SelectorState), not a fault.
#[derive(Error, Debug)]
pub enum Error<H: core::fmt::Debug> {
    #[error("Hardware access error")]
    Hal(H),
    #[error("No startup selection has run yet")]
    NotStarted,
    #[error("Startup selection already ran")]
    AlreadyStarted,
}
