//! This crate implements the battery failover logic for the power distribution board of a small mobile robot.
//!
//! It supports `no-std` environments by use of the `no-std` feature flag.
//!
//! The board accepts three battery inputs and feeds the robot from exactly
//! one of them at a time, each input switched onto the bus by its own relay.
//! The [FailoverController](controller::FailoverController) measures every
//! input through its sense divider and engages the first battery above the
//! low voltage threshold at startup. Whenever the active battery sags it
//! moves the bus to the best remaining one, and once the whole pack is spent
//! it opens every relay and halts for good.
//!
//! All hardware access goes through the [PowerBoardHal](hal::PowerBoardHal)
//! trait, so the same controller runs on the board firmware and on a host,
//! either against the test mock or the simulated demo
//! (`demos/simulation.rs`).

#![cfg_attr(feature = "no-std", no_std)]

pub mod board;
pub mod controller;
pub mod error;
pub mod hal;
pub mod scaling;
pub mod selector;
pub mod source;

#[cfg(test)]
mod mock_hal;
