// SPDX-License-Identifier: MIT
//! MTU3 timer support for the Flow kernel.
//!
//! The MTU3 unit carries two 16-bit counter/compare channels that share a single start/stop
//! register. This crate turns channel 0 into a periodic clock-event device and channel 1 into a
//! free-running clocksource, and hands both to the kernel's time core.
//!
//! The crate is `no_std`. The embedding kernel provides the `critical-section` implementation
//! that masks local interrupts.
#![cfg_attr(not(test), no_std)]

pub mod bsp;
pub mod driver;
pub mod error;
pub mod exception;
pub mod sync;
pub mod time;

pub use driver::timer::mtu3::{Channel, Mtu3};
pub use error::Error;
