// SPDX-License-Identifier: MIT
use crate::exception::asynchronous::IRQNumber;

/// Failures reported by the MTU3 driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("cannot get clock `{0}`")]
    ClockUnavailable(&'static str),

    /// Preparing the clock, or the brief enable used to sample its rate, failed.
    #[error("cannot bring up clock: {0}")]
    ClockSetup(&'static str),

    #[error("ch{channel}: cannot enable clock: {reason}")]
    ClockEnable {
        channel: usize,
        reason: &'static str,
    },

    #[error("failed to remap I/O memory: {0}")]
    MapRegisters(&'static str),

    #[error("ch{channel}: failed to request irq {irq}: {reason}")]
    RequestIrq {
        channel: usize,
        irq: IRQNumber,
        reason: &'static str,
    },

    #[error("driver already probed")]
    AlreadyProbed,

    /// Registered clock events and clocksources cannot be taken back from the time core.
    #[error("device busy")]
    Busy,
}
