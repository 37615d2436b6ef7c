// SPDX-License-Identifier: MIT
//! Contract between timer drivers and the time core.

use bitflags::bitflags;

use crate::Error;

bitflags! {
    /// Programming modes a clock-event device supports.
    pub struct ClockEventFeatures: u32 {
        const PERIODIC = 1 << 0;
        const ONESHOT = 1 << 1;
    }
}

bitflags! {
    pub struct ClockSourceFlags: u32 {
        /// The counter keeps running in every idle state.
        const IS_CONTINUOUS = 1 << 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEventState {
    Shutdown,
    Periodic,
}

/// Receiver of clock-event ticks. Invoked from interrupt context.
pub trait ClockEventHandler {
    fn event(&self);
}

/// A device delivering timer interrupts to the time core.
pub trait ClockEventDevice {
    fn name(&self) -> &'static str;

    fn features(&self) -> ClockEventFeatures;

    /// Higher is better.
    fn rating(&self) -> u32;

    fn state(&self) -> ClockEventState;

    /// Install the tick receiver. There is no way to take it out again.
    fn set_event_handler(&self, handler: &'static (dyn ClockEventHandler + Sync));

    fn set_state_shutdown(&self) -> Result<(), Error>;

    fn set_state_periodic(&self) -> Result<(), Error>;

    fn suspend(&self);

    fn resume(&self);
}

/// A readable counter the time core derives monotonic time from.
pub trait ClockSourceDevice {
    fn name(&self) -> &'static str;

    /// Higher is better.
    fn rating(&self) -> u32;

    /// Width of the raw hardware counter.
    fn mask(&self) -> u64;

    fn flags(&self) -> ClockSourceFlags;

    /// Current cycle count.
    fn read(&self) -> u64;

    fn enable(&self) -> Result<(), Error>;

    fn disable(&self);

    fn suspend(&self);

    fn resume(&self);
}

/// The time core as seen by timer drivers.
pub trait TimeSubsystem {
    fn register_clockevent(&'static self, ced: &'static (dyn ClockEventDevice + Sync));

    /// Register a clocksource counting at `hz`.
    fn register_clocksource(&'static self, cs: &'static (dyn ClockSourceDevice + Sync), hz: u64);
}
