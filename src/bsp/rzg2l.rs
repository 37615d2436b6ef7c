// SPDX-License-Identifier: MIT
//! Renesas RZ/G2L MTU3 wiring.

use core::num::NonZeroU32;

use crate::driver::timer::mtu3::NUM_CHANNELS;

//--------------------------------------------------------------------------------------------------
// Public definitions
//--------------------------------------------------------------------------------------------------
pub const COMPATIBLE: &str = "renesas,rzg2l-mtu3";

/// Name of the functional clock in the device description.
pub const CLOCK_NAME: &str = "fck";

/// Fixed input prescaler used by every channel.
pub const PRESCALE: u64 = 64;

/// Kernel tick rate used unless the board says otherwise.
pub const DEFAULT_HZ: NonZeroU32 = match NonZeroU32::new(100) {
    Some(hz) => hz,
    None => panic!("zero tick rate"),
};

pub const CLOCKEVENT_RATING: u32 = 200;
pub const CLOCKSOURCE_RATING: u32 = 126;

#[rustfmt::skip]
pub mod map {
    use super::NUM_CHANNELS;

    /// Register sub-block of each channel, relative to the MTU3 base.
    pub const CHANNEL_OFFSETS: [usize; NUM_CHANNELS] = [0x100, 0x180];

    /// Compare-match A interrupt line of each channel.
    pub const CHANNEL_IRQ_NAMES: [&str; NUM_CHANNELS] = ["tgi0a", "tgi1a"];
}

/// Per-board tunables handed to the driver at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    hz: NonZeroU32,
    clockevent_rating: u32,
    clocksource_rating: u32,
}

//--------------------------------------------------------------------------------------------------
// Public code
//--------------------------------------------------------------------------------------------------
impl Config {
    pub const fn new() -> Self {
        Self {
            hz: DEFAULT_HZ,
            clockevent_rating: CLOCKEVENT_RATING,
            clocksource_rating: CLOCKSOURCE_RATING,
        }
    }

    pub const fn with_hz(self, hz: NonZeroU32) -> Self {
        Self { hz, ..self }
    }

    pub const fn with_ratings(self, clockevent_rating: u32, clocksource_rating: u32) -> Self {
        Self {
            clockevent_rating,
            clocksource_rating,
            ..self
        }
    }

    /// Ticks per second the clock-event channel is programmed for.
    pub const fn hz(&self) -> NonZeroU32 {
        self.hz
    }

    pub const fn clockevent_rating(&self) -> u32 {
        self.clockevent_rating
    }

    pub const fn clocksource_rating(&self) -> u32 {
        self.clocksource_rating
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
