// SPDX-License-Identifier: MIT
//! Clocksource side of a channel: the free-running counter, widened to 64 bits.

use core::sync::atomic::Ordering;

use log::error;

use super::channel::{Channel, Role};
use super::{COUNTER_MASK, COUNTER_RANGE};
use crate::sync::interface::Mutex;
use crate::time::interface::{ClockSourceDevice, ClockSourceFlags};
use crate::Error;

impl ClockSourceDevice for Channel {
    fn name(&self) -> &'static str {
        self.mtu().name()
    }

    fn rating(&self) -> u32 {
        self.mtu().config().clocksource_rating()
    }

    fn mask(&self) -> u64 {
        COUNTER_MASK
    }

    fn flags(&self) -> ClockSourceFlags {
        ClockSourceFlags::IS_CONTINUOUS
    }

    /// Accumulated cycles plus the live counter.
    ///
    /// A counter value below the previous one means the counter wrapped once since then.
    fn read(&self) -> u64 {
        self.state.lock(|state| {
            let raw = self.raw_counter();
            if raw < state.last_raw {
                state.total_cycles += COUNTER_RANGE;
            }
            state.last_raw = raw;

            state.total_cycles + u64::from(raw)
        })
    }

    fn enable(&self) -> Result<(), Error> {
        if self.cs_enabled.load(Ordering::Acquire) {
            self.report_misuse("clocksource enabled twice");
        }

        self.state.lock(|state| state.total_cycles = 0);
        self.start(Role::ClockSource)?;
        self.cs_enabled.store(true, Ordering::Release);

        Ok(())
    }

    fn disable(&self) {
        if !self.cs_enabled.load(Ordering::Acquire) {
            self.report_misuse("clocksource disabled while not enabled");
        }

        self.stop(Role::ClockSource);
        self.cs_enabled.store(false, Ordering::Release);
    }

    fn suspend(&self) {
        if !self.cs_enabled.load(Ordering::Acquire) {
            return;
        }

        self.stop(Role::ClockSource);
        self.mtu().power().syscore_power_off();
    }

    fn resume(&self) {
        if !self.cs_enabled.load(Ordering::Acquire) {
            return;
        }

        self.mtu().power().syscore_power_on();
        if let Err(e) = self.start(Role::ClockSource) {
            error!("ch{}: cannot resume clocksource: {}", self.index(), e);
        }
    }
}
