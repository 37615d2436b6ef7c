// SPDX-License-Identifier: MIT
//! A small time core: picks the best clock devices, counts ticks and keeps uptime.

use core::num::NonZeroU64;
use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;

use log::{info, warn};

use crate::sync::interface::Mutex;
use crate::sync::IRQSafeSpinLock;

pub mod interface;

use interface::{
    ClockEventDevice, ClockEventFeatures, ClockEventHandler, ClockSourceDevice, TimeSubsystem,
};

const NANOSEC_PER_SEC: u64 = 1_000_000_000;

#[derive(Copy, Clone)]
struct RegisteredClockSource {
    device: &'static (dyn ClockSourceDevice + Sync),
    frequency: NonZeroU64,
}

pub struct TimeManager {
    hz: NonZeroU64,
    jiffies: AtomicU64,
    clocksource: IRQSafeSpinLock<Option<RegisteredClockSource>>,
    clockevent: IRQSafeSpinLock<Option<&'static (dyn ClockEventDevice + Sync)>>,
}

/// Convert a cycle count of a counter running at `frequency` into a duration.
pub fn cycles_to_duration(cycles: u64, frequency: NonZeroU64) -> Duration {
    if cycles == 0 {
        return Duration::ZERO;
    }

    let freq = frequency.get();
    let secs = cycles / freq;
    let subsec = cycles % freq;

    // subsec < freq, so the product fits u128 and the quotient is below NANOSEC_PER_SEC.
    let nanos = (u128::from(subsec) * u128::from(NANOSEC_PER_SEC) / u128::from(freq)) as u32;

    Duration::new(secs, nanos)
}

impl TimeManager {
    /// Create a time core ticking `hz` times per second.
    pub const fn new(hz: NonZeroU64) -> Self {
        Self {
            hz,
            jiffies: AtomicU64::new(0),
            clocksource: IRQSafeSpinLock::new(None),
            clockevent: IRQSafeSpinLock::new(None),
        }
    }

    /// Ticks delivered by the active clock-event device since boot.
    pub fn jiffies(&self) -> u64 {
        self.jiffies.load(Ordering::Relaxed)
    }

    /// Name of the clocksource currently used for timekeeping.
    pub fn current_clocksource(&self) -> Option<&'static str> {
        self.clocksource.lock(|cs| cs.map(|cs| cs.device.name()))
    }

    /// Name of the clock-event device currently delivering ticks.
    pub fn current_clockevent(&self) -> Option<&'static str> {
        self.clockevent.lock(|ced| ced.map(|ced| ced.name()))
    }

    /// Time since the clocksource was enabled, or since the first tick without one.
    pub fn uptime(&self) -> Duration {
        let source = self.clocksource.lock(|cs| *cs);

        match source {
            Some(cs) => cycles_to_duration(cs.device.read(), cs.frequency),
            None => cycles_to_duration(self.jiffies(), self.hz),
        }
    }

    /// System sleep entry: park the clocksource, then the tick device.
    pub fn suspend(&self) {
        if let Some(cs) = self.clocksource.lock(|cs| *cs) {
            cs.device.suspend();
        }
        if let Some(ced) = self.clockevent.lock(|ced| *ced) {
            ced.suspend();
        }
    }

    /// System sleep exit, in reverse order of `suspend`.
    pub fn resume(&self) {
        if let Some(ced) = self.clockevent.lock(|ced| *ced) {
            ced.resume();
        }
        if let Some(cs) = self.clocksource.lock(|cs| *cs) {
            cs.device.resume();
        }
    }
}

impl ClockEventHandler for TimeManager {
    fn event(&self) {
        self.jiffies.fetch_add(1, Ordering::Relaxed);

        // Reading once per tick keeps the clocksource's wrap accounting fed.
        if let Some(cs) = self.clocksource.lock(|cs| *cs) {
            cs.device.read();
        }
    }
}

impl TimeSubsystem for TimeManager {
    fn register_clockevent(&'static self, ced: &'static (dyn ClockEventDevice + Sync)) {
        if !ced.features().contains(ClockEventFeatures::PERIODIC) {
            warn!("{}: no periodic mode, not used for ticks", ced.name());
            return;
        }

        self.clockevent.lock(|current| {
            if let Some(old) = current {
                if old.rating() >= ced.rating() {
                    info!("{}: keeping {} for ticks", ced.name(), old.name());
                    return;
                }
            }

            ced.set_event_handler(self);
            if let Err(e) = ced.set_state_periodic() {
                warn!("{}: cannot switch to periodic mode: {}", ced.name(), e);
                return;
            }

            if let Some(old) = current.replace(ced) {
                if let Err(e) = old.set_state_shutdown() {
                    warn!("{}: shutdown failed: {}", old.name(), e);
                }
            }
            info!("{}: delivering ticks at {} Hz", ced.name(), self.hz);
        })
    }

    fn register_clocksource(&'static self, cs: &'static (dyn ClockSourceDevice + Sync), hz: u64) {
        let frequency = match NonZeroU64::new(hz) {
            Some(f) => f,
            None => {
                warn!("{}: refusing clocksource with a zero rate", cs.name());
                return;
            }
        };

        self.clocksource.lock(|current| {
            if let Some(old) = current {
                if old.device.rating() >= cs.rating() {
                    info!("{}: keeping {} for timekeeping", cs.name(), old.device.name());
                    return;
                }
            }

            if let Err(e) = cs.enable() {
                warn!("{}: cannot enable clocksource: {}", cs.name(), e);
                return;
            }

            let new = RegisteredClockSource {
                device: cs,
                frequency,
            };
            if let Some(old) = current.replace(new) {
                old.device.disable();
            }
            info!("{}: switched to clocksource at {} Hz", cs.name(), hz);
        })
    }
}
