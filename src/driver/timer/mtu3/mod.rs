// SPDX-License-Identifier: MIT
//! MTU3 Driver - multi-function timer pulse unit 3.
//!
//! Two channels of the unit are put to work for the time core:
//!
//! | Channel | Role | Interrupt |
//! |---------|------|-----------|
//! | 0 | periodic clock events | `tgi0a`, compare match A |
//! | 1 | free-running clocksource | `tgi1a`, never enabled |
//!
//! Both channels start and stop through one shared register. The device owns that register
//! and serializes every update of it behind its own lock; channels only ever ask the device to
//! flip their run bit.

use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error, info, warn};
use tock_registers::interfaces::{Readable, Writeable};

use crate::bsp::rzg2l::{self, map, Config};
use crate::driver::platform::{Clock, Platform, PowerDomain};
use crate::driver::{interface, DriverLoadOrder};
use crate::exception::asynchronous::{IRQHandlerDescriptor, IRQNumber};
use crate::exception::interface::IRQManager;
use crate::sync::interface::Mutex;
use crate::sync::{IRQSafeSpinLock, OnceCell};
use crate::time::interface::TimeSubsystem;
use crate::Error;

mod channel;
mod clockevent;
mod clocksource;
mod irq;
pub mod registers;

pub use channel::{Channel, ChannelFlags, Role};

use registers::{SharedRegisters, REGISTER_WINDOW_SIZE};

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

pub const NUM_CHANNELS: usize = 2;

/// Width of the hardware counter.
pub const COUNTER_MASK: u64 = 0xffff;

/// Cycles per full turn of the hardware counter.
pub const COUNTER_RANGE: u64 = COUNTER_MASK + 1;

/// Representation of one MTU3 unit.
pub struct Mtu3 {
    platform: &'static (dyn Platform + Sync),
    irq_manager: &'static (dyn IRQManager<IRQNumberType = IRQNumber> + Sync),
    time: &'static (dyn TimeSubsystem + Sync),
    config: Config,
    probed: AtomicBool,
    resources: OnceCell<Resources>,
    /// The start/stop register is shared by all channels.
    shared: OnceCell<IRQSafeSpinLock<SharedRegisters>>,
    channels: [Channel; NUM_CHANNELS],
}

//--------------------------------------------------------------------------------------------------
// Private Definitions
//--------------------------------------------------------------------------------------------------

struct Resources {
    clock: &'static (dyn Clock + Sync),
    /// Counter rate after the fixed prescaler.
    rate: u64,
}

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

impl Mtu3 {
    /// Create an instance. Nothing touches the hardware before `init`.
    pub const fn new(
        platform: &'static (dyn Platform + Sync),
        irq_manager: &'static (dyn IRQManager<IRQNumberType = IRQNumber> + Sync),
        time: &'static (dyn TimeSubsystem + Sync),
        config: Config,
    ) -> Self {
        Self {
            platform,
            irq_manager,
            time,
            config,
            probed: AtomicBool::new(false),
            resources: OnceCell::new(),
            shared: OnceCell::new(),
            channels: [Channel::new(0), Channel::new(1)],
        }
    }

    pub fn name(&self) -> &'static str {
        self.platform.device_name()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    /// Counter rate in Hz, i.e. the functional clock divided by the prescaler.
    pub fn rate(&self) -> u64 {
        self.resources.rate
    }

    /// Start or stop `ch` by flipping its bit in the shared start/stop register.
    ///
    /// Must not be called with the shared-register lock held.
    pub fn set_running(&self, ch: &Channel, run: bool) {
        let bit = 1u8 << ch.index();

        self.shared.lock(|regs| {
            let mut value = regs.TSTRA.get();
            if run {
                value |= bit;
            } else {
                value &= !bit;
            }
            regs.TSTRA.set(value);

            // Read back so the posted write lands before the lock is dropped.
            let _ = regs.TSTRA.get();
        })
    }

    /// Whether the run bit of `ch` is set in the shared start/stop register.
    pub fn is_running(&self, ch: &Channel) -> bool {
        let bit = 1u8 << ch.index();

        self.shared.lock(|regs| regs.TSTRA.get() & bit != 0)
    }

    /// Bring up the unit and register its channels with the time core.
    ///
    /// A failed bring-up releases everything it acquired and may be retried.
    ///
    /// # Safety
    ///
    /// - The platform must map the real MTU3 register window.
    pub unsafe fn probe(&'static self) -> Result<(), Error> {
        if self.probed.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyProbed);
        }

        let power = self.power();
        power.runtime_enable();

        match self.setup() {
            Ok(true) => {
                power.runtime_irq_safe();
                Ok(())
            }
            Ok(false) => {
                power.runtime_idle();
                Ok(())
            }
            Err(e) => {
                power.runtime_idle();
                self.probed.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    //----------------------------------------------------------------------------------------------
    // Crate-internal accessors used by the channels
    //----------------------------------------------------------------------------------------------

    pub(crate) fn clock(&self) -> &'static (dyn Clock + Sync) {
        self.resources.clock
    }

    pub(crate) fn power(&self) -> &'static (dyn PowerDomain + Sync) {
        self.platform.power_domain()
    }

    /// Compare value giving one compare match per kernel tick, rounded to nearest.
    pub(crate) fn periodic_cycles(&self) -> u16 {
        let hz = u64::from(self.config.hz().get());
        let periodic = (self.rate() + hz / 2) / hz;

        u16::try_from(periodic).unwrap_or_else(|_| {
            warn!(
                "{}: {} cycles per tick exceed the compare register, clamping",
                self.name(),
                periodic
            );
            u16::MAX
        })
    }

    //----------------------------------------------------------------------------------------------
    // Private code
    //----------------------------------------------------------------------------------------------

    /// Returns whether a clock-event channel was registered.
    unsafe fn setup(&'static self) -> Result<bool, Error> {
        match self.platform.reset_control() {
            Some(rstc) => {
                if let Err(e) = rstc.deassert() {
                    warn!("{}: failed to deassert reset: {}", self.name(), e);
                }
            }
            None => warn!("{}: failed to get cpg reset", self.name()),
        }

        let clock = self.platform.clock(rzg2l::CLOCK_NAME).ok_or_else(|| {
            error!("{}: cannot get clock", self.name());
            Error::ClockUnavailable(rzg2l::CLOCK_NAME)
        })?;

        clock.prepare().map_err(Error::ClockSetup)?;

        // The rate is only stable while the clock runs.
        if let Err(e) = clock.enable() {
            clock.unprepare();
            return Err(Error::ClockSetup(e));
        }
        let rate = clock.rate() / rzg2l::PRESCALE;
        clock.disable();

        let mapbase = match self.platform.map_registers(REGISTER_WINDOW_SIZE) {
            Ok(base) => base,
            Err(e) => {
                error!("{}: failed to remap I/O memory", self.name());
                clock.unprepare();
                return Err(Error::MapRegisters(e));
            }
        };

        let mut irqs: [Option<IRQNumber>; NUM_CHANNELS] = [None; NUM_CHANNELS];
        for ch in &self.channels {
            ch.attach(self, mapbase + map::CHANNEL_OFFSETS[ch.index()]);

            match self.request_irq(ch) {
                Ok(irq) => irqs[ch.index()] = irq,
                Err(e) => {
                    for irq in irqs.iter().flatten() {
                        self.irq_manager.unregister_handler(irq);
                    }
                    self.platform.unmap_registers(mapbase);
                    clock.unprepare();
                    return Err(e);
                }
            }
        }

        self.resources.set(Resources { clock, rate });
        self.shared
            .set(IRQSafeSpinLock::new(SharedRegisters::new(mapbase)));

        let hz = u64::from(self.config.hz().get());
        if rate > wrap_budget(hz) {
            warn!(
                "{}: counter wraps faster than the {} Hz tick, time will be lost",
                self.name(),
                hz
            );
        }

        let has_clockevent = self
            .channels
            .iter()
            .any(|ch| ch.role() == Role::ClockEvent && irqs[ch.index()].is_some());

        for ch in &self.channels {
            if irqs[ch.index()].is_none() {
                continue;
            }

            match ch.role() {
                Role::ClockEvent => {
                    info!("ch{}: used for clock events", ch.index());
                    self.time.register_clockevent(ch);
                }
                Role::ClockSource => {
                    info!("ch{}: used as clock source", ch.index());
                    if !has_clockevent {
                        warn!(
                            "ch{}: no tick source reads the counter, wraps may go unnoticed",
                            ch.index()
                        );
                    }
                    self.time.register_clocksource(ch, rate);
                }
            }
        }

        Ok(has_clockevent)
    }

    /// Hook up the compare-match interrupt of `ch`. Channels without one are skipped.
    fn request_irq(&'static self, ch: &'static Channel) -> Result<Option<IRQNumber>, Error> {
        let name = map::CHANNEL_IRQ_NAMES[ch.index()];

        let irq = match self.platform.irq_by_name(name) {
            Some(irq) => irq,
            None => {
                debug!("ch{}: no `{}` interrupt declared, skipping", ch.index(), name);
                return Ok(None);
            }
        };

        let descriptor = IRQHandlerDescriptor::new(irq, name, ch);
        if let Err(reason) = self.irq_manager.register_handler(descriptor) {
            error!("ch{}: failed to request irq {}", ch.index(), irq);
            return Err(Error::RequestIrq {
                channel: ch.index(),
                irq,
                reason,
            });
        }
        self.irq_manager.enable(&irq);

        Ok(Some(irq))
    }
}

/// Highest counter rate whose wrap period still spans one tick at `hz`.
fn wrap_budget(hz: u64) -> u64 {
    COUNTER_RANGE.saturating_mul(hz)
}

impl interface::DeviceDriver for Mtu3 {
    type Error = Error;

    fn load_order(&self) -> DriverLoadOrder {
        DriverLoadOrder::Early
    }

    fn compatible(&self) -> &'static str {
        rzg2l::COMPATIBLE
    }

    unsafe fn init(&'static self) -> Result<(), Self::Error> {
        self.probe()
    }

    /// Clock events and clocksources cannot be unregistered once the time core holds them.
    fn remove(&self) -> Result<(), Self::Error> {
        Err(Error::Busy)
    }
}
