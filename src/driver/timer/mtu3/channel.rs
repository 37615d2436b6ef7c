// SPDX-License-Identifier: MIT
//! One MTU3 channel and its reference-counted enable state.
//!
//! A channel is active while it holds at least one role. The first role switches the hardware
//! on, the last one to go switches it off again.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use bitflags::bitflags;
use log::error;
use tock_registers::interfaces::{Readable, Writeable};

use super::clockevent::ClockEventSlot;
use super::registers::{ChannelRegisters, TCR, TIER, TIOR, TMDR};
use super::Mtu3;
use crate::sync::interface::Mutex;
use crate::sync::{IRQSafeSpinLock, OnceCell};
use crate::Error;

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

bitflags! {
    /// What a channel is currently used for.
    pub struct ChannelFlags: u8 {
        const CLOCKEVENT = 1 << 0;
        const CLOCKSOURCE = 1 << 1;
        const REPROGRAM = 1 << 2;
        const SKIPEVENT = 1 << 3;
        const IRQCONTEXT = 1 << 4;

        /// Roles that keep the hardware running.
        const ROLES = Self::CLOCKEVENT.bits | Self::CLOCKSOURCE.bits;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    ClockEvent,
    ClockSource,
}

pub struct Channel {
    index: usize,
    role: Role,
    mtu: OnceCell<&'static Mtu3>,
    /// Mapped sub-block of this channel, zero until attached.
    base: AtomicUsize,
    pub(super) state: IRQSafeSpinLock<ChannelState>,
    pub(super) clockevent: IRQSafeSpinLock<ClockEventSlot>,
    /// Clocksource enable state as seen by the time core, tracked apart from the role flags.
    pub(super) cs_enabled: AtomicBool,
    misuse: AtomicU32,
}

//--------------------------------------------------------------------------------------------------
// Private Definitions
//--------------------------------------------------------------------------------------------------

pub(super) struct ChannelState {
    pub(super) flags: ChannelFlags,
    /// Cycles accounted for by completed counter wraps.
    pub(super) total_cycles: u64,
    /// Counter value seen by the previous read.
    pub(super) last_raw: u16,
}

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

impl Role {
    /// Even channels tick, odd channels count.
    pub const fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Role::ClockEvent
        } else {
            Role::ClockSource
        }
    }

    pub const fn flag(self) -> ChannelFlags {
        match self {
            Role::ClockEvent => ChannelFlags::CLOCKEVENT,
            Role::ClockSource => ChannelFlags::CLOCKSOURCE,
        }
    }
}

impl Channel {
    pub(super) const fn new(index: usize) -> Self {
        Self {
            index,
            role: Role::for_index(index),
            mtu: OnceCell::new(),
            base: AtomicUsize::new(0),
            state: IRQSafeSpinLock::new(ChannelState {
                flags: ChannelFlags::empty(),
                total_cycles: 0,
                last_raw: 0,
            }),
            clockevent: IRQSafeSpinLock::new(ClockEventSlot::new()),
            cs_enabled: AtomicBool::new(false),
            misuse: AtomicU32::new(0),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The role this channel was assigned at construction.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Snapshot of the role flags.
    pub fn roles(&self) -> ChannelFlags {
        self.state.lock(|state| state.flags)
    }

    /// Number of enable/disable requests that did not match the clocksource state.
    pub fn misuse_reports(&self) -> u32 {
        self.misuse.load(Ordering::Relaxed)
    }

    /// Take `role`, switching the hardware on if the channel was idle.
    ///
    /// A failed switch-on leaves the role flags untouched.
    pub fn start(&self, role: Role) -> Result<(), Error> {
        self.state.lock(|state| -> Result<(), Error> {
            if !state.flags.intersects(ChannelFlags::ROLES) {
                self.enable_hw()?;
            }

            if role == Role::ClockSource {
                state.last_raw = self.raw_counter();
            }
            state.flags.insert(role.flag());

            Ok(())
        })
    }

    /// Drop `role`, switching the hardware off if it was the last one.
    pub fn stop(&self, role: Role) {
        self.state.lock(|state| {
            let was_active = state.flags.intersects(ChannelFlags::ROLES);
            state.flags.remove(role.flag());

            if was_active && !state.flags.intersects(ChannelFlags::ROLES) {
                self.disable_hw();
            }
        })
    }

    //----------------------------------------------------------------------------------------------
    // Module-internal code
    //----------------------------------------------------------------------------------------------

    /// Point the channel at its register sub-block. A retried bring-up attaches again.
    ///
    /// # Safety
    ///
    /// - `base` must be the mapped sub-block of this channel.
    pub(super) unsafe fn attach(&self, mtu: &'static Mtu3, base: usize) {
        if self.mtu.get().is_none() {
            self.mtu.set(mtu);
        }
        self.base.store(base, Ordering::Release);
    }

    pub(super) fn mtu(&self) -> &'static Mtu3 {
        *self.mtu
    }

    pub(super) fn registers(&self) -> ChannelRegisters {
        let base = self.base.load(Ordering::Acquire);
        assert!(base != 0, "ch{}: registers used before attach", self.index);

        // SAFETY: `attach` only stores mapped sub-block addresses.
        unsafe { ChannelRegisters::new(base) }
    }

    pub(super) fn raw_counter(&self) -> u16 {
        self.registers().TCNT.get()
    }

    /// Switch the hardware off and drop `role`, whatever the role flags say.
    pub(super) fn force_stop(&self, role: Role) {
        self.state.lock(|state| {
            self.disable_hw();
            state.flags.remove(role.flag());
        })
    }

    pub(super) fn report_misuse(&self, what: &str) {
        self.misuse.fetch_add(1, Ordering::Relaxed);
        error!("ch{}: {}", self.index, what);
    }

    //----------------------------------------------------------------------------------------------
    // Private code
    //----------------------------------------------------------------------------------------------

    fn enable_hw(&self) -> Result<(), Error> {
        let mtu = self.mtu();
        let power = mtu.power();

        power.runtime_get_sync();
        power.set_syscore(true);

        if let Err(reason) = mtu.clock().enable() {
            error!("ch{}: cannot enable clock", self.index);
            power.set_syscore(false);
            power.runtime_put();
            return Err(Error::ClockEnable {
                channel: self.index,
                reason,
            });
        }

        // Stop the counter before reprogramming it.
        mtu.set_running(self, false);

        let regs = self.registers();
        match self.role {
            Role::ClockSource => {
                regs.TCR.write(TCR::TPSC::Div64);
                regs.TIER.set(0);
            }
            Role::ClockEvent => {
                regs.TCR.write(TCR::CCLR::TGRA + TCR::TPSC::Div64);
                regs.TIOR.write(TIOR::IOCH::Out0Clear + TIOR::IOCL::Out0Clear);
                regs.TGRA.set(mtu.periodic_cycles());
                regs.TMDR.write(TMDR::MD::Normal);
                regs.TIER.write(TIER::TGIEA::SET);
            }
        }

        mtu.set_running(self, true);

        Ok(())
    }

    fn disable_hw(&self) {
        let mtu = self.mtu();
        let power = mtu.power();

        mtu.set_running(self, false);
        mtu.clock().disable();

        power.set_syscore(false);
        power.runtime_put();
    }
}
