// SPDX-License-Identifier: MIT
//! Compare-match interrupt of a channel.

use log::debug;
use tock_registers::interfaces::ReadWriteable;

use super::channel::{Channel, ChannelFlags};
use super::registers::TSR;
use crate::exception::interface::IRQHandler;
use crate::sync::interface::Mutex;

impl IRQHandler for Channel {
    fn handle(&self) -> Result<(), &'static str> {
        // The flag stays set until cleared, acknowledge first.
        self.registers().TSR.modify(TSR::TGFA::CLEAR);

        let ticking = self
            .state
            .lock(|state| state.flags.contains(ChannelFlags::CLOCKEVENT));
        if !ticking {
            debug!("ch{}: unexpected interrupt", self.index());
            return Ok(());
        }

        // The handler runs without any channel lock held.
        if let Some(handler) = self.clockevent.lock(|ced| ced.handler) {
            handler.event();
        }

        Ok(())
    }
}
