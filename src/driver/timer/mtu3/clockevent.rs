// SPDX-License-Identifier: MIT
//! Clock-event side of a channel: periodic ticks from compare match A.

use log::info;

use super::channel::{Channel, Role};
use crate::sync::interface::Mutex;
use crate::time::interface::{
    ClockEventDevice, ClockEventFeatures, ClockEventHandler, ClockEventState,
};
use crate::Error;

pub(super) struct ClockEventSlot {
    pub(super) state: ClockEventState,
    pub(super) handler: Option<&'static (dyn ClockEventHandler + Sync)>,
}

impl ClockEventSlot {
    pub(super) const fn new() -> Self {
        Self {
            state: ClockEventState::Shutdown,
            handler: None,
        }
    }
}

impl ClockEventDevice for Channel {
    fn name(&self) -> &'static str {
        self.mtu().name()
    }

    fn features(&self) -> ClockEventFeatures {
        ClockEventFeatures::PERIODIC
    }

    fn rating(&self) -> u32 {
        self.mtu().config().clockevent_rating()
    }

    fn state(&self) -> ClockEventState {
        self.clockevent.lock(|ced| ced.state)
    }

    fn set_event_handler(&self, handler: &'static (dyn ClockEventHandler + Sync)) {
        self.clockevent.lock(|ced| ced.handler = Some(handler))
    }

    fn set_state_shutdown(&self) -> Result<(), Error> {
        self.clockevent.lock(|ced| {
            if ced.state == ClockEventState::Periodic {
                self.force_stop(Role::ClockEvent);
            }
            ced.state = ClockEventState::Shutdown;
        });

        Ok(())
    }

    fn set_state_periodic(&self) -> Result<(), Error> {
        self.clockevent.lock(|ced| -> Result<(), Error> {
            if ced.state == ClockEventState::Periodic {
                self.force_stop(Role::ClockEvent);
                ced.state = ClockEventState::Shutdown;
            }

            info!("ch{}: used for periodic clock events", self.index());
            self.start(Role::ClockEvent)?;
            ced.state = ClockEventState::Periodic;

            Ok(())
        })
    }

    fn suspend(&self) {
        self.mtu().power().syscore_power_off();
    }

    fn resume(&self) {
        self.mtu().power().syscore_power_on();
    }
}
