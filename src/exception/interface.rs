// SPDX-License-Identifier: MIT
use crate::exception::asynchronous::IRQHandlerDescriptor;

pub trait IRQHandler {
    /// Called from interrupt context. Must not block.
    fn handle(&self) -> Result<(), &'static str>;
}

/// The interrupt controller as seen by peripheral drivers.
pub trait IRQManager {
    type IRQNumberType: Copy;

    fn register_handler(
        &self,
        ih_desc: IRQHandlerDescriptor<Self::IRQNumberType>,
    ) -> Result<(), &'static str>;

    /// Drop a handler again. Only used to unwind a driver whose bring-up failed.
    fn unregister_handler(&self, irq_number: &Self::IRQNumberType);

    fn enable(&self, irq_number: &Self::IRQNumberType);
}
