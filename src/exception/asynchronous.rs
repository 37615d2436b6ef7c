// SPDX-License-Identifier: MIT
use crate::driver::BoundedUsize;
use crate::exception::interface;

/// Highest interrupt ID a GICv2-style controller can deliver to a shared peripheral.
pub const MAX_IRQ_NUMBER: usize = 1019;

pub type IRQNumber = BoundedUsize<{ MAX_IRQ_NUMBER }>;

#[derive(Copy, Clone)]
pub struct IRQHandlerDescriptor<T> where T: Copy {
    number: T,
    name: &'static str,
    handler: &'static (dyn interface::IRQHandler + Sync),
}

impl<T> IRQHandlerDescriptor<T> where T: Copy {
    pub const fn new(
        number: T,
        name: &'static str,
        handler: &'static (dyn interface::IRQHandler + Sync),
    ) -> Self {
        Self {
            number,
            name,
            handler,
        }
    }

    pub fn number(&self) -> T {
        self.number
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn handler(&self) -> &'static (dyn interface::IRQHandler + Sync) {
        self.handler
    }
}

/// Run `f` with local interrupts masked.
///
/// Masking goes through the `critical-section` implementation registered by the kernel, which
/// saves and restores the previous mask state, so calls nest.
#[inline(always)]
pub fn exec_with_masked_irqs<T>(f: impl FnOnce() -> T) -> T {
    critical_section::with(|_cs| f())
}
