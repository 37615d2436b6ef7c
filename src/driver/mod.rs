// SPDX-License-Identifier: MIT
pub use common::*;

mod common;

pub mod platform;
pub mod timer;

pub mod interface {
    use core::fmt;

    use crate::driver::DriverLoadOrder;

    pub trait DeviceDriver {
        type Error: fmt::Display;

        /// Describes the load order of the driver.
        fn load_order(&self) -> DriverLoadOrder;

        /// A string describing the device driver.
        fn compatible(&self) -> &'static str;

        /// Called by the kernel to bring up the device.
        ///
        /// # Safety
        ///
        /// - The platform must describe the real register window of the device.
        unsafe fn init(&'static self) -> Result<(), Self::Error>;

        /// Called by the kernel to detach the device again.
        fn remove(&self) -> Result<(), Self::Error>;
    }
}

#[allow(dead_code)]
#[derive(Debug, Eq, PartialEq)]
pub enum DriverLoadOrder {
    /// The interrupt controller driver is always loaded first.
    InterruptController,

    /// The driver is loaded very early in the boot process, after the interrupt controller.
    /// System timers live here so that timekeeping is up before anything sleeps.
    Early,

    /// The driver is loaded at the normal probe-and-load stage of the boot process.
    Normal,

    /// The driver is not loaded at boot, and must be loaded manually.
    Manual,
}
