// SPDX-License-Identifier: MIT
//! Services a peripheral driver consumes from the platform it is attached to.
//!
//! Resource discovery, clocks, reset lines and power domains are owned by the kernel's
//! platform layer. Drivers only see them through these traits.

use crate::exception::asynchronous::IRQNumber;

/// A functional clock feeding a peripheral.
///
/// `enable`/`disable` are counted by the provider; enabling twice and disabling twice must
/// leave the clock running exactly as long as the outermost pair.
pub trait Clock {
    fn prepare(&self) -> Result<(), &'static str>;

    fn unprepare(&self);

    fn enable(&self) -> Result<(), &'static str>;

    fn disable(&self);

    /// Current rate in Hz.
    fn rate(&self) -> u64;
}

pub trait ResetControl {
    fn deassert(&self) -> Result<(), &'static str>;
}

/// Runtime and system-sleep power management of the domain a device sits in.
///
/// Every hook defaults to a no-op so that always-on domains need no implementation.
pub trait PowerDomain {
    /// Mark the device active and allow runtime power management.
    fn runtime_enable(&self) {}

    /// Take a runtime reference, powering the domain up synchronously.
    fn runtime_get_sync(&self) {}

    /// Drop a runtime reference.
    fn runtime_put(&self) {}

    /// Let the domain idle if nothing holds a reference.
    fn runtime_idle(&self) {}

    /// Runtime callbacks of this device may run with interrupts disabled.
    fn runtime_irq_safe(&self) {}

    /// Flag the device as a syscore device, which the domain must not power off on its own
    /// during system suspend.
    fn set_syscore(&self, _syscore: bool) {}

    /// Power the domain off from the syscore suspend path.
    fn syscore_power_off(&self) {}

    /// Power the domain on from the syscore resume path.
    fn syscore_power_on(&self) {}
}

/// Resource discovery for one platform device.
pub trait Platform {
    /// Name of the device instance, used to name registered clock devices.
    fn device_name(&self) -> &'static str;

    /// Map at least `size` bytes of the device's register window and return its virtual base
    /// address.
    fn map_registers(&self, size: usize) -> Result<usize, &'static str>;

    fn unmap_registers(&self, base: usize);

    /// Look up an interrupt line by its name in the device description.
    fn irq_by_name(&self, name: &str) -> Option<IRQNumber>;

    fn clock(&self, name: &str) -> Option<&'static (dyn Clock + Sync)>;

    fn reset_control(&self) -> Option<&'static (dyn ResetControl + Sync)>;

    fn power_domain(&self) -> &'static (dyn PowerDomain + Sync);
}
