// SPDX-License-Identifier: MIT
//! Fake platform collaborators and a heap-backed register window for driving the MTU3 driver
//! on the host.

#![allow(dead_code)]

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

use log::{LevelFilter, Log, Metadata, Record};

use flow_mtu3::bsp::rzg2l::Config;
use flow_mtu3::driver::interface::DeviceDriver;
use flow_mtu3::driver::platform::{Clock, Platform, PowerDomain, ResetControl};
use flow_mtu3::exception::asynchronous::{IRQHandlerDescriptor, IRQNumber};
use flow_mtu3::exception::interface::IRQManager;
use flow_mtu3::time::interface::{
    ClockEventDevice, ClockEventHandler, ClockSourceDevice, TimeSubsystem,
};
use flow_mtu3::{Error, Mtu3};

pub const DEVICE_NAME: &str = "10001200.timer";

/// Functional clock of the fake board, 1 MHz after the /64 prescaler.
pub const FCK_RATE: u64 = 64_000_000;

pub const CH0_BASE: usize = 0x100;
pub const CH1_BASE: usize = 0x180;

pub const TCR: usize = 0x0;
pub const TMDR: usize = 0x1;
pub const TIOR: usize = 0x2;
pub const TIER: usize = 0x4;
pub const TSR: usize = 0x5;
pub const TCNT: usize = 0x6;
pub const TGRA: usize = 0x8;

pub const TSTRA: usize = 0x80;

pub fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

//--------------------------------------------------------------------------------------------------
// Host critical section
//--------------------------------------------------------------------------------------------------

// Host threads have no interrupts to mask. Sections only track nesting per thread, so the
// driver's spin locks are the only thing serializing threads.
struct HostCriticalSection;
critical_section::set_impl!(HostCriticalSection);

thread_local! {
    static SECTION_DEPTH: Cell<usize> = Cell::new(0);
}

unsafe impl critical_section::Impl for HostCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        SECTION_DEPTH.with(|depth| depth.set(depth.get() + 1));
    }

    unsafe fn release(_restore_state: critical_section::RawRestoreState) {
        SECTION_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

//--------------------------------------------------------------------------------------------------
// Log capture
//--------------------------------------------------------------------------------------------------

struct CaptureLogger {
    lines: Mutex<Vec<String>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let line = format!("{}: {}", record.level(), record.args());
        self.lines.lock().unwrap().push(line);
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    lines: Mutex::new(Vec::new()),
};
static LOGGER_INIT: Once = Once::new();

/// Route driver logs into memory. Tests share the process, so match on specific text.
pub fn capture_logs() {
    LOGGER_INIT.call_once(|| {
        log::set_logger(&LOGGER).expect("logger");
        log::set_max_level(LevelFilter::Trace);
    });
}

pub fn logged(needle: &str) -> bool {
    LOGGER
        .lines
        .lock()
        .unwrap()
        .iter()
        .any(|line| line.contains(needle))
}

//--------------------------------------------------------------------------------------------------
// Register window
//--------------------------------------------------------------------------------------------------

pub const WINDOW_SIZE: usize = 0x1000;

#[repr(C, align(4096))]
struct Window([u8; WINDOW_SIZE]);

/// Plain host memory standing in for the mapped MTU3 block.
#[derive(Clone, Copy)]
pub struct FakeMmio {
    base: usize,
}

impl FakeMmio {
    pub fn new() -> Self {
        let window: &'static mut Window = Box::leak(Box::new(Window([0; WINDOW_SIZE])));
        Self {
            base: window.0.as_mut_ptr() as usize,
        }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn read8(&self, offset: usize) -> u8 {
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u8) }
    }

    pub fn write8(&self, offset: usize, value: u8) {
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u8, value) }
    }

    pub fn read16(&self, offset: usize) -> u16 {
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u16) }
    }

    pub fn write16(&self, offset: usize, value: u16) {
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u16, value) }
    }

    pub fn snapshot(&self) -> Vec<u8> {
        (0..WINDOW_SIZE).map(|offset| self.read8(offset)).collect()
    }
}

//--------------------------------------------------------------------------------------------------
// Clock, reset, power
//--------------------------------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeClock {
    pub rate: AtomicU64,
    pub prepared: AtomicI64,
    /// Net enable count.
    pub enabled: AtomicI64,
    pub enable_calls: AtomicU32,
    pub fail_prepare: AtomicBool,
    pub fail_enable: AtomicBool,
}

impl FakeClock {
    pub fn with_rate(rate: u64) -> Self {
        let clock = Self::default();
        clock.rate.store(rate, Ordering::Relaxed);
        clock
    }

    pub fn enabled(&self) -> i64 {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn prepared(&self) -> i64 {
        self.prepared.load(Ordering::SeqCst)
    }
}

impl Clock for FakeClock {
    fn prepare(&self) -> Result<(), &'static str> {
        if self.fail_prepare.load(Ordering::SeqCst) {
            return Err("prepare refused");
        }
        self.prepared.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unprepare(&self) {
        self.prepared.fetch_sub(1, Ordering::SeqCst);
    }

    fn enable(&self) -> Result<(), &'static str> {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_enable.load(Ordering::SeqCst) {
            return Err("enable refused");
        }
        self.enabled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn disable(&self) {
        self.enabled.fetch_sub(1, Ordering::SeqCst);
    }

    fn rate(&self) -> u64 {
        self.rate.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct FakeReset {
    pub deasserted: AtomicU32,
    pub fail: AtomicBool,
}

impl ResetControl for FakeReset {
    fn deassert(&self) -> Result<(), &'static str> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("reset stuck");
        }
        self.deasserted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakePower {
    pub runtime_enabled: AtomicU32,
    /// Net runtime reference count.
    pub references: AtomicI64,
    pub idle: AtomicU32,
    pub irq_safe: AtomicBool,
    pub syscore: AtomicBool,
    pub power_off: AtomicU32,
    pub power_on: AtomicU32,
}

impl FakePower {
    pub fn references(&self) -> i64 {
        self.references.load(Ordering::SeqCst)
    }

    pub fn syscore(&self) -> bool {
        self.syscore.load(Ordering::SeqCst)
    }
}

impl PowerDomain for FakePower {
    fn runtime_enable(&self) {
        self.runtime_enabled.fetch_add(1, Ordering::SeqCst);
    }

    fn runtime_get_sync(&self) {
        self.references.fetch_add(1, Ordering::SeqCst);
    }

    fn runtime_put(&self) {
        self.references.fetch_sub(1, Ordering::SeqCst);
    }

    fn runtime_idle(&self) {
        self.idle.fetch_add(1, Ordering::SeqCst);
    }

    fn runtime_irq_safe(&self) {
        self.irq_safe.store(true, Ordering::SeqCst);
    }

    fn set_syscore(&self, syscore: bool) {
        self.syscore.store(syscore, Ordering::SeqCst);
    }

    fn syscore_power_off(&self) {
        self.power_off.fetch_add(1, Ordering::SeqCst);
    }

    fn syscore_power_on(&self) {
        self.power_on.fetch_add(1, Ordering::SeqCst);
    }
}

//--------------------------------------------------------------------------------------------------
// Interrupt controller
//--------------------------------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeIrqManager {
    handlers: Mutex<Vec<IRQHandlerDescriptor<IRQNumber>>>,
    enabled: Mutex<Vec<usize>>,
    /// Refuse registration of this line.
    pub refuse: Mutex<Option<usize>>,
}

impl FakeIrqManager {
    pub fn registered(&self) -> Vec<(usize, &'static str)> {
        self.handlers
            .lock()
            .unwrap()
            .iter()
            .map(|d| (d.number().get(), d.name()))
            .collect()
    }

    pub fn enabled(&self) -> Vec<usize> {
        self.enabled.lock().unwrap().clone()
    }

    /// Deliver interrupt `irq` to its handler, as the controller's dispatch loop would.
    pub fn fire(&self, irq: usize) -> Result<(), &'static str> {
        let handler = self
            .handlers
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.number().get() == irq)
            .map(|d| d.handler())
            .ok_or("no handler")?;

        handler.handle()
    }
}

impl IRQManager for FakeIrqManager {
    type IRQNumberType = IRQNumber;

    fn register_handler(
        &self,
        ih_desc: IRQHandlerDescriptor<Self::IRQNumberType>,
    ) -> Result<(), &'static str> {
        if *self.refuse.lock().unwrap() == Some(ih_desc.number().get()) {
            return Err("line busy");
        }

        let mut handlers = self.handlers.lock().unwrap();
        if handlers.iter().any(|d| d.number() == ih_desc.number()) {
            return Err("handler already registered");
        }
        handlers.push(ih_desc);
        Ok(())
    }

    fn unregister_handler(&self, irq_number: &Self::IRQNumberType) {
        self.handlers
            .lock()
            .unwrap()
            .retain(|d| d.number() != *irq_number);
        self.enabled
            .lock()
            .unwrap()
            .retain(|n| *n != irq_number.get());
    }

    fn enable(&self, irq_number: &Self::IRQNumberType) {
        self.enabled.lock().unwrap().push(irq_number.get());
    }
}

//--------------------------------------------------------------------------------------------------
// Platform
//--------------------------------------------------------------------------------------------------

pub const TGI0A: usize = 218;
pub const TGI1A: usize = 226;

pub struct FakePlatform {
    pub mmio: FakeMmio,
    pub clock: &'static FakeClock,
    pub reset: &'static FakeReset,
    pub power: &'static FakePower,
    pub clock_missing: AtomicBool,
    pub reset_missing: AtomicBool,
    pub map_fails: AtomicBool,
    pub mapped_size: AtomicUsize,
    pub unmapped: AtomicU32,
    pub irq_lines: Mutex<Vec<(&'static str, usize)>>,
}

impl FakePlatform {
    pub fn new(clock: &'static FakeClock) -> Self {
        Self {
            mmio: FakeMmio::new(),
            clock,
            reset: leak(FakeReset::default()),
            power: leak(FakePower::default()),
            clock_missing: AtomicBool::new(false),
            reset_missing: AtomicBool::new(false),
            map_fails: AtomicBool::new(false),
            mapped_size: AtomicUsize::new(0),
            unmapped: AtomicU32::new(0),
            irq_lines: Mutex::new(vec![("tgi0a", TGI0A), ("tgi1a", TGI1A)]),
        }
    }

    pub fn drop_irq_line(&self, name: &str) {
        self.irq_lines.lock().unwrap().retain(|(n, _)| *n != name);
    }
}

impl Platform for FakePlatform {
    fn device_name(&self) -> &'static str {
        DEVICE_NAME
    }

    fn map_registers(&self, size: usize) -> Result<usize, &'static str> {
        if self.map_fails.load(Ordering::SeqCst) {
            return Err("no register window");
        }
        if size > WINDOW_SIZE {
            return Err("register window too small");
        }
        self.mapped_size.store(size, Ordering::SeqCst);
        Ok(self.mmio.base())
    }

    fn unmap_registers(&self, base: usize) {
        assert_eq!(base, self.mmio.base());
        self.unmapped.fetch_add(1, Ordering::SeqCst);
    }

    fn irq_by_name(&self, name: &str) -> Option<IRQNumber> {
        self.irq_lines
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, irq)| IRQNumber::try_new(*irq))
    }

    fn clock(&self, name: &str) -> Option<&'static (dyn Clock + Sync)> {
        if self.clock_missing.load(Ordering::SeqCst) || name != "fck" {
            return None;
        }
        Some(self.clock)
    }

    fn reset_control(&self) -> Option<&'static (dyn ResetControl + Sync)> {
        if self.reset_missing.load(Ordering::SeqCst) {
            return None;
        }
        Some(self.reset)
    }

    fn power_domain(&self) -> &'static (dyn PowerDomain + Sync) {
        self.power
    }
}

//--------------------------------------------------------------------------------------------------
// Time core stand-ins
//--------------------------------------------------------------------------------------------------

/// Remembers what the driver registered without touching the devices.
#[derive(Default)]
pub struct RecordingTime {
    clockevents: Mutex<Vec<&'static str>>,
    clocksources: Mutex<Vec<(&'static str, u64)>>,
}

impl RecordingTime {
    pub fn clockevents(&self) -> Vec<&'static str> {
        self.clockevents.lock().unwrap().clone()
    }

    pub fn clocksources(&self) -> Vec<(&'static str, u64)> {
        self.clocksources.lock().unwrap().clone()
    }
}

impl TimeSubsystem for RecordingTime {
    fn register_clockevent(&'static self, ced: &'static (dyn ClockEventDevice + Sync)) {
        self.clockevents.lock().unwrap().push(ced.name());
    }

    fn register_clocksource(&'static self, cs: &'static (dyn ClockSourceDevice + Sync), hz: u64) {
        self.clocksources.lock().unwrap().push((cs.name(), hz));
    }
}

#[derive(Default)]
pub struct CountingHandler {
    pub events: AtomicU32,
}

impl CountingHandler {
    pub fn events(&self) -> u32 {
        self.events.load(Ordering::SeqCst)
    }
}

impl ClockEventHandler for CountingHandler {
    fn event(&self) {
        self.events.fetch_add(1, Ordering::SeqCst);
    }
}

//--------------------------------------------------------------------------------------------------
// Rig
//--------------------------------------------------------------------------------------------------

/// A driver instance wired to fresh fakes. Nothing is probed yet.
pub struct Rig {
    pub mtu: &'static Mtu3,
    pub platform: &'static FakePlatform,
    pub irqs: &'static FakeIrqManager,
    pub clock: &'static FakeClock,
    pub power: &'static FakePower,
    pub mmio: FakeMmio,
}

impl Rig {
    pub fn new(time: &'static (dyn TimeSubsystem + Sync)) -> Self {
        Self::with_config(time, Config::new())
    }

    pub fn with_config(time: &'static (dyn TimeSubsystem + Sync), config: Config) -> Self {
        let clock = leak(FakeClock::with_rate(FCK_RATE));
        let platform = leak(FakePlatform::new(clock));
        let irqs = leak(FakeIrqManager::default());
        let mtu = leak(Mtu3::new(platform, irqs, time, config));

        Self {
            mtu,
            platform,
            irqs,
            clock,
            power: platform.power,
            mmio: platform.mmio,
        }
    }

    /// A rig probed against a `RecordingTime`.
    pub fn probed() -> (Self, &'static RecordingTime) {
        let time = leak(RecordingTime::default());
        let rig = Self::new(time);
        rig.probe().expect("probe");
        (rig, time)
    }

    pub fn probe(&self) -> Result<(), Error> {
        unsafe { self.mtu.init() }
    }

    pub fn running_bits(&self) -> u8 {
        self.mmio.read8(TSTRA)
    }
}
