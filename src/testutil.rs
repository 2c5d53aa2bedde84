//! In-memory register port and delay used by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;

use crate::port::RegisterPort;
use crate::registers::Reg;
use crate::{Charger, Config};

pub const BASE: u16 = 0x1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusError;

#[derive(Default)]
struct Regs {
    values: BTreeMap<u16, u8>,
    failing: BTreeSet<u16>,
    fail_writes: bool,
    reads: Vec<u16>,
    writes: Vec<(u16, u8)>,
}

/// A register file shared between the test body and the charger under test
#[derive(Clone, Default)]
pub struct FakePort(Rc<RefCell<Regs>>);

impl FakePort {
    pub fn set(&self, reg: Reg, value: u8) {
        self.0.borrow_mut().values.insert(BASE + reg.to_u16(), value);
    }

    pub fn set_u16(&self, reg: Reg, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        let mut regs = self.0.borrow_mut();
        regs.values.insert(BASE + reg.to_u16(), lo);
        regs.values.insert(BASE + reg.to_u16() + 1, hi);
    }

    pub fn get(&self, reg: Reg) -> u8 {
        self.0
            .borrow()
            .values
            .get(&(BASE + reg.to_u16()))
            .copied()
            .unwrap_or(0)
    }

    pub fn fail(&self, reg: Reg) {
        self.0.borrow_mut().failing.insert(BASE + reg.to_u16());
    }

    pub fn fail_writes(&self) {
        self.0.borrow_mut().fail_writes = true;
    }

    pub fn read_count(&self, reg: Reg) -> usize {
        let offset = BASE + reg.to_u16();
        self.0.borrow().reads.iter().filter(|&&r| r == offset).count()
    }

    pub fn total_reads(&self) -> usize {
        self.0.borrow().reads.len()
    }

    /// Values written to `reg`, in order
    pub fn writes(&self, reg: Reg) -> Vec<u8> {
        let offset = BASE + reg.to_u16();
        self.0
            .borrow()
            .writes
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl RegisterPort for FakePort {
    type Error = BusError;

    async fn read_bulk(&mut self, offset: u16, buf: &mut [u8]) -> Result<(), BusError> {
        let mut regs = self.0.borrow_mut();
        regs.reads.push(offset);
        for (i, byte) in buf.iter_mut().enumerate() {
            let addr = offset + i as u16;
            if regs.failing.contains(&addr) {
                return Err(BusError);
            }
            *byte = regs.values.get(&addr).copied().unwrap_or(0);
        }
        Ok(())
    }

    async fn write(&mut self, offset: u16, value: u8) -> Result<(), BusError> {
        let mut regs = self.0.borrow_mut();
        if regs.fail_writes {
            return Err(BusError);
        }
        regs.writes.push((offset, value));
        regs.values.insert(offset, value);
        Ok(())
    }
}

pub type TestCharger = Charger<NoopRawMutex, FakePort>;

pub fn charger() -> (TestCharger, FakePort) {
    let port = FakePort::default();
    (Charger::new(port.clone(), Config::new(BASE)), port)
}

/// Source detected, no over-voltage, 5V input
pub fn plug_usb(port: &FakePort) {
    port.set(Reg::USB_CHGPTH_RT_STS, 0b0000_0100);
    port.set(Reg::USB_CHGPTH_INPUT_STS, 0b0000_1000);
}

/// Grounded ID pin with a USBID reading well under the ground threshold
pub fn plug_otg(port: &FakePort) {
    port.set(Reg::MISC_IDEV_STS, 0x00);
    port.set_u16(Reg::USB_CHGPTH_USBID_MSB, 0x0100);
    port.set(Reg::USB_CHGPTH_RID_STS, 0x00);
}

/// Floating ID pin
pub fn unplug_otg(port: &FakePort) {
    port.set(Reg::MISC_IDEV_STS, 0x02);
    port.set_u16(Reg::USB_CHGPTH_USBID_MSB, 0x0fff);
    port.set(Reg::USB_CHGPTH_RID_STS, 0x08);
}

/// A delay that returns immediately and records how long it was asked to wait
#[derive(Clone, Default)]
pub struct RecordingDelay(Rc<Cell<u64>>);

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.0.get() / 1_000_000
    }
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.0.set(self.0.get() + u64::from(ns));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.0.set(self.0.get() + u64::from(ms) * 1_000_000);
    }
}

/// A delay that only returns once the test signals it, one signal per wait
pub struct GatedDelay<'a>(&'a Signal<NoopRawMutex, ()>);

impl<'a> GatedDelay<'a> {
    pub fn new(gate: &'a Signal<NoopRawMutex, ()>) -> Self {
        GatedDelay(gate)
    }
}

impl DelayNs for GatedDelay<'_> {
    async fn delay_ns(&mut self, _ns: u32) {
        self.0.wait().await;
    }

    async fn delay_ms(&mut self, _ms: u32) {
        self.0.wait().await;
    }
}
