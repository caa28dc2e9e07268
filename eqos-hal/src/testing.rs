//! Register file and delay doubles shared by the unit tests.
extern crate std;

use core::cell::RefCell;
use std::collections::BTreeMap;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::bus::RegisterBus;

/// Plain register file. Unwritten registers read as zero.
#[derive(Debug, Default)]
pub struct FakeBus {
    regs: RefCell<BTreeMap<usize, u32>>,
    reads: RefCell<BTreeMap<usize, u32>>,
    writes: RefCell<Vec<(usize, u32)>>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset a register value without recording a write.
    pub fn set(&self, offset: usize, value: u32) {
        self.regs.borrow_mut().insert(offset, value);
    }

    /// Current register value without recording a read.
    pub fn get(&self, offset: usize) -> u32 {
        self.regs.borrow().get(&offset).copied().unwrap_or(0)
    }

    pub fn read_count(&self, offset: usize) -> u32 {
        self.reads.borrow().get(&offset).copied().unwrap_or(0)
    }

    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.writes.borrow().clone()
    }

    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.writes
            .borrow()
            .iter()
            .filter(|(off, _)| *off == offset)
            .map(|(_, val)| *val)
            .collect()
    }

    pub fn clear_log(&self) {
        self.reads.borrow_mut().clear();
        self.writes.borrow_mut().clear();
    }
}

impl RegisterBus for FakeBus {
    fn read32(&self, offset: usize) -> u32 {
        *self.reads.borrow_mut().entry(offset).or_default() += 1;
        self.get(offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        self.writes.borrow_mut().push((offset, value));
        self.set(offset, value);
    }
}

/// Delay which returns immediately and keeps track of the requested delays.
#[derive(Debug, Default)]
pub struct FakeDelay {
    pub calls: u32,
    pub total_us: u64,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_us += u64::from(ns) / 1000;
    }

    fn delay_us(&mut self, us: u32) {
        self.calls += 1;
        self.total_us += u64::from(us);
    }
}
