//! # Functional safety shadow of the DMA channel registers
//!
//! The configuration path writes safety critical registers through [SafetyShadow::write], which
//! updates the hardware register and a masked shadow copy atomically. A periodic diagnostic
//! calls [SafetyShadow::validate] to compare the hardware against the shadow. Any difference
//! means that a register was changed outside the driver, for example by a hardware fault.
//!
//! The shadow table is protected by a [critical_section::Mutex], so the validator can run in a
//! different context than the configuration path.
use core::cell::RefCell;

use critical_section::Mutex;
use eqos::dma;
use log::{error, warn};

use super::{ChannelId, MAX_CHANNELS};
use crate::bus::RegisterBus;

/// Safety critical register of a DMA channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_enum::IntoPrimitive)]
#[repr(u8)]
pub enum RegisterClass {
    Control = 0,
    TxControl = 1,
    RxControl = 2,
    TxRingLength = 3,
    RxRingLength = 4,
    InterruptEnable = 5,
}

impl RegisterClass {
    pub const ALL: [RegisterClass; 6] = [
        RegisterClass::Control,
        RegisterClass::TxControl,
        RegisterClass::RxControl,
        RegisterClass::TxRingLength,
        RegisterClass::RxRingLength,
        RegisterClass::InterruptEnable,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Register offset for the given channel.
    pub const fn offset(&self, channel: ChannelId) -> usize {
        let chan = channel.index();
        match self {
            RegisterClass::Control => dma::chx_ctrl(chan),
            RegisterClass::TxControl => dma::chx_tx_ctrl(chan),
            RegisterClass::RxControl => dma::chx_rx_ctrl(chan),
            RegisterClass::TxRingLength => dma::chx_tx_ring_len(chan),
            RegisterClass::RxRingLength => dma::chx_rx_ring_len(chan),
            RegisterClass::InterruptEnable => dma::chx_intr_ena(chan),
        }
    }

    /// Bits which are compared during validation.
    pub const fn mask(&self) -> u32 {
        match self {
            RegisterClass::Control => dma::CHX_CTRL_SAFETY_MASK,
            RegisterClass::TxControl => dma::CHX_TX_CTRL_SAFETY_MASK,
            RegisterClass::RxControl => dma::CHX_RX_CTRL_SAFETY_MASK,
            RegisterClass::TxRingLength => dma::CHX_TX_RING_LEN_SAFETY_MASK,
            RegisterClass::RxRingLength => dma::CHX_RX_RING_LEN_SAFETY_MASK,
            RegisterClass::InterruptEnable => dma::CHX_INTR_ENA_SAFETY_MASK,
        }
    }

    #[inline]
    fn index(self) -> usize {
        u8::from(self) as usize
    }
}

/// Shadow copy of one safety critical register. `value` only contains bits inside `mask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyRegisterEntry {
    pub offset: usize,
    pub mask: u32,
    pub value: u32,
}

/// A safety critical register does not match its shadow copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error(
    "safety register at offset {offset:#x} changed: expected {expected:#010x}, read {actual:#010x}"
)]
pub struct IntegrityViolation {
    pub offset: usize,
    pub expected: u32,
    pub actual: u32,
}

type ShadowTable = [[Option<SafetyRegisterEntry>; RegisterClass::COUNT]; MAX_CHANNELS];

const EMPTY_TABLE: ShadowTable = [[None; RegisterClass::COUNT]; MAX_CHANNELS];

pub struct SafetyShadow {
    table: Mutex<RefCell<ShadowTable>>,
}

impl SafetyShadow {
    /// Create an empty shadow. Validating an empty shadow always succeeds.
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(RefCell::new(EMPTY_TABLE)),
        }
    }

    /// Discard the current table and seed the entries of the given channels from the masked
    /// current hardware values. Entries of other channels stay unpopulated.
    pub fn init<B: RegisterBus>(&self, bus: &B, channels: &[ChannelId]) {
        critical_section::with(|cs| {
            let mut table = self.table.borrow_ref_mut(cs);
            *table = EMPTY_TABLE;
            for &channel in channels {
                for class in RegisterClass::ALL {
                    let offset = class.offset(channel);
                    let mask = class.mask();
                    table[channel.index()][class.index()] = Some(SafetyRegisterEntry {
                        offset,
                        mask,
                        value: bus.read32(offset) & mask,
                    });
                }
            }
        });
    }

    /// Write a safety critical register and update its shadow copy.
    ///
    /// The write to an unpopulated entry still reaches the hardware, but it is not tracked.
    pub fn write<B: RegisterBus>(
        &self,
        bus: &B,
        channel: ChannelId,
        class: RegisterClass,
        value: u32,
    ) {
        critical_section::with(|cs| {
            let mut table = self.table.borrow_ref_mut(cs);
            bus.write32(class.offset(channel), value);
            match &mut table[channel.index()][class.index()] {
                Some(entry) => entry.value = value & entry.mask,
                None => warn!(
                    "{class:?} register of DMA channel {} written but not tracked",
                    channel.value()
                ),
            }
        });
    }

    /// Compare every populated entry against the masked hardware value.
    ///
    /// Stops at the first mismatch.
    pub fn validate<B: RegisterBus>(&self, bus: &B) -> Result<(), IntegrityViolation> {
        critical_section::with(|cs| {
            let table = self.table.borrow_ref(cs);
            for entry in table.iter().flatten().flatten() {
                let actual = bus.read32(entry.offset) & entry.mask;
                if actual != entry.value {
                    return Err(IntegrityViolation {
                        offset: entry.offset,
                        expected: entry.value,
                        actual,
                    });
                }
            }
            Ok(())
        })
        .inspect_err(|e| error!("{e}"))
    }

    pub fn entry(&self, channel: ChannelId, class: RegisterClass) -> Option<SafetyRegisterEntry> {
        critical_section::with(|cs| self.table.borrow_ref(cs)[channel.index()][class.index()])
    }
}

impl Default for SafetyShadow {
    fn default() -> Self {
        Self::new()
    }
}
