//! # DMA channel register module.
//!
//! Every DMA channel owns a register window of [DMA_CHANNEL_STRIDE] bytes starting at
//! [DMA_CHANNEL_BASE]. The offset helpers in this module return the offset of a register
//! relative to the EQOS base address.
use core::mem::offset_of;

use arbitrary_int::{u3, u6, u12, u14};

pub const DMA_CHANNEL_BASE: usize = 0x1100;
pub const DMA_CHANNEL_STRIDE: usize = 0x80;
/// Number of DMA channels implemented by the EQOS MAC.
pub const MAX_DMA_CHANNELS: usize = 4;

/// Register window of a single DMA channel.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct DmaChannel {
    ctrl: ChannelControl,
    tx_ctrl: ChannelTxControl,
    rx_ctrl: ChannelRxControl,
    _reserved0: u32,
    tx_desc_list_addr_high: u32,
    tx_desc_list_addr: u32,
    rx_desc_list_addr_high: u32,
    rx_desc_list_addr: u32,
    tx_desc_tail_ptr: u32,
    _reserved1: u32,
    rx_desc_tail_ptr: u32,
    tx_ring_len: u32,
    rx_ring_len: u32,
    interrupt_enable: ChannelInterruptEnable,
    rx_watchdog: ChannelRxWatchdog,
    slot_ctrl: ChannelSlotControl,
    _reserved2: [u32; 0x10],
}

static_assertions::const_assert_eq!(core::mem::size_of::<DmaChannel>(), DMA_CHANNEL_STRIDE);

impl DmaChannel {
    /// Create an MMIO instance for the given channel of the EQOS MAC at `eqos_base`.
    ///
    /// # Safety
    ///
    /// `eqos_base` must be the address of a mapped EQOS register block. Multiple instances for
    /// the same channel can be created, and the user must ensure that concurrent accesses do
    /// not interfere with each other.
    pub const unsafe fn new_mmio_for_channel(
        eqos_base: usize,
        chan: usize,
    ) -> MmioDmaChannel<'static> {
        unsafe { Self::new_mmio_at(eqos_base + channel_base(chan)) }
    }
}

const CHX_CTRL: usize = offset_of!(DmaChannel, ctrl);
const CHX_TX_CTRL: usize = offset_of!(DmaChannel, tx_ctrl);
const CHX_RX_CTRL: usize = offset_of!(DmaChannel, rx_ctrl);
const CHX_TX_RING_LEN: usize = offset_of!(DmaChannel, tx_ring_len);
const CHX_RX_RING_LEN: usize = offset_of!(DmaChannel, rx_ring_len);
const CHX_INTR_ENA: usize = offset_of!(DmaChannel, interrupt_enable);
const CHX_RX_WDT: usize = offset_of!(DmaChannel, rx_watchdog);
const CHX_SLOT_CTRL: usize = offset_of!(DmaChannel, slot_ctrl);

static_assertions::const_assert_eq!(CHX_TX_RING_LEN, 0x2C);
static_assertions::const_assert_eq!(CHX_SLOT_CTRL, 0x3C);

#[inline]
pub const fn channel_base(chan: usize) -> usize {
    DMA_CHANNEL_BASE + DMA_CHANNEL_STRIDE * chan
}

#[inline]
pub const fn chx_ctrl(chan: usize) -> usize {
    channel_base(chan) + CHX_CTRL
}

#[inline]
pub const fn chx_tx_ctrl(chan: usize) -> usize {
    channel_base(chan) + CHX_TX_CTRL
}

#[inline]
pub const fn chx_rx_ctrl(chan: usize) -> usize {
    channel_base(chan) + CHX_RX_CTRL
}

#[inline]
pub const fn chx_tx_ring_len(chan: usize) -> usize {
    channel_base(chan) + CHX_TX_RING_LEN
}

#[inline]
pub const fn chx_rx_ring_len(chan: usize) -> usize {
    channel_base(chan) + CHX_RX_RING_LEN
}

#[inline]
pub const fn chx_intr_ena(chan: usize) -> usize {
    channel_base(chan) + CHX_INTR_ENA
}

#[inline]
pub const fn chx_rx_wdt(chan: usize) -> usize {
    channel_base(chan) + CHX_RX_WDT
}

#[inline]
pub const fn chx_slot_ctrl(chan: usize) -> usize {
    channel_base(chan) + CHX_SLOT_CTRL
}

// Bits of the safety critical registers which are compared against the shadow copy. Reserved
// and self-clearing bits are excluded.
pub const CHX_CTRL_SAFETY_MASK: u32 = 0x011D_3FFF;
pub const CHX_TX_CTRL_SAFETY_MASK: u32 = 0x0F3F_9010;
pub const CHX_RX_CTRL_SAFETY_MASK: u32 = 0x8F3F_7FE0;
pub const CHX_TX_RING_LEN_SAFETY_MASK: u32 = 0x3FF;
pub const CHX_RX_RING_LEN_SAFETY_MASK: u32 = 0x3FF;
pub const CHX_INTR_ENA_SAFETY_MASK: u32 = 0xFFC7;

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct ChannelControl {
    /// Split header enable.
    #[bit(24, rw)]
    split_header: bool,
    /// Descriptor skip length in bus width units.
    #[bits(18..=20, rw)]
    descriptor_skip_len: u3,
    /// Multiply the programmed TX and RX burst lengths by eight.
    #[bit(16, rw)]
    pbl_x8: bool,
    /// Maximum segment size for TCP segmentation offload.
    #[bits(0..=13, rw)]
    mss: u14,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct ChannelTxControl {
    /// Transmit programmable burst length.
    #[bits(16..=21, rw)]
    tx_pbl: u6,
    /// TCP segmentation enable.
    #[bit(12, rw)]
    tse: bool,
    /// Operate on second frame.
    #[bit(4, rw)]
    osf: bool,
    #[bit(0, rw)]
    start: bool,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct ChannelRxControl {
    #[bit(31, rw)]
    flush_packets: bool,
    /// Receive programmable burst length.
    #[bits(16..=21, rw)]
    rx_pbl: u6,
    /// Receive buffer size in bytes. Bits 1 to 4 are ignored by hardware and must be a multiple
    /// of the bus width.
    #[bits(1..=14, rw)]
    rx_buf_size: u14,
    #[bit(0, rw)]
    start: bool,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct ChannelInterruptEnable {
    /// Normal interrupt summary enable.
    #[bit(15, rw)]
    normal_summary: bool,
    /// Abnormal interrupt summary enable.
    #[bit(14, rw)]
    abnormal_summary: bool,
    #[bit(13, rw)]
    context_descriptor_error: bool,
    #[bit(12, rw)]
    fatal_bus_error: bool,
    #[bit(11, rw)]
    early_rx: bool,
    #[bit(10, rw)]
    early_tx: bool,
    #[bit(9, rw)]
    rx_watchdog_timeout: bool,
    #[bit(8, rw)]
    rx_stopped: bool,
    #[bit(7, rw)]
    rx_buf_unavailable: bool,
    #[bit(6, rw)]
    rx_complete: bool,
    #[bit(2, rw)]
    tx_buf_unavailable: bool,
    #[bit(1, rw)]
    tx_stopped: bool,
    #[bit(0, rw)]
    tx_complete: bool,
}

/// Unit of the receive interrupt watchdog timer, in system clock cycles.
#[bitbybit::bitenum(u2, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum WatchdogUnit {
    Cycles256 = 0,
    Cycles512 = 1,
    Cycles1024 = 2,
    Cycles2048 = 3,
}

impl WatchdogUnit {
    pub const fn cycles(&self) -> u32 {
        match self {
            WatchdogUnit::Cycles256 => 256,
            WatchdogUnit::Cycles512 => 512,
            WatchdogUnit::Cycles1024 => 1024,
            WatchdogUnit::Cycles2048 => 2048,
        }
    }
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct ChannelRxWatchdog {
    #[bits(16..=17, rw)]
    unit: WatchdogUnit,
    /// Watchdog timer count in [Self::unit] cycles.
    #[bits(0..=7, rw)]
    count: u8,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct ChannelSlotControl {
    /// Slot interval value in microseconds.
    #[bits(4..=15, rw)]
    interval: u12,
    /// Advance slot check.
    #[bit(1, rw)]
    advance_slot_check: bool,
    /// Enable slot comparison.
    #[bit(0, rw)]
    enable: bool,
}
