//! # DWC XPCS register module.
//!
//! The XPCS registers live in a 21-bit MMD address space which is only reachable through an
//! indirect window: the upper address bits are written to the [XPCS_WINDOW_SELECT] register,
//! and the lower [XPCS_WINDOW_BITS] bits then address the register inside the window. Use
//! [window_select] and [window_offset] to split an address.
use core::mem::offset_of;

use arbitrary_int::u3;

/// Indirect access window of the XPCS block. The low [XPCS_WINDOW_BITS] address bits of an XPCS
/// register select the word inside [Self::data] after the upper bits were written to the
/// window select register.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct XpcsWindow {
    data: [u32; 0xFF],
    window_select: u32,
}

pub const XPCS_WINDOW_BITS: u32 = 10;
/// Offset of the window select register inside the XPCS block.
pub const XPCS_WINDOW_SELECT: usize = offset_of!(XpcsWindow, window_select);
const XPCS_WINDOW_SELECT_MASK: u32 = 0x1FFF;
const XPCS_WINDOW_OFFSET_MASK: u32 = (1 << XPCS_WINDOW_BITS) - 1;

static_assertions::const_assert_eq!(core::mem::size_of::<XpcsWindow>(), 1 << XPCS_WINDOW_BITS);
static_assertions::const_assert_eq!(XPCS_WINDOW_SELECT, 0x3FC);

/// Value for the [XPCS_WINDOW_SELECT] register to reach the given XPCS register.
#[inline]
pub const fn window_select(reg: u32) -> u32 {
    (reg >> XPCS_WINDOW_BITS) & XPCS_WINDOW_SELECT_MASK
}

/// Offset of the given XPCS register inside the currently selected window.
#[inline]
pub const fn window_offset(reg: u32) -> usize {
    (reg & XPCS_WINDOW_OFFSET_MASK) as usize
}

// Register addresses in the MMD address space (MMD number in bits 18 to 20, register in bits
// 2 to 17).
pub const SR_XS_PCS_CTRL1: u32 = 0x0C_0000;
pub const SR_XS_PCS_STS1: u32 = 0x0C_0004;
pub const SR_XS_PCS_CTRL2: u32 = 0x0C_001C;
pub const VR_XS_PCS_DIG_CTRL1: u32 = 0x0E_0000;
pub const VR_XS_PCS_EEE_MCTRL0: u32 = 0x0E_0018;
pub const SR_AN_CTRL: u32 = 0x1C_0000;
pub const SR_MII_CTRL: u32 = 0x7C_0000;
pub const VR_MII_AN_INTR_STS: u32 = 0x7E_0008;

#[bitbybit::bitenum(u4, exhaustive = false)]
#[derive(Debug, PartialEq, Eq)]
pub enum PcsType {
    BaseR = 0b0000,
    BaseX = 0b0001,
    BaseW = 0b0010,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct PcsControl2 {
    #[bits(0..=3, rw)]
    pcs_type: Option<PcsType>,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct PcsStatus1 {
    #[bit(7, r)]
    fault: bool,
    /// Latched low. A read reflects link failures since the previous read.
    #[bit(2, r)]
    rx_link_up: bool,
    #[bit(1, r)]
    low_power_ability: bool,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct PcsDigitalControl1 {
    /// Vendor specific soft reset. Self-clearing.
    #[bit(15, rw)]
    vendor_reset: bool,
    /// Clause 37 autonegotiation in backplane mode.
    #[bit(12, rw)]
    cl37_backplane: bool,
    /// USXGMII rate adaptor reset. Self-clearing.
    #[bit(10, rw)]
    usxg_rate_adaptor_reset: bool,
    #[bit(9, rw)]
    usxg_enable: bool,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct EeeModeControl0 {
    #[bit(1, rw)]
    rx_lpi_enable: bool,
    #[bit(0, rw)]
    tx_lpi_enable: bool,
}

/// Clause 73 autonegotiation control.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct AnControl {
    #[bit(12, rw)]
    an_enable: bool,
}

/// MII control register. The speed select bits SS13, SS6 and SS5 together encode the
/// USXGMII line rate.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct MiiControl {
    #[bit(15, rw)]
    reset: bool,
    #[bit(13, rw)]
    ss13: bool,
    #[bit(12, rw)]
    an_enable: bool,
    #[bit(9, rw)]
    restart_an: bool,
    #[bit(6, rw)]
    ss6: bool,
    #[bit(5, rw)]
    ss5: bool,
}

/// Speed reported by the USXGMII autonegotiation.
#[bitbybit::bitenum(u3, exhaustive = false)]
#[derive(Debug, PartialEq, Eq)]
pub enum UsxgAnSpeed {
    Mbps10000 = 0b011,
    Mbps2500 = 0b100,
    Mbps5000 = 0b101,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct MiiAnInterruptStatus {
    /// Raw speed field. Zero means no usable speed was negotiated.
    #[bits(10..=12, rw)]
    usxg_an_speed: u3,
    /// Clause 37 autonegotiation complete. Cleared by writing zero.
    #[bit(0, rw)]
    cl37_an_complete: bool,
}
