//! # Hardware abstraction core for the EQOS Ethernet MAC
//!
//! This crate contains the operating system independent core of an EQOS Ethernet MAC driver.
//! It builds on the register definitions of the [eqos] crate and covers the parts of the
//! controller which need careful software handling:
//!
//! - [mmc]: Accumulation of the wrapping hardware statistics counters into overflow-safe 64-bit
//!   software counters.
//! - [xpcs]: Bounded link bring-up state machine for the USXGMII serial PCS.
//! - [dma]: DMA channel configuration with a functional safety shadow which detects unexpected
//!   changes of safety critical registers.
//!
//! All register accesses go through the [RegisterBus] trait. Delays are requested through the
//! [embedded_hal::delay::DelayNs] trait, mutual exclusion for the safety shadow is provided by
//! the [critical_section] implementation of the platform and diagnostics are emitted with the
//! [log] facade.
#![no_std]

pub mod bus;
pub mod dma;
pub mod mmc;
pub mod poll;
pub mod time;
pub mod xpcs;

#[cfg(test)]
pub(crate) mod testing;

pub use bus::{MmioBus, RegisterBus};
pub use poll::{PollConfig, PollTimeout, poll_until};

/// A caller supplied value is outside of the set of accepted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid argument")]
pub struct InvalidArgument;
