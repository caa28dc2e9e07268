//! # Register access layer for the EQOS Ethernet MAC
//!
//! This crate contains the register offsets and typed register layouts for the blocks of the
//! Synopsys Ethernet Quality-of-Service (EQOS) MAC which are driven by the
//! [`eqos-hal`](../eqos_hal/index.html) core:
//!
//! - [mmc]: MAC management counters (hardware statistics).
//! - [dma]: Per-channel DMA control registers.
//! - [xpcs]: The DWC XPCS serial physical coding sublayer, reached through an indirect window.
//!
//! The register blocks are [derive_mmio] structs, and the offset constants used by the core are
//! derived from them. The register layouts are [bitbybit] bitfields which can be converted from
//! and to the raw register value.
#![no_std]

pub mod dma;
pub mod mmc;
pub mod xpcs;

