//! # XPCS driver
//!
//! Brings up the USXGMII link of the DWC XPCS. The bring-up is a sequential state machine:
//!
//! 1. [Xpcs::init]: select the BASE-R PCS type, enable USXGMII mode, issue a vendor specific
//!    soft reset and configure clause 37 autonegotiation in backplane mode.
//! 2. [Xpcs::start]: run the autonegotiation, program the negotiated speed, reset the rate
//!    adaptor and wait for the receive link.
//!
//! Every hardware wait is bounded by the configured [PollConfig]. A timeout or a failed
//! negotiation moves the state machine to [PcsState::Failed].
use arbitrary_int::u3;
use eqos::xpcs::{
    self, AnControl, EeeModeControl0, MiiAnInterruptStatus, MiiControl, PcsControl2,
    PcsDigitalControl1, PcsStatus1, PcsType, UsxgAnSpeed,
};
use embedded_hal::delay::DelayNs;
use log::{debug, error, warn};

use crate::{
    InvalidArgument,
    bus::RegisterBus,
    poll::{PollConfig, poll_until},
};

/// Bring-up state of the PCS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcsState {
    Reset,
    ModeSelect,
    VendorReset,
    BackplaneConfig,
    AnEnable,
    AnPolling,
    SpeedSet,
    RateAdaptorReset,
    LinkUpPolling,
    Ready,
    Failed,
}

/// USXGMII line rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Mbps2500,
    Mbps5000,
    Mbps10000,
}

impl Speed {
    /// Speed select pattern with SS13 in bit 2, SS6 in bit 1 and SS5 in bit 0.
    pub const fn speed_select(&self) -> u3 {
        match self {
            Speed::Mbps2500 => u3::new(0b001),
            Speed::Mbps5000 => u3::new(0b101),
            Speed::Mbps10000 => u3::new(0b110),
        }
    }

    /// Decode the raw autonegotiation speed field. Zero means that no usable speed was
    /// negotiated. Unknown non-zero encodings are treated as 10 Gbps.
    pub fn from_an_speed(raw: u3) -> Option<Self> {
        if raw.value() == 0 {
            return None;
        }
        Some(match UsxgAnSpeed::new_with_raw_value(raw) {
            Ok(UsxgAnSpeed::Mbps2500) => Speed::Mbps2500,
            Ok(UsxgAnSpeed::Mbps5000) => Speed::Mbps5000,
            Ok(UsxgAnSpeed::Mbps10000) => Speed::Mbps10000,
            Err(raw) => {
                warn!("unknown USXGMII speed encoding {raw:?}, using 10 Gbps");
                Speed::Mbps10000
            }
        })
    }

    fn program(&self, ctrl: MiiControl) -> MiiControl {
        let ss = self.speed_select().value();
        ctrl.with_ss13(ss & 0b100 != 0)
            .with_ss6(ss & 0b010 != 0)
            .with_ss5(ss & 0b001 != 0)
    }
}

/// Link state after a successful [Xpcs::start].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkState {
    pub speed: Speed,
    pub an_complete: bool,
    pub rate_adaptor_reset_done: bool,
    pub rx_link_up: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PcsError {
    #[error("XPCS hardware poll timed out in state {stage:?}")]
    HardwareTimeout { stage: PcsState },
    #[error("autonegotiation completed without a usable speed")]
    NegotiationFailed,
}

/// Energy efficient ethernet low power idle mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, num_enum::TryFromPrimitive, num_enum::IntoPrimitive,
)]
#[repr(u32)]
pub enum LowPowerIdle {
    Disable = 0,
    Enable = 1,
}

/// Window based access to the XPCS register space.
struct XpcsRegisters<B> {
    bus: B,
}

impl<B: RegisterBus> XpcsRegisters<B> {
    fn read(&self, reg: u32) -> u32 {
        self.bus
            .write32(xpcs::XPCS_WINDOW_SELECT, xpcs::window_select(reg));
        self.bus.read32(xpcs::window_offset(reg))
    }

    fn write(&self, reg: u32, value: u32) {
        self.bus
            .write32(xpcs::XPCS_WINDOW_SELECT, xpcs::window_select(reg));
        self.bus.write32(xpcs::window_offset(reg), value);
    }

    fn modify(&self, reg: u32, f: impl FnOnce(u32) -> u32) {
        let value = self.read(reg);
        self.write(reg, f(value));
    }
}

/// XPCS driver.
pub struct Xpcs<B, D> {
    regs: XpcsRegisters<B>,
    delay: D,
    poll: PollConfig,
    state: PcsState,
}

impl<B: RegisterBus, D: DelayNs> Xpcs<B, D> {
    /// Create the driver. The bus must address the XPCS register block.
    pub const fn new(bus: B, delay: D) -> Self {
        Self::new_with_poll_config(bus, delay, PollConfig::XPCS)
    }

    pub const fn new_with_poll_config(bus: B, delay: D, poll: PollConfig) -> Self {
        Self {
            regs: XpcsRegisters { bus },
            delay,
            poll,
            state: PcsState::Reset,
        }
    }

    #[inline]
    pub fn state(&self) -> PcsState {
        self.state
    }

    /// Configure the PCS for USXGMII operation.
    pub fn init(&mut self) -> Result<(), PcsError> {
        self.state = PcsState::Reset;

        self.enter(PcsState::ModeSelect);
        self.regs.modify(xpcs::SR_XS_PCS_CTRL2, |val| {
            PcsControl2::new_with_raw_value(val)
                .with_pcs_type(PcsType::BaseR)
                .raw_value()
        });

        self.enter(PcsState::VendorReset);
        self.regs.modify(xpcs::VR_XS_PCS_DIG_CTRL1, |val| {
            PcsDigitalControl1::new_with_raw_value(val)
                .with_usxg_enable(true)
                .with_vendor_reset(true)
                .raw_value()
        });
        self.poll(|regs| {
            !PcsDigitalControl1::new_with_raw_value(regs.read(xpcs::VR_XS_PCS_DIG_CTRL1))
                .vendor_reset()
        })?;

        self.enter(PcsState::BackplaneConfig);
        self.regs.modify(xpcs::SR_AN_CTRL, |val| {
            AnControl::new_with_raw_value(val)
                .with_an_enable(false)
                .raw_value()
        });
        self.regs.modify(xpcs::VR_XS_PCS_DIG_CTRL1, |val| {
            PcsDigitalControl1::new_with_raw_value(val)
                .with_cl37_backplane(true)
                .raw_value()
        });
        Ok(())
    }

    /// Run the USXGMII autonegotiation and wait for the link.
    pub fn start(&mut self) -> Result<LinkState, PcsError> {
        self.enter(PcsState::AnEnable);
        self.regs.modify(xpcs::SR_MII_CTRL, |val| {
            MiiControl::new_with_raw_value(val)
                .with_an_enable(true)
                .raw_value()
        });

        self.enter(PcsState::AnPolling);
        let mut status = MiiAnInterruptStatus::DEFAULT;
        self.poll(|regs| {
            status =
                MiiAnInterruptStatus::new_with_raw_value(regs.read(xpcs::VR_MII_AN_INTR_STS));
            status.cl37_an_complete()
        })?;
        self.regs.write(
            xpcs::VR_MII_AN_INTR_STS,
            status.with_cl37_an_complete(false).raw_value(),
        );

        let Some(speed) = Speed::from_an_speed(status.usxg_an_speed()) else {
            error!("XPCS autonegotiation did not resolve a speed");
            self.state = PcsState::Failed;
            return Err(PcsError::NegotiationFailed);
        };

        self.enter(PcsState::SpeedSet);
        self.regs.modify(xpcs::SR_MII_CTRL, |val| {
            speed.program(MiiControl::new_with_raw_value(val)).raw_value()
        });

        self.enter(PcsState::RateAdaptorReset);
        self.regs.modify(xpcs::VR_XS_PCS_DIG_CTRL1, |val| {
            PcsDigitalControl1::new_with_raw_value(val)
                .with_usxg_rate_adaptor_reset(true)
                .raw_value()
        });
        self.poll(|regs| {
            !PcsDigitalControl1::new_with_raw_value(regs.read(xpcs::VR_XS_PCS_DIG_CTRL1))
                .usxg_rate_adaptor_reset()
        })?;

        self.enter(PcsState::LinkUpPolling);
        self.poll(|regs| {
            PcsStatus1::new_with_raw_value(regs.read(xpcs::SR_XS_PCS_STS1)).rx_link_up()
        })?;

        self.enter(PcsState::Ready);
        debug!("XPCS link up at {speed:?}");
        Ok(LinkState {
            speed,
            an_complete: true,
            rate_adaptor_reset_done: true,
            rx_link_up: true,
        })
    }

    /// Enable or disable transmit and receive low power idle together.
    pub fn set_low_power_idle(&mut self, mode: LowPowerIdle) {
        let enable = mode == LowPowerIdle::Enable;
        self.regs.modify(xpcs::VR_XS_PCS_EEE_MCTRL0, |val| {
            EeeModeControl0::new_with_raw_value(val)
                .with_tx_lpi_enable(enable)
                .with_rx_lpi_enable(enable)
                .raw_value()
        });
    }

    /// Variant of [Self::set_low_power_idle] for a raw control value, which must be 0 or 1.
    pub fn set_low_power_idle_raw(&mut self, raw: u32) -> Result<(), InvalidArgument> {
        let mode = LowPowerIdle::try_from(raw).map_err(|_| {
            error!("invalid low power idle value {raw}");
            InvalidArgument
        })?;
        self.set_low_power_idle(mode);
        Ok(())
    }

    /// Current receive link status. The status bit latches low, so the first read after a link
    /// failure reports the link as down.
    pub fn link_up(&self) -> bool {
        PcsStatus1::new_with_raw_value(self.regs.read(xpcs::SR_XS_PCS_STS1)).rx_link_up()
    }

    #[inline]
    pub fn release(self) -> (B, D) {
        (self.regs.bus, self.delay)
    }

    fn enter(&mut self, state: PcsState) {
        debug!("XPCS {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn poll(
        &mut self,
        mut condition: impl FnMut(&XpcsRegisters<B>) -> bool,
    ) -> Result<(), PcsError> {
        let regs = &self.regs;
        if let Err(e) = poll_until(&mut self.delay, &self.poll, || condition(regs)) {
            let stage = self.state;
            error!("XPCS timed out in state {stage:?} after {} attempts", e.attempts);
            self.state = PcsState::Failed;
            return Err(PcsError::HardwareTimeout { stage });
        }
        Ok(())
    }
}
