//! # DMA channel module
//!
//! Configures the EQOS DMA channels. All writes to the safety critical channel registers go
//! through the [SafetyShadow], which allows [Dma::validate_registers] to detect registers which
//! were changed outside of the driver.
use arbitrary_int::{Number, u6, u12, u14};
use eqos::dma::{
    self, ChannelControl, ChannelInterruptEnable, ChannelRxControl, ChannelRxWatchdog,
    ChannelSlotControl, ChannelTxControl, WatchdogUnit,
};
use log::{debug, warn};

use crate::{
    InvalidArgument,
    bus::RegisterBus,
    time::{Hertz, Microseconds},
};

pub mod safety;

pub use safety::{IntegrityViolation, RegisterClass, SafetyRegisterEntry, SafetyShadow};

pub const MAX_CHANNELS: usize = dma::MAX_DMA_CHANNELS;

/// Accepted range of the receive interrupt watchdog in microseconds.
pub const RX_WATCHDOG_MIN_US: u32 = 3;
pub const RX_WATCHDOG_MAX_US: u32 = 1020;

/// Largest slot interval the hardware can represent, in microseconds.
pub const SLOT_INTERVAL_MAX_US: u32 = u12::MAX.value() as u32;

pub const TX_PBL: u6 = u6::new(32);
pub const RX_PBL: u6 = u6::new(12);

/// Default AXI clock which drives the receive watchdog.
pub const AXI_CLK_DEFAULT: Hertz = Hertz::from_raw(125_000_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid DMA channel {0}")]
pub struct InvalidChannel(pub u8);

/// Index of a DMA channel, guaranteed to be smaller than [MAX_CHANNELS].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(u8);

impl ChannelId {
    pub const fn new(id: u8) -> Result<Self, InvalidChannel> {
        if id as usize >= MAX_CHANNELS {
            return Err(InvalidChannel(id));
        }
        Ok(Self(id))
    }

    #[inline]
    pub const fn value(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for ChannelId {
    type Error = InvalidChannel;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

/// Configuration of a single DMA channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaChannelConfig {
    pub channel: ChannelId,
    /// Receive buffer length in bytes.
    pub rx_buf_len: u16,
    /// Receive interrupt watchdog. Values outside of [RX_WATCHDOG_MIN_US] and
    /// [RX_WATCHDOG_MAX_US] are not programmed.
    pub rx_watchdog: Option<Microseconds>,
    /// Slot number check interval. Slot checking stays disabled if this is not set.
    pub slot_interval: Option<Microseconds>,
}

impl DmaChannelConfig {
    pub const fn new(channel: ChannelId, rx_buf_len: u16) -> Self {
        Self {
            channel,
            rx_buf_len,
            rx_watchdog: None,
            slot_interval: None,
        }
    }

    pub const fn with_rx_watchdog(mut self, rx_watchdog: Microseconds) -> Self {
        self.rx_watchdog = Some(rx_watchdog);
        self
    }

    pub const fn with_slot_interval(mut self, slot_interval: Microseconds) -> Self {
        self.slot_interval = Some(slot_interval);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaConfig {
    pub axi_clk: Hertz,
}

impl DmaConfig {
    pub const fn new(axi_clk: Hertz) -> Self {
        Self { axi_clk }
    }
}

impl Default for DmaConfig {
    fn default() -> Self {
        Self::new(AXI_CLK_DEFAULT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DmaError {
    #[error(transparent)]
    InvalidChannel(#[from] InvalidChannel),
    #[error("DMA channel {0} configured more than once")]
    DuplicateChannel(u8),
    #[error("too many DMA channels configured")]
    TooManyChannels,
    #[error("receive buffer length {0} does not fit the buffer size field")]
    RxBufLenOutOfRange(u16),
    #[error("DMA channel {0} is not active")]
    ChannelNotActive(u8),
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
}

/// Watchdog count for the given timeout, in units of 512 AXI clock cycles.
pub fn rx_watchdog_count(axi_clk: Hertz, usec: u32) -> u8 {
    let cycles = usec.saturating_mul(axi_clk.to_MHz());
    // Only the lower 8 bits fit the count field.
    (cycles / WatchdogUnit::Cycles512.cycles()) as u8
}

fn rx_buf_size(len: u16) -> Result<u14, DmaError> {
    if len > u14::MAX.value() {
        return Err(DmaError::RxBufLenOutOfRange(len));
    }
    Ok(u14::new(len))
}

/// DMA driver.
///
/// Register validation and the runtime configuration methods only require a shared reference,
/// so a safety diagnostic task can validate the registers while the driver is in use.
pub struct Dma<B> {
    bus: B,
    cfg: DmaConfig,
    channels: heapless::Vec<ChannelId, MAX_CHANNELS>,
    shadow: SafetyShadow,
}

impl<B: RegisterBus> Dma<B> {
    /// Create the driver. The bus must address the MAC register block.
    pub const fn new(bus: B, cfg: DmaConfig) -> Self {
        Self {
            bus,
            cfg,
            channels: heapless::Vec::new(),
            shadow: SafetyShadow::new(),
        }
    }

    /// Channels activated by the last successful [Self::init_all_channels] call.
    #[inline]
    pub fn active_channels(&self) -> &[ChannelId] {
        &self.channels
    }

    #[inline]
    pub fn shadow(&self) -> &SafetyShadow {
        &self.shadow
    }

    /// Seed the safety shadow for the configured channels and initialize each of them.
    ///
    /// The configuration list is checked completely before any register is touched.
    pub fn init_all_channels(&mut self, configs: &[DmaChannelConfig]) -> Result<(), DmaError> {
        let channels = Self::collect_channels(configs)?;
        self.shadow.init(&self.bus, &channels);
        self.channels = channels;
        for config in configs {
            self.init_channel(config)?;
        }
        debug!("initialized {} DMA channel(s)", self.channels.len());
        Ok(())
    }

    fn collect_channels(
        configs: &[DmaChannelConfig],
    ) -> Result<heapless::Vec<ChannelId, MAX_CHANNELS>, DmaError> {
        if configs.len() > MAX_CHANNELS {
            return Err(DmaError::TooManyChannels);
        }
        let mut channels = heapless::Vec::new();
        for config in configs {
            if channels.contains(&config.channel) {
                return Err(DmaError::DuplicateChannel(config.channel.value()));
            }
            rx_buf_size(config.rx_buf_len)?;
            channels
                .push(config.channel)
                .map_err(|_| DmaError::TooManyChannels)?;
        }
        Ok(channels)
    }

    /// Program the interrupt enables, burst lengths and receive buffer size of an active
    /// channel, followed by the optional receive watchdog and slot scheduling.
    pub fn init_channel(&self, config: &DmaChannelConfig) -> Result<(), DmaError> {
        let channel = config.channel;
        let buf_size = rx_buf_size(config.rx_buf_len)?;
        self.ensure_active(channel)?;
        let chan = channel.index();

        let intr =
            ChannelInterruptEnable::new_with_raw_value(self.bus.read32(dma::chx_intr_ena(chan)))
                .with_tx_complete(true)
                .with_rx_complete(true);
        self.write_safe(channel, RegisterClass::InterruptEnable, intr.raw_value());

        let ctrl = ChannelControl::new_with_raw_value(self.bus.read32(dma::chx_ctrl(chan)))
            .with_pbl_x8(true);
        self.write_safe(channel, RegisterClass::Control, ctrl.raw_value());

        let tx_ctrl =
            ChannelTxControl::new_with_raw_value(self.bus.read32(dma::chx_tx_ctrl(chan)))
                .with_osf(true)
                .with_tx_pbl(TX_PBL)
                .with_tse(true);
        self.write_safe(channel, RegisterClass::TxControl, tx_ctrl.raw_value());

        let rx_ctrl =
            ChannelRxControl::new_with_raw_value(self.bus.read32(dma::chx_rx_ctrl(chan)))
                .with_rx_buf_size(buf_size)
                .with_rx_pbl(RX_PBL);
        self.write_safe(channel, RegisterClass::RxControl, rx_ctrl.raw_value());

        if let Some(timeout) = config.rx_watchdog {
            if let Err(e) = self.program_rx_watchdog(channel, timeout) {
                warn!(
                    "DMA channel {}: RX watchdog of {} us not programmed: {e}",
                    channel.value(),
                    timeout.ticks()
                );
            }
        }
        if let Some(interval) = config.slot_interval {
            self.configure_slot_scheduling(channel, true, interval);
        }
        Ok(())
    }

    /// Compare all shadowed registers against the hardware.
    pub fn validate_registers(&self) -> Result<(), IntegrityViolation> {
        self.shadow.validate(&self.bus)
    }

    /// Enable or disable slot number checking for a channel. The interval is only updated when
    /// enabling and is limited to [SLOT_INTERVAL_MAX_US].
    pub fn configure_slot_scheduling(
        &self,
        channel: ChannelId,
        enable: bool,
        interval: Microseconds,
    ) {
        self.bus.modify32(dma::chx_slot_ctrl(channel.index()), |val| {
            let mut slot = ChannelSlotControl::new_with_raw_value(val);
            if enable {
                let requested = interval.ticks();
                let interval = requested.min(SLOT_INTERVAL_MAX_US);
                if interval != requested {
                    warn!("slot interval of {requested} us too large, clamping to {interval} us");
                }
                slot.set_interval(u12::new(interval as u16));
            }
            slot.set_enable(enable);
            slot.raw_value()
        });
    }

    /// Reprogram the receive interrupt watchdog of an active channel.
    pub fn set_rx_watchdog(
        &self,
        channel: ChannelId,
        timeout: Microseconds,
    ) -> Result<(), DmaError> {
        self.ensure_active(channel)?;
        self.program_rx_watchdog(channel, timeout)?;
        Ok(())
    }

    /// Enable or disable the abnormal interrupts used for debugging on all active channels.
    pub fn configure_debug_interrupts(&self, enable: bool) {
        for &channel in &self.channels {
            let intr = ChannelInterruptEnable::new_with_raw_value(
                self.bus.read32(dma::chx_intr_ena(channel.index())),
            )
            .with_normal_summary(enable)
            .with_abnormal_summary(enable)
            .with_fatal_bus_error(enable)
            .with_rx_buf_unavailable(enable)
            .with_tx_buf_unavailable(enable);
            self.write_safe(channel, RegisterClass::InterruptEnable, intr.raw_value());
        }
    }

    #[inline]
    pub fn release(self) -> B {
        self.bus
    }

    fn ensure_active(&self, channel: ChannelId) -> Result<(), DmaError> {
        if !self.channels.contains(&channel) {
            return Err(DmaError::ChannelNotActive(channel.value()));
        }
        Ok(())
    }

    #[inline]
    fn write_safe(&self, channel: ChannelId, class: RegisterClass, value: u32) {
        self.shadow.write(&self.bus, channel, class, value);
    }

    fn program_rx_watchdog(
        &self,
        channel: ChannelId,
        timeout: Microseconds,
    ) -> Result<(), InvalidArgument> {
        let usec = timeout.ticks();
        if !(RX_WATCHDOG_MIN_US..=RX_WATCHDOG_MAX_US).contains(&usec) {
            return Err(InvalidArgument);
        }
        let count = rx_watchdog_count(self.cfg.axi_clk, usec);
        self.bus.modify32(dma::chx_rx_wdt(channel.index()), |val| {
            ChannelRxWatchdog::new_with_raw_value(val)
                .with_unit(WatchdogUnit::Cycles512)
                .with_count(count)
                .raw_value()
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBus;

    fn ch(id: u8) -> ChannelId {
        ChannelId::new(id).unwrap()
    }

    fn us(val: u32) -> Microseconds {
        Microseconds::from_ticks(val)
    }

    #[test]
    fn channel_id_range() {
        assert_eq!(ChannelId::new(3).map(|c| c.index()), Ok(3));
        assert_eq!(ChannelId::new(4), Err(InvalidChannel(4)));
        assert_eq!(ChannelId::try_from(200), Err(InvalidChannel(200)));
    }

    #[test]
    fn watchdog_count_for_default_axi_clock() {
        assert_eq!(rx_watchdog_count(AXI_CLK_DEFAULT, 1000), 244);
        assert_eq!(rx_watchdog_count(AXI_CLK_DEFAULT, 3), 0);
        assert_eq!(rx_watchdog_count(Hertz::from_raw(250_000_000), 100), 48);
    }

    #[test]
    fn init_programs_channel_registers() {
        let bus = FakeBus::new();
        let mut dma = Dma::new(&bus, DmaConfig::default());
        let config = DmaChannelConfig::new(ch(0), 2048)
            .with_rx_watchdog(us(1000))
            .with_slot_interval(us(250));
        dma.init_all_channels(&[config]).unwrap();

        assert_eq!(dma.active_channels(), &[ch(0)]);
        assert_eq!(bus.get(dma::chx_intr_ena(0)), 0x41);
        assert_eq!(bus.get(dma::chx_ctrl(0)), 1 << 16);
        assert_eq!(bus.get(dma::chx_tx_ctrl(0)), 0x0020_1010);
        assert_eq!(bus.get(dma::chx_rx_ctrl(0)), 0x000C_1000);
        let wdt = ChannelRxWatchdog::new_with_raw_value(bus.get(dma::chx_rx_wdt(0)));
        assert_eq!(wdt.count(), 244);
        assert_eq!(wdt.unit(), WatchdogUnit::Cycles512);
        let slot = ChannelSlotControl::new_with_raw_value(bus.get(dma::chx_slot_ctrl(0)));
        assert!(slot.enable());
        assert_eq!(slot.interval().value(), 250);
        assert_eq!(dma.validate_registers(), Ok(()));
        assert_eq!(
            dma.shadow()
                .entry(ch(0), RegisterClass::TxControl)
                .map(|e| e.value),
            Some(0x0020_1010)
        );
    }

    #[test]
    fn invalid_configuration_touches_no_register() {
        let bus = FakeBus::new();
        let mut dma = Dma::new(&bus, DmaConfig::default());
        let duplicate = [
            DmaChannelConfig::new(ch(1), 1536),
            DmaChannelConfig::new(ch(1), 1536),
        ];
        assert_eq!(
            dma.init_all_channels(&duplicate),
            Err(DmaError::DuplicateChannel(1))
        );
        let too_large = [
            DmaChannelConfig::new(ch(0), 1536),
            DmaChannelConfig::new(ch(2), 0x4000),
        ];
        assert_eq!(
            dma.init_all_channels(&too_large),
            Err(DmaError::RxBufLenOutOfRange(0x4000))
        );
        assert!(bus.writes().is_empty());
        assert!(dma.active_channels().is_empty());
    }

    #[test]
    fn more_configs_than_channels_are_rejected() {
        let bus = FakeBus::new();
        let mut dma = Dma::new(&bus, DmaConfig::default());
        let configs = [
            DmaChannelConfig::new(ch(0), 1536),
            DmaChannelConfig::new(ch(1), 1536),
            DmaChannelConfig::new(ch(2), 1536),
            DmaChannelConfig::new(ch(3), 1536),
            DmaChannelConfig::new(ch(0), 1536),
        ];
        assert_eq!(
            dma.init_all_channels(&configs),
            Err(DmaError::TooManyChannels)
        );
        assert!(bus.writes().is_empty());
        assert!(bus.read_count(dma::chx_ctrl(0)) == 0);

        dma.init_all_channels(&configs[..MAX_CHANNELS]).unwrap();
        assert_eq!(dma.active_channels().len(), MAX_CHANNELS);
    }

    #[test]
    fn out_of_range_watchdog_is_skipped_at_init() {
        let bus = FakeBus::new();
        let mut dma = Dma::new(&bus, DmaConfig::default());
        let config = DmaChannelConfig::new(ch(2), 1536).with_rx_watchdog(us(2000));
        dma.init_all_channels(&[config]).unwrap();
        assert!(bus.writes_to(dma::chx_rx_wdt(2)).is_empty());
        assert!(bus.writes_to(dma::chx_slot_ctrl(2)).is_empty());
        assert_eq!(bus.get(dma::chx_rx_ctrl(2)) >> 1 & 0x3FFF, 1536);
    }

    #[test]
    fn runtime_watchdog_update() {
        let bus = FakeBus::new();
        let mut dma = Dma::new(&bus, DmaConfig::default());
        dma.init_all_channels(&[DmaChannelConfig::new(ch(1), 1536)])
            .unwrap();
        assert_eq!(
            dma.set_rx_watchdog(ch(1), us(2)),
            Err(DmaError::InvalidArgument(InvalidArgument))
        );
        assert_eq!(
            dma.set_rx_watchdog(ch(0), us(100)),
            Err(DmaError::ChannelNotActive(0))
        );
        assert!(bus.writes_to(dma::chx_rx_wdt(1)).is_empty());
        dma.set_rx_watchdog(ch(1), us(1020)).unwrap();
        let wdt = ChannelRxWatchdog::new_with_raw_value(bus.get(dma::chx_rx_wdt(1)));
        assert_eq!(wdt.count(), 249);
    }

    #[test]
    fn validation_detects_external_change() {
        let bus = FakeBus::new();
        let mut dma = Dma::new(&bus, DmaConfig::default());
        dma.init_all_channels(&[
            DmaChannelConfig::new(ch(0), 1536),
            DmaChannelConfig::new(ch(3), 1536),
        ])
        .unwrap();
        assert_eq!(dma.validate_registers(), Ok(()));

        let ctrl = bus.get(dma::chx_ctrl(3));
        bus.write32(dma::chx_ctrl(3), ctrl & !(1 << 16));
        assert_eq!(
            dma.validate_registers(),
            Err(IntegrityViolation {
                offset: dma::chx_ctrl(3),
                expected: 1 << 16,
                actual: 0,
            })
        );
    }

    #[test]
    fn inactive_channels_are_not_validated() {
        let bus = FakeBus::new();
        let mut dma = Dma::new(&bus, DmaConfig::default());
        assert_eq!(dma.validate_registers(), Ok(()));
        dma.init_all_channels(&[DmaChannelConfig::new(ch(0), 1536)])
            .unwrap();
        bus.write32(dma::chx_ctrl(1), 0xFFFF_FFFF);
        assert_eq!(dma.validate_registers(), Ok(()));
    }

    #[test]
    fn init_channel_requires_active_channel() {
        let bus = FakeBus::new();
        let dma = Dma::new(&bus, DmaConfig::default());
        assert_eq!(
            dma.init_channel(&DmaChannelConfig::new(ch(0), 1536)),
            Err(DmaError::ChannelNotActive(0))
        );
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn slot_scheduling() {
        let bus = FakeBus::new();
        let dma = Dma::new(&bus, DmaConfig::default());
        dma.configure_slot_scheduling(ch(1), true, us(125));
        let slot = ChannelSlotControl::new_with_raw_value(bus.get(dma::chx_slot_ctrl(1)));
        assert!(slot.enable());
        assert_eq!(slot.interval().value(), 125);

        dma.configure_slot_scheduling(ch(1), false, us(0));
        let slot = ChannelSlotControl::new_with_raw_value(bus.get(dma::chx_slot_ctrl(1)));
        assert!(!slot.enable());
        assert_eq!(slot.interval().value(), 125);

        dma.configure_slot_scheduling(ch(1), true, us(5000));
        let slot = ChannelSlotControl::new_with_raw_value(bus.get(dma::chx_slot_ctrl(1)));
        assert_eq!(slot.interval().value(), 4095);
    }

    #[test]
    fn debug_interrupts_stay_consistent_with_shadow() {
        let bus = FakeBus::new();
        let mut dma = Dma::new(&bus, DmaConfig::default());
        dma.init_all_channels(&[
            DmaChannelConfig::new(ch(0), 1536),
            DmaChannelConfig::new(ch(1), 1536),
        ])
        .unwrap();
        dma.configure_debug_interrupts(true);
        for chan in [0, 1] {
            let intr = ChannelInterruptEnable::new_with_raw_value(bus.get(dma::chx_intr_ena(chan)));
            assert!(intr.abnormal_summary() && intr.fatal_bus_error() && intr.normal_summary());
            assert!(intr.rx_buf_unavailable() && intr.tx_buf_unavailable());
            assert!(intr.tx_complete() && intr.rx_complete());
        }
        assert_eq!(dma.validate_registers(), Ok(()));

        dma.configure_debug_interrupts(false);
        assert_eq!(bus.get(dma::chx_intr_ena(0)), 0x41);
        assert_eq!(dma.validate_registers(), Ok(()));
    }
}
