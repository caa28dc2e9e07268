//! # MAC management counter (MMC) accumulation
//!
//! The hardware counters are 32 bits wide and operate in reset-on-read mode, so every read
//! returns the number of events since the previous read. [Mmc::read_all_counters] adds these
//! deltas to 64-bit software counters. A software counter which would overflow is not wrapped:
//! the hardware and all software counters are reset instead.
use eqos::mmc::{self, MmcControl};
use log::{debug, error};

use crate::bus::RegisterBus;

macro_rules! mmc_counters {
    ($($name:ident => $offset:ident),+ $(,)?) => {
        /// Software accumulated MMC statistics.
        ///
        /// Each field is fed by exactly one hardware counter register. The field names follow
        /// the register names of the [eqos::mmc] module.
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
        pub struct MmcCounters {
            $(pub $name: u64,)+
        }

        impl MmcCounters {
            /// Counter names together with the hardware register they are accumulated from,
            /// in register order.
            pub const REGISTERS: &'static [(&'static str, usize)] = &[
                $((stringify!($name), mmc::$offset),)+
            ];

            pub const COUNT: usize = Self::REGISTERS.len();

            pub const ZERO: Self = Self {
                $($name: 0,)+
            };

            fn values(&self) -> [u64; Self::COUNT] {
                [$(self.$name,)+]
            }

            fn slots_mut(&mut self) -> [&mut u64; Self::COUNT] {
                [$(&mut self.$name,)+]
            }
        }
    };
}

mmc_counters! {
    // Transmit
    tx_octet_count_gb => TX_OCTET_COUNT_GB,
    tx_packet_count_gb => TX_PACKET_COUNT_GB,
    tx_broadcast_packets_g => TX_BROADCAST_PACKETS_G,
    tx_multicast_packets_g => TX_MULTICAST_PACKETS_G,
    tx_64_octets_gb => TX_64_OCTETS_GB,
    tx_65_to_127_octets_gb => TX_65_TO_127_OCTETS_GB,
    tx_128_to_255_octets_gb => TX_128_TO_255_OCTETS_GB,
    tx_256_to_511_octets_gb => TX_256_TO_511_OCTETS_GB,
    tx_512_to_1023_octets_gb => TX_512_TO_1023_OCTETS_GB,
    tx_1024_to_max_octets_gb => TX_1024_TO_MAX_OCTETS_GB,
    tx_unicast_packets_gb => TX_UNICAST_PACKETS_GB,
    tx_multicast_packets_gb => TX_MULTICAST_PACKETS_GB,
    tx_broadcast_packets_gb => TX_BROADCAST_PACKETS_GB,
    tx_underflow_error => TX_UNDERFLOW_ERROR,
    tx_single_collision_g => TX_SINGLE_COLLISION_G,
    tx_multi_collision_g => TX_MULTI_COLLISION_G,
    tx_deferred => TX_DEFERRED,
    tx_late_collision => TX_LATE_COLLISION,
    tx_excessive_collision => TX_EXCESSIVE_COLLISION,
    tx_carrier_error => TX_CARRIER_ERROR,
    tx_octet_count_g => TX_OCTET_COUNT_G,
    tx_packet_count_g => TX_PACKET_COUNT_G,
    tx_excessive_deferral_error => TX_EXCESSIVE_DEFERRAL_ERROR,
    tx_pause_packets => TX_PAUSE_PACKETS,
    tx_vlan_packets_g => TX_VLAN_PACKETS_G,
    tx_oversize_packets_g => TX_OVERSIZE_PACKETS_G,
    // Receive
    rx_packet_count_gb => RX_PACKET_COUNT_GB,
    rx_octet_count_gb => RX_OCTET_COUNT_GB,
    rx_octet_count_g => RX_OCTET_COUNT_G,
    rx_broadcast_packets_g => RX_BROADCAST_PACKETS_G,
    rx_multicast_packets_g => RX_MULTICAST_PACKETS_G,
    rx_crc_error => RX_CRC_ERROR,
    rx_alignment_error => RX_ALIGNMENT_ERROR,
    rx_runt_error => RX_RUNT_ERROR,
    rx_jabber_error => RX_JABBER_ERROR,
    rx_undersize_packets_g => RX_UNDERSIZE_PACKETS_G,
    rx_oversize_packets_g => RX_OVERSIZE_PACKETS_G,
    rx_64_octets_gb => RX_64_OCTETS_GB,
    rx_65_to_127_octets_gb => RX_65_TO_127_OCTETS_GB,
    rx_128_to_255_octets_gb => RX_128_TO_255_OCTETS_GB,
    rx_256_to_511_octets_gb => RX_256_TO_511_OCTETS_GB,
    rx_512_to_1023_octets_gb => RX_512_TO_1023_OCTETS_GB,
    rx_1024_to_max_octets_gb => RX_1024_TO_MAX_OCTETS_GB,
    rx_unicast_packets_g => RX_UNICAST_PACKETS_G,
    rx_length_error => RX_LENGTH_ERROR,
    rx_out_of_range_type => RX_OUT_OF_RANGE_TYPE,
    rx_pause_packets => RX_PAUSE_PACKETS,
    rx_fifo_overflow => RX_FIFO_OVERFLOW,
    rx_vlan_packets_gb => RX_VLAN_PACKETS_GB,
    rx_watchdog_error => RX_WATCHDOG_ERROR,
    rx_receive_error => RX_RECEIVE_ERROR,
    rx_control_packets_g => RX_CONTROL_PACKETS_G,
    // Receive checksum offload, packets
    rx_ipv4_good_packets => RX_IPV4_GOOD_PACKETS,
    rx_ipv4_header_error_packets => RX_IPV4_HEADER_ERROR_PACKETS,
    rx_ipv4_no_payload_packets => RX_IPV4_NO_PAYLOAD_PACKETS,
    rx_ipv4_fragmented_packets => RX_IPV4_FRAGMENTED_PACKETS,
    rx_ipv4_udp_checksum_disabled_packets => RX_IPV4_UDP_CHECKSUM_DISABLED_PACKETS,
    rx_ipv6_good_packets => RX_IPV6_GOOD_PACKETS,
    rx_ipv6_header_error_packets => RX_IPV6_HEADER_ERROR_PACKETS,
    rx_ipv6_no_payload_packets => RX_IPV6_NO_PAYLOAD_PACKETS,
    rx_udp_good_packets => RX_UDP_GOOD_PACKETS,
    rx_udp_error_packets => RX_UDP_ERROR_PACKETS,
    rx_tcp_good_packets => RX_TCP_GOOD_PACKETS,
    rx_tcp_error_packets => RX_TCP_ERROR_PACKETS,
    rx_icmp_good_packets => RX_ICMP_GOOD_PACKETS,
    rx_icmp_error_packets => RX_ICMP_ERROR_PACKETS,
    // Receive checksum offload, octets
    rx_ipv4_good_octets => RX_IPV4_GOOD_OCTETS,
    rx_ipv4_header_error_octets => RX_IPV4_HEADER_ERROR_OCTETS,
    rx_ipv4_no_payload_octets => RX_IPV4_NO_PAYLOAD_OCTETS,
    rx_ipv4_fragmented_octets => RX_IPV4_FRAGMENTED_OCTETS,
    rx_ipv4_udp_checksum_disabled_octets => RX_IPV4_UDP_CHECKSUM_DISABLED_OCTETS,
    rx_ipv6_good_octets => RX_IPV6_GOOD_OCTETS,
    rx_ipv6_header_error_octets => RX_IPV6_HEADER_ERROR_OCTETS,
    rx_ipv6_no_payload_octets => RX_IPV6_NO_PAYLOAD_OCTETS,
    rx_udp_good_octets => RX_UDP_GOOD_OCTETS,
    rx_udp_error_octets => RX_UDP_ERROR_OCTETS,
    rx_tcp_good_octets => RX_TCP_GOOD_OCTETS,
    rx_tcp_error_octets => RX_TCP_ERROR_OCTETS,
    rx_icmp_good_octets => RX_ICMP_GOOD_OCTETS,
    rx_icmp_error_octets => RX_ICMP_ERROR_OCTETS,
}

impl MmcCounters {
    /// Iterate over all counters as `(name, value)` pairs in register order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> {
        Self::REGISTERS
            .iter()
            .zip(self.values())
            .map(|(&(name, _), value)| (name, value))
    }

    /// Look up a counter by its field name.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.iter().find(|(n, _)| *n == name).map(|(_, value)| value)
    }
}

/// Result of an accumulation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulation {
    /// All counters were read and accumulated.
    Complete,
    /// Accumulating the counter at the given register offset would have overflowed. The
    /// hardware and all software counters were reset and the remaining registers were not read.
    OverflowReset { offset: usize },
}

/// MMC driver.
pub struct Mmc<B> {
    bus: B,
    counters: MmcCounters,
}

impl<B: RegisterBus> Mmc<B> {
    /// Create the driver. The bus must address the MAC register block.
    pub const fn new(bus: B) -> Self {
        Self {
            bus,
            counters: MmcCounters::ZERO,
        }
    }

    /// Mask all MMC interrupts, enable reset-on-read mode and reset all counters.
    pub fn init(&mut self) {
        self.bus.write32(mmc::MMC_RX_INTR_MASK, 0xFFFF_FFFF);
        self.bus.write32(mmc::MMC_TX_INTR_MASK, 0xFFFF_FFFF);
        self.bus.write32(mmc::MMC_IPC_RX_INTR_MASK, 0xFFFF_FFFF);
        self.bus.modify32(mmc::MMC_CNTRL, |val| {
            MmcControl::new_with_raw_value(val)
                .with_counters_reset(true)
                .with_reset_on_read(true)
                .with_counter_preset(true)
                .with_full_half_preset(true)
                .raw_value()
        });
        self.counters = MmcCounters::default();
        debug!("MMC counters initialized");
    }

    /// Read every hardware counter once and add its value to the matching software counter.
    pub fn read_all_counters(&mut self) -> Accumulation {
        let mut overflow = None;
        for (slot, &(_, offset)) in self
            .counters
            .slots_mut()
            .into_iter()
            .zip(MmcCounters::REGISTERS)
        {
            let delta = self.bus.read32(offset);
            match slot.checked_add(u64::from(delta)) {
                Some(total) => *slot = total,
                None => {
                    overflow = Some(offset);
                    break;
                }
            }
        }
        match overflow {
            Some(offset) => {
                error!("MMC counter at offset {offset:#x} overflowed, resetting all counters");
                self.reset();
                Accumulation::OverflowReset { offset }
            }
            None => Accumulation::Complete,
        }
    }

    /// Reset the hardware counters and zero all software counters.
    pub fn reset(&mut self) {
        self.bus.modify32(mmc::MMC_CNTRL, |val| {
            MmcControl::new_with_raw_value(val)
                .with_counters_reset(true)
                .raw_value()
        });
        self.counters = MmcCounters::default();
    }

    #[inline]
    pub fn counters(&self) -> &MmcCounters {
        &self.counters
    }

    #[inline]
    pub fn release(self) -> B {
        self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBus;

    fn counter_offsets() -> impl Iterator<Item = usize> {
        MmcCounters::REGISTERS.iter().map(|(_, offset)| *offset)
    }

    #[test]
    fn every_counter_has_its_own_register() {
        assert_eq!(MmcCounters::COUNT, 80);
        let mut offsets: [usize; MmcCounters::COUNT] = [0; MmcCounters::COUNT];
        for (idx, offset) in counter_offsets().enumerate() {
            offsets[idx] = offset;
        }
        offsets.sort_unstable();
        assert!(offsets.windows(2).all(|w| w[0] != w[1]));
        assert_eq!(
            MmcCounters::REGISTERS
                .iter()
                .find(|(name, _)| *name == "tx_carrier_error")
                .map(|(_, offset)| *offset),
            Some(mmc::TX_CARRIER_ERROR)
        );
    }

    #[test]
    fn init_masks_interrupts_and_enables_reset_on_read() {
        let bus = FakeBus::new();
        let mut mmc = Mmc::new(&bus);
        mmc.init();
        assert_eq!(bus.get(mmc::MMC_RX_INTR_MASK), 0xFFFF_FFFF);
        assert_eq!(bus.get(mmc::MMC_TX_INTR_MASK), 0xFFFF_FFFF);
        assert_eq!(bus.get(mmc::MMC_IPC_RX_INTR_MASK), 0xFFFF_FFFF);
        let ctrl = MmcControl::new_with_raw_value(bus.get(mmc::MMC_CNTRL));
        assert!(ctrl.reset_on_read());
        assert!(ctrl.counters_reset());
        assert!(ctrl.counter_preset() && ctrl.full_half_preset());
        assert!(!ctrl.counter_freeze());
    }

    #[test]
    fn deltas_accumulate() {
        let bus = FakeBus::new();
        let mut mmc = Mmc::new(&bus);
        bus.set(mmc::TX_OCTET_COUNT_GB, 1500);
        bus.set(mmc::RX_CRC_ERROR, 2);
        bus.set(mmc::RX_ICMP_ERROR_OCTETS, 64);
        assert_eq!(mmc.read_all_counters(), Accumulation::Complete);
        assert_eq!(mmc.read_all_counters(), Accumulation::Complete);
        let counters = mmc.counters();
        assert_eq!(counters.tx_octet_count_gb, 3000);
        assert_eq!(counters.rx_crc_error, 4);
        assert_eq!(counters.rx_icmp_error_octets, 128);
        assert_eq!(counters.tx_packet_count_gb, 0);
        assert_eq!(counters.get("rx_crc_error"), Some(4));
        assert_eq!(counters.get("no_such_counter"), None);
        assert_eq!(counters.iter().map(|(_, value)| value).sum::<u64>(), 3132);
        for offset in counter_offsets() {
            assert_eq!(bus.read_count(offset), 2);
        }
    }

    #[test]
    fn varying_deltas_sum_up() {
        let bus = FakeBus::new();
        let mut mmc = Mmc::new(&bus);
        let deltas = [5, 1200, 77, 0, 0xFFFF_FFFF];
        for delta in deltas {
            bus.set(mmc::RX_OCTET_COUNT_GB, delta);
            bus.set(mmc::TX_UNDERFLOW_ERROR, delta / 2);
            assert_eq!(mmc.read_all_counters(), Accumulation::Complete);
        }
        let expected: u64 = deltas.iter().map(|d| u64::from(*d)).sum();
        assert_eq!(mmc.counters().rx_octet_count_gb, expected);
        assert_eq!(
            mmc.counters().tx_underflow_error,
            deltas.iter().map(|d| u64::from(*d / 2)).sum::<u64>()
        );
    }

    #[test]
    fn carrier_error_and_excessive_collision_are_separate() {
        let bus = FakeBus::new();
        let mut mmc = Mmc::new(&bus);
        bus.set(mmc::TX_CARRIER_ERROR, 3);
        bus.set(mmc::TX_EXCESSIVE_COLLISION, 5);
        mmc.read_all_counters();
        assert_eq!(mmc.counters().tx_carrier_error, 3);
        assert_eq!(mmc.counters().tx_excessive_collision, 5);
    }

    #[test]
    fn ipv6_and_udp_octets_are_separate() {
        let bus = FakeBus::new();
        let mut mmc = Mmc::new(&bus);
        bus.set(mmc::RX_IPV6_GOOD_OCTETS, 1000);
        bus.set(mmc::RX_UDP_GOOD_OCTETS, 600);
        mmc.read_all_counters();
        assert_eq!(mmc.counters().rx_ipv6_good_octets, 1000);
        assert_eq!(mmc.counters().rx_udp_good_octets, 600);
    }

    #[test]
    fn overflow_resets_everything_once() {
        let bus = FakeBus::new();
        let mut mmc = Mmc::new(&bus);
        bus.set(mmc::TX_OCTET_COUNT_GB, 10);
        mmc.read_all_counters();
        mmc.counters.rx_crc_error = u64::MAX - 1;
        bus.set(mmc::RX_CRC_ERROR, 2);
        bus.clear_log();

        assert_eq!(
            mmc.read_all_counters(),
            Accumulation::OverflowReset {
                offset: mmc::RX_CRC_ERROR
            }
        );
        assert_eq!(*mmc.counters(), MmcCounters::default());
        let resets = bus.writes_to(mmc::MMC_CNTRL);
        assert_eq!(resets.len(), 1);
        assert!(MmcControl::new_with_raw_value(resets[0]).counters_reset());
        // Registers after the overflowing one are not read in the same pass.
        assert_eq!(bus.read_count(mmc::RX_ALIGNMENT_ERROR), 0);
    }

    #[test]
    fn exact_maximum_does_not_overflow() {
        let bus = FakeBus::new();
        let mut mmc = Mmc::new(&bus);
        mmc.counters.tx_pause_packets = u64::MAX - 7;
        bus.set(mmc::TX_PAUSE_PACKETS, 7);
        assert_eq!(mmc.read_all_counters(), Accumulation::Complete);
        assert_eq!(mmc.counters().tx_pause_packets, u64::MAX);
        assert!(bus.writes_to(mmc::MMC_CNTRL).is_empty());
    }

    #[test]
    fn reset_clears_software_counters() {
        let bus = FakeBus::new();
        let mut mmc = Mmc::new(&bus);
        bus.set(mmc::RX_PACKET_COUNT_GB, 9);
        mmc.read_all_counters();
        mmc.reset();
        assert_eq!(mmc.counters().rx_packet_count_gb, 0);
        assert_eq!(bus.writes_to(mmc::MMC_CNTRL).len(), 1);
    }
}
