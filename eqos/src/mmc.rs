//! # MAC management counter (MMC) register module.
//!
//! The MMC block maintains 32-bit hardware statistics counters. With
//! [MmcControl::reset_on_read] set, every read returns the number of events since the previous
//! read, which allows software to accumulate the values into wider counters.
//!
//! The register block starts at [MMC_OFFSET] inside the MAC register space. The offset
//! constants of this module are relative to the MAC base address.
use core::mem::offset_of;

/// Offset of the MMC register block inside the MAC register space.
pub const MMC_OFFSET: usize = 0x700;

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct MmcControl {
    /// Counters are preset to almost-full (0xFFFF_FFF0) instead of almost-half.
    #[bit(5, rw)]
    full_half_preset: bool,
    /// Preset all counters to the level selected by [Self::full_half_preset]. Self-clearing.
    #[bit(4, rw)]
    counter_preset: bool,
    #[bit(3, rw)]
    counter_freeze: bool,
    #[bit(2, rw)]
    reset_on_read: bool,
    #[bit(1, rw)]
    counter_stop_rollover: bool,
    /// Reset all counters. Self-clearing one clock cycle after the write.
    #[bit(0, rw)]
    counters_reset: bool,
}

/// MMC register block.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct Mmc {
    control: MmcControl,
    #[mmio(PureRead)]
    rx_interrupt_status: u32,
    #[mmio(PureRead)]
    tx_interrupt_status: u32,
    rx_interrupt_mask: u32,
    tx_interrupt_mask: u32,
    #[mmio(PureRead)]
    tx_octet_count_gb: u32,
    #[mmio(PureRead)]
    tx_packet_count_gb: u32,
    #[mmio(PureRead)]
    tx_broadcast_packets_g: u32,
    #[mmio(PureRead)]
    tx_multicast_packets_g: u32,
    #[mmio(PureRead)]
    tx_64_octets_gb: u32,
    #[mmio(PureRead)]
    tx_65_to_127_octets_gb: u32,
    #[mmio(PureRead)]
    tx_128_to_255_octets_gb: u32,
    #[mmio(PureRead)]
    tx_256_to_511_octets_gb: u32,
    #[mmio(PureRead)]
    tx_512_to_1023_octets_gb: u32,
    #[mmio(PureRead)]
    tx_1024_to_max_octets_gb: u32,
    #[mmio(PureRead)]
    tx_unicast_packets_gb: u32,
    #[mmio(PureRead)]
    tx_multicast_packets_gb: u32,
    #[mmio(PureRead)]
    tx_broadcast_packets_gb: u32,
    #[mmio(PureRead)]
    tx_underflow_error: u32,
    #[mmio(PureRead)]
    tx_single_collision_g: u32,
    #[mmio(PureRead)]
    tx_multi_collision_g: u32,
    #[mmio(PureRead)]
    tx_deferred: u32,
    #[mmio(PureRead)]
    tx_late_collision: u32,
    #[mmio(PureRead)]
    tx_excessive_collision: u32,
    #[mmio(PureRead)]
    tx_carrier_error: u32,
    #[mmio(PureRead)]
    tx_octet_count_g: u32,
    #[mmio(PureRead)]
    tx_packet_count_g: u32,
    #[mmio(PureRead)]
    tx_excessive_deferral_error: u32,
    #[mmio(PureRead)]
    tx_pause_packets: u32,
    #[mmio(PureRead)]
    tx_vlan_packets_g: u32,
    #[mmio(PureRead)]
    tx_oversize_packets_g: u32,
    _reserved0: u32,
    #[mmio(PureRead)]
    rx_packet_count_gb: u32,
    #[mmio(PureRead)]
    rx_octet_count_gb: u32,
    #[mmio(PureRead)]
    rx_octet_count_g: u32,
    #[mmio(PureRead)]
    rx_broadcast_packets_g: u32,
    #[mmio(PureRead)]
    rx_multicast_packets_g: u32,
    #[mmio(PureRead)]
    rx_crc_error: u32,
    #[mmio(PureRead)]
    rx_alignment_error: u32,
    #[mmio(PureRead)]
    rx_runt_error: u32,
    #[mmio(PureRead)]
    rx_jabber_error: u32,
    #[mmio(PureRead)]
    rx_undersize_packets_g: u32,
    #[mmio(PureRead)]
    rx_oversize_packets_g: u32,
    #[mmio(PureRead)]
    rx_64_octets_gb: u32,
    #[mmio(PureRead)]
    rx_65_to_127_octets_gb: u32,
    #[mmio(PureRead)]
    rx_128_to_255_octets_gb: u32,
    #[mmio(PureRead)]
    rx_256_to_511_octets_gb: u32,
    #[mmio(PureRead)]
    rx_512_to_1023_octets_gb: u32,
    #[mmio(PureRead)]
    rx_1024_to_max_octets_gb: u32,
    #[mmio(PureRead)]
    rx_unicast_packets_g: u32,
    #[mmio(PureRead)]
    rx_length_error: u32,
    #[mmio(PureRead)]
    rx_out_of_range_type: u32,
    #[mmio(PureRead)]
    rx_pause_packets: u32,
    #[mmio(PureRead)]
    rx_fifo_overflow: u32,
    #[mmio(PureRead)]
    rx_vlan_packets_gb: u32,
    #[mmio(PureRead)]
    rx_watchdog_error: u32,
    #[mmio(PureRead)]
    rx_receive_error: u32,
    #[mmio(PureRead)]
    rx_control_packets_g: u32,
    _reserved1: [u32; 0x06],
    ipc_rx_interrupt_mask: u32,
    _reserved2: [u32; 0x03],
    #[mmio(PureRead)]
    rx_ipv4_good_packets: u32,
    #[mmio(PureRead)]
    rx_ipv4_header_error_packets: u32,
    #[mmio(PureRead)]
    rx_ipv4_no_payload_packets: u32,
    #[mmio(PureRead)]
    rx_ipv4_fragmented_packets: u32,
    #[mmio(PureRead)]
    rx_ipv4_udp_checksum_disabled_packets: u32,
    #[mmio(PureRead)]
    rx_ipv6_good_packets: u32,
    #[mmio(PureRead)]
    rx_ipv6_header_error_packets: u32,
    #[mmio(PureRead)]
    rx_ipv6_no_payload_packets: u32,
    #[mmio(PureRead)]
    rx_udp_good_packets: u32,
    #[mmio(PureRead)]
    rx_udp_error_packets: u32,
    #[mmio(PureRead)]
    rx_tcp_good_packets: u32,
    #[mmio(PureRead)]
    rx_tcp_error_packets: u32,
    #[mmio(PureRead)]
    rx_icmp_good_packets: u32,
    #[mmio(PureRead)]
    rx_icmp_error_packets: u32,
    _reserved3: [u32; 0x02],
    #[mmio(PureRead)]
    rx_ipv4_good_octets: u32,
    #[mmio(PureRead)]
    rx_ipv4_header_error_octets: u32,
    #[mmio(PureRead)]
    rx_ipv4_no_payload_octets: u32,
    #[mmio(PureRead)]
    rx_ipv4_fragmented_octets: u32,
    #[mmio(PureRead)]
    rx_ipv4_udp_checksum_disabled_octets: u32,
    #[mmio(PureRead)]
    rx_ipv6_good_octets: u32,
    #[mmio(PureRead)]
    rx_ipv6_header_error_octets: u32,
    #[mmio(PureRead)]
    rx_ipv6_no_payload_octets: u32,
    #[mmio(PureRead)]
    rx_udp_good_octets: u32,
    #[mmio(PureRead)]
    rx_udp_error_octets: u32,
    #[mmio(PureRead)]
    rx_tcp_good_octets: u32,
    #[mmio(PureRead)]
    rx_tcp_error_octets: u32,
    #[mmio(PureRead)]
    rx_icmp_good_octets: u32,
    #[mmio(PureRead)]
    rx_icmp_error_octets: u32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<Mmc>(), 0x188);

/// MMC control register.
pub const MMC_CNTRL: usize = MMC_OFFSET + offset_of!(Mmc, control);
/// MMC receive interrupt mask register.
pub const MMC_RX_INTR_MASK: usize = MMC_OFFSET + offset_of!(Mmc, rx_interrupt_mask);
/// MMC transmit interrupt mask register.
pub const MMC_TX_INTR_MASK: usize = MMC_OFFSET + offset_of!(Mmc, tx_interrupt_mask);
/// MMC receive checksum offload (IPC) interrupt mask register.
pub const MMC_IPC_RX_INTR_MASK: usize = MMC_OFFSET + offset_of!(Mmc, ipc_rx_interrupt_mask);

// Transmit counters.
pub const TX_OCTET_COUNT_GB: usize = MMC_OFFSET + offset_of!(Mmc, tx_octet_count_gb);
pub const TX_PACKET_COUNT_GB: usize = MMC_OFFSET + offset_of!(Mmc, tx_packet_count_gb);
pub const TX_BROADCAST_PACKETS_G: usize = MMC_OFFSET + offset_of!(Mmc, tx_broadcast_packets_g);
pub const TX_MULTICAST_PACKETS_G: usize = MMC_OFFSET + offset_of!(Mmc, tx_multicast_packets_g);
pub const TX_64_OCTETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, tx_64_octets_gb);
pub const TX_65_TO_127_OCTETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, tx_65_to_127_octets_gb);
pub const TX_128_TO_255_OCTETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, tx_128_to_255_octets_gb);
pub const TX_256_TO_511_OCTETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, tx_256_to_511_octets_gb);
pub const TX_512_TO_1023_OCTETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, tx_512_to_1023_octets_gb);
pub const TX_1024_TO_MAX_OCTETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, tx_1024_to_max_octets_gb);
pub const TX_UNICAST_PACKETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, tx_unicast_packets_gb);
pub const TX_MULTICAST_PACKETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, tx_multicast_packets_gb);
pub const TX_BROADCAST_PACKETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, tx_broadcast_packets_gb);
pub const TX_UNDERFLOW_ERROR: usize = MMC_OFFSET + offset_of!(Mmc, tx_underflow_error);
pub const TX_SINGLE_COLLISION_G: usize = MMC_OFFSET + offset_of!(Mmc, tx_single_collision_g);
pub const TX_MULTI_COLLISION_G: usize = MMC_OFFSET + offset_of!(Mmc, tx_multi_collision_g);
pub const TX_DEFERRED: usize = MMC_OFFSET + offset_of!(Mmc, tx_deferred);
pub const TX_LATE_COLLISION: usize = MMC_OFFSET + offset_of!(Mmc, tx_late_collision);
pub const TX_EXCESSIVE_COLLISION: usize = MMC_OFFSET + offset_of!(Mmc, tx_excessive_collision);
pub const TX_CARRIER_ERROR: usize = MMC_OFFSET + offset_of!(Mmc, tx_carrier_error);
pub const TX_OCTET_COUNT_G: usize = MMC_OFFSET + offset_of!(Mmc, tx_octet_count_g);
pub const TX_PACKET_COUNT_G: usize = MMC_OFFSET + offset_of!(Mmc, tx_packet_count_g);
pub const TX_EXCESSIVE_DEFERRAL_ERROR: usize =
    MMC_OFFSET + offset_of!(Mmc, tx_excessive_deferral_error);
pub const TX_PAUSE_PACKETS: usize = MMC_OFFSET + offset_of!(Mmc, tx_pause_packets);
pub const TX_VLAN_PACKETS_G: usize = MMC_OFFSET + offset_of!(Mmc, tx_vlan_packets_g);
pub const TX_OVERSIZE_PACKETS_G: usize = MMC_OFFSET + offset_of!(Mmc, tx_oversize_packets_g);

// Receive counters.
pub const RX_PACKET_COUNT_GB: usize = MMC_OFFSET + offset_of!(Mmc, rx_packet_count_gb);
pub const RX_OCTET_COUNT_GB: usize = MMC_OFFSET + offset_of!(Mmc, rx_octet_count_gb);
pub const RX_OCTET_COUNT_G: usize = MMC_OFFSET + offset_of!(Mmc, rx_octet_count_g);
pub const RX_BROADCAST_PACKETS_G: usize = MMC_OFFSET + offset_of!(Mmc, rx_broadcast_packets_g);
pub const RX_MULTICAST_PACKETS_G: usize = MMC_OFFSET + offset_of!(Mmc, rx_multicast_packets_g);
pub const RX_CRC_ERROR: usize = MMC_OFFSET + offset_of!(Mmc, rx_crc_error);
pub const RX_ALIGNMENT_ERROR: usize = MMC_OFFSET + offset_of!(Mmc, rx_alignment_error);
pub const RX_RUNT_ERROR: usize = MMC_OFFSET + offset_of!(Mmc, rx_runt_error);
pub const RX_JABBER_ERROR: usize = MMC_OFFSET + offset_of!(Mmc, rx_jabber_error);
pub const RX_UNDERSIZE_PACKETS_G: usize = MMC_OFFSET + offset_of!(Mmc, rx_undersize_packets_g);
pub const RX_OVERSIZE_PACKETS_G: usize = MMC_OFFSET + offset_of!(Mmc, rx_oversize_packets_g);
pub const RX_64_OCTETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, rx_64_octets_gb);
pub const RX_65_TO_127_OCTETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, rx_65_to_127_octets_gb);
pub const RX_128_TO_255_OCTETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, rx_128_to_255_octets_gb);
pub const RX_256_TO_511_OCTETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, rx_256_to_511_octets_gb);
pub const RX_512_TO_1023_OCTETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, rx_512_to_1023_octets_gb);
pub const RX_1024_TO_MAX_OCTETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, rx_1024_to_max_octets_gb);
pub const RX_UNICAST_PACKETS_G: usize = MMC_OFFSET + offset_of!(Mmc, rx_unicast_packets_g);
pub const RX_LENGTH_ERROR: usize = MMC_OFFSET + offset_of!(Mmc, rx_length_error);
pub const RX_OUT_OF_RANGE_TYPE: usize = MMC_OFFSET + offset_of!(Mmc, rx_out_of_range_type);
pub const RX_PAUSE_PACKETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_pause_packets);
pub const RX_FIFO_OVERFLOW: usize = MMC_OFFSET + offset_of!(Mmc, rx_fifo_overflow);
pub const RX_VLAN_PACKETS_GB: usize = MMC_OFFSET + offset_of!(Mmc, rx_vlan_packets_gb);
pub const RX_WATCHDOG_ERROR: usize = MMC_OFFSET + offset_of!(Mmc, rx_watchdog_error);
pub const RX_RECEIVE_ERROR: usize = MMC_OFFSET + offset_of!(Mmc, rx_receive_error);
pub const RX_CONTROL_PACKETS_G: usize = MMC_OFFSET + offset_of!(Mmc, rx_control_packets_g);

// Receive checksum offload (IPC) packet counters.
pub const RX_IPV4_GOOD_PACKETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_ipv4_good_packets);
pub const RX_IPV4_HEADER_ERROR_PACKETS: usize =
    MMC_OFFSET + offset_of!(Mmc, rx_ipv4_header_error_packets);
pub const RX_IPV4_NO_PAYLOAD_PACKETS: usize =
    MMC_OFFSET + offset_of!(Mmc, rx_ipv4_no_payload_packets);
pub const RX_IPV4_FRAGMENTED_PACKETS: usize =
    MMC_OFFSET + offset_of!(Mmc, rx_ipv4_fragmented_packets);
pub const RX_IPV4_UDP_CHECKSUM_DISABLED_PACKETS: usize =
    MMC_OFFSET + offset_of!(Mmc, rx_ipv4_udp_checksum_disabled_packets);
pub const RX_IPV6_GOOD_PACKETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_ipv6_good_packets);
pub const RX_IPV6_HEADER_ERROR_PACKETS: usize =
    MMC_OFFSET + offset_of!(Mmc, rx_ipv6_header_error_packets);
pub const RX_IPV6_NO_PAYLOAD_PACKETS: usize =
    MMC_OFFSET + offset_of!(Mmc, rx_ipv6_no_payload_packets);
pub const RX_UDP_GOOD_PACKETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_udp_good_packets);
pub const RX_UDP_ERROR_PACKETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_udp_error_packets);
pub const RX_TCP_GOOD_PACKETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_tcp_good_packets);
pub const RX_TCP_ERROR_PACKETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_tcp_error_packets);
pub const RX_ICMP_GOOD_PACKETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_icmp_good_packets);
pub const RX_ICMP_ERROR_PACKETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_icmp_error_packets);

// Receive checksum offload (IPC) octet counters.
pub const RX_IPV4_GOOD_OCTETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_ipv4_good_octets);
pub const RX_IPV4_HEADER_ERROR_OCTETS: usize =
    MMC_OFFSET + offset_of!(Mmc, rx_ipv4_header_error_octets);
pub const RX_IPV4_NO_PAYLOAD_OCTETS: usize =
    MMC_OFFSET + offset_of!(Mmc, rx_ipv4_no_payload_octets);
pub const RX_IPV4_FRAGMENTED_OCTETS: usize =
    MMC_OFFSET + offset_of!(Mmc, rx_ipv4_fragmented_octets);
pub const RX_IPV4_UDP_CHECKSUM_DISABLED_OCTETS: usize =
    MMC_OFFSET + offset_of!(Mmc, rx_ipv4_udp_checksum_disabled_octets);
pub const RX_IPV6_GOOD_OCTETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_ipv6_good_octets);
pub const RX_IPV6_HEADER_ERROR_OCTETS: usize =
    MMC_OFFSET + offset_of!(Mmc, rx_ipv6_header_error_octets);
pub const RX_IPV6_NO_PAYLOAD_OCTETS: usize =
    MMC_OFFSET + offset_of!(Mmc, rx_ipv6_no_payload_octets);
pub const RX_UDP_GOOD_OCTETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_udp_good_octets);
pub const RX_UDP_ERROR_OCTETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_udp_error_octets);
pub const RX_TCP_GOOD_OCTETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_tcp_good_octets);
pub const RX_TCP_ERROR_OCTETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_tcp_error_octets);
pub const RX_ICMP_GOOD_OCTETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_icmp_good_octets);
pub const RX_ICMP_ERROR_OCTETS: usize = MMC_OFFSET + offset_of!(Mmc, rx_icmp_error_octets);
