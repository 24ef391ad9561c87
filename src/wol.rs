//! Wake-on-LAN collaborator
//!
//! The scan pipeline only consumes [`build_wake_link`]; the magic-packet
//! sender backs the `--wake` action.

use crate::error::ScanError;
use std::net::{Ipv4Addr, UdpSocket};

/// Default broadcast destination for magic packets
pub const DEFAULT_BROADCAST: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 255);

/// Default UDP port for magic packets
pub const DEFAULT_WOL_PORT: u16 = 9;

/// Build the wake-trigger URL shown next to a host. A broadcast override
/// is appended as an extra path segment when given.
pub fn build_wake_link(mac: &str, broadcast: Option<Ipv4Addr>, link_port: u16) -> String {
    match broadcast {
        Some(broadcast) => format!("http://localhost:{}/{}/{}", link_port, mac, broadcast),
        None => format!("http://localhost:{}/{}/", link_port, mac),
    }
}

/// Parse a MAC in colon, dash or bare-hex form into its six octets
pub fn parse_mac(mac: &str) -> crate::Result<[u8; 6]> {
    let hex: String = mac.chars().filter(|c| *c != ':' && *c != '-').collect();
    if hex.len() != 12 || !hex.is_ascii() {
        return Err(ScanError::ParseError(format!(
            "Invalid MAC address length: {}",
            mac
        )));
    }

    let mut octets = [0u8; 6];
    for (i, octet) in octets.iter_mut().enumerate() {
        *octet = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| ScanError::ParseError(format!("Invalid MAC address format: {}", mac)))?;
    }

    Ok(octets)
}

/// Assemble the magic-packet payload: six `0xFF` octets then the MAC
/// repeated sixteen times.
pub fn magic_packet(mac: [u8; 6]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(102);
    packet.extend_from_slice(&[0xFF; 6]);
    for _ in 0..16 {
        packet.extend_from_slice(&mac);
    }
    packet
}

/// Send one magic packet for `mac` to `broadcast:port`
pub fn send_magic_packet(mac: &str, broadcast: Ipv4Addr, port: u16) -> crate::Result<()> {
    let packet = magic_packet(parse_mac(mac)?);

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.set_broadcast(true)?;
    socket.send_to(&packet, (broadcast, port))?;

    Ok(())
}
