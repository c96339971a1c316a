//! Small value types shared by set entries.

use std::fmt;
use std::str::FromStr;

use crate::netlink::{Error, Result};

/// IP protocol of a port-carrying entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IpProtocol {
    /// TCP (6)
    #[default]
    Tcp,
    /// UDP (17)
    Udp,
    /// ICMP (1)
    Icmp,
    /// ICMPv6 (58)
    Icmpv6,
    /// Other protocol
    Other(u8),
}

impl IpProtocol {
    pub fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::Icmp,
            6 => Self::Tcp,
            17 => Self::Udp,
            58 => Self::Icmpv6,
            other => Self::Other(other),
        }
    }

    /// Get the protocol number.
    pub fn number(&self) -> u8 {
        match self {
            Self::Icmp => 1,
            Self::Tcp => 6,
            Self::Udp => 17,
            Self::Icmpv6 => 58,
            Self::Other(n) => *n,
        }
    }
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Udp => f.write_str("udp"),
            Self::Icmp => f.write_str("icmp"),
            Self::Icmpv6 => f.write_str("icmpv6"),
            Self::Other(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for IpProtocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            "icmp" => Ok(Self::Icmp),
            "icmpv6" => Ok(Self::Icmpv6),
            other => other
                .parse::<u8>()
                .map(Self::from_u8)
                .map_err(|_| Error::InvalidEntry(format!("unknown protocol: {}", s))),
        }
    }
}

/// Ethernet hardware address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidEntry(format!("invalid MAC address: {}", s));
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(invalid());
        }

        let mut mac = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() || part.len() > 2 {
                return Err(invalid());
            }
            mac[i] = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }

        Ok(Self(mac))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_numbers() {
        assert_eq!(IpProtocol::from_u8(6), IpProtocol::Tcp);
        assert_eq!(IpProtocol::from_u8(17), IpProtocol::Udp);
        assert_eq!(IpProtocol::from_u8(132), IpProtocol::Other(132));
        assert_eq!(IpProtocol::Other(132).number(), 132);
        assert_eq!(IpProtocol::default(), IpProtocol::Tcp);
    }

    #[test]
    fn test_protocol_parse() {
        assert_eq!("tcp".parse::<IpProtocol>().unwrap(), IpProtocol::Tcp);
        assert_eq!("UDP".parse::<IpProtocol>().unwrap(), IpProtocol::Udp);
        assert_eq!("132".parse::<IpProtocol>().unwrap(), IpProtocol::Other(132));
        assert!("sctpx".parse::<IpProtocol>().is_err());
    }

    #[test]
    fn test_mac() {
        let mac: MacAddr = "00:1A:2b:3c:4d:5e".parse().unwrap();
        assert_eq!(mac.octets(), [0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]);
        assert_eq!(mac.to_string(), "00:1a:2b:3c:4d:5e");
        assert!("00:1a:2b:3c:4d".parse::<MacAddr>().is_err());
        assert!("00:1a:2b:3c:4d:zz".parse::<MacAddr>().is_err());
        assert!("00:1a:2b:3c:4d:5e5".parse::<MacAddr>().is_err());
    }
}
