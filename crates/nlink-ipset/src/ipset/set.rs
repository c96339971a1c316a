//! Set-variant payloads and their attribute encodings.
//!
//! A [`Set`] is the type-specific part of an entry: the address, range,
//! network, port or MAC that identifies the element. Each variant encodes
//! to the attribute sequence the kernel expects inside an entry's `DATA`
//! container.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use super::command::Family;
use super::consts::*;
use super::types::{IpProtocol, MacAddr};
use crate::netlink::attr::{Attr, NLA_F_NESTED, NLA_F_NET_BYTEORDER, RawAttr};
use crate::netlink::{AttrLocation, Error, Result, parse};

/// Which [`Set`] variant the entries of a set decode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetKind {
    Ip,
    IpPort,
    Net,
    NetPort,
    Mac,
}

impl SetKind {
    /// Map a kernel type name to the variant its entries use.
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        match type_name {
            "hash:ip" | "bitmap:ip" => Some(Self::Ip),
            "hash:ip,port" => Some(Self::IpPort),
            "hash:net" => Some(Self::Net),
            "hash:net,port" => Some(Self::NetPort),
            "hash:mac" => Some(Self::Mac),
            _ => None,
        }
    }

    /// The canonical hash type for this kind.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Ip => "hash:ip",
            Self::IpPort => "hash:ip,port",
            Self::Net => "hash:net",
            Self::NetPort => "hash:net,port",
            Self::Mac => "hash:mac",
        }
    }
}

impl fmt::Display for SetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// The type-specific part of a set entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Set {
    /// Single address or inclusive address range.
    Ip { addr: IpAddr, to: Option<IpAddr> },
    /// Address (or range) with a port (or port range) and protocol.
    IpPort {
        addr: IpAddr,
        to: Option<IpAddr>,
        port: u16,
        port_to: Option<u16>,
        proto: IpProtocol,
    },
    /// Network; `cidr: None` means no mask is sent.
    Net { addr: IpAddr, cidr: Option<u8> },
    /// Network with a port (or port range) and protocol.
    NetPort {
        addr: IpAddr,
        cidr: Option<u8>,
        port: u16,
        port_to: Option<u16>,
        proto: IpProtocol,
    },
    /// Hardware address.
    Mac(MacAddr),
}

impl Set {
    pub fn ip(addr: IpAddr) -> Self {
        Self::Ip { addr, to: None }
    }

    pub fn ip_range(addr: IpAddr, to: IpAddr) -> Self {
        Self::Ip { addr, to: Some(to) }
    }

    pub fn ip_port(addr: IpAddr, proto: IpProtocol, port: u16) -> Self {
        Self::IpPort {
            addr,
            to: None,
            port,
            port_to: None,
            proto,
        }
    }

    /// A network; a CIDR of zero is stored as no mask.
    pub fn net(addr: IpAddr, cidr: u8) -> Self {
        Self::Net {
            addr,
            cidr: non_zero(cidr),
        }
    }

    pub fn net_port(addr: IpAddr, cidr: u8, proto: IpProtocol, port: u16) -> Self {
        Self::NetPort {
            addr,
            cidr: non_zero(cidr),
            port,
            port_to: None,
            proto,
        }
    }

    pub fn mac(mac: impl Into<MacAddr>) -> Self {
        Self::Mac(mac.into())
    }

    pub fn kind(&self) -> SetKind {
        match self {
            Self::Ip { .. } => SetKind::Ip,
            Self::IpPort { .. } => SetKind::IpPort,
            Self::Net { .. } => SetKind::Net,
            Self::NetPort { .. } => SetKind::NetPort,
            Self::Mac(_) => SetKind::Mac,
        }
    }

    /// Address family of the entry, `None` for MAC entries.
    pub fn family(&self) -> Option<Family> {
        match self {
            Self::Ip { addr, .. }
            | Self::IpPort { addr, .. }
            | Self::Net { addr, .. }
            | Self::NetPort { addr, .. } => Some(Family::of(addr)),
            Self::Mac(_) => None,
        }
    }

    /// Attributes for this entry, in kernel order.
    pub fn encode(&self) -> Vec<Attr> {
        let mut attrs = Vec::new();
        match self {
            Self::Ip { addr, to } => {
                attrs.push(ip_attr(IPSET_ATTR_IP, addr));
                if let Some(to) = to {
                    attrs.push(ip_attr(IPSET_ATTR_IP_TO, to));
                }
            }
            Self::IpPort {
                addr,
                to,
                port,
                port_to,
                proto,
            } => {
                attrs.push(ip_attr(IPSET_ATTR_IP, addr));
                if let Some(to) = to {
                    attrs.push(ip_attr(IPSET_ATTR_IP_TO, to));
                }
                push_port(&mut attrs, *port, *port_to, *proto);
            }
            Self::Net { addr, cidr } => {
                attrs.push(ip_attr(IPSET_ATTR_IP, addr));
                push_cidr(&mut attrs, *cidr);
            }
            Self::NetPort {
                addr,
                cidr,
                port,
                port_to,
                proto,
            } => {
                attrs.push(ip_attr(IPSET_ATTR_IP, addr));
                push_cidr(&mut attrs, *cidr);
                push_port(&mut attrs, *port, *port_to, *proto);
            }
            Self::Mac(mac) => attrs.push(Attr::bytes(IPSET_ATTR_ETHER, mac.octets())),
        }
        attrs
    }

    /// Parse a string form as the given kind.
    ///
    /// Plain addresses are accepted for network kinds and become an
    /// unmasked network.
    pub fn parse_as(kind: SetKind, s: &str) -> Result<Self> {
        let parsed: Set = s.parse()?;
        match (kind, parsed) {
            (SetKind::Net, Set::Ip { addr, to: None }) => Ok(Set::Net { addr, cidr: None }),
            (
                SetKind::NetPort,
                Set::IpPort {
                    addr,
                    to: None,
                    port,
                    port_to,
                    proto,
                },
            ) => Ok(Set::NetPort {
                addr,
                cidr: None,
                port,
                port_to,
                proto,
            }),
            (kind, parsed) if parsed.kind() == kind => Ok(parsed),
            _ => Err(Error::InvalidEntry(format!(
                "{:?} is not a valid {} entry",
                s, kind
            ))),
        }
    }
}

fn non_zero(cidr: u8) -> Option<u8> {
    (cidr != 0).then_some(cidr)
}

/// Nested address container (`IP`, `IP_TO`, `IP2`, ...) holding one
/// network-order address leaf.
pub fn ip_attr(kind: u16, addr: &IpAddr) -> Attr {
    let leaf = match addr {
        IpAddr::V4(v4) => Attr::bytes(IPSET_ATTR_IPADDR_IPV4 | NLA_F_NET_BYTEORDER, v4.octets()),
        IpAddr::V6(v6) => Attr::bytes(IPSET_ATTR_IPADDR_IPV6 | NLA_F_NET_BYTEORDER, v6.octets()),
    };
    Attr::nested(kind, vec![leaf])
}

fn push_cidr(attrs: &mut Vec<Attr>, cidr: Option<u8>) {
    if let Some(cidr) = cidr.filter(|&c| c != 0) {
        attrs.push(Attr::u8(IPSET_ATTR_CIDR, cidr));
    }
}

fn push_port(attrs: &mut Vec<Attr>, port: u16, port_to: Option<u16>, proto: IpProtocol) {
    attrs.push(Attr::u16_be(IPSET_ATTR_PORT, port));
    if let Some(port_to) = port_to {
        attrs.push(Attr::u16_be(IPSET_ATTR_PORT_TO, port_to));
    }
    attrs.push(Attr::u8(IPSET_ATTR_PROTO, proto.number()));
}

/// Decode a nested address container.
pub fn decode_ip(attr: RawAttr<'_>) -> Result<IpAddr> {
    let mut addr = None;
    for child in attr.nested() {
        let child = child?;
        let value = match child.raw_type() {
            t if t == IPSET_ATTR_IPADDR_IPV4 || t == IPSET_ATTR_IPADDR_IPV4 | NLA_F_NET_BYTEORDER => {
                IpAddr::V4(parse::ipv4(child.payload())?)
            }
            t if t == IPSET_ATTR_IPADDR_IPV6 || t == IPSET_ATTR_IPADDR_IPV6 | NLA_F_NET_BYTEORDER => {
                IpAddr::V6(parse::ipv6(child.payload())?)
            }
            kind => {
                return Err(Error::UnknownAttribute {
                    location: AttrLocation::IpAddress,
                    kind,
                });
            }
        };
        if addr.replace(value).is_some() {
            return Err(Error::InvalidAttribute(
                "address container holds more than one address".into(),
            ));
        }
    }
    addr.ok_or(Error::MissingAttribute {
        location: AttrLocation::IpAddress,
        name: "IPSET_ATTR_IPADDR",
    })
}

/// Type-specific fields collected while decoding one entry.
#[derive(Debug, Default, Clone)]
pub(crate) struct SetFields {
    pub ip: Option<IpAddr>,
    pub ip_to: Option<IpAddr>,
    pub cidr: Option<u8>,
    pub port: Option<u16>,
    pub port_to: Option<u16>,
    pub proto: Option<u8>,
    pub mac: Option<MacAddr>,
}

impl SetFields {
    /// Decode one type-specific attribute. Returns `false` if `attr` is not one.
    pub fn decode(&mut self, attr: RawAttr<'_>) -> Result<bool> {
        const IP: u16 = IPSET_ATTR_IP | NLA_F_NESTED;
        const IP_TO: u16 = IPSET_ATTR_IP_TO | NLA_F_NESTED;
        const PORT: u16 = IPSET_ATTR_PORT | NLA_F_NET_BYTEORDER;
        const PORT_TO: u16 = IPSET_ATTR_PORT_TO | NLA_F_NET_BYTEORDER;

        match attr.raw_type() {
            IP => self.ip = Some(decode_ip(attr)?),
            IP_TO => self.ip_to = Some(decode_ip(attr)?),
            IPSET_ATTR_CIDR => self.cidr = non_zero(parse::u8(attr.payload())?),
            PORT => self.port = Some(parse::u16_be(attr.payload())?),
            PORT_TO => self.port_to = Some(parse::u16_be(attr.payload())?),
            IPSET_ATTR_PROTO => self.proto = Some(parse::u8(attr.payload())?),
            IPSET_ATTR_ETHER => self.mac = Some(MacAddr(parse::mac(attr.payload())?)),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Guess the kind from which attributes are present.
    fn infer_kind(&self) -> Option<SetKind> {
        match (self.mac, self.ip, self.port, self.cidr) {
            (Some(_), None, _, _) => Some(SetKind::Mac),
            (_, Some(_), Some(_), Some(_)) => Some(SetKind::NetPort),
            (_, Some(_), Some(_), None) => Some(SetKind::IpPort),
            (_, Some(_), None, Some(_)) => Some(SetKind::Net),
            (_, Some(_), None, None) => Some(SetKind::Ip),
            _ => None,
        }
    }

    /// First collected attribute that `kind` has no field for.
    fn unused_by(&self, kind: SetKind) -> Option<u16> {
        // (ip, ip_to, cidr, ports, mac)
        let used = match kind {
            SetKind::Mac => (false, false, false, false, true),
            SetKind::Ip => (true, true, false, false, false),
            SetKind::Net => (true, false, true, false, false),
            SetKind::IpPort => (true, true, false, true, false),
            SetKind::NetPort => (true, false, true, true, false),
        };
        [
            (self.ip.is_some() && !used.0, IPSET_ATTR_IP | NLA_F_NESTED),
            (self.ip_to.is_some() && !used.1, IPSET_ATTR_IP_TO | NLA_F_NESTED),
            (self.cidr.is_some() && !used.2, IPSET_ATTR_CIDR),
            (self.port.is_some() && !used.3, IPSET_ATTR_PORT | NLA_F_NET_BYTEORDER),
            (self.port_to.is_some() && !used.3, IPSET_ATTR_PORT_TO | NLA_F_NET_BYTEORDER),
            (self.proto.is_some() && !used.3, IPSET_ATTR_PROTO),
            (self.mac.is_some() && !used.4, IPSET_ATTR_ETHER),
        ]
        .into_iter()
        .find_map(|(unused, attr)| unused.then_some(attr))
    }

    /// Build the set for `kind`, or for the inferred kind when `None`.
    ///
    /// An attribute the kind cannot hold fails the decode instead of being
    /// dropped.
    pub fn into_set(self, kind: Option<SetKind>) -> Result<Set> {
        let kind = kind.or_else(|| self.infer_kind()).ok_or(Error::MissingAttribute {
            location: AttrLocation::AdtEntry,
            name: "IPSET_ATTR_IP",
        })?;
        if let Some(attr) = self.unused_by(kind) {
            return Err(Error::UnknownAttribute {
                location: AttrLocation::AdtEntry,
                kind: attr,
            });
        }

        let missing = |name| Error::MissingAttribute {
            location: AttrLocation::AdtEntry,
            name,
        };
        let proto = IpProtocol::from_u8(self.proto.unwrap_or(libc::IPPROTO_TCP as u8));

        match kind {
            SetKind::Mac => self.mac.map(Set::Mac).ok_or(missing("IPSET_ATTR_ETHER")),
            SetKind::Ip => Ok(Set::Ip {
                addr: self.ip.ok_or(missing("IPSET_ATTR_IP"))?,
                to: self.ip_to,
            }),
            SetKind::Net => Ok(Set::Net {
                addr: self.ip.ok_or(missing("IPSET_ATTR_IP"))?,
                cidr: self.cidr,
            }),
            SetKind::IpPort => Ok(Set::IpPort {
                addr: self.ip.ok_or(missing("IPSET_ATTR_IP"))?,
                to: self.ip_to,
                port: self.port.ok_or(missing("IPSET_ATTR_PORT"))?,
                port_to: self.port_to,
                proto,
            }),
            SetKind::NetPort => Ok(Set::NetPort {
                addr: self.ip.ok_or(missing("IPSET_ATTR_IP"))?,
                cidr: self.cidr,
                port: self.port.ok_or(missing("IPSET_ATTR_PORT"))?,
                port_to: self.port_to,
                proto,
            }),
        }
    }
}

fn fmt_ports(
    f: &mut fmt::Formatter<'_>,
    port: u16,
    port_to: Option<u16>,
    proto: IpProtocol,
) -> fmt::Result {
    write!(f, ",{}:{}", proto, port)?;
    if let Some(port_to) = port_to {
        write!(f, "-{}", port_to)?;
    }
    Ok(())
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip { addr, to } => {
                write!(f, "{}", addr)?;
                if let Some(to) = to {
                    write!(f, "-{}", to)?;
                }
                Ok(())
            }
            Self::IpPort {
                addr,
                to,
                port,
                port_to,
                proto,
            } => {
                write!(f, "{}", addr)?;
                if let Some(to) = to {
                    write!(f, "-{}", to)?;
                }
                fmt_ports(f, *port, *port_to, *proto)
            }
            Self::Net { addr, cidr } => {
                write!(f, "{}", addr)?;
                if let Some(cidr) = cidr {
                    write!(f, "/{}", cidr)?;
                }
                Ok(())
            }
            Self::NetPort {
                addr,
                cidr,
                port,
                port_to,
                proto,
            } => {
                write!(f, "{}", addr)?;
                if let Some(cidr) = cidr {
                    write!(f, "/{}", cidr)?;
                }
                fmt_ports(f, *port, *port_to, *proto)
            }
            Self::Mac(mac) => write!(f, "{}", mac),
        }
    }
}

fn invalid(s: &str, what: &str) -> Error {
    Error::InvalidEntry(format!("{}: {}", what, s))
}

fn parse_addr(s: &str) -> Result<IpAddr> {
    s.trim().parse().map_err(|_| invalid(s, "invalid address"))
}

/// `addr` or `addr-addr`, both of the same family.
fn parse_range(s: &str) -> Result<(IpAddr, Option<IpAddr>)> {
    match s.split_once('-') {
        Some((from, to)) => {
            let (from, to) = (parse_addr(from)?, parse_addr(to)?);
            if Family::of(&from) != Family::of(&to) {
                return Err(invalid(s, "mixed address families"));
            }
            Ok((from, Some(to)))
        }
        None => Ok((parse_addr(s)?, None)),
    }
}

/// `addr/cidr` with the prefix checked against the family.
fn parse_net(s: &str) -> Result<(IpAddr, Option<u8>)> {
    let (addr, cidr) = s.split_once('/').ok_or_else(|| invalid(s, "missing prefix"))?;
    let addr = parse_addr(addr)?;
    let cidr: u8 = cidr.trim().parse().map_err(|_| invalid(s, "invalid prefix length"))?;
    let max = match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    if cidr > max {
        return Err(invalid(s, "invalid prefix length"));
    }
    Ok((addr, non_zero(cidr)))
}

/// `[proto:]port[-port]`, TCP when no protocol is given.
fn parse_ports(s: &str) -> Result<(IpProtocol, u16, Option<u16>)> {
    let (proto, ports) = match s.split_once(':') {
        Some((proto, ports)) => (proto.parse()?, ports),
        None => (IpProtocol::Tcp, s),
    };
    let port = |p: &str| p.trim().parse::<u16>().map_err(|_| invalid(s, "invalid port"));
    match ports.split_once('-') {
        Some((from, to)) => Ok((proto, port(from)?, Some(port(to)?))),
        None => Ok((proto, port(ports)?, None)),
    }
}

impl FromStr for Set {
    type Err = Error;

    /// Infer the variant from the shape of `s`: `ip`, `ip-ip`,
    /// `ip,[proto:]port[-port]`, `net/cidr`, `net/cidr,[proto:]port[-port]`
    /// or a colon separated MAC address.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidEntry("empty entry".into()));
        }

        if let Some((head, ports)) = s.split_once(',') {
            let (proto, port, port_to) = parse_ports(ports)?;
            if head.contains('/') {
                let (addr, cidr) = parse_net(head)?;
                return Ok(Set::NetPort {
                    addr,
                    cidr,
                    port,
                    port_to,
                    proto,
                });
            }
            let (addr, to) = parse_range(head)?;
            return Ok(Set::IpPort {
                addr,
                to,
                port,
                port_to,
                proto,
            });
        }

        if s.contains('/') {
            let (addr, cidr) = parse_net(s)?;
            return Ok(Set::Net { addr, cidr });
        }

        match parse_range(s) {
            Ok((addr, to)) => Ok(Set::Ip { addr, to }),
            Err(err) => s.parse::<MacAddr>().map(Set::Mac).map_err(|_| err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::AttrIter;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    fn encode_all(attrs: &[Attr]) -> Vec<u8> {
        let mut buf = Vec::new();
        for attr in attrs {
            attr.encode_into(&mut buf).unwrap();
        }
        buf
    }

    fn decode_as(buf: &[u8], kind: Option<SetKind>) -> Set {
        let mut fields = SetFields::default();
        for attr in AttrIter::new(buf) {
            assert!(fields.decode(attr.unwrap()).unwrap());
        }
        fields.into_set(kind).unwrap()
    }

    #[test]
    fn test_ip_encoding_bytes() {
        let buf = encode_all(&Set::ip(v4(10, 0, 0, 1)).encode());
        let mut expected = Vec::new();
        expected.extend_from_slice(&12u16.to_ne_bytes());
        expected.extend_from_slice(&(IPSET_ATTR_IP | NLA_F_NESTED).to_ne_bytes());
        expected.extend_from_slice(&8u16.to_ne_bytes());
        expected.extend_from_slice(&(IPSET_ATTR_IPADDR_IPV4 | NLA_F_NET_BYTEORDER).to_ne_bytes());
        expected.extend_from_slice(&[10, 0, 0, 1]);
        assert_eq!(buf, expected);
    }

    #[test]
    fn test_ipv6_leaf() {
        let addr = IpAddr::V6(Ipv6Addr::LOCALHOST);
        let attr = ip_attr(IPSET_ATTR_IP, &addr);
        assert_eq!(attr.children().len(), 1);
        assert_eq!(
            attr.children()[0].raw_type(),
            IPSET_ATTR_IPADDR_IPV6 | NLA_F_NET_BYTEORDER
        );
        assert_eq!(attr.to_bytes().unwrap().len(), 4 + 4 + 16);
    }

    #[test]
    fn test_ip_port_byte_order() {
        let set = Set::ip_port(v4(192, 168, 1, 1), IpProtocol::Udp, 53);
        let attrs = set.encode();
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs[1].raw_type(), IPSET_ATTR_PORT | NLA_F_NET_BYTEORDER);
        assert_eq!(attrs[1].to_bytes().unwrap()[4..6], [0x00, 0x35]);
        assert_eq!(attrs[2].raw_type(), IPSET_ATTR_PROTO);
        assert_eq!(attrs[2].to_bytes().unwrap()[4], 17);
    }

    #[test]
    fn test_net_without_cidr_emits_no_cidr() {
        let attrs = Set::net(v4(10, 0, 0, 0), 0).encode();
        assert_eq!(attrs.len(), 1);

        let attrs = Set::Net {
            addr: v4(10, 0, 0, 0),
            cidr: Some(0),
        }
        .encode();
        assert_eq!(attrs.len(), 1);

        let attrs = Set::net(v4(10, 0, 0, 0), 8).encode();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[1].raw_type(), IPSET_ATTR_CIDR);
    }

    #[test]
    fn test_variant_roundtrips() {
        let sets = [
            Set::ip(v4(10, 0, 0, 1)),
            Set::ip_range(v4(10, 0, 0, 1), v4(10, 0, 0, 9)),
            Set::IpPort {
                addr: v4(10, 0, 0, 1),
                to: None,
                port: 8000,
                port_to: Some(8080),
                proto: IpProtocol::Udp,
            },
            Set::net(v4(10, 1, 0, 0), 16),
            Set::net(v4(10, 1, 0, 0), 0),
            Set::net_port("2001:db8::".parse().unwrap(), 32, IpProtocol::Tcp, 443),
            Set::mac([0, 1, 2, 3, 4, 5]),
        ];
        for set in sets {
            let buf = encode_all(&set.encode());
            assert_eq!(decode_as(&buf, Some(set.kind())), set, "{}", set);
        }
    }

    #[test]
    fn test_inferred_kind() {
        let set = Set::net_port(v4(10, 0, 0, 0), 8, IpProtocol::Tcp, 22);
        let buf = encode_all(&set.encode());
        assert_eq!(decode_as(&buf, None), set);

        let set = Set::mac([0xaa; 6]);
        let buf = encode_all(&set.encode());
        assert_eq!(decode_as(&buf, None), set);
    }

    #[test]
    fn test_missing_port() {
        let buf = encode_all(&Set::ip(v4(1, 2, 3, 4)).encode());
        let mut fields = SetFields::default();
        for attr in AttrIter::new(&buf) {
            fields.decode(attr.unwrap()).unwrap();
        }
        assert!(matches!(
            fields.into_set(Some(SetKind::IpPort)),
            Err(Error::MissingAttribute {
                name: "IPSET_ATTR_PORT",
                ..
            })
        ));
    }

    #[test]
    fn test_attribute_unused_by_kind_is_rejected() {
        let mut attrs = Set::ip(v4(10, 0, 0, 1)).encode();
        attrs.push(Attr::bytes(IPSET_ATTR_ETHER, [1, 2, 3, 4, 5, 6]));
        let buf = encode_all(&attrs);
        for kind in [None, Some(SetKind::Ip)] {
            let mut fields = SetFields::default();
            for attr in AttrIter::new(&buf) {
                fields.decode(attr.unwrap()).unwrap();
            }
            assert!(matches!(
                fields.into_set(kind),
                Err(Error::UnknownAttribute {
                    location: AttrLocation::AdtEntry,
                    kind: IPSET_ATTR_ETHER
                })
            ));
        }

        let buf = encode_all(&Set::ip_port(v4(10, 0, 0, 1), IpProtocol::Udp, 53).encode());
        let mut fields = SetFields::default();
        for attr in AttrIter::new(&buf) {
            fields.decode(attr.unwrap()).unwrap();
        }
        assert!(matches!(
            fields.into_set(Some(SetKind::Ip)),
            Err(Error::UnknownAttribute {
                location: AttrLocation::AdtEntry,
                kind
            }) if kind == IPSET_ATTR_PORT | NLA_F_NET_BYTEORDER
        ));
    }

    #[test]
    fn test_decode_ip_rejects_unknown_leaf() {
        let attr = Attr::nested(IPSET_ATTR_IP, vec![Attr::bytes(5, [1, 2, 3, 4])]);
        let buf = attr.to_bytes().unwrap();
        let raw = AttrIter::new(&buf).next().unwrap().unwrap();
        assert!(matches!(
            decode_ip(raw),
            Err(Error::UnknownAttribute {
                location: AttrLocation::IpAddress,
                kind: 5
            })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Set::ip(v4(1, 2, 3, 4)).to_string(), "1.2.3.4");
        assert_eq!(
            Set::ip_range(v4(1, 2, 3, 4), v4(1, 2, 3, 8)).to_string(),
            "1.2.3.4-1.2.3.8"
        );
        assert_eq!(
            Set::ip_port(v4(1, 2, 3, 4), IpProtocol::Udp, 53).to_string(),
            "1.2.3.4,udp:53"
        );
        assert_eq!(Set::net(v4(10, 0, 0, 0), 8).to_string(), "10.0.0.0/8");
        assert_eq!(Set::net(v4(10, 0, 0, 0), 0).to_string(), "10.0.0.0");
        assert_eq!(Set::mac([0, 0x1a, 0, 0, 0, 0xff]).to_string(), "00:1a:00:00:00:ff");
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!("10.0.0.1".parse::<Set>().unwrap(), Set::ip(v4(10, 0, 0, 1)));
        assert_eq!(
            "10.0.0.1-10.0.0.5".parse::<Set>().unwrap(),
            Set::ip_range(v4(10, 0, 0, 1), v4(10, 0, 0, 5))
        );
        assert_eq!(
            "10.0.0.1,80".parse::<Set>().unwrap(),
            Set::ip_port(v4(10, 0, 0, 1), IpProtocol::Tcp, 80)
        );
        assert_eq!(
            "10.0.0.1,udp:1000-2000".parse::<Set>().unwrap(),
            Set::IpPort {
                addr: v4(10, 0, 0, 1),
                to: None,
                port: 1000,
                port_to: Some(2000),
                proto: IpProtocol::Udp,
            }
        );
        assert_eq!(
            "192.168.0.0/16".parse::<Set>().unwrap(),
            Set::net(v4(192, 168, 0, 0), 16)
        );
        assert_eq!(
            "192.168.0.0/16,tcp:22".parse::<Set>().unwrap(),
            Set::net_port(v4(192, 168, 0, 0), 16, IpProtocol::Tcp, 22)
        );
        assert_eq!(
            "de:ad:be:ef:00:01".parse::<Set>().unwrap(),
            Set::mac([0xde, 0xad, 0xbe, 0xef, 0, 1])
        );
        assert!("::1".parse::<Set>().unwrap().family() == Some(Family::Inet6));
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Set>().is_err());
        assert!("10.0.0.1/33".parse::<Set>().is_err());
        assert!("10.0.0.1-::1".parse::<Set>().is_err());
        assert!("10.0.0.1,http".parse::<Set>().is_err());
        assert!("not-an-entry".parse::<Set>().is_err());
    }

    #[test]
    fn test_display_parse_roundtrip() {
        for s in ["1.2.3.4", "1.2.3.4-1.2.3.9", "1.2.3.4,udp:53-54", "10.0.0.0/8,tcp:22"] {
            assert_eq!(s.parse::<Set>().unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_parse_as() {
        assert_eq!(
            Set::parse_as(SetKind::Net, "10.0.0.1").unwrap(),
            Set::Net {
                addr: v4(10, 0, 0, 1),
                cidr: None
            }
        );
        assert!(matches!(
            Set::parse_as(SetKind::NetPort, "10.0.0.0/8,udp:53").unwrap(),
            Set::NetPort { cidr: Some(8), .. }
        ));
        assert!(Set::parse_as(SetKind::Mac, "10.0.0.1").is_err());
        assert!(Set::parse_as(SetKind::Ip, "10.0.0.0/8").is_err());
    }

    #[test]
    fn test_kind_from_type_name() {
        assert_eq!(SetKind::from_type_name("hash:ip"), Some(SetKind::Ip));
        assert_eq!(SetKind::from_type_name("bitmap:ip"), Some(SetKind::Ip));
        assert_eq!(SetKind::from_type_name("hash:ip,port"), Some(SetKind::IpPort));
        assert_eq!(SetKind::from_type_name("hash:net"), Some(SetKind::Net));
        assert_eq!(SetKind::from_type_name("hash:net,port"), Some(SetKind::NetPort));
        assert_eq!(SetKind::from_type_name("hash:mac"), Some(SetKind::Mac));
        assert_eq!(SetKind::from_type_name("list:set"), None);
    }
}
