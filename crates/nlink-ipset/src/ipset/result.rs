//! Decoding of ipset replies.
//!
//! Every reply payload is an nfgenmsg followed by top-level attributes.
//! LIST replies nest the set metadata in `DATA` and the elements in
//! `ADT`, each element being one more `DATA` container. Large sets are
//! split over several messages that repeat the set name.

use std::net::IpAddr;

use super::consts::*;
use super::entry::Entry;
use super::set::{SetKind, decode_ip};
use crate::netlink::attr::{NLA_F_NESTED, NLA_F_NET_BYTEORDER, RawAttr};
use crate::netlink::{AttrIter, AttrLocation, Error, NfGenMsg, Result, parse};

const DATA: u16 = IPSET_ATTR_DATA | NLA_F_NESTED;
const ADT: u16 = IPSET_ATTR_ADT | NLA_F_NESTED;
const INDEX: u16 = IPSET_ATTR_INDEX | NLA_F_NET_BYTEORDER;

/// Decoded reply to PROTOCOL, TYPE, HEADER or LIST.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetResult {
    /// Envelope of the first message folded in.
    pub nfgenmsg: Option<NfGenMsg>,
    pub protocol: u8,
    /// `PROTOCOL_MIN` in PROTOCOL replies, `REVISION_MIN` in TYPE replies.
    pub protocol_min: Option<u8>,
    pub revision: u8,
    pub family: u8,
    pub flags: u32,
    pub set_name: String,
    pub type_name: String,
    /// Kernel index of the set, sent when the request used protocol 7.
    pub index: Option<u16>,
    pub hash_size: u32,
    pub num_entries: u32,
    pub max_elements: u32,
    pub references: u32,
    pub size_in_memory: u32,
    pub cadt_flags: u32,
    /// Default timeout of the set, if created with one.
    pub timeout: Option<u32>,
    pub bucket_size: Option<u8>,
    pub initval: Option<u32>,
    pub netmask: Option<u8>,
    pub markmask: Option<u32>,
    pub bitmask: Option<IpAddr>,
    /// Size of a list:set.
    pub size: Option<u32>,
    /// Range of a bitmap:ip set.
    pub ip_from: Option<IpAddr>,
    pub ip_to: Option<IpAddr>,
    /// Range of a bitmap:port set.
    pub port_from: Option<u16>,
    pub port_to: Option<u16>,
    pub entries: Vec<Entry>,
}

impl SetResult {
    /// Decode a single reply payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let mut result = Self::default();
        result.decode_message(payload)?;
        Ok(result)
    }

    /// Fold every payload into one result.
    pub fn from_payloads<'a>(payloads: impl IntoIterator<Item = &'a [u8]>) -> Result<Self> {
        let mut result = Self::default();
        for payload in payloads {
            result.decode_message(payload)?;
        }
        Ok(result)
    }

    /// Entry variant used for this set's elements, if the type is known.
    pub fn set_kind(&self) -> Option<SetKind> {
        SetKind::from_type_name(&self.type_name)
    }

    /// Fold one reply payload into `self`.
    ///
    /// Scalars overwrite, entries accumulate. Any attribute not expected at
    /// its level fails the whole decode.
    pub fn decode_message(&mut self, payload: &[u8]) -> Result<()> {
        let (nfgenmsg, attrs) = NfGenMsg::split(payload)?;
        self.nfgenmsg.get_or_insert(nfgenmsg);

        for attr in AttrIter::new(attrs) {
            let attr = attr?;
            let data = attr.payload();
            match attr.raw_type() {
                IPSET_ATTR_PROTOCOL => self.protocol = parse::u8(data)?,
                IPSET_ATTR_PROTOCOL_MIN => self.protocol_min = Some(parse::u8(data)?),
                IPSET_ATTR_REVISION => self.revision = parse::u8(data)?,
                IPSET_ATTR_FAMILY => self.family = parse::u8(data)?,
                IPSET_ATTR_FLAGS => self.flags = decode_flags(data)?,
                IPSET_ATTR_SETNAME => self.set_name = parse::string(data)?.to_string(),
                IPSET_ATTR_TYPENAME => self.type_name = parse::string(data)?.to_string(),
                INDEX => self.index = Some(parse::u16_be(data)?),
                DATA => self.decode_data(attr)?,
                ADT => self.decode_adt(attr)?,
                kind => {
                    return Err(Error::UnknownAttribute {
                        location: AttrLocation::TopLevel,
                        kind,
                    });
                }
            }
        }
        Ok(())
    }

    fn decode_data(&mut self, container: RawAttr<'_>) -> Result<()> {
        const BE: u16 = NLA_F_NET_BYTEORDER;
        const HASHSIZE: u16 = IPSET_ATTR_HASHSIZE | BE;
        const MAXELEM: u16 = IPSET_ATTR_MAXELEM | BE;
        const TIMEOUT: u16 = IPSET_ATTR_TIMEOUT | BE;
        const ELEMENTS: u16 = IPSET_ATTR_ELEMENTS | BE;
        const REFERENCES: u16 = IPSET_ATTR_REFERENCES | BE;
        const MEMSIZE: u16 = IPSET_ATTR_MEMSIZE | BE;
        const CADT_FLAGS: u16 = IPSET_ATTR_CADT_FLAGS | BE;
        const INITVAL: u16 = IPSET_ATTR_INITVAL | BE;
        const MARKMASK: u16 = IPSET_ATTR_MARKMASK | BE;
        const SIZE: u16 = IPSET_ATTR_SIZE | BE;
        const IP: u16 = IPSET_ATTR_IP | NLA_F_NESTED;
        const IP_TO: u16 = IPSET_ATTR_IP_TO | NLA_F_NESTED;
        const BITMASK: u16 = IPSET_ATTR_BITMASK | NLA_F_NESTED;
        const PORT: u16 = IPSET_ATTR_PORT | BE;
        const PORT_TO: u16 = IPSET_ATTR_PORT_TO | BE;

        for attr in container.nested() {
            let attr = attr?;
            let data = attr.payload();
            match attr.raw_type() {
                HASHSIZE => self.hash_size = parse::u32_be(data)?,
                MAXELEM => self.max_elements = parse::u32_be(data)?,
                TIMEOUT => self.timeout = Some(parse::u32_be(data)?),
                ELEMENTS => self.num_entries = parse::u32_be(data)?,
                REFERENCES => self.references = parse::u32_be(data)?,
                MEMSIZE => self.size_in_memory = parse::u32_be(data)?,
                CADT_FLAGS => self.cadt_flags = parse::u32_be(data)?,
                INITVAL => self.initval = Some(parse::u32_be(data)?),
                MARKMASK => self.markmask = Some(parse::u32_be(data)?),
                // hash:*,mark puts its markmask in host order.
                IPSET_ATTR_MARKMASK => self.markmask = Some(parse::u32_ne(data)?),
                SIZE => self.size = Some(parse::u32_be(data)?),
                IPSET_ATTR_BUCKETSIZE => self.bucket_size = Some(parse::u8(data)?),
                IPSET_ATTR_NETMASK => self.netmask = Some(parse::u8(data)?),
                BITMASK => self.bitmask = Some(decode_ip(attr)?),
                IP => self.ip_from = Some(decode_ip(attr)?),
                IP_TO => self.ip_to = Some(decode_ip(attr)?),
                PORT => self.port_from = Some(parse::u16_be(data)?),
                PORT_TO => self.port_to = Some(parse::u16_be(data)?),
                kind => {
                    return Err(Error::UnknownAttribute {
                        location: AttrLocation::SetData,
                        kind,
                    });
                }
            }
        }
        Ok(())
    }

    fn decode_adt(&mut self, container: RawAttr<'_>) -> Result<()> {
        let kind = self.set_kind();
        for attr in container.nested() {
            let attr = attr?;
            match attr.raw_type() {
                DATA => self.entries.push(Entry::decode(attr, kind)?),
                other => {
                    return Err(Error::UnknownAttribute {
                        location: AttrLocation::Adt,
                        kind: other,
                    });
                }
            }
        }
        Ok(())
    }
}

/// `FLAGS` is a u8 in older replies and a be32 in newer ones.
fn decode_flags(data: &[u8]) -> Result<u32> {
    match data.len() {
        1 => parse::u8(data).map(u32::from),
        _ => parse::u32_be(data),
    }
}

/// Set name carried by a reply payload, if any.
pub fn payload_set_name(payload: &[u8]) -> Result<Option<String>> {
    let (_, attrs) = NfGenMsg::split(payload)?;
    for attr in AttrIter::new(attrs) {
        let attr = attr?;
        if attr.raw_type() == IPSET_ATTR_SETNAME {
            return Ok(Some(parse::string(attr.payload())?.to_string()));
        }
    }
    Ok(None)
}

/// Split a LIST dump into one result per set.
///
/// A payload whose set name matches the current result is a continuation
/// and is folded into it; any other name starts a new result.
pub fn decode_dump<'a>(payloads: impl IntoIterator<Item = &'a [u8]>) -> Result<Vec<SetResult>> {
    let mut results: Vec<SetResult> = Vec::new();
    for payload in payloads {
        let name = payload_set_name(payload)?;
        let continues = match (results.last(), &name) {
            (Some(last), Some(name)) => last.set_name == *name,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if continues && let Some(last) = results.last_mut() {
            last.decode_message(payload)?;
        } else {
            results.push(SetResult::from_payload(payload)?);
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipset::fixtures;
    use crate::ipset::set::Set;
    use crate::ipset::types::IpProtocol;
    use crate::netlink::Attr;
    use std::net::Ipv4Addr;

    fn payload(attrs: &[Attr]) -> Vec<u8> {
        let mut buf = NfGenMsg::new(libc::AF_INET as u8).to_bytes().to_vec();
        for attr in attrs {
            attr.encode_into(&mut buf).unwrap();
        }
        buf
    }

    #[test]
    fn test_protocol_reply() {
        let result = SetResult::from_payload(&fixtures::protocol_reply()).unwrap();
        assert_eq!(result.protocol, 7);
        assert_eq!(result.protocol_min, Some(6));
        assert_eq!(result.nfgenmsg.unwrap().family, 2);
    }

    #[test]
    fn test_list_hash_ip_reply() {
        let result = SetResult::from_payload(&fixtures::list_hash_ip()).unwrap();
        assert_eq!(result.set_name, "test");
        assert_eq!(result.type_name, "hash:ip");
        assert_eq!(result.family, 2);
        assert_eq!(result.revision, 4);
        assert_eq!(result.hash_size, 1024);
        assert_eq!(result.max_elements, 65536);
        assert_eq!(result.timeout, Some(3600));
        assert_eq!(result.references, 0);
        assert_eq!(result.num_entries, 1);
        assert_eq!(result.size_in_memory, 296);
        assert_eq!(result.bucket_size, Some(12));
        assert_eq!(result.initval, Some(0x1234_5678));
        assert_eq!(result.entries.len(), 1);

        let entry = &result.entries[0];
        assert_eq!(entry.set, Set::ip(Ipv4Addr::new(10, 0, 0, 1).into()));
        assert_eq!(entry.timeout, Some(3599));
        assert_eq!(entry.comment.as_deref(), Some("hi"));
    }

    #[test]
    fn test_list_hash_net_port_reply() {
        let result = SetResult::from_payload(&fixtures::list_hash_net_port()).unwrap();
        assert_eq!(result.set_kind(), Some(SetKind::NetPort));
        assert_eq!(result.entries.len(), 2);
        assert_eq!(
            result.entries[0].set,
            Set::net_port(Ipv4Addr::new(192, 168, 0, 0).into(), 16, IpProtocol::Udp, 53)
        );
        assert_eq!(result.entries[1].packets, Some(3));
        assert_eq!(result.entries[1].bytes, Some(180));
    }

    #[test]
    fn test_unknown_top_level() {
        let buf = payload(&[Attr::u8(IPSET_ATTR_PROTOCOL, 6), Attr::u8(0x63, 0)]);
        assert!(matches!(
            SetResult::from_payload(&buf),
            Err(Error::UnknownAttribute {
                location: AttrLocation::TopLevel,
                kind: 0x63
            })
        ));
    }

    #[test]
    fn test_set_index() {
        let buf = payload(&[
            Attr::u8(IPSET_ATTR_PROTOCOL, 7),
            Attr::string(IPSET_ATTR_SETNAME, "web"),
            Attr::u16_be(IPSET_ATTR_INDEX, 0x0102),
        ]);
        let result = SetResult::from_payload(&buf).unwrap();
        assert_eq!(result.index, Some(0x0102));

        let buf = payload(&[Attr::u16_ne(IPSET_ATTR_INDEX, 1)]);
        assert!(matches!(
            SetResult::from_payload(&buf),
            Err(Error::UnknownAttribute {
                location: AttrLocation::TopLevel,
                kind: IPSET_ATTR_INDEX
            })
        ));
    }

    #[test]
    fn test_entry_attribute_unused_by_set_type() {
        let buf = payload(&[
            Attr::string(IPSET_ATTR_SETNAME, "hosts"),
            Attr::string(IPSET_ATTR_TYPENAME, "hash:ip,mac"),
            Attr::nested(
                IPSET_ATTR_ADT,
                vec![Attr::nested(
                    IPSET_ATTR_DATA,
                    vec![
                        Set::ip(Ipv4Addr::new(10, 0, 0, 1).into()).encode().remove(0),
                        Attr::bytes(IPSET_ATTR_ETHER, [1, 2, 3, 4, 5, 6]),
                    ],
                )],
            ),
        ]);
        assert!(matches!(
            SetResult::from_payload(&buf),
            Err(Error::UnknownAttribute {
                location: AttrLocation::AdtEntry,
                kind: IPSET_ATTR_ETHER
            })
        ));
    }

    #[test]
    fn test_unknown_set_data() {
        let buf = payload(&[Attr::nested(
            IPSET_ATTR_DATA,
            vec![Attr::u32_be(IPSET_ATTR_MAXELEM, 1), Attr::u32_be(0x3e, 0)],
        )]);
        assert!(matches!(
            SetResult::from_payload(&buf),
            Err(Error::UnknownAttribute {
                location: AttrLocation::SetData,
                kind
            }) if kind == 0x3e | NLA_F_NET_BYTEORDER
        ));
    }

    #[test]
    fn test_unknown_adt_child() {
        let buf = payload(&[Attr::nested(
            IPSET_ATTR_ADT,
            vec![Attr::u8(IPSET_ATTR_CIDR, 8)],
        )]);
        assert!(matches!(
            SetResult::from_payload(&buf),
            Err(Error::UnknownAttribute {
                location: AttrLocation::Adt,
                kind: IPSET_ATTR_CIDR
            })
        ));
    }

    #[test]
    fn test_byte_order_flag_is_part_of_the_type() {
        // Hash size without NLA_F_NET_BYTEORDER is not the same attribute.
        let buf = payload(&[Attr::nested(
            IPSET_ATTR_DATA,
            vec![Attr::u32_ne(IPSET_ATTR_HASHSIZE, 1024)],
        )]);
        assert!(matches!(
            SetResult::from_payload(&buf),
            Err(Error::UnknownAttribute {
                location: AttrLocation::SetData,
                kind: IPSET_ATTR_HASHSIZE
            })
        ));
    }

    #[test]
    fn test_truncated_stream() {
        let full = fixtures::list_hash_ip();
        // Cut inside the nfgenmsg, inside SETNAME and inside ADT.
        for cut in [2, 18, full.len() - 3] {
            let err = SetResult::from_payload(&full[..cut]).unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::Truncated { .. }
                        | Error::MalformedAttribute { .. }
                        | Error::InvalidAttribute(_)
                ),
                "cut at {}: {:?}",
                cut,
                err
            );
        }
    }

    #[test]
    fn test_folding_accumulates_entries() {
        let first = fixtures::list_hash_ip();
        let second = payload(&[
            Attr::string(IPSET_ATTR_SETNAME, "test"),
            Attr::nested(
                IPSET_ATTR_ADT,
                vec![Attr::nested(
                    IPSET_ATTR_DATA,
                    Set::ip(Ipv4Addr::new(10, 0, 0, 2).into()).encode(),
                )],
            ),
        ]);
        let result = SetResult::from_payloads([first.as_slice(), second.as_slice()]).unwrap();
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.type_name, "hash:ip");
    }

    #[test]
    fn test_decode_dump_splits_by_name() {
        let a = fixtures::list_hash_ip();
        let a_more = payload(&[
            Attr::string(IPSET_ATTR_SETNAME, "test"),
            Attr::nested(IPSET_ATTR_ADT, vec![]),
        ]);
        let b = fixtures::list_hash_net_port();
        let results = decode_dump([a.as_slice(), a_more.as_slice(), b.as_slice()]).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].set_name, "test");
        assert_eq!(results[1].set_name, "ports");
        assert_eq!(results[1].entries.len(), 2);
    }

    #[test]
    fn test_flags_width() {
        assert_eq!(decode_flags(&[3]).unwrap(), 3);
        assert_eq!(decode_flags(&[0, 0, 1, 0]).unwrap(), 256);
        assert!(decode_flags(&[0, 0]).is_err());
    }
}
