//! Set entries: a [`Set`] plus per-element extensions.

use std::fmt;

use super::consts::*;
use super::set::{Set, SetFields, SetKind};
use crate::netlink::attr::{Attr, NLA_F_NET_BYTEORDER, RawAttr};
use crate::netlink::{AttrLocation, Error, Result, parse};

/// One element of a set, as added, deleted, tested or listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub set: Set,
    pub comment: Option<String>,
    /// Seconds until the element expires.
    pub timeout: Option<u32>,
    pub packets: Option<u64>,
    pub bytes: Option<u64>,
    /// Per-element CADT flags (`IPSET_FLAG_NOMATCH`, ...).
    pub cadt_flags: Option<u32>,
    /// `mark << 32 | mask`.
    pub skbmark: Option<u64>,
    pub skbprio: Option<u32>,
    pub skbqueue: Option<u16>,
    /// Overwrite instead of failing when the element already exists.
    pub replace: bool,
}

impl Entry {
    pub fn new(set: Set) -> Self {
        Self {
            set,
            comment: None,
            timeout: None,
            packets: None,
            bytes: None,
            cadt_flags: None,
            skbmark: None,
            skbprio: None,
            skbqueue: None,
            replace: false,
        }
    }

    pub fn timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Initial packet and byte counters.
    pub fn counters(mut self, packets: u64, bytes: u64) -> Self {
        self.packets = Some(packets);
        self.bytes = Some(bytes);
        self
    }

    pub fn cadt_flags(mut self, flags: u32) -> Self {
        self.cadt_flags = Some(flags);
        self
    }

    pub fn skbmark(mut self, mark: u32, mask: u32) -> Self {
        self.skbmark = Some(u64::from(mark) << 32 | u64::from(mask));
        self
    }

    pub fn skbprio(mut self, prio: u32) -> Self {
        self.skbprio = Some(prio);
        self
    }

    pub fn skbqueue(mut self, queue: u16) -> Self {
        self.skbqueue = Some(queue);
        self
    }

    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }

    /// Check limits the kernel enforces before anything is sent.
    pub fn validate(&self) -> Result<()> {
        if let Some(comment) = &self.comment {
            if comment.len() >= IPSET_MAX_COMMENT_SIZE {
                return Err(Error::InvalidEntry(format!(
                    "comment longer than {} bytes",
                    IPSET_MAX_COMMENT_SIZE - 1
                )));
            }
            if comment.contains('\0') {
                return Err(Error::InvalidEntry("comment contains NUL".into()));
            }
        }
        Ok(())
    }

    /// The `DATA` container sent with ADD, DEL and TEST.
    pub fn encode_data(&self) -> Attr {
        let mut attrs = Vec::new();
        if let Some(timeout) = self.timeout {
            attrs.push(Attr::u32_be(IPSET_ATTR_TIMEOUT, timeout));
        }
        attrs.extend(self.set.encode());
        if let Some(bytes) = self.bytes {
            attrs.push(Attr::u64_be(IPSET_ATTR_BYTES, bytes));
        }
        if let Some(packets) = self.packets {
            attrs.push(Attr::u64_be(IPSET_ATTR_PACKETS, packets));
        }
        if let Some(comment) = &self.comment {
            attrs.push(Attr::string(IPSET_ATTR_COMMENT, comment));
        }
        if let Some(mark) = self.skbmark {
            attrs.push(Attr::u64_be(IPSET_ATTR_SKBMARK, mark));
        }
        if let Some(prio) = self.skbprio {
            attrs.push(Attr::u32_be(IPSET_ATTR_SKBPRIO, prio));
        }
        if let Some(queue) = self.skbqueue {
            attrs.push(Attr::u16_be(IPSET_ATTR_SKBQUEUE, queue));
        }
        if let Some(flags) = self.cadt_flags {
            attrs.push(Attr::u32_be(IPSET_ATTR_CADT_FLAGS, flags));
        }
        attrs.push(Attr::u32_be(IPSET_ATTR_LINENO, 0));
        Attr::nested(IPSET_ATTR_DATA, attrs)
    }

    /// Decode the children of one `ADT` → `DATA` container.
    pub fn decode(data: RawAttr<'_>, kind: Option<SetKind>) -> Result<Self> {
        const TIMEOUT: u16 = IPSET_ATTR_TIMEOUT | NLA_F_NET_BYTEORDER;
        const BYTES: u16 = IPSET_ATTR_BYTES | NLA_F_NET_BYTEORDER;
        const PACKETS: u16 = IPSET_ATTR_PACKETS | NLA_F_NET_BYTEORDER;
        const CADT_FLAGS: u16 = IPSET_ATTR_CADT_FLAGS | NLA_F_NET_BYTEORDER;
        const LINENO: u16 = IPSET_ATTR_LINENO | NLA_F_NET_BYTEORDER;
        const SKBMARK: u16 = IPSET_ATTR_SKBMARK | NLA_F_NET_BYTEORDER;
        const SKBPRIO: u16 = IPSET_ATTR_SKBPRIO | NLA_F_NET_BYTEORDER;
        const SKBQUEUE: u16 = IPSET_ATTR_SKBQUEUE | NLA_F_NET_BYTEORDER;

        let mut fields = SetFields::default();
        let mut timeout = None;
        let mut bytes = None;
        let mut packets = None;
        let mut comment = None;
        let mut cadt_flags = None;
        let mut skbmark = None;
        let mut skbprio = None;
        let mut skbqueue = None;

        for attr in data.nested() {
            let attr = attr?;
            if fields.decode(attr)? {
                continue;
            }
            let payload = attr.payload();
            match attr.raw_type() {
                TIMEOUT => timeout = Some(parse::u32_be(payload)?),
                BYTES => bytes = Some(parse::u64_be(payload)?),
                PACKETS => packets = Some(parse::u64_be(payload)?),
                IPSET_ATTR_COMMENT => comment = Some(parse::string(payload)?.to_string()),
                CADT_FLAGS => cadt_flags = Some(parse::u32_be(payload)?),
                SKBMARK => skbmark = Some(parse::u64_be(payload)?),
                SKBPRIO => skbprio = Some(parse::u32_be(payload)?),
                SKBQUEUE => skbqueue = Some(parse::u16_be(payload)?),
                // Alignment filler before 64-bit values, and the echo of our own line number.
                IPSET_ATTR_PAD | LINENO => {}
                other => {
                    return Err(Error::UnknownAttribute {
                        location: AttrLocation::AdtEntry,
                        kind: other,
                    });
                }
            }
        }

        Ok(Self {
            set: fields.into_set(kind)?,
            comment,
            timeout,
            packets,
            bytes,
            cadt_flags,
            skbmark,
            skbprio,
            skbqueue,
            replace: false,
        })
    }
}

impl From<Set> for Entry {
    fn from(set: Set) -> Self {
        Self::new(set)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.set)?;
        if let Some(timeout) = self.timeout {
            write!(f, " timeout {}", timeout)?;
        }
        if let Some(packets) = self.packets {
            write!(f, " packets {}", packets)?;
        }
        if let Some(bytes) = self.bytes {
            write!(f, " bytes {}", bytes)?;
        }
        if let Some(comment) = &self.comment {
            write!(f, " comment {:?}", comment)?;
        }
        if let Some(mark) = self.skbmark {
            write!(f, " skbmark {:#x}/{:#x}", mark >> 32, mark & 0xffff_ffff)?;
        }
        if let Some(prio) = self.skbprio {
            write!(f, " skbprio {}:{}", prio >> 16, prio & 0xffff)?;
        }
        if let Some(queue) = self.skbqueue {
            write!(f, " skbqueue {}", queue)?;
        }
        if self.cadt_flags.is_some_and(|flags| flags & IPSET_FLAG_NOMATCH != 0) {
            f.write_str(" nomatch")?;
        }
        Ok(())
    }
}
