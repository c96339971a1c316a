//! Netlink attribute (nlattr) encoding and decoding.
//!
//! Outgoing attributes are built as an owned tree of [`Attr`] values and
//! serialized in one pass. Incoming buffers are walked lazily with
//! [`AttrIter`], which borrows from the receive buffer and never recurses.

use super::error::{Error, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Netlink attribute alignment.
pub const NLA_ALIGNTO: usize = 4;

/// Align a length to NLA_ALIGNTO boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// Size of the attribute header.
pub const NLA_HDRLEN: usize = 4; // nla_align(size_of::<NlAttr>())

/// Netlink attribute header (mirrors struct nlattr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlAttr {
    /// Length including header, excluding trailing padding.
    pub nla_len: u16,
    /// Attribute type, flags included.
    pub nla_type: u16,
}

/// Attribute type flags.
pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

impl NlAttr {
    /// Create a new attribute header.
    ///
    /// Fails when the payload is too large for the 16-bit length field.
    pub fn new(attr_type: u16, data_len: usize) -> Result<Self> {
        let nla_len = u16::try_from(NLA_HDRLEN + data_len).map_err(|_| {
            Error::InvalidAttribute(format!(
                "attribute {:#06x} payload of {} bytes exceeds the netlink length field",
                attr_type, data_len
            ))
        })?;
        Ok(Self {
            nla_len,
            nla_type: attr_type,
        })
    }

    /// Convert to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Read a header from the front of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(hdr, _)| hdr)
            .map_err(|_| Error::Truncated {
                expected: NLA_HDRLEN,
                actual: data.len(),
            })
    }
}

/// Attribute payload: either raw bytes or ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Leaf value bytes, unpadded.
    Bytes(Vec<u8>),
    /// Nested children, serialized in order.
    Nested(Vec<Attr>),
}

/// An attribute to be encoded.
///
/// The stored type keeps its flag bits; the constructors set
/// `NLA_F_NESTED` / `NLA_F_NET_BYTEORDER` where the payload calls for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    raw_type: u16,
    value: AttrValue,
}

impl Attr {
    /// Leaf attribute with raw bytes. The type is used verbatim.
    pub fn bytes(raw_type: u16, data: impl Into<Vec<u8>>) -> Self {
        Self {
            raw_type,
            value: AttrValue::Bytes(data.into()),
        }
    }

    /// Zero-length flag attribute.
    pub fn empty(kind: u16) -> Self {
        Self::bytes(kind, Vec::new())
    }

    pub fn u8(kind: u16, value: u8) -> Self {
        Self::bytes(kind, vec![value])
    }

    /// Host order u16, no byte-order flag.
    pub fn u16_ne(kind: u16, value: u16) -> Self {
        Self::bytes(kind, value.to_ne_bytes())
    }

    /// Host order u32, no byte-order flag.
    pub fn u32_ne(kind: u16, value: u32) -> Self {
        Self::bytes(kind, value.to_ne_bytes())
    }

    /// Host order u64, no byte-order flag.
    pub fn u64_ne(kind: u16, value: u64) -> Self {
        Self::bytes(kind, value.to_ne_bytes())
    }

    /// Big-endian u16 with `NLA_F_NET_BYTEORDER` set.
    pub fn u16_be(kind: u16, value: u16) -> Self {
        Self::bytes(kind | NLA_F_NET_BYTEORDER, value.to_be_bytes())
    }

    /// Big-endian u32 with `NLA_F_NET_BYTEORDER` set.
    pub fn u32_be(kind: u16, value: u32) -> Self {
        Self::bytes(kind | NLA_F_NET_BYTEORDER, value.to_be_bytes())
    }

    /// Big-endian u64 with `NLA_F_NET_BYTEORDER` set.
    pub fn u64_be(kind: u16, value: u64) -> Self {
        Self::bytes(kind | NLA_F_NET_BYTEORDER, value.to_be_bytes())
    }

    /// NUL-terminated string.
    pub fn string(kind: u16, value: &str) -> Self {
        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
        Self::bytes(kind, data)
    }

    /// Nested container with `NLA_F_NESTED` set.
    pub fn nested(kind: u16, children: Vec<Attr>) -> Self {
        Self {
            raw_type: kind | NLA_F_NESTED,
            value: AttrValue::Nested(children),
        }
    }

    /// Attribute type without flags.
    pub fn kind(&self) -> u16 {
        self.raw_type & NLA_TYPE_MASK
    }

    /// Attribute type with flags, as written on the wire.
    pub fn raw_type(&self) -> u16 {
        self.raw_type
    }

    pub fn is_nested(&self) -> bool {
        self.raw_type & NLA_F_NESTED != 0
    }

    pub fn is_net_byteorder(&self) -> bool {
        self.raw_type & NLA_F_NET_BYTEORDER != 0
    }

    pub fn value(&self) -> &AttrValue {
        &self.value
    }

    /// Children of a nested attribute (empty for leaves).
    pub fn children(&self) -> &[Attr] {
        match &self.value {
            AttrValue::Nested(children) => children,
            AttrValue::Bytes(_) => &[],
        }
    }

    /// Unpadded payload length.
    pub fn payload_len(&self) -> usize {
        match &self.value {
            AttrValue::Bytes(data) => data.len(),
            AttrValue::Nested(children) => children.iter().map(Attr::encoded_len).sum(),
        }
    }

    /// Bytes taken on the wire, header and padding included.
    pub fn encoded_len(&self) -> usize {
        nla_align(NLA_HDRLEN + self.payload_len())
    }

    /// Append the encoded attribute to `buf`.
    ///
    /// Nothing is written when the attribute does not fit its length field.
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> Result<()> {
        let start = buf.len();
        let header = NlAttr::new(self.raw_type, self.payload_len())?;
        buf.extend_from_slice(header.as_bytes());
        match &self.value {
            AttrValue::Bytes(data) => buf.extend_from_slice(data),
            AttrValue::Nested(children) => {
                // Children are smaller than the parent, so they fit too.
                for child in children {
                    child.encode_into(buf)?;
                }
            }
        }
        buf.resize(start + nla_align(buf.len() - start), 0);
        Ok(())
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf)?;
        Ok(buf)
    }
}

/// A decoded attribute borrowing from the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAttr<'a> {
    raw_type: u16,
    payload: &'a [u8],
}

impl<'a> RawAttr<'a> {
    pub fn new(raw_type: u16, payload: &'a [u8]) -> Self {
        Self { raw_type, payload }
    }

    /// Attribute type without flags.
    pub fn kind(&self) -> u16 {
        self.raw_type & NLA_TYPE_MASK
    }

    /// Attribute type with flags.
    pub fn raw_type(&self) -> u16 {
        self.raw_type
    }

    pub fn is_nested(&self) -> bool {
        self.raw_type & NLA_F_NESTED != 0
    }

    pub fn is_net_byteorder(&self) -> bool {
        self.raw_type & NLA_F_NET_BYTEORDER != 0
    }

    /// Unpadded payload.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Walk the payload as a sequence of attributes.
    pub fn nested(&self) -> AttrIter<'a> {
        AttrIter::new(self.payload)
    }
}

/// Iterator over netlink attributes in a buffer.
///
/// Stops when fewer than a header's worth of bytes remain, so trailing
/// padding is tolerated. A header whose length is shorter than the header
/// itself or longer than the remaining buffer yields
/// [`Error::MalformedAttribute`] once; the iterator is fused afterwards.
pub struct AttrIter<'a> {
    data: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> AttrIter<'a> {
    /// Create a new attribute iterator.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            failed: false,
        }
    }

    /// Check if there are no more attributes.
    pub fn is_empty(&self) -> bool {
        self.failed || self.data.len() < NLA_HDRLEN
    }
}

impl<'a> Iterator for AttrIter<'a> {
    type Item = Result<RawAttr<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_empty() {
            return None;
        }

        let attr = match NlAttr::from_bytes(self.data) {
            Ok(a) => a,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };

        let len = attr.nla_len as usize;
        if len < NLA_HDRLEN || len > self.data.len() {
            self.failed = true;
            return Some(Err(Error::MalformedAttribute {
                offset: self.offset,
                len,
                remaining: self.data.len(),
            }));
        }

        let payload = &self.data[NLA_HDRLEN..len];
        let aligned_len = nla_align(len);

        // Move to next attribute
        if aligned_len >= self.data.len() {
            self.data = &[];
        } else {
            self.data = &self.data[aligned_len..];
        }
        self.offset += aligned_len;

        Some(Ok(RawAttr::new(attr.nla_type, payload)))
    }
}

impl std::iter::FusedIterator for AttrIter<'_> {}
