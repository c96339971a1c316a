//! Netlink and nfnetlink message headers.

use winnow::binary::{be_u16, le_u8};
use winnow::prelude::*;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::error::{Error, Result};
use super::parse::PResult;

/// Netlink message header alignment.
pub const NLMSG_ALIGNTO: usize = 4;

/// Align a length to NLMSG_ALIGNTO boundary.
#[inline]
pub const fn nlmsg_align(len: usize) -> usize {
    (len + NLMSG_ALIGNTO - 1) & !(NLMSG_ALIGNTO - 1)
}

/// Size of the netlink message header.
pub const NLMSG_HDRLEN: usize = nlmsg_align(std::mem::size_of::<NlMsgHdr>());

/// Netlink message header (mirrors struct nlmsghdr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlMsgHdr {
    /// Length of message including header.
    pub nlmsg_len: u32,
    /// Message type.
    pub nlmsg_type: u16,
    /// Additional flags.
    pub nlmsg_flags: u16,
    /// Sequence number.
    pub nlmsg_seq: u32,
    /// Sending process port ID.
    pub nlmsg_pid: u32,
}

impl NlMsgHdr {
    /// Create a new message header.
    pub fn new(msg_type: u16, flags: u16) -> Self {
        Self {
            nlmsg_len: NLMSG_HDRLEN as u32,
            nlmsg_type: msg_type,
            nlmsg_flags: flags,
            nlmsg_seq: 0,
            nlmsg_pid: 0,
        }
    }

    /// Check if this is an error message.
    pub fn is_error(&self) -> bool {
        self.nlmsg_type == NlMsgType::ERROR
    }

    /// Check if this is a done message.
    pub fn is_done(&self) -> bool {
        self.nlmsg_type == NlMsgType::DONE
    }

    /// Check if this message has the multi flag.
    pub fn is_multi(&self) -> bool {
        self.nlmsg_flags & NLM_F_MULTI != 0
    }

    /// Convert header to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Parse header from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(hdr, _)| hdr)
            .map_err(|_| Error::Truncated {
                expected: std::mem::size_of::<Self>(),
                actual: data.len(),
            })
    }
}

/// Standard netlink message types.
pub struct NlMsgType;

impl NlMsgType {
    /// No operation, message must be discarded.
    pub const NOOP: u16 = 1;
    /// Error message or ACK.
    pub const ERROR: u16 = 2;
    /// End of multipart message.
    pub const DONE: u16 = 3;
    /// Data lost, request resend.
    pub const OVERRUN: u16 = 4;
}

/// Netlink message flags.
pub const NLM_F_REQUEST: u16 = 0x01;
pub const NLM_F_MULTI: u16 = 0x02;
pub const NLM_F_ACK: u16 = 0x04;

// Modifiers to GET request
pub const NLM_F_ROOT: u16 = 0x100;
pub const NLM_F_MATCH: u16 = 0x200;
pub const NLM_F_DUMP: u16 = NLM_F_ROOT | NLM_F_MATCH;

// Modifiers to NEW request
pub const NLM_F_REPLACE: u16 = 0x100;
pub const NLM_F_EXCL: u16 = 0x200;
pub const NLM_F_CREATE: u16 = 0x400;

/// Iterator over netlink messages in a buffer.
///
/// Yields each header together with the full message bytes (header
/// included) so callers can keep the message as-is.
pub struct MessageIter<'a> {
    data: &'a [u8],
}

impl<'a> MessageIter<'a> {
    /// Create a new message iterator.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl<'a> Iterator for MessageIter<'a> {
    type Item = Result<(NlMsgHdr, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.len() < NLMSG_HDRLEN {
            return None;
        }

        let header = match NlMsgHdr::from_bytes(self.data) {
            Ok(h) => h,
            Err(e) => return Some(Err(e)),
        };

        let msg_len = header.nlmsg_len as usize;
        if msg_len < NLMSG_HDRLEN || msg_len > self.data.len() {
            self.data = &[];
            return Some(Err(Error::InvalidMessage(format!(
                "invalid message length: {}",
                msg_len
            ))));
        }

        let message = &self.data[..msg_len];
        let aligned_len = nlmsg_align(msg_len);

        // Move to next message
        if aligned_len >= self.data.len() {
            self.data = &[];
        } else {
            self.data = &self.data[aligned_len..];
        }

        Some(Ok((header, message)))
    }
}

/// Split a complete message into its header and payload.
pub fn split_message(msg: &[u8]) -> Result<(NlMsgHdr, &[u8])> {
    let header = NlMsgHdr::from_bytes(msg)?;
    let len = header.nlmsg_len as usize;
    if len < NLMSG_HDRLEN || len > msg.len() {
        return Err(Error::Truncated {
            expected: len.max(NLMSG_HDRLEN),
            actual: msg.len(),
        });
    }
    Ok((header, &msg[NLMSG_HDRLEN..len]))
}

/// Netlink error message payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
pub struct NlMsgError {
    /// Error code (negative errno or 0 for ACK).
    pub error: i32,
    /// Original message header that caused the error.
    pub msg: NlMsgHdr,
}

impl NlMsgError {
    /// Parse error message from payload.
    ///
    /// Only the errno is required; with `NETLINK_CAP_ACK` the kernel may
    /// trim the echoed header.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if let Ok((err, _)) = Self::read_from_prefix(data) {
            return Ok(err);
        }
        let (error, _) = i32::read_from_prefix(data).map_err(|_| Error::Truncated {
            expected: std::mem::size_of::<i32>(),
            actual: data.len(),
        })?;
        Ok(Self {
            error,
            msg: NlMsgHdr::default(),
        })
    }

    /// Check if this is an ACK (no error).
    pub fn is_ack(&self) -> bool {
        self.error == 0
    }
}

/// nfnetlink protocol version carried in every nfgenmsg.
pub const NFNETLINK_V0: u8 = 0;

/// nfgenmsg header (4 bytes) that starts every nfnetlink payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NfGenMsg {
    /// Address family (AF_INET, AF_INET6, ...).
    pub family: u8,
    /// nfnetlink version.
    pub version: u8,
    /// Resource id, big endian on the wire.
    pub res_id: u16,
}

impl NfGenMsg {
    pub const SIZE: usize = 4;

    pub fn new(family: u8) -> Self {
        Self {
            family,
            version: NFNETLINK_V0,
            res_id: 0,
        }
    }

    pub fn parse(input: &mut &[u8]) -> PResult<Self> {
        let family = le_u8.parse_next(input)?;
        let version = le_u8.parse_next(input)?;
        let res_id = be_u16.parse_next(input)?;
        Ok(Self {
            family,
            version,
            res_id,
        })
    }

    /// Split a payload into its nfgenmsg and the attribute bytes after it.
    pub fn split(payload: &[u8]) -> Result<(Self, &[u8])> {
        let mut input = payload;
        let header = Self::parse(&mut input).map_err(|_| Error::Truncated {
            expected: Self::SIZE,
            actual: payload.len(),
        })?;
        Ok((header, input))
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        let [hi, lo] = self.res_id.to_be_bytes();
        [self.family, self.version, hi, lo]
    }
}
