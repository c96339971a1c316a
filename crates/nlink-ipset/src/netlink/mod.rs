//! Netlink plumbing for the netfilter subsystem.
//!
//! Attribute trees are built with [`Attr`] and walked with [`AttrIter`];
//! messages are assembled by [`MessageBuilder`] and moved by a
//! [`Transport`], normally a [`Connection`] over a `NETLINK_NETFILTER`
//! socket.
//!
//! ```ignore
//! use nlink_ipset::netlink::{Attr, AttrIter};
//!
//! let bytes = Attr::nested(7, vec![Attr::u16_be(4, 443)]).to_bytes()?;
//! for attr in AttrIter::new(&bytes) {
//!     let attr = attr?;
//!     println!("{} nested={}", attr.kind(), attr.is_nested());
//! }
//! ```

pub mod attr;
mod builder;
pub mod connection;
mod error;
pub mod message;
pub mod parse;
mod socket;
mod transport;

pub use attr::{Attr, AttrIter, AttrValue, NlAttr, RawAttr};
pub use builder::MessageBuilder;
pub use connection::Connection;
pub use error::{AttrLocation, Error, Result};
pub use message::{MessageIter, NLMSG_HDRLEN, NfGenMsg, NlMsgHdr, NlMsgType};
pub use socket::NetlinkSocket;
pub use transport::Transport;
