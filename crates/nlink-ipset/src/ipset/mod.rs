//! The ipset netfilter subsystem.
//!
//! [`IpSet`] is the entry point. Requests are assembled by [`IpsetRequest`]
//! from a [`Set`] (the type-specific part of an element) wrapped in an
//! [`Entry`]; replies decode into [`SetResult`].
//!
//! ```ignore
//! use nlink_ipset::ipset::{IpSet, Entry, Set, IpProtocol};
//!
//! let ipset = IpSet::connect()?;
//! let entry = Entry::new(Set::ip_port("10.0.0.1".parse()?, IpProtocol::Udp, 53))
//!     .timeout(300);
//! ipset.add("dns", &entry).await?;
//! assert!(ipset.test("dns", &entry).await?);
//! ```

mod client;
mod command;
pub mod consts;
pub mod diagnostics;
mod entry;
mod errno;
mod request;
mod result;
mod set;
mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use client::{Config, CreateOptions, IpSet};
pub use command::{Command, Family};
pub use diagnostics::{Diagnostics, TracingDiagnostics, render_request};
pub use entry::Entry;
pub use errno::IpsetErrorKind;
pub use request::IpsetRequest;
pub use result::{SetResult, decode_dump, payload_set_name};
pub use set::{Set, SetKind, decode_ip, ip_attr};
pub use types::{IpProtocol, MacAddr};
