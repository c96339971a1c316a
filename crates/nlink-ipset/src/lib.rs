//! Async ipset client over netlink.
//!
//! This crate speaks the kernel's ipset protocol on a `NETLINK_NETFILTER`
//! socket: it creates, lists and destroys sets and adds, deletes and tests
//! their elements.
//!
//! # Features
//!
//! - `output` - JSON/text output formatting
//! - `integration` - tests that need root and the ip_set kernel modules
//!
//! # Example
//!
//! ```ignore
//! use nlink_ipset::{CreateOptions, Entry, IpSet, Set};
//!
//! #[tokio::main]
//! async fn main() -> nlink_ipset::Result<()> {
//!     let ipset = IpSet::connect()?;
//!     ipset
//!         .create("lan", "hash:net", CreateOptions::new().with_counters())
//!         .await?;
//!     ipset
//!         .add("lan", &Entry::new(Set::net("10.0.0.0".parse().unwrap(), 8)))
//!         .await?;
//!
//!     for set in ipset.list_all().await? {
//!         println!("{} ({}): {} entries", set.set_name, set.type_name, set.entries.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod ipset;
pub mod netlink;

#[cfg(feature = "output")]
pub mod output;

pub use ipset::{
    Config, CreateOptions, Entry, Family, IpProtocol, IpSet, IpsetErrorKind, MacAddr, Set,
    SetKind, SetResult,
};
pub use netlink::{Connection, Error, Result};
