//! ipset private error codes.

use std::fmt;

use super::command::Command;
use super::consts::*;

/// Errors the ipset subsystem reports with codes above the errno range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpsetErrorKind {
    /// Kernel does not speak our protocol version.
    Protocol,
    /// Set type is not supported by the kernel.
    FindType,
    /// Kernel set limit reached.
    MaxSets,
    /// Set is in use and cannot be destroyed or modified.
    Busy,
    /// The second set name in a rename or swap already exists.
    SetExists,
    /// Swap of sets with different types.
    TypeMismatch,
    /// Element is already present (add).
    ElementExists,
    /// Element is not present (del, test).
    ElementNotFound,
    InvalidCidr,
    InvalidNetmask,
    InvalidFamily,
    /// Set was created without timeout support.
    Timeout,
    /// Set is referenced by another set or rule.
    Referenced,
    InvalidIpv4,
    InvalidIpv6,
    /// Set was created without counter support.
    Counter,
    /// Set was created without comment support.
    Comment,
    InvalidMarkmask,
    /// Set was created without skbinfo support.
    Skbinfo,
    /// bitmask and netmask were both given.
    BitmaskNetmaskExclusive,
    /// Code defined by the set type itself.
    TypeSpecific(i32),
    /// Any other private code.
    Unknown(i32),
}

impl IpsetErrorKind {
    /// Map a positive errno to an ipset error.
    ///
    /// Codes below `IPSET_ERR_PRIVATE` are ordinary errno values and return
    /// `None`. `IPSET_ERR_EXIST` means "already added" for ADD and "not
    /// present" for every other command.
    pub fn from_errno(errno: i32, command: Command) -> Option<Self> {
        if errno < IPSET_ERR_PRIVATE {
            return None;
        }
        let kind = match errno {
            IPSET_ERR_PROTOCOL => Self::Protocol,
            IPSET_ERR_FIND_TYPE => Self::FindType,
            IPSET_ERR_MAX_SETS => Self::MaxSets,
            IPSET_ERR_BUSY => Self::Busy,
            IPSET_ERR_EXIST_SETNAME2 => Self::SetExists,
            IPSET_ERR_TYPE_MISMATCH => Self::TypeMismatch,
            IPSET_ERR_EXIST if command == Command::Add => Self::ElementExists,
            IPSET_ERR_EXIST => Self::ElementNotFound,
            IPSET_ERR_INVALID_CIDR => Self::InvalidCidr,
            IPSET_ERR_INVALID_NETMASK => Self::InvalidNetmask,
            IPSET_ERR_INVALID_FAMILY => Self::InvalidFamily,
            IPSET_ERR_TIMEOUT => Self::Timeout,
            IPSET_ERR_REFERENCED => Self::Referenced,
            IPSET_ERR_IPADDR_IPV4 => Self::InvalidIpv4,
            IPSET_ERR_IPADDR_IPV6 => Self::InvalidIpv6,
            IPSET_ERR_COUNTER => Self::Counter,
            IPSET_ERR_COMMENT => Self::Comment,
            IPSET_ERR_INVALID_MARKMASK => Self::InvalidMarkmask,
            IPSET_ERR_SKBINFO => Self::Skbinfo,
            IPSET_ERR_BITMASK_NETMASK_EXCL => Self::BitmaskNetmaskExclusive,
            n if n >= IPSET_ERR_TYPE_SPECIFIC => Self::TypeSpecific(n),
            n => Self::Unknown(n),
        };
        Some(kind)
    }

    /// Human-readable description, in the wording of the ipset tool.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Protocol => "kernel error received: ipset protocol error",
            Self::FindType => "kernel error received: set type not supported",
            Self::MaxSets => "kernel error received: maximal number of sets reached",
            Self::Busy => "set cannot be destroyed: it is in use by a kernel component",
            Self::SetExists => "set with the second name already exists",
            Self::TypeMismatch => "the sets cannot be swapped: their type does not match",
            Self::ElementExists => "element is already added",
            Self::ElementNotFound => "element is missing from the set",
            Self::InvalidCidr => "the value of the CIDR parameter of the IP address is invalid",
            Self::InvalidNetmask => "the value of the netmask parameter is invalid",
            Self::InvalidFamily => "the protocol family not supported by the set type",
            Self::Timeout => "timeout cannot be used: set was created without timeout support",
            Self::Referenced => "set cannot be destroyed: it is referenced",
            Self::InvalidIpv4 => "an IPv4 address is expected, but not received",
            Self::InvalidIpv6 => "an IPv6 address is expected, but not received",
            Self::Counter => "packet/byte counters cannot be used: set was created without counter support",
            Self::Comment => "comment cannot be used: set was created without comment support",
            Self::InvalidMarkmask => "the value of the markmask parameter is invalid",
            Self::Skbinfo => "skbinfo mapping cannot be used: set was created without skbinfo support",
            Self::BitmaskNetmaskExclusive => "bitmask and netmask are mutually exclusive",
            Self::TypeSpecific(_) => "set type specific error",
            Self::Unknown(_) => "unknown ipset error",
        }
    }
}

impl fmt::Display for IpsetErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeSpecific(n) | Self::Unknown(n) => write!(f, "{} ({})", self.message(), n),
            _ => f.write_str(self.message()),
        }
    }
}
