//! Error types for netlink and ipset operations.

use std::fmt;
use std::io;

use crate::ipset::IpsetErrorKind;

/// Result type for netlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Where in the attribute tree a decode error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrLocation {
    /// Directly after the nfgenmsg header.
    TopLevel,
    /// Inside the set metadata `DATA` container.
    SetData,
    /// Inside the `ADT` entry list.
    Adt,
    /// Inside one entry's `DATA` container.
    AdtEntry,
    /// Inside a nested `IP` / `IP_TO` address container.
    IpAddress,
}

impl fmt::Display for AttrLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TopLevel => "top level",
            Self::SetData => "set data",
            Self::Adt => "adt",
            Self::AdtEntry => "adt entry",
            Self::IpAddress => "ip address",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during netlink operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Kernel returned a generic errno.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Kernel returned one of the ipset private error codes.
    #[error("ipset: {kind} (errno {errno})")]
    Ipset {
        /// Decoded error kind.
        kind: IpsetErrorKind,
        /// The raw errno value.
        errno: i32,
    },

    /// Message was truncated.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected message length.
        expected: usize,
        /// Actual bytes received.
        actual: usize,
    },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid attribute payload.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// An attribute header is inconsistent with the buffer holding it.
    #[error("malformed attribute at offset {offset}: length {len}, {remaining} bytes remaining")]
    MalformedAttribute {
        /// Offset of the header inside the buffer being walked.
        offset: usize,
        /// Length field read from the header.
        len: usize,
        /// Bytes left in the buffer at that offset.
        remaining: usize,
    },

    /// An attribute type that is not expected at this level.
    #[error("unknown attribute {kind:#06x} at {location}")]
    UnknownAttribute {
        /// Level at which the attribute was found.
        location: AttrLocation,
        /// Raw type, flags included.
        kind: u16,
    },

    /// A required attribute was not present.
    #[error("missing attribute {name} at {location}")]
    MissingAttribute {
        /// Level that lacked the attribute.
        location: AttrLocation,
        /// Symbolic attribute name.
        name: &'static str,
    },

    /// An entry could not be parsed or built.
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// A set or type name does not fit the kernel's limits.
    #[error("invalid name: {0}")]
    InvalidName(String),
}

impl Error {
    /// Create a kernel error from a (negative) errno value.
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::Kernel {
            errno: -errno,
            message,
        }
    }

    /// Check if this is a "not found" error (ENOENT or a missing element).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => *errno == libc::ENOENT,
            Self::Ipset { kind, .. } => matches!(kind, IpsetErrorKind::ElementNotFound),
            _ => false,
        }
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => matches!(*errno, libc::EPERM | libc::EACCES),
            _ => false,
        }
    }

    /// Check if this is an "already exists" error (EEXIST, set or element exists).
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => *errno == libc::EEXIST,
            Self::Ipset { kind, .. } => {
                matches!(kind, IpsetErrorKind::SetExists | IpsetErrorKind::ElementExists)
            }
            _ => false,
        }
    }

    /// Check if this is a "busy" error (EBUSY or a set still in use).
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => *errno == libc::EBUSY,
            Self::Ipset { kind, .. } => {
                matches!(kind, IpsetErrorKind::Busy | IpsetErrorKind::Referenced)
            }
            _ => false,
        }
    }

    /// Get the errno value if this error came from the kernel.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } | Self::Ipset { errno, .. } => Some(*errno),
            _ => None,
        }
    }

    /// Get the ipset error kind, if any.
    pub fn ipset_kind(&self) -> Option<IpsetErrorKind> {
        match self {
            Self::Ipset { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
