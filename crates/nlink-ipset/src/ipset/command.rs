//! ipset commands and address families.

use std::fmt;
use std::net::IpAddr;

use super::consts::NFNL_SUBSYS_IPSET;
use crate::netlink::message::{NLM_F_ACK, NLM_F_CREATE, NLM_F_DUMP, NLM_F_REQUEST};

/// ipset netlink commands (`IPSET_CMD_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    Protocol = 1,
    Create = 2,
    Destroy = 3,
    Flush = 4,
    Rename = 5,
    Swap = 6,
    List = 7,
    Save = 8,
    Add = 9,
    Del = 10,
    Test = 11,
    Header = 12,
    Type = 13,
}

impl Command {
    pub const ALL: [Command; 13] = [
        Command::Protocol,
        Command::Create,
        Command::Destroy,
        Command::Flush,
        Command::Rename,
        Command::Swap,
        Command::List,
        Command::Save,
        Command::Add,
        Command::Del,
        Command::Test,
        Command::Header,
        Command::Type,
    ];

    /// Command number on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.code() == code)
    }

    /// Netlink message type: `command | NFNL_SUBSYS_IPSET << 8`.
    pub fn msg_type(self) -> u16 {
        u16::from(self.code()) | (u16::from(NFNL_SUBSYS_IPSET) << 8)
    }

    /// Netlink header flags, before `NLM_F_EXCL` is considered.
    pub fn flags(self) -> u16 {
        match self {
            Command::Create => NLM_F_REQUEST | NLM_F_ACK | NLM_F_CREATE,
            Command::Destroy
            | Command::Flush
            | Command::Rename
            | Command::Swap
            | Command::Test
            | Command::Add
            | Command::Del => NLM_F_REQUEST | NLM_F_ACK,
            Command::List | Command::Save => NLM_F_REQUEST | NLM_F_ACK | NLM_F_DUMP,
            Command::Header | Command::Type | Command::Protocol => NLM_F_REQUEST,
        }
    }

    /// Symbolic kernel name.
    pub fn name(self) -> &'static str {
        match self {
            Command::Protocol => "IPSET_CMD_PROTOCOL",
            Command::Create => "IPSET_CMD_CREATE",
            Command::Destroy => "IPSET_CMD_DESTROY",
            Command::Flush => "IPSET_CMD_FLUSH",
            Command::Rename => "IPSET_CMD_RENAME",
            Command::Swap => "IPSET_CMD_SWAP",
            Command::List => "IPSET_CMD_LIST",
            Command::Save => "IPSET_CMD_SAVE",
            Command::Add => "IPSET_CMD_ADD",
            Command::Del => "IPSET_CMD_DEL",
            Command::Test => "IPSET_CMD_TEST",
            Command::Header => "IPSET_CMD_HEADER",
            Command::Type => "IPSET_CMD_TYPE",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name().trim_start_matches("IPSET_CMD_").to_ascii_lowercase();
        f.write_str(&name)
    }
}

/// Address family of a set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Family {
    #[default]
    Inet,
    Inet6,
}

impl Family {
    pub fn as_u8(self) -> u8 {
        match self {
            Family::Inet => libc::AF_INET as u8,
            Family::Inet6 => libc::AF_INET6 as u8,
        }
    }

    pub fn from_u8(family: u8) -> Option<Self> {
        match i32::from(family) {
            libc::AF_INET => Some(Family::Inet),
            libc::AF_INET6 => Some(Family::Inet6),
            _ => None,
        }
    }

    /// Family of an address.
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Family::Inet,
            IpAddr::V6(_) => Family::Inet6,
        }
    }

    /// Name used by the ipset tool.
    pub fn name(self) -> &'static str {
        match self {
            Family::Inet => "inet",
            Family::Inet6 => "inet6",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::message::NLM_F_EXCL;

    #[test]
    fn test_msg_type() {
        assert_eq!(Command::Protocol.msg_type(), 0x601);
        assert_eq!(Command::Add.msg_type(), 0x609);
        assert_eq!(Command::Type.msg_type(), 0x60d);
    }

    #[test]
    fn test_codes_roundtrip() {
        for cmd in Command::ALL {
            assert_eq!(Command::from_code(cmd.code()), Some(cmd));
        }
        assert_eq!(Command::from_code(0), None);
        assert_eq!(Command::from_code(14), None);
    }

    #[test]
    fn test_flags_table() {
        assert_eq!(Command::Create.flags(), 0x405);
        assert_eq!(Command::Add.flags(), 0x005);
        assert_eq!(Command::Rename.flags(), 0x005);
        assert_eq!(Command::List.flags(), 0x305);
        assert_eq!(Command::Save.flags(), 0x305);
        assert_eq!(Command::Header.flags(), 0x001);
        assert_eq!(Command::Protocol.flags(), 0x001);
        // NLM_F_DUMP shares its bit with NLM_F_EXCL.
        for cmd in Command::ALL {
            if !matches!(cmd, Command::List | Command::Save) {
                assert_eq!(cmd.flags() & NLM_F_EXCL, 0, "{}", cmd);
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::Destroy.to_string(), "destroy");
        assert_eq!(Command::Type.name(), "IPSET_CMD_TYPE");
    }

    #[test]
    fn test_family() {
        assert_eq!(Family::default(), Family::Inet);
        assert_eq!(Family::Inet.as_u8(), 2);
        assert_eq!(Family::Inet6.as_u8(), 10);
        assert_eq!(Family::from_u8(10), Some(Family::Inet6));
        assert_eq!(Family::from_u8(7), None);
        assert_eq!(Family::of(&"::1".parse().unwrap()), Family::Inet6);
    }
}
