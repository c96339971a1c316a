//! ipset request messages.

use super::command::{Command, Family};
use super::consts::*;
use crate::netlink::message::NLM_F_EXCL;
use crate::netlink::{Attr, Error, MessageBuilder, NfGenMsg, Result};

/// Builder for one ipset request.
///
/// The message starts with the nfgenmsg header, the `PROTOCOL` attribute
/// and, for CREATE and TYPE, the `FAMILY` attribute; everything else is
/// appended in call order. Sequence number and port id stay zero until the
/// transport stamps them.
///
/// ```ignore
/// let msg = IpsetRequest::new(Command::Add, IPSET_PROTOCOL, Family::Inet)?
///     .set_name("blocklist")?
///     .attr(entry.encode_data())?
///     .exclusive_unless(entry.replace)
///     .finish();
/// ```
#[derive(Debug, Clone)]
pub struct IpsetRequest {
    command: Command,
    builder: MessageBuilder,
}

impl IpsetRequest {
    pub fn new(command: Command, protocol: u8, family: Family) -> Result<Self> {
        let mut builder = MessageBuilder::new(command.msg_type(), command.flags());
        builder.append_bytes(&NfGenMsg::new(family.as_u8()).to_bytes());
        builder.append_attr(&Attr::u8(IPSET_ATTR_PROTOCOL, protocol))?;

        match command {
            Command::Create => {
                builder.append_attr(&Attr::u8(IPSET_ATTR_FAMILY, family.as_u8()))?;
            }
            Command::Type => {
                builder.append_attr(&Attr::u8(IPSET_ATTR_FAMILY, family.as_u8()))?;
                builder.add_flags(NLM_F_EXCL);
            }
            _ => {}
        }

        Ok(Self { command, builder })
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn flags(&self) -> u16 {
        self.builder.flags()
    }

    /// Fail if the target already exists instead of overwriting it.
    pub fn exclusive(mut self) -> Self {
        self.builder.add_flags(NLM_F_EXCL);
        self
    }

    /// `exclusive()` unless the caller asked for replace semantics.
    pub fn exclusive_unless(self, replace: bool) -> Self {
        if replace { self } else { self.exclusive() }
    }

    pub fn set_name(self, name: &str) -> Result<Self> {
        check_name(name)?;
        self.attr(Attr::string(IPSET_ATTR_SETNAME, name))
    }

    /// Second set name of a rename or swap.
    pub fn set_name2(self, name: &str) -> Result<Self> {
        check_name(name)?;
        self.attr(Attr::string(IPSET_ATTR_SETNAME2, name))
    }

    pub fn type_name(self, name: &str) -> Result<Self> {
        check_name(name)?;
        self.attr(Attr::string(IPSET_ATTR_TYPENAME, name))
    }

    pub fn revision(self, revision: u8) -> Result<Self> {
        self.attr(Attr::u8(IPSET_ATTR_REVISION, revision))
    }

    /// Wrap `attrs` in a `DATA` container.
    pub fn data(self, attrs: Vec<Attr>) -> Result<Self> {
        self.attr(Attr::nested(IPSET_ATTR_DATA, attrs))
    }

    /// Append one attribute tree; fails if it does not fit a netlink length.
    pub fn attr(mut self, attr: Attr) -> Result<Self> {
        self.builder.append_attr(&attr)?;
        Ok(self)
    }

    /// Current message bytes, length field not yet written.
    pub fn as_bytes(&self) -> &[u8] {
        self.builder.as_bytes()
    }

    pub fn finish(self) -> Vec<u8> {
        self.builder.finish()
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName("empty name".into()));
    }
    if name.len() >= IPSET_MAXNAMELEN {
        return Err(Error::InvalidName(format!(
            "{:?} is longer than {} bytes",
            name,
            IPSET_MAXNAMELEN - 1
        )));
    }
    if name.contains('\0') {
        return Err(Error::InvalidName(format!("{:?} contains NUL", name)));
    }
    Ok(())
}
