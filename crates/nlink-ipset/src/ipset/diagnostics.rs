//! Opt-in dumps of requests and decoded replies.
//!
//! A [`Diagnostics`] sink is handed to
//! [`IpSet::with_diagnostics`](super::IpSet::with_diagnostics). The sink only
//! observes; nothing it does changes the outcome of a call.

use std::fmt::Write as _;

use tracing::debug;

use super::command::Command;
use super::consts::*;
use super::result::SetResult;
use crate::netlink::attr::{NLA_F_NET_BYTEORDER, RawAttr};
use crate::netlink::message::split_message;
use crate::netlink::{AttrIter, NfGenMsg, Result};

/// Observer for the façade's traffic.
pub trait Diagnostics: Send + Sync {
    /// Called with the finished request, before it is sent.
    fn on_request(&self, command: Command, request: &[u8]) {
        let _ = (command, request);
    }

    /// Called with every decoded reply.
    fn on_result(&self, command: Command, result: &SetResult) {
        let _ = (command, result);
    }
}

/// Logs requests as attribute trees and results as debug structs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn on_request(&self, command: Command, request: &[u8]) {
        match render_request(request) {
            Ok(tree) => debug!(command = command.name(), "ipset request\n{}", tree),
            Err(e) => debug!(command = command.name(), error = %e, "cannot render ipset request"),
        }
    }

    fn on_result(&self, command: Command, result: &SetResult) {
        debug!(command = command.name(), "ipset result: {:#?}", result);
    }
}

/// Which name table applies inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Command,
    /// `DATA` of CREATE: creation parameters above the CADT range.
    CreateData,
    /// `DATA` of element commands and `ADT` children.
    AdtData,
    Address,
}

fn command_attr_name(kind: u16) -> Option<&'static str> {
    Some(match kind {
        IPSET_ATTR_PROTOCOL => "IPSET_ATTR_PROTOCOL",
        IPSET_ATTR_SETNAME => "IPSET_ATTR_SETNAME",
        IPSET_ATTR_TYPENAME => "IPSET_ATTR_TYPENAME",
        IPSET_ATTR_REVISION => "IPSET_ATTR_REVISION",
        IPSET_ATTR_FAMILY => "IPSET_ATTR_FAMILY",
        IPSET_ATTR_FLAGS => "IPSET_ATTR_FLAGS",
        IPSET_ATTR_DATA => "IPSET_ATTR_DATA",
        IPSET_ATTR_ADT => "IPSET_ATTR_ADT",
        IPSET_ATTR_LINENO => "IPSET_ATTR_LINENO",
        IPSET_ATTR_PROTOCOL_MIN => "IPSET_ATTR_PROTOCOL_MIN",
        IPSET_ATTR_INDEX => "IPSET_ATTR_INDEX",
        _ => return None,
    })
}

fn cadt_attr_name(kind: u16) -> Option<&'static str> {
    Some(match kind {
        IPSET_ATTR_IP => "IPSET_ATTR_IP",
        IPSET_ATTR_IP_TO => "IPSET_ATTR_IP_TO",
        IPSET_ATTR_CIDR => "IPSET_ATTR_CIDR",
        IPSET_ATTR_PORT => "IPSET_ATTR_PORT",
        IPSET_ATTR_PORT_TO => "IPSET_ATTR_PORT_TO",
        IPSET_ATTR_TIMEOUT => "IPSET_ATTR_TIMEOUT",
        IPSET_ATTR_PROTO => "IPSET_ATTR_PROTO",
        IPSET_ATTR_CADT_FLAGS => "IPSET_ATTR_CADT_FLAGS",
        IPSET_ATTR_CADT_LINENO => "IPSET_ATTR_CADT_LINENO",
        IPSET_ATTR_MARK => "IPSET_ATTR_MARK",
        IPSET_ATTR_MARKMASK => "IPSET_ATTR_MARKMASK",
        IPSET_ATTR_BITMASK => "IPSET_ATTR_BITMASK",
        _ => return None,
    })
}

fn create_attr_name(kind: u16) -> Option<&'static str> {
    Some(match kind {
        IPSET_ATTR_INITVAL => "IPSET_ATTR_INITVAL",
        IPSET_ATTR_HASHSIZE => "IPSET_ATTR_HASHSIZE",
        IPSET_ATTR_MAXELEM => "IPSET_ATTR_MAXELEM",
        IPSET_ATTR_NETMASK => "IPSET_ATTR_NETMASK",
        IPSET_ATTR_BUCKETSIZE => "IPSET_ATTR_BUCKETSIZE",
        IPSET_ATTR_RESIZE => "IPSET_ATTR_RESIZE",
        IPSET_ATTR_SIZE => "IPSET_ATTR_SIZE",
        IPSET_ATTR_ELEMENTS => "IPSET_ATTR_ELEMENTS",
        IPSET_ATTR_REFERENCES => "IPSET_ATTR_REFERENCES",
        IPSET_ATTR_MEMSIZE => "IPSET_ATTR_MEMSIZE",
        _ => return None,
    })
}

fn adt_attr_name(kind: u16) -> Option<&'static str> {
    Some(match kind {
        IPSET_ATTR_ETHER => "IPSET_ATTR_ETHER",
        IPSET_ATTR_NAME => "IPSET_ATTR_NAME",
        IPSET_ATTR_NAMEREF => "IPSET_ATTR_NAMEREF",
        IPSET_ATTR_IP2 => "IPSET_ATTR_IP2",
        IPSET_ATTR_CIDR2 => "IPSET_ATTR_CIDR2",
        IPSET_ATTR_IP2_TO => "IPSET_ATTR_IP2_TO",
        IPSET_ATTR_IFACE => "IPSET_ATTR_IFACE",
        IPSET_ATTR_BYTES => "IPSET_ATTR_BYTES",
        IPSET_ATTR_PACKETS => "IPSET_ATTR_PACKETS",
        IPSET_ATTR_COMMENT => "IPSET_ATTR_COMMENT",
        IPSET_ATTR_SKBMARK => "IPSET_ATTR_SKBMARK",
        IPSET_ATTR_SKBPRIO => "IPSET_ATTR_SKBPRIO",
        IPSET_ATTR_SKBQUEUE => "IPSET_ATTR_SKBQUEUE",
        IPSET_ATTR_PAD => "IPSET_ATTR_PAD",
        _ => return None,
    })
}

fn attr_name(scope: Scope, kind: u16) -> Option<&'static str> {
    match scope {
        Scope::Command => command_attr_name(kind),
        Scope::CreateData => cadt_attr_name(kind).or_else(|| create_attr_name(kind)),
        Scope::AdtData => cadt_attr_name(kind).or_else(|| adt_attr_name(kind)),
        Scope::Address => match kind {
            IPSET_ATTR_IPADDR_IPV4 => Some("IPV4"),
            IPSET_ATTR_IPADDR_IPV6 => Some("IPV6"),
            _ => None,
        },
    }
}

/// Render a complete request message as an indented attribute tree.
pub fn render_request(message: &[u8]) -> Result<String> {
    let (header, payload) = split_message(message)?;
    let (nfgenmsg, attrs) = NfGenMsg::split(payload)?;
    let command = Command::from_code((header.nlmsg_type & 0xff) as u8);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} len {} flags {:#06x} seq {}",
        command.map_or("IPSET_CMD_UNKNOWN", Command::name),
        header.nlmsg_len,
        header.nlmsg_flags,
        header.nlmsg_seq,
    );
    let _ = writeln!(
        out,
        "nfgenmsg family {} version {} res_id {}",
        nfgenmsg.family, nfgenmsg.version, nfgenmsg.res_id
    );
    let data_scope = if command == Some(Command::Create) {
        Scope::CreateData
    } else {
        Scope::AdtData
    };
    render_attrs(&mut out, attrs, Scope::Command, data_scope, 0)?;
    Ok(out)
}

fn render_attrs(
    out: &mut String,
    data: &[u8],
    scope: Scope,
    data_scope: Scope,
    depth: usize,
) -> Result<()> {
    for attr in AttrIter::new(data) {
        let attr = attr?;
        let kind = attr.kind();
        let indent = "  ".repeat(depth);
        let name = attr_name(scope, kind).unwrap_or("?");

        if attr.is_nested() {
            let _ = writeln!(out, "{}{}[{}]:", indent, name, kind);
            let inner = match (scope, kind) {
                (Scope::Command, IPSET_ATTR_DATA) => data_scope,
                (Scope::Command, IPSET_ATTR_ADT) => Scope::Command,
                _ => Scope::Address,
            };
            // ADT holds DATA containers, each one an element.
            let inner_data = if inner == Scope::Command {
                Scope::AdtData
            } else {
                data_scope
            };
            render_attrs(out, attr.payload(), inner, inner_data, depth + 1)?;
        } else {
            let _ = writeln!(out, "{}{}[{}]: {}", indent, name, kind, render_value(scope, &attr));
        }
    }
    Ok(())
}

fn render_value(scope: Scope, attr: &RawAttr<'_>) -> String {
    let data = attr.payload();
    let be = attr.raw_type() & NLA_F_NET_BYTEORDER != 0;
    let is_string = match scope {
        Scope::Command => matches!(attr.kind(), IPSET_ATTR_SETNAME | IPSET_ATTR_TYPENAME),
        Scope::AdtData => attr.kind() == IPSET_ATTR_COMMENT,
        _ => false,
    };

    if is_string && let Some(s) = data.strip_suffix(&[0]).and_then(|s| std::str::from_utf8(s).ok()) {
        return format!("{:?}", s);
    }
    if scope == Scope::Address {
        return crate::netlink::parse::ip(data)
            .map(|ip| ip.to_string())
            .unwrap_or_else(|_| hex(data));
    }
    match (data.len(), be) {
        (1, _) => data[0].to_string(),
        (2, true) => u16::from_be_bytes([data[0], data[1]]).to_string(),
        (4, true) => u32::from_be_bytes([data[0], data[1], data[2], data[3]]).to_string(),
        (8, true) => {
            let mut b = [0u8; 8];
            b.copy_from_slice(data);
            u64::from_be_bytes(b).to_string()
        }
        _ => hex(data),
    }
}

fn hex(data: &[u8]) -> String {
    if data.is_empty() {
        return "(empty)".into();
    }
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
