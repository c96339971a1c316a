//! Reply payloads as the kernel sends them, for decoder tests.
//!
//! Payloads start at the nfgenmsg; netlink headers are in host order
//! (captured on little-endian machines), values flagged
//! `NLA_F_NET_BYTEORDER` are big-endian.

#![allow(dead_code)]

use super::command::Command;
use crate::netlink::message::NLM_F_MULTI;
use crate::netlink::{NLMSG_HDRLEN, NlMsgHdr, NlMsgType};

/// Reply to PROTOCOL from a kernel speaking protocol 7, minimum 6.
pub fn protocol_reply() -> Vec<u8> {
    vec![
        0x02, 0x00, 0x00, 0x00, // nfgenmsg: AF_INET, v0, res_id 0
        0x05, 0x00, 0x01, 0x00, 0x07, 0x00, 0x00, 0x00, // PROTOCOL 7
        0x05, 0x00, 0x0a, 0x00, 0x06, 0x00, 0x00, 0x00, // PROTOCOL_MIN 6
    ]
}

/// `ipset list test` for a hash:ip set with timeout and comment support
/// holding `10.0.0.1 timeout 3599 comment "hi"`.
pub fn list_hash_ip() -> Vec<u8> {
    vec![
        0x02, 0x00, 0x00, 0x00, // nfgenmsg
        0x05, 0x00, 0x01, 0x00, 0x06, 0x00, 0x00, 0x00, // PROTOCOL 6
        0x09, 0x00, 0x02, 0x00, b't', b'e', b's', b't', 0x00, 0x00, 0x00, 0x00, // SETNAME
        0x0c, 0x00, 0x03, 0x00, b'h', b'a', b's', b'h', b':', b'i', b'p', 0x00, // TYPENAME
        0x05, 0x00, 0x04, 0x00, 0x04, 0x00, 0x00, 0x00, // REVISION 4
        0x05, 0x00, 0x05, 0x00, 0x02, 0x00, 0x00, 0x00, // FAMILY inet
        0x44, 0x00, 0x07, 0x80, // DATA
        0x08, 0x00, 0x11, 0x40, 0x12, 0x34, 0x56, 0x78, //   INITVAL
        0x08, 0x00, 0x12, 0x40, 0x00, 0x00, 0x04, 0x00, //   HASHSIZE 1024
        0x08, 0x00, 0x13, 0x40, 0x00, 0x01, 0x00, 0x00, //   MAXELEM 65536
        0x05, 0x00, 0x15, 0x00, 0x0c, 0x00, 0x00, 0x00, //   BUCKETSIZE 12
        0x08, 0x00, 0x06, 0x40, 0x00, 0x00, 0x0e, 0x10, //   TIMEOUT 3600
        0x08, 0x00, 0x19, 0x40, 0x00, 0x00, 0x00, 0x00, //   REFERENCES 0
        0x08, 0x00, 0x18, 0x40, 0x00, 0x00, 0x00, 0x01, //   ELEMENTS 1
        0x08, 0x00, 0x1a, 0x40, 0x00, 0x00, 0x01, 0x28, //   MEMSIZE 296
        0x24, 0x00, 0x08, 0x80, // ADT
        0x20, 0x00, 0x07, 0x80, //   DATA
        0x0c, 0x00, 0x01, 0x80, //     IP
        0x08, 0x00, 0x01, 0x40, 0x0a, 0x00, 0x00, 0x01, //       IPADDR_IPV4 10.0.0.1
        0x08, 0x00, 0x06, 0x40, 0x00, 0x00, 0x0e, 0x0f, //     TIMEOUT 3599
        0x07, 0x00, 0x1a, 0x00, b'h', b'i', 0x00, 0x00, //     COMMENT "hi"
    ]
}

/// `ipset list ports` for a hash:net,port set with counters.
///
/// The first element carries the `PAD` attribute the kernel inserts to
/// align 64-bit counters.
pub fn list_hash_net_port() -> Vec<u8> {
    let mut buf = vec![
        0x02, 0x00, 0x00, 0x00, // nfgenmsg
        0x05, 0x00, 0x01, 0x00, 0x06, 0x00, 0x00, 0x00, // PROTOCOL 6
        0x0a, 0x00, 0x02, 0x00, b'p', b'o', b'r', b't', b's', 0x00, 0x00, 0x00, // SETNAME
        0x12, 0x00, 0x03, 0x00, // TYPENAME
    ];
    buf.extend_from_slice(b"hash:net,port\0\0\0");
    buf.extend_from_slice(&[
        0x05, 0x00, 0x04, 0x00, 0x07, 0x00, 0x00, 0x00, // REVISION 7
        0x05, 0x00, 0x05, 0x00, 0x02, 0x00, 0x00, 0x00, // FAMILY inet
        0x1c, 0x00, 0x07, 0x80, // DATA
        0x08, 0x00, 0x08, 0x40, 0x00, 0x00, 0x00, 0x08, //   CADT_FLAGS with-counters
        0x08, 0x00, 0x12, 0x40, 0x00, 0x00, 0x04, 0x00, //   HASHSIZE 1024
        0x08, 0x00, 0x18, 0x40, 0x00, 0x00, 0x00, 0x02, //   ELEMENTS 2
        0x88, 0x00, 0x08, 0x80, // ADT
        0x44, 0x00, 0x07, 0x80, //   DATA
        0x0c, 0x00, 0x01, 0x80, //     IP
        0x08, 0x00, 0x01, 0x40, 0xc0, 0xa8, 0x00, 0x00, //       192.168.0.0
        0x05, 0x00, 0x03, 0x00, 0x10, 0x00, 0x00, 0x00, //     CIDR 16
        0x06, 0x00, 0x04, 0x40, 0x00, 0x35, 0x00, 0x00, //     PORT 53
        0x05, 0x00, 0x07, 0x00, 0x11, 0x00, 0x00, 0x00, //     PROTO udp
        0x04, 0x00, 0x1e, 0x00, //     PAD
        0x0c, 0x00, 0x18, 0x40, 0, 0, 0, 0, 0, 0, 0, 0, //     BYTES 0
        0x0c, 0x00, 0x19, 0x40, 0, 0, 0, 0, 0, 0, 0, 0, //     PACKETS 0
        0x40, 0x00, 0x07, 0x80, //   DATA
        0x0c, 0x00, 0x01, 0x80, //     IP
        0x08, 0x00, 0x01, 0x40, 0x0a, 0x00, 0x00, 0x00, //       10.0.0.0
        0x05, 0x00, 0x03, 0x00, 0x08, 0x00, 0x00, 0x00, //     CIDR 8
        0x06, 0x00, 0x04, 0x40, 0x00, 0x16, 0x00, 0x00, //     PORT 22
        0x05, 0x00, 0x07, 0x00, 0x06, 0x00, 0x00, 0x00, //     PROTO tcp
        0x0c, 0x00, 0x18, 0x40, 0, 0, 0, 0, 0, 0, 0, 0xb4, //     BYTES 180
        0x0c, 0x00, 0x19, 0x40, 0, 0, 0, 0, 0, 0, 0, 0x03, //     PACKETS 3
    ]);
    buf
}

/// Wrap `payload` in a netlink header for `command`'s reply.
pub fn message(command: Command, seq: u32, multi: bool, payload: &[u8]) -> Vec<u8> {
    let mut hdr = NlMsgHdr::new(command.msg_type(), if multi { NLM_F_MULTI } else { 0 });
    hdr.nlmsg_len = (NLMSG_HDRLEN + payload.len()) as u32;
    hdr.nlmsg_seq = seq;
    let mut buf = hdr.as_bytes().to_vec();
    buf.extend_from_slice(payload);
    buf
}

/// An NLMSG_ERROR frame; `errno` zero is an ACK.
pub fn error(seq: u32, errno: i32) -> Vec<u8> {
    let mut hdr = NlMsgHdr::new(NlMsgType::ERROR, 0);
    hdr.nlmsg_len = (NLMSG_HDRLEN * 2 + 4) as u32;
    hdr.nlmsg_seq = seq;
    let mut buf = hdr.as_bytes().to_vec();
    buf.extend_from_slice(&(-errno).to_ne_bytes());
    buf.extend_from_slice(NlMsgHdr::new(0, 0).as_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipset::consts::*;
    use crate::ipset::result::{SetResult, decode_dump};
    use crate::netlink::attr::NLA_F_NESTED;
    use crate::netlink::message::split_message;
    use crate::netlink::{AttrIter, NfGenMsg};

    #[test]
    fn test_fixture_lengths_are_consistent() {
        for payload in [protocol_reply(), list_hash_ip(), list_hash_net_port()] {
            assert_eq!(payload.len() % 4, 0);
            let (_, attrs) = NfGenMsg::split(&payload).unwrap();
            let consumed: usize = AttrIter::new(attrs)
                .map(|a| crate::netlink::attr::nla_align(4 + a.unwrap().payload().len()))
                .sum();
            assert_eq!(consumed, attrs.len());
        }
    }

    #[test]
    fn test_adt_entries_are_data_containers() {
        let payload = list_hash_net_port();
        let (_, attrs) = NfGenMsg::split(&payload).unwrap();
        let adt = AttrIter::new(attrs)
            .map(Result::unwrap)
            .find(|a| a.raw_type() == IPSET_ATTR_ADT | NLA_F_NESTED)
            .unwrap();
        let children: Vec<u16> = adt.nested().map(|a| a.unwrap().raw_type()).collect();
        assert_eq!(children, vec![IPSET_ATTR_DATA | NLA_F_NESTED; 2]);
    }

    #[test]
    fn test_wrapped_dump_decodes() {
        let msgs = [
            message(Command::List, 9, true, &list_hash_ip()),
            message(Command::List, 9, true, &list_hash_net_port()),
        ];
        let payloads: Vec<&[u8]> = msgs.iter().map(|m| split_message(m).unwrap().1).collect();
        let sets = decode_dump(payloads).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].entries.len() + sets[1].entries.len(), 3);
    }

    #[test]
    fn test_error_frame() {
        let frame = error(4, IPSET_ERR_EXIST);
        let hdr = NlMsgHdr::from_bytes(&frame).unwrap();
        assert_eq!(hdr.nlmsg_len as usize, frame.len());
        let (_, payload) = split_message(&frame).unwrap();
        assert_eq!(i32::from_ne_bytes(payload[..4].try_into().unwrap()), -4103);
        assert!(SetResult::from_payload(&protocol_reply()).is_ok());
    }
}
