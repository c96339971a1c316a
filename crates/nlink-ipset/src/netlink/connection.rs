//! Netfilter netlink connection with request/response handling.

use tracing::{debug, trace, warn};

use super::builder::stamp;
use super::error::{Error, Result};
use super::message::{MessageIter, NLMSG_HDRLEN, NlMsgError, NlMsgHdr, NlMsgType};
use super::socket::NetlinkSocket;
use super::transport::Transport;

/// Socket-backed [`Transport`].
pub struct Connection {
    socket: NetlinkSocket,
}

impl Connection {
    /// Open a new `NETLINK_NETFILTER` connection.
    pub fn new() -> Result<Self> {
        Ok(Self {
            socket: NetlinkSocket::new()?,
        })
    }

    /// Get the underlying socket.
    pub fn socket(&self) -> &NetlinkSocket {
        &self.socket
    }
}

/// What a single reply frame means for the exchange in progress.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Frame {
    /// Belongs to another exchange.
    Foreign,
    /// Data message; `last` when it is not part of a multipart reply.
    Data { last: bool },
    /// ACK or NLMSG_DONE.
    Done,
    /// Discard and keep reading.
    Skip,
}

/// Classify one reply frame for `seq`.
pub(crate) fn classify(header: &NlMsgHdr, message: &[u8], seq: u32) -> Result<Frame> {
    if header.nlmsg_seq != seq {
        return Ok(Frame::Foreign);
    }
    let payload = &message[NLMSG_HDRLEN.min(message.len())..];

    match header.nlmsg_type {
        NlMsgType::ERROR => {
            let err = NlMsgError::from_bytes(payload)?;
            if !err.is_ack() {
                return Err(Error::from_errno(err.error));
            }
            Ok(Frame::Done)
        }
        NlMsgType::DONE => {
            // A dump that failed part way reports the errno here.
            if let Ok(err) = NlMsgError::from_bytes(payload)
                && err.error < 0
            {
                return Err(Error::from_errno(err.error));
            }
            Ok(Frame::Done)
        }
        NlMsgType::NOOP => Ok(Frame::Skip),
        NlMsgType::OVERRUN => Err(Error::InvalidMessage("netlink overrun".into())),
        _ => Ok(Frame::Data {
            last: !header.is_multi(),
        }),
    }
}

impl Transport for Connection {
    async fn send(&self, mut request: Vec<u8>) -> Result<u32> {
        let seq = self.socket.next_seq();
        stamp(&mut request, seq, self.socket.pid());
        debug!(seq, len = request.len(), "sending netlink request");
        self.socket.send(&request).await?;
        Ok(seq)
    }

    async fn receive(&self, seq: u32) -> Result<Vec<Vec<u8>>> {
        let mut responses = Vec::new();

        loop {
            let data = self.socket.recv_msg().await?;

            for result in MessageIter::new(&data) {
                let (header, message) = result?;

                match classify(&header, message, seq)? {
                    Frame::Foreign => {
                        warn!(
                            expected = seq,
                            got = header.nlmsg_seq,
                            msg_type = header.nlmsg_type,
                            "skipping netlink message for another request"
                        );
                    }
                    Frame::Skip => {}
                    Frame::Done => {
                        trace!(seq, messages = responses.len(), "reply complete");
                        return Ok(responses);
                    }
                    Frame::Data { last } => {
                        responses.push(message.to_vec());
                        if last {
                            trace!(seq, messages = responses.len(), "single-part reply");
                            return Ok(responses);
                        }
                    }
                }
            }
        }
    }
}
