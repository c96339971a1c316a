//! The seam between request/response marshaling and the socket.

use std::future::Future;

use super::error::Result;

/// Moves finished netlink requests to the kernel and collects the replies.
///
/// [`Connection`](super::Connection) is the socket-backed implementation;
/// tests substitute scripted transports.
pub trait Transport: Send + Sync {
    /// Stamp a sequence number and port id into `request`, send it, and
    /// return the sequence number used.
    fn send(&self, request: Vec<u8>) -> impl Future<Output = Result<u32>> + Send;

    /// Collect the data messages answering `seq`, headers included.
    ///
    /// Returns once the reply is complete: on `NLMSG_DONE`, on an ACK, or
    /// after a single non-multipart data message. An error frame carrying a
    /// non-zero errno becomes [`Error::Kernel`](super::Error::Kernel).
    fn receive(&self, seq: u32) -> impl Future<Output = Result<Vec<Vec<u8>>>> + Send;

    /// Send `request` and collect its reply.
    fn request(&self, request: Vec<u8>) -> impl Future<Output = Result<Vec<Vec<u8>>>> + Send {
        async move {
            let seq = self.send(request).await?;
            self.receive(seq).await
        }
    }
}
