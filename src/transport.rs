//! Transport interface (§6): a bound UDP socket abstraction. Supplemented
//! per `SPEC_FULL.md` §12 — grounded in how `rumblefrog-a2s-rs` parameterizes
//! its client over sync/async transports via a cargo feature, generalized
//! here into a trait object so the dispatcher can be driven by a fake
//! transport in tests instead of a real socket.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::UdpSocket;

use crate::error::{Error, Result};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_to(&self, buf: &[u8], addr: SocketAddr) -> Result<()>;

    /// Receive one datagram into `buf`, returning the number of bytes
    /// written and the sender's address.
    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)>;

    /// Release the underlying socket. The dispatcher calls this exactly
    /// once, on completion or on timeout, whichever comes first (§3
    /// invariants). The default UDP transport has nothing to do here
    /// beyond what `Drop` already handles; fakes use it to assert the
    /// single-close invariant.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Default transport: a single bound UDP socket.
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    pub async fn bind() -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(Error::Bind)?;
        Ok(UdpTransport { socket })
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send_to(&self, buf: &[u8], addr: SocketAddr) -> Result<()> {
        self.socket
            .send_to(buf, addr)
            .await
            .map_err(Error::Socket)?;
        Ok(())
    }

    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).await.map_err(Error::Socket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bound_socket_has_an_ephemeral_port() {
        let transport = UdpTransport::bind().await.unwrap();
        let addr = transport.socket.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
    }
}
