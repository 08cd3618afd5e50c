//! Error taxonomy for the A2S client.
//!
//! `ErrTimeout` from the spec's error table is intentionally absent here:
//! a timed-out query is not a failure, it is the ordinary completion path
//! represented by [`crate::event::Event::Done`]'s `timed_out` flag.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to resolve host {host:?}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind udp socket: {0}")]
    Bind(#[source] std::io::Error),

    #[error("udp socket operation failed: {0}")]
    Socket(#[source] std::io::Error),

    #[error("datagram from unknown source {0}")]
    UnknownSource(std::net::SocketAddr),

    #[error("framing prefix was neither -1 nor -2")]
    BadFraming,

    #[error("read past end of buffer")]
    Truncated,

    #[error("string ran past end of buffer without a null terminator")]
    TruncatedString,

    #[error("unexpected response type byte 0x{0:02X}")]
    UnexpectedResponseType(u8),

    #[error("response type byte 0x{0:02X} received out of order for the current stage")]
    ProtocolOutOfOrder(u8),

    #[error("decompressed payload failed crc32 verification")]
    Checksum,

    #[error("0x{0:02X} is not a request type defined in §4.1")]
    InvalidRequestKind(u8),
}

pub type Result<T> = std::result::Result<T, Error>;
