//! Endpoint data model (§3).
//!
//! Per the design note on "per-endpoint hidden fields", this type exposes
//! only the finalized result slots a caller can read back after a query
//! run. The state-machine-private bookkeeping (challenge tokens, the ping
//! send timestamp, the in-flight reassembly context, the observed
//! application id) lives on [`crate::session::Session`] instead.

use std::net::Ipv4Addr;

use crate::info::Info;
use crate::player::PlayerList;
use crate::rules::RuleList;

/// A single remote game server, addressed by hostname (as given by the
/// caller) and resolved IPv4 address + UDP port.
#[derive(Clone, Debug)]
pub struct Endpoint {
    pub host: String,
    pub address: Ipv4Addr,
    pub port: u16,
    pub info: Option<Info>,
    pub players: Option<PlayerList>,
    pub rules: Option<RuleList>,
    pub ping_ms: Option<f32>,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, address: Ipv4Addr, port: u16) -> Self {
        Endpoint {
            host: host.into(),
            address,
            port,
            info: None,
            players: None,
            rules: None,
            ping_ms: None,
        }
    }

    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from((self.address, self.port))
    }

    /// All four stages have reported a result.
    pub fn is_complete(&self) -> bool {
        self.info.is_some() && self.players.is_some() && self.rules.is_some() && self.ping_ms.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_endpoint_is_incomplete() {
        let ep = Endpoint::new("example.invalid", Ipv4Addr::LOCALHOST, 27015);
        assert!(!ep.is_complete());
        assert_eq!(ep.socket_addr().port(), 27015);
    }
}
