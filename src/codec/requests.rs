//! Request datagram builders.
//!
//! The teacher crate parses these same byte layouts from the server side
//! (`requests.rs::parse_info_request` etc., useful as the wire-format
//! reference); a client instead needs to *build* them. Per the spec's design
//! note, this is a plain builder function per request kind rather than a
//! `RequestPacket` constructor branching on a string tag — the state machine
//! already knows which request it wants.

use crate::error::{Error, Result};

const SIMPLE_FRAMING: i32 = -1;
const NO_CHALLENGE: i32 = -1;

const TYPE_INFO: u8 = 0x54;
const TYPE_PLAYER: u8 = 0x55;
const TYPE_RULES: u8 = 0x56;
const TYPE_GETCHALLENGE: u8 = 0x57;
const TYPE_PING: u8 = 0x69;

const INFO_PAYLOAD: &[u8] = b"Source Engine Query\0";

/// The five request kinds defined in spec §4.1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    Info,
    Player,
    Rules,
    GetChallenge,
    Ping,
}

impl RequestKind {
    /// Map a raw request-type byte to its kind, per §4.1's type-byte table.
    /// Fails with [`Error::InvalidRequestKind`] for any byte not in that
    /// table — the state machine itself never asks for one of these, but a
    /// caller driving the codec directly from a raw byte (e.g. a config-
    /// or string-tag-driven entry point) can.
    pub fn from_type_byte(b: u8) -> Result<Self> {
        match b {
            TYPE_INFO => Ok(RequestKind::Info),
            TYPE_PLAYER => Ok(RequestKind::Player),
            TYPE_RULES => Ok(RequestKind::Rules),
            TYPE_GETCHALLENGE => Ok(RequestKind::GetChallenge),
            TYPE_PING => Ok(RequestKind::Ping),
            other => Err(Error::InvalidRequestKind(other)),
        }
    }
}

fn framing_prefix(buf: &mut Vec<u8>) {
    buf.extend_from_slice(&SIMPLE_FRAMING.to_le_bytes());
}

/// Build the wire bytes for `kind`. `challenge` is required for
/// [`RequestKind::Player`] and [`RequestKind::Rules`] (use `-1` to request a
/// fresh token) and ignored otherwise.
pub fn build_request(kind: RequestKind, challenge: i32) -> Vec<u8> {
    match kind {
        RequestKind::Info => build_info_request(),
        RequestKind::Player => build_challenge_request(TYPE_PLAYER, challenge),
        RequestKind::Rules => build_challenge_request(TYPE_RULES, challenge),
        RequestKind::GetChallenge => build_empty_request(TYPE_GETCHALLENGE),
        RequestKind::Ping => build_empty_request(TYPE_PING),
    }
}

/// Build the wire bytes for the request type named by a raw type byte
/// (§4.1's type-byte column), failing with [`Error::InvalidRequestKind`]
/// when `type_byte` doesn't name one of the five kinds there. The state
/// machine always knows its `RequestKind` statically and uses
/// [`build_request`] directly; this is the entry point for a caller that
/// only has the raw byte on hand.
pub fn build_request_for_type_byte(type_byte: u8, challenge: i32) -> Result<Vec<u8>> {
    let kind = RequestKind::from_type_byte(type_byte)?;
    Ok(build_request(kind, challenge))
}

fn build_info_request() -> Vec<u8> {
    let mut buf = Vec::with_capacity(25);
    framing_prefix(&mut buf);
    buf.push(TYPE_INFO);
    buf.extend_from_slice(INFO_PAYLOAD);
    buf
}

fn build_challenge_request(type_byte: u8, challenge: i32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(9);
    framing_prefix(&mut buf);
    buf.push(type_byte);
    buf.extend_from_slice(&challenge.to_le_bytes());
    buf
}

fn build_empty_request(type_byte: u8) -> Vec<u8> {
    let mut buf = Vec::with_capacity(5);
    framing_prefix(&mut buf);
    buf.push(type_byte);
    buf
}

/// Sentinel challenge value used to request a fresh token.
pub const SENTINEL_CHALLENGE: i32 = NO_CHALLENGE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_request_is_25_bytes() {
        let req = build_request(RequestKind::Info, SENTINEL_CHALLENGE);
        assert_eq!(req.len(), 25);
        assert_eq!(&req[0..4], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(req[4], 0x54);
        assert_eq!(&req[5..], INFO_PAYLOAD);
    }

    #[test]
    fn player_request_is_9_bytes_with_challenge() {
        let req = build_request(RequestKind::Player, 0x12345678);
        assert_eq!(req.len(), 9);
        assert_eq!(req[4], 0x55);
        assert_eq!(&req[5..9], &0x12345678i32.to_le_bytes());
    }

    #[test]
    fn rules_request_is_9_bytes() {
        let req = build_request(RequestKind::Rules, -1);
        assert_eq!(req.len(), 9);
        assert_eq!(req[4], 0x56);
        assert_eq!(&req[5..9], &(-1i32).to_le_bytes());
    }

    #[test]
    fn challenge_and_ping_are_5_bytes() {
        let challenge = build_request(RequestKind::GetChallenge, -1);
        assert_eq!(challenge, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x57]);

        let ping = build_request(RequestKind::Ping, -1);
        assert_eq!(ping, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x69]);
    }

    #[test]
    fn from_type_byte_accepts_every_kind_in_the_table() {
        assert_eq!(RequestKind::from_type_byte(0x54).unwrap(), RequestKind::Info);
        assert_eq!(RequestKind::from_type_byte(0x55).unwrap(), RequestKind::Player);
        assert_eq!(RequestKind::from_type_byte(0x56).unwrap(), RequestKind::Rules);
        assert_eq!(
            RequestKind::from_type_byte(0x57).unwrap(),
            RequestKind::GetChallenge
        );
        assert_eq!(RequestKind::from_type_byte(0x69).unwrap(), RequestKind::Ping);
    }

    // spec.md §4.1: "Fails with ErrInvalidRequestKind when asked to build
    // any other type."
    #[test]
    fn from_type_byte_rejects_unknown_bytes() {
        assert!(matches!(
            RequestKind::from_type_byte(0x00),
            Err(Error::InvalidRequestKind(0x00))
        ));
    }

    #[test]
    fn build_request_for_type_byte_rejects_unknown_bytes() {
        assert!(matches!(
            build_request_for_type_byte(0xAB, -1),
            Err(Error::InvalidRequestKind(0xAB))
        ));
    }

    #[test]
    fn build_request_for_type_byte_matches_the_typed_builder() {
        assert_eq!(
            build_request_for_type_byte(0x55, 0x12345678).unwrap(),
            build_request(RequestKind::Player, 0x12345678)
        );
    }
}
