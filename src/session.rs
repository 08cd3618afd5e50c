//! Per-endpoint query state machine (§4.4).
//!
//! Sequences `AWAIT_INFO → AWAIT_CHALLENGE_P → AWAIT_PLAYERS →
//! AWAIT_CHALLENGE_R → AWAIT_RULES → AWAIT_PING → DONE`, owns the
//! challenge tokens and the ping timestamp as session-private state (see
//! the design note on promoting hidden per-endpoint fields in
//! `spec.md` §9), and owns the in-flight reassembly context for this
//! endpoint.

use std::time::Instant;

use crate::codec::packet::{read_framing, read_response_type, ResponseType};
use crate::codec::requests::{build_request, RequestKind, SENTINEL_CHALLENGE};
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::info::{parse_goldsource_info, parse_source_info, Info};
use crate::ping::parse_ping;
use crate::player::parse_players;
use crate::reassembly::{ingest_goldsource_fragment, ingest_source_fragment, ReassemblyContext};
use crate::rules::parse_rules;

const SHIP_APP_ID: i16 = 2400;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    AwaitInfo,
    AwaitChallengeP,
    AwaitPlayers,
    AwaitChallengeR,
    AwaitRules,
    AwaitPing,
    Done,
}

/// One event surfaced by a successful stage transition, per §6's event
/// surface (minus `done`, which is a dispatcher-level, not session-level,
/// concept).
#[derive(Clone, Debug)]
pub enum StageEvent {
    Info(Info),
    Challenge(i32),
    Players,
    Rules,
    Ping(f32),
}

/// The result of feeding a datagram's payload into a session: the event
/// raised, and the next request to transmit, if the state machine isn't
/// done.
pub struct Advance {
    pub event: StageEvent,
    pub next_request: Option<Vec<u8>>,
}

pub struct Session {
    pub endpoint: Endpoint,
    stage: Stage,
    challenge_player: Option<i32>,
    challenge_rules: Option<i32>,
    ping_sent_at: Option<Instant>,
    reassembly: Option<ReassemblyContext>,
    app_id: Option<i16>,
    protocol: Option<u8>,
}

impl Session {
    pub fn new(endpoint: Endpoint) -> Self {
        Session {
            endpoint,
            stage: Stage::AwaitInfo,
            challenge_player: None,
            challenge_rules: None,
            ping_sent_at: None,
            reassembly: None,
            app_id: None,
            protocol: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Build the A2S_INFO datagram that kicks this session off.
    pub fn initial_request(&self) -> Vec<u8> {
        build_request(RequestKind::Info, SENTINEL_CHALLENGE)
    }

    /// Feed one datagram payload (everything after the −1/−2 framing
    /// prefix has already been stripped by the dispatcher) that arrived as
    /// a single, unsplit packet.
    pub fn accept_single(&mut self, body: &[u8]) -> Result<Advance> {
        self.handle_response(body)
    }

    /// Feed one multi-packet fragment (everything after the −2 prefix).
    /// Returns `Ok(None)` while reassembly is still in progress.
    pub fn accept_fragment(&mut self, body: &[u8]) -> Result<Option<Advance>> {
        let assembled = if self.app_id.map_or(false, |id| id < 200) {
            ingest_goldsource_fragment(&mut self.reassembly, body)?
        } else {
            let protocol = self.protocol.unwrap_or(0);
            let app_id = self.app_id.unwrap_or(i16::MAX);
            ingest_source_fragment(&mut self.reassembly, body, protocol, app_id)?
        };

        match assembled {
            None => Ok(None),
            Some(payload) => {
                // The assembled payload still carries its own inner
                // simple-framing prefix (§4.3); re-read it here.
                let (is_multi, rest) = read_framing(&payload)?;
                if is_multi {
                    return Err(Error::BadFraming);
                }
                self.handle_response(rest).map(Some)
            }
        }
    }

    fn handle_response(&mut self, body: &[u8]) -> Result<Advance> {
        let (response_type, rest) = read_response_type(body)?;

        match (self.stage, response_type) {
            (Stage::AwaitInfo, ResponseType::InfoSource) => self.on_source_info(rest),
            (Stage::AwaitInfo, ResponseType::InfoGoldSource) => self.on_goldsource_info(rest),
            (Stage::AwaitChallengeP, ResponseType::Challenge) => self.on_challenge_player(rest),
            (Stage::AwaitChallengeR, ResponseType::Challenge) => self.on_challenge_rules(rest),
            (Stage::AwaitPlayers, ResponseType::Player) => self.on_players(rest),
            (Stage::AwaitRules, ResponseType::Rules) => self.on_rules(rest),
            (Stage::AwaitPing, ResponseType::Ping) => self.on_ping(rest),
            (_, ResponseType::Unknown(b)) => Err(Error::UnexpectedResponseType(b)),
            (_, other) => Err(Error::ProtocolOutOfOrder(other.byte())),
        }
    }

    fn on_source_info(&mut self, body: &[u8]) -> Result<Advance> {
        let info = parse_source_info(body)?;
        self.app_id = Some(info.app_id);
        self.protocol = Some(info.protocol);
        let info = Info::Source(info);
        self.endpoint.info = Some(info.clone());
        self.stage = Stage::AwaitChallengeP;
        Ok(Advance {
            event: StageEvent::Info(info),
            next_request: Some(build_request(RequestKind::Player, SENTINEL_CHALLENGE)),
        })
    }

    fn on_goldsource_info(&mut self, body: &[u8]) -> Result<Advance> {
        let info = parse_goldsource_info(body)?;
        self.protocol = Some(info.protocol);
        // The obsolete schema carries no application id; leave it unknown
        // so fragmentation falls back to the Source path per §4.3.
        let info = Info::GoldSource(info);
        self.endpoint.info = Some(info.clone());
        self.stage = Stage::AwaitChallengeP;
        Ok(Advance {
            event: StageEvent::Info(info),
            next_request: Some(build_request(RequestKind::Player, SENTINEL_CHALLENGE)),
        })
    }

    fn on_challenge_player(&mut self, body: &[u8]) -> Result<Advance> {
        let token = read_i32(body)?;
        self.challenge_player = Some(token);
        self.stage = Stage::AwaitPlayers;
        Ok(Advance {
            event: StageEvent::Challenge(token),
            next_request: Some(build_request(RequestKind::Player, token)),
        })
    }

    fn on_challenge_rules(&mut self, body: &[u8]) -> Result<Advance> {
        let token = read_i32(body)?;
        self.challenge_rules = Some(token);
        self.stage = Stage::AwaitRules;
        Ok(Advance {
            event: StageEvent::Challenge(token),
            next_request: Some(build_request(RequestKind::Rules, token)),
        })
    }

    fn on_players(&mut self, body: &[u8]) -> Result<Advance> {
        let is_ship = self.app_id == Some(SHIP_APP_ID);
        let players = parse_players(body, is_ship)?;
        self.endpoint.players = Some(players);
        self.stage = Stage::AwaitChallengeR;
        Ok(Advance {
            event: StageEvent::Players,
            next_request: Some(build_request(RequestKind::Rules, SENTINEL_CHALLENGE)),
        })
    }

    fn on_rules(&mut self, body: &[u8]) -> Result<Advance> {
        let rules = parse_rules(body)?;
        self.endpoint.rules = Some(rules);
        self.stage = Stage::AwaitPing;
        self.ping_sent_at = Some(Instant::now());
        Ok(Advance {
            event: StageEvent::Rules,
            next_request: Some(build_request(RequestKind::Ping, SENTINEL_CHALLENGE)),
        })
    }

    fn on_ping(&mut self, body: &[u8]) -> Result<Advance> {
        // The body carries no information this client uses (pingMs comes
        // from the send timestamp, per §4.4); some servers reply with an
        // empty body, so a parse failure here is not fatal to the stage.
        let _ = parse_ping(body);
        let ms = self
            .ping_sent_at
            .map(|sent| sent.elapsed().as_secs_f32() * 1000.0)
            .unwrap_or(0.0);
        self.endpoint.ping_ms = Some(ms);
        self.stage = Stage::Done;
        Ok(Advance {
            event: StageEvent::Ping(ms),
            next_request: None,
        })
    }
}

fn read_i32(body: &[u8]) -> Result<i32> {
    let mut c = crate::codec::Cursor::new(body);
    c.read_i32()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn fresh_session() -> Session {
        Session::new(Endpoint::new("h", Ipv4Addr::LOCALHOST, 27015))
    }

    fn minimal_info_body() -> Vec<u8> {
        let mut data = vec![0x49u8, 11];
        data.extend_from_slice(b"Test\0de_dust\0cstrike\0CS\0");
        data.extend_from_slice(&16i16.to_le_bytes());
        data.extend_from_slice(&[4, 16, 0, 0x64, 0x6C, 0, 1]);
        data.extend_from_slice(b"1.0\0");
        data.push(0);
        data
    }

    // S6 from spec §8: challenge handshake, single fire.
    #[test]
    fn full_handshake_sequence() {
        let mut s = fresh_session();

        let adv = s.accept_single(&minimal_info_body()).unwrap();
        assert!(matches!(adv.event, StageEvent::Info(_)));
        assert!(adv.next_request.is_some());

        let mut challenge = vec![0x41u8];
        challenge.extend_from_slice(&0x12345678i32.to_le_bytes());
        let adv = s.accept_single(&challenge).unwrap();
        match adv.event {
            StageEvent::Challenge(tok) => assert_eq!(tok, 0x12345678),
            _ => panic!("expected challenge event"),
        }

        let mut players = vec![0x44u8, 1];
        players.push(0);
        players.extend_from_slice(b"Alice\0");
        players.extend_from_slice(&10i32.to_le_bytes());
        players.extend_from_slice(&1.0f32.to_le_bytes());
        let adv = s.accept_single(&players).unwrap();
        assert!(matches!(adv.event, StageEvent::Players));

        let mut challenge2 = vec![0x41u8];
        challenge2.extend_from_slice(&0x87654321u32.to_le_bytes());
        let adv = s.accept_single(&challenge2).unwrap();
        assert!(matches!(adv.event, StageEvent::Challenge(_)));

        let mut rules = vec![0x45u8];
        rules.extend_from_slice(&0i16.to_le_bytes());
        let adv = s.accept_single(&rules).unwrap();
        assert!(matches!(adv.event, StageEvent::Rules));

        let mut ping = vec![0x6Au8];
        ping.extend_from_slice(b"00000000000000\0");
        let adv = s.accept_single(&ping).unwrap();
        assert!(matches!(adv.event, StageEvent::Ping(_)));
        assert!(adv.next_request.is_none());
        assert!(s.is_done());
        assert!(s.endpoint.is_complete());
    }

    #[test]
    fn out_of_order_response_is_rejected() {
        let mut s = fresh_session();
        let mut players = vec![0x44u8, 0];
        let _ = &mut players;
        let result = s.accept_single(&players);
        assert!(matches!(result, Err(Error::ProtocolOutOfOrder(0x44))));
    }

    // Real servers sometimes reply to A2A_PING with a bare type byte and no
    // body at all; that must not fail the stage.
    #[test]
    fn empty_ping_body_still_completes() {
        let mut s = fresh_session();
        s.accept_single(&minimal_info_body()).unwrap();

        let mut challenge = vec![0x41u8];
        challenge.extend_from_slice(&1i32.to_le_bytes());
        s.accept_single(&challenge).unwrap();

        let players = vec![0x44u8, 0];
        s.accept_single(&players).unwrap();

        let mut challenge2 = vec![0x41u8];
        challenge2.extend_from_slice(&2i32.to_le_bytes());
        s.accept_single(&challenge2).unwrap();

        let mut rules = vec![0x45u8];
        rules.extend_from_slice(&0i16.to_le_bytes());
        s.accept_single(&rules).unwrap();

        let ping = vec![0x6Au8];
        let adv = s.accept_single(&ping).unwrap();
        assert!(matches!(adv.event, StageEvent::Ping(_)));
        assert!(s.is_done());
    }

    #[test]
    fn unknown_response_type_is_rejected() {
        let mut s = fresh_session();
        let result = s.accept_single(&[0xFF]);
        assert!(matches!(result, Err(Error::UnexpectedResponseType(0xFF))));
    }
}
