//! Event surface (§6): typed deliveries to the caller, replacing the
//! string-keyed event-emitter pattern called out in `spec.md` §9's design
//! notes with a plain enum the dispatcher sends down an mpsc channel.

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::info::Info;
use crate::player::PlayerList;
use crate::rules::RuleList;

/// Index of an endpoint within the slice originally supplied to the
/// dispatcher; stable for the lifetime of one query run.
pub type EndpointId = usize;

#[derive(Debug)]
pub enum Event {
    Info(EndpointId, Info),
    Player(EndpointId, PlayerList),
    Rules(EndpointId, RuleList),
    Ping(EndpointId, f32),
    /// Fires twice per endpoint: once for the A2S_PLAYER challenge, once
    /// for A2S_RULES.
    Challenge(EndpointId, i32),
    /// Non-fatal, per-datagram or per-endpoint error; does not halt other
    /// endpoints.
    Error(Error),
    /// Terminal event, fired exactly once. `timed_out` is true when the
    /// overall deadline fired before every endpoint finished; endpoints may
    /// then carry partially populated slots.
    Done {
        endpoints: Vec<Endpoint>,
        timed_out: bool,
    },
}
