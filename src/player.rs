//! A2S_PLAYER response parsing (§3, §4.4).
//!
//! Grounded in the teacher crate's `player.rs` (`ResponsePlayer`,
//! `PlayerData`, `TheShipData`), with one deliberate divergence: the teacher
//! places all Ship `deaths`/`money` pairs in a trailing block after every
//! ordinary player record, matching what it observed on the wire. The
//! interleaved layout below — each player's `deaths`/`money` immediately
//! following its `duration` — is what this client's target servers send, and
//! is what every player-indexed accessor here assumes.

use crate::codec::Cursor;
use crate::error::Result;

#[derive(Clone, Debug, PartialEq)]
pub struct ShipPlayerFields {
    pub deaths: i32,
    pub money: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerRecord {
    pub index: u8,
    pub name: String,
    pub score: i32,
    pub duration: f32,
    pub ship: Option<ShipPlayerFields>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerList {
    pub players: Vec<PlayerRecord>,
}

/// Parse a player-response body. `is_ship` selects the interleaved
/// `deaths`/`money` trailer per record (set when the endpoint's info
/// response carried `app_id == 2400`).
///
/// Per §4.4, parsing stops when either the declared count is exhausted or
/// the buffer runs out, whichever comes first; a buffer underrun mid-record
/// is tolerated rather than treated as a parse failure, since servers in the
/// wild sometimes under-report their player count.
pub fn parse_players(input: &[u8], is_ship: bool) -> Result<PlayerList> {
    let mut c = Cursor::new(input);
    let count = c.read_u8()?;
    let mut players = Vec::with_capacity(count as usize);

    for _ in 0..count {
        if c.is_empty() {
            break;
        }
        let record = (|| -> Result<PlayerRecord> {
            let index = c.read_u8()?;
            let name = c.read_string()?;
            let score = c.read_i32()?;
            let duration = c.read_f32()?;
            let ship = if is_ship {
                let deaths = c.read_i32()?;
                let money = c.read_i32()?;
                Some(ShipPlayerFields { deaths, money })
            } else {
                None
            };
            Ok(PlayerRecord {
                index,
                name,
                score,
                duration,
                ship,
            })
        })();

        match record {
            Ok(p) => players.push(p),
            Err(_) => break,
        }
    }

    Ok(PlayerList { players })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_players() {
        let mut data = vec![2u8];
        data.push(0);
        data.extend_from_slice(b"Alice\0");
        data.extend_from_slice(&10i32.to_le_bytes());
        data.extend_from_slice(&123.4f32.to_le_bytes());
        data.push(1);
        data.extend_from_slice(b"Bob\0");
        data.extend_from_slice(&(-5i32).to_le_bytes());
        data.extend_from_slice(&45.0f32.to_le_bytes());

        let list = parse_players(&data, false).unwrap();
        assert_eq!(list.players.len(), 2);
        assert_eq!(list.players[0].name, "Alice");
        assert_eq!(list.players[0].score, 10);
        assert_eq!(list.players[1].name, "Bob");
        assert_eq!(list.players[1].score, -5);
        assert!(list.players[0].ship.is_none());
    }

    // S3 from spec §8: Ship player fields interleaved per record.
    #[test]
    fn ship_players_interleaved() {
        let mut data = vec![1u8];
        data.push(0);
        data.extend_from_slice(b"Captain\0");
        data.extend_from_slice(&3i32.to_le_bytes());
        data.extend_from_slice(&60.0f32.to_le_bytes());
        data.extend_from_slice(&2i32.to_le_bytes()); // deaths
        data.extend_from_slice(&500i32.to_le_bytes()); // money

        let list = parse_players(&data, true).unwrap();
        assert_eq!(list.players.len(), 1);
        let ship = list.players[0].ship.as_ref().unwrap();
        assert_eq!(ship.deaths, 2);
        assert_eq!(ship.money, 500);
    }

    #[test]
    fn zero_players() {
        let data = [0u8];
        let list = parse_players(&data, false).unwrap();
        assert!(list.players.is_empty());
    }

    // §4.4: a truncated trailing record is tolerated, not a parse failure.
    #[test]
    fn truncated_mid_record_is_tolerated() {
        let mut data = vec![1u8];
        data.push(0);
        data.extend_from_slice(b"Trunc");
        let list = parse_players(&data, false).unwrap();
        assert!(list.players.is_empty());
    }
}
