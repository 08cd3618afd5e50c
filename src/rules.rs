//! A2S_RULES response parsing (§3, §4.4).
//!
//! Grounded in the teacher crate's `rules.rs` (`RulesResponse`, `RuleData`),
//! with one divergence: the teacher hard-errors with a "non-empty" failure
//! if bytes remain once `num_rules` pairs have been read. Some engines
//! truncate the rule list into a single packet instead of splitting it, so
//! this parser stops after `num_rules` pairs (or when the buffer runs out,
//! whichever comes first) and treats anything left over as ordinary
//! leftover data rather than a parse failure.

use crate::codec::Cursor;
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleList {
    /// Rule count as declared by the server; may exceed `rules.len()` if the
    /// response was truncated.
    pub declared_count: i16,
    pub rules: Vec<Rule>,
}

pub fn parse_rules(input: &[u8]) -> Result<RuleList> {
    let mut c = Cursor::new(input);
    let declared_count = c.read_i16()?;
    let mut rules = Vec::with_capacity(declared_count.max(0) as usize);

    for _ in 0..declared_count.max(0) {
        if c.is_empty() {
            break;
        }
        let pair = (|| -> Result<Rule> {
            let name = c.read_string()?;
            let value = c.read_string()?;
            Ok(Rule { name, value })
        })();

        match pair {
            Ok(r) => rules.push(r),
            Err(_) => break,
        }
    }

    Ok(RuleList {
        declared_count,
        rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_rules() {
        let mut data = vec![];
        data.extend_from_slice(&2i16.to_le_bytes());
        data.extend_from_slice(b"mp_friendlyfire\0");
        data.extend_from_slice(b"0\0");
        data.extend_from_slice(b"sv_gravity\0");
        data.extend_from_slice(b"800\0");

        let rules = parse_rules(&data).unwrap();
        assert_eq!(rules.declared_count, 2);
        assert_eq!(rules.rules.len(), 2);
        assert_eq!(rules.rules[0].name, "mp_friendlyfire");
        assert_eq!(rules.rules[0].value, "0");
        assert_eq!(rules.rules[1].name, "sv_gravity");
        assert_eq!(rules.rules[1].value, "800");
    }

    // S5-adjacent: declared count exceeds what's actually present — this is
    // not a hard error, the parser simply stops.
    #[test]
    fn declared_count_exceeds_actual_data() {
        let mut data = vec![];
        data.extend_from_slice(&5i16.to_le_bytes());
        data.extend_from_slice(b"mp_timelimit\0");
        data.extend_from_slice(b"30\0");

        let rules = parse_rules(&data).unwrap();
        assert_eq!(rules.declared_count, 5);
        assert_eq!(rules.rules.len(), 1);
    }

    #[test]
    fn zero_rules() {
        let data = 0i16.to_le_bytes();
        let rules = parse_rules(&data).unwrap();
        assert!(rules.rules.is_empty());
    }

    // §4.4: a truncated trailing pair is tolerated, not a parse failure.
    #[test]
    fn truncated_mid_pair_is_tolerated() {
        let mut data = vec![];
        data.extend_from_slice(&2i16.to_le_bytes());
        data.extend_from_slice(b"mp_timelimit\0");
        data.extend_from_slice(b"30\0");
        data.extend_from_slice(b"sv_cheat"); // no terminator, no value

        let rules = parse_rules(&data).unwrap();
        assert_eq!(rules.rules.len(), 1);
        assert_eq!(rules.rules[0].name, "mp_timelimit");
    }
}
