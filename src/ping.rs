//! A2A_PING response parsing (§4.4).
//!
//! Grounded in the teacher crate's `ping.rs`. The request itself is
//! deprecated per the wiki and most modern servers don't answer it, but the
//! wire shape is trivial enough to keep supporting: a single c-string body,
//! `"00000000000000"` from Source servers or empty from GoldSource.

use crate::codec::Cursor;
use crate::error::Result;

pub fn parse_ping(input: &[u8]) -> Result<String> {
    let mut c = Cursor::new(input);
    c.read_string()
}
