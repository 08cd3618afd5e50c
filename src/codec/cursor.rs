//! Cursored reader over a response datagram.
//!
//! Grounded in the teacher crate's `parser_util.rs` helpers (`c_string`,
//! `parse_bool`, the numeric `nom` combinators used throughout `info.rs` /
//! `player.rs` / `rules.rs`), generalized into one reusable typed cursor per
//! the spec's design note: avoid a single polymorphic `readInt` so truncation
//! is a distinct, typed failure at each call site rather than a runtime
//! surprise.

use nom::{
    bytes::complete::take_till,
    character::complete::char,
    number::complete::{le_f32, le_i16, le_i32, le_u64, le_u8},
    sequence::terminated,
};

use crate::error::{Error, Result};

/// A forward-only, typed reader over a response payload.
///
/// Every `read_*` method consumes exactly the bytes for its type and
/// advances the cursor; there is no backtracking, matching the wire formats
/// in §4 which define a fixed, non-reorderable field sequence.
pub struct Cursor<'a> {
    remaining: &'a [u8],
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Cursor { remaining: input }
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    /// Skip `n` bytes, failing with [`Error::Truncated`] if fewer remain.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        if self.remaining.len() < n {
            return Err(Error::Truncated);
        }
        self.remaining = &self.remaining[n..];
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let (rest, v) = le_u8::<_, nom::error::Error<&[u8]>>(self.remaining)
            .map_err(|_| Error::Truncated)?;
        self.remaining = rest;
        Ok(v)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let (rest, v) = le_i16::<_, nom::error::Error<&[u8]>>(self.remaining)
            .map_err(|_| Error::Truncated)?;
        self.remaining = rest;
        Ok(v)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let (rest, v) = le_i32::<_, nom::error::Error<&[u8]>>(self.remaining)
            .map_err(|_| Error::Truncated)?;
        self.remaining = rest;
        Ok(v)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let (rest, v) = le_u64::<_, nom::error::Error<&[u8]>>(self.remaining)
            .map_err(|_| Error::Truncated)?;
        self.remaining = rest;
        Ok(v)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let (rest, v) = le_f32::<_, nom::error::Error<&[u8]>>(self.remaining)
            .map_err(|_| Error::Truncated)?;
        self.remaining = rest;
        Ok(v)
    }

    /// One byte interpreted as an ASCII character.
    pub fn read_char(&mut self) -> Result<char> {
        self.read_u8().map(|b| b as char)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_u8().map(|b| b != 0)
    }

    /// Bytes up to and including the next `0x00`. Fails with
    /// [`Error::TruncatedString`] if the buffer ends before a terminator is
    /// found.
    pub fn read_string(&mut self) -> Result<String> {
        let result = terminated(take_till(|c: u8| c == 0x00), char(0x00 as char))(self.remaining)
            as nom::IResult<&[u8], &[u8]>;
        match result {
            Ok((rest, bytes)) => {
                self.remaining = rest;
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
            Err(_) => Err(Error::TruncatedString),
        }
    }

    /// Read a `0x00` byte, failing if the next byte isn't null.
    pub fn skip_null(&mut self) -> Result<()> {
        let b = self.read_u8()?;
        if b != 0 {
            return Err(Error::Truncated);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_order() {
        let data = [0x01, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
        let mut c = Cursor::new(&data);
        assert_eq!(c.read_u8().unwrap(), 0x01);
        assert_eq!(c.read_string().unwrap(), "");
        assert_eq!(c.read_i32().unwrap(), 3);
    }

    #[test]
    fn truncated_numeric() {
        let data = [0x01];
        let mut c = Cursor::new(&data);
        assert!(matches!(c.read_i32(), Err(Error::Truncated)));
    }

    #[test]
    fn truncated_string() {
        let data = [b'h', b'i'];
        let mut c = Cursor::new(&data);
        assert!(matches!(c.read_string(), Err(Error::TruncatedString)));
    }

    #[test]
    fn string_terminates_correctly() {
        let data = b"Test\0rest";
        let mut c = Cursor::new(data);
        assert_eq!(c.read_string().unwrap(), "Test");
        assert_eq!(c.remaining(), b"rest");
    }
}
