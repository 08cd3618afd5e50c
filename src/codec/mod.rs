//! Wire-format building blocks: request builders, the typed response
//! cursor, and framing/fragment-header parsing.

pub mod cursor;
pub mod packet;
pub mod requests;

pub use cursor::Cursor;
pub use requests::{
    build_request, build_request_for_type_byte, RequestKind, SENTINEL_CHALLENGE,
};
