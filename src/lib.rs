/*!
An async client for the Source/GoldSource [`A2S`] game-server query
protocol: given a set of hostname+port endpoints, it drives the
info → challenge → players → challenge → rules → ping exchange for each
and reports the result through a typed event stream.

DNS resolution, the raw UDP transport, logging, and CLI/config loading
are external collaborators rather than owned concerns — see
[`resolver`], [`transport`], and [`config`].

[`A2S`]: https://developer.valvesoftware.com/wiki/Server_queries
*/

pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod event;
pub mod info;
pub mod ping;
pub mod player;
pub mod reassembly;
pub mod resolver;
pub mod rules;
pub mod session;
pub mod transport;

pub use config::QueryConfig;
pub use dispatcher::{run_query, QueryTarget};
pub use endpoint::Endpoint;
pub use error::{Error, Result};
pub use event::{Event, EndpointId};
