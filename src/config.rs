//! Configuration (§6). Loading config from env vars, files, or CLI flags is
//! explicitly out of scope for the library (`spec.md` §1); the demo binary
//! under `demos/` shows one way to build this with `clap`.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryConfig {
    /// Overall deadline for a query run, covering every endpoint.
    pub timeout: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            timeout: Duration::from_millis(2000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_2000ms() {
        assert_eq!(QueryConfig::default().timeout, Duration::from_millis(2000));
    }
}
