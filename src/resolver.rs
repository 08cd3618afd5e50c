//! Resolver interface (§6): translates a hostname into IPv4 addresses
//! before query start. The default implementation defers to Tokio's async
//! DNS lookup; dispatcher tests substitute a fake that returns fixed
//! addresses without touching the network.

use std::net::Ipv4Addr;

use async_trait::async_trait;

use crate::error::{Error, Result};

#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve `host` to one or more IPv4 addresses. The caller uses the
    /// first entry.
    async fn resolve(&self, host: &str) -> Result<Vec<Ipv4Addr>>;
}

/// Default resolver, backed by the system resolver via
/// `tokio::net::lookup_host`.
#[derive(Default)]
pub struct TokioResolver;

#[async_trait]
impl Resolver for TokioResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<Ipv4Addr>> {
        let lookup_target = format!("{host}:0");
        let addrs = tokio::net::lookup_host(&lookup_target)
            .await
            .map_err(|source| Error::Resolve {
                host: host.to_string(),
                source,
            })?;

        let v4: Vec<Ipv4Addr> = addrs
            .filter_map(|addr| match addr.ip() {
                std::net::IpAddr::V4(v4) => Some(v4),
                std::net::IpAddr::V6(_) => None,
            })
            .collect();

        if v4.is_empty() {
            return Err(Error::Resolve {
                host: host.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no IPv4 addresses returned",
                ),
            });
        }

        Ok(v4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedResolver(Vec<Ipv4Addr>);

    #[async_trait]
    impl Resolver for FixedResolver {
        async fn resolve(&self, _host: &str) -> Result<Vec<Ipv4Addr>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn fixed_resolver_returns_fixed_addresses() {
        let r = FixedResolver(vec![Ipv4Addr::new(192, 0, 2, 1)]);
        let addrs = r.resolve("anything.invalid").await.unwrap();
        assert_eq!(addrs, vec![Ipv4Addr::new(192, 0, 2, 1)]);
    }

    #[tokio::test]
    async fn loopback_resolves_via_tokio() {
        let r = TokioResolver;
        let addrs = r.resolve("127.0.0.1").await.unwrap();
        assert_eq!(addrs, vec![Ipv4Addr::LOCALHOST]);
    }
}
