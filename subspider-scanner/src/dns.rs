// DNS probing: one A-record lookup per hostname

use crate::error::{Result, ScanError};
use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// Why a hostname did not resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsFailure {
    /// NXDOMAIN or an answer without A records
    NoRecords,
    Timeout,
    /// Anything else the resolver reported (SERVFAIL, malformed name, io)
    Resolver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsOutcome {
    Resolved,
    NotResolved(DnsFailure),
}

impl DnsOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, DnsOutcome::Resolved)
    }
}

/// Resolves a single hostname to a yes/no answer.
///
/// The stages only ever ask whether a host resolved, so implementations
/// must fold every failure into [`DnsOutcome::NotResolved`].
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, host: &str) -> DnsOutcome;
}

/// Production resolver backed by hickory
pub struct DnsProbe {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl DnsProbe {
    /// Uses the system resolver configuration (falls back to hickory's
    /// defaults when it cannot be read).
    pub fn new(timeout: Duration) -> Self {
        let (config, mut opts) = hickory_resolver::system_conf::read_system_conf()
            .unwrap_or_else(|_| (ResolverConfig::default(), ResolverOpts::default()));
        Self::tune(&mut opts, timeout);
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        }
    }

    /// Sends every query to the given nameservers on port 53
    pub fn with_nameservers(nameservers: &[String], timeout: Duration) -> Result<Self> {
        let ips = nameservers
            .iter()
            .map(|ns| {
                ns.trim()
                    .parse::<IpAddr>()
                    .map_err(|e| ScanError::InvalidResolver(format!("{}: {}", ns, e)))
            })
            .collect::<Result<Vec<IpAddr>>>()?;

        let group = NameServerConfigGroup::from_ips_clear(&ips, 53, true);
        let config = ResolverConfig::from_parts(None, vec![], group);
        let mut opts = ResolverOpts::default();
        Self::tune(&mut opts, timeout);

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        })
    }

    fn tune(opts: &mut ResolverOpts, timeout: Duration) {
        opts.timeout = timeout;
        // One attempt per candidate, a failed lookup is final
        opts.attempts = 1;
        opts.cache_size = 0;
    }
}

#[async_trait]
impl HostResolver for DnsProbe {
    async fn resolve(&self, host: &str) -> DnsOutcome {
        // Trailing dot keeps search domains out of the query
        let fqdn = format!("{}.", host.trim_end_matches('.'));

        let lookup = tokio::time::timeout(self.timeout, self.resolver.ipv4_lookup(fqdn)).await;

        match lookup {
            Err(_) => {
                debug!("DNS timeout for {}", host);
                DnsOutcome::NotResolved(DnsFailure::Timeout)
            }
            Ok(Ok(answer)) => {
                if answer.iter().next().is_some() {
                    DnsOutcome::Resolved
                } else {
                    DnsOutcome::NotResolved(DnsFailure::NoRecords)
                }
            }
            Ok(Err(e)) => {
                debug!("DNS lookup for {} failed: {}", host, e);
                let failure = match e.kind() {
                    ResolveErrorKind::NoRecordsFound { .. } => DnsFailure::NoRecords,
                    ResolveErrorKind::Timeout => DnsFailure::Timeout,
                    _ => DnsFailure::Resolver,
                };
                DnsOutcome::NotResolved(failure)
            }
        }
    }
}
