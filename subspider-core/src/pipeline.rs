// Two-stage discovery: DNS resolution, then HTTP liveness

use crate::candidates::generate_candidates;
use crate::console::Console;
use crate::error::{PipelineError, Result};
use crate::liveness::{DEFAULT_HTTP_CONCURRENCY, LivenessStage};
use crate::resolve::{DEFAULT_DNS_CONCURRENCY, ResolutionStage};
use crate::sink::{DEFAULT_OUTPUT_FILE, ResultSink, SinkOutcome};
use crate::wordlist::{DEFAULT_WORDLIST_URL, WordlistSource};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use subspider_scanner::{
    DEFAULT_USER_AGENT, DnsProbe, HostResolver, HttpProbe, LiveResult, TargetProber, build_client,
};
use tokio::sync::watch;
use tracing::info;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// What a full run observed
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub domains: usize,
    pub fragments: usize,
    pub candidates: usize,
    pub resolved: Vec<String>,
    pub probed: usize,
    pub reachable: usize,
    pub failed: usize,
    pub live: Vec<LiveResult>,
    /// Set when a shutdown signal cut the run short
    pub interrupted: bool,
}

/// Candidate generation plus both probing stages, no I/O beyond the probes
pub struct Pipeline {
    resolver: Arc<dyn HostResolver>,
    prober: Arc<dyn TargetProber>,
    dns_concurrency: usize,
    http_concurrency: usize,
    shutdown: Option<watch::Receiver<bool>>,
    console: Console,
}

impl Pipeline {
    pub fn new(resolver: Arc<dyn HostResolver>, prober: Arc<dyn TargetProber>) -> Self {
        Self {
            resolver,
            prober,
            dns_concurrency: DEFAULT_DNS_CONCURRENCY,
            http_concurrency: DEFAULT_HTTP_CONCURRENCY,
            shutdown: None,
            console: Console::silent(),
        }
    }

    pub fn with_dns_concurrency(mut self, concurrency: usize) -> Self {
        self.dns_concurrency = concurrency;
        self
    }

    pub fn with_http_concurrency(mut self, concurrency: usize) -> Self {
        self.http_concurrency = concurrency;
        self
    }

    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    fn interrupted(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    pub async fn run(&self, domains: &[String], fragments: &[String]) -> Result<ScanSummary> {
        let started_at = Utc::now();
        let candidates = generate_candidates(domains, fragments);
        let candidate_count = candidates.len();

        self.console.info(&format!(
            "Checking DNS resolution of {} subdomains...",
            candidate_count
        ));

        let mut resolution = ResolutionStage::new(self.resolver.clone())
            .with_concurrency(self.dns_concurrency)
            .with_console(self.console);
        if let Some(ref shutdown) = self.shutdown {
            resolution = resolution.with_shutdown(shutdown.clone());
        }
        let resolved = resolution.run(candidates).await?;

        self.console.info(&format!(
            "{} subdomains resolved. Starting HTTP checks...",
            resolved.resolved.len()
        ));

        let mut liveness = LivenessStage::new(self.prober.clone())
            .with_concurrency(self.http_concurrency)
            .with_console(self.console);
        if let Some(ref shutdown) = self.shutdown {
            liveness = liveness.with_shutdown(shutdown.clone());
        }
        let probed = liveness.run_hosts(&resolved.resolved).await?;

        let summary = ScanSummary {
            started_at,
            finished_at: Utc::now(),
            domains: domains.len(),
            fragments: fragments.len(),
            candidates: candidate_count,
            probed: probed.settled(),
            reachable: probed.reachable,
            failed: probed.failed,
            live: probed.live,
            resolved: resolved.resolved,
            interrupted: self.interrupted(),
        };

        info!(
            "Scan finished: {} candidates, {} resolved, {} live",
            summary.candidates,
            summary.resolved.len(),
            summary.live.len()
        );
        Ok(summary)
    }
}

/// Options for a full scan from the command line
pub struct ScanOptions {
    pub domains: Vec<String>,
    pub wordlist: WordlistSource,
    pub output: PathBuf,
    pub json_report: Option<PathBuf>,
    pub dns_concurrency: usize,
    pub http_concurrency: usize,
    pub timeout: Duration,
    pub user_agent: String,
    /// Skip TLS certificate verification
    pub insecure: bool,
    /// Custom nameserver IPs, system configuration when empty
    pub nameservers: Vec<String>,
    pub console: Console,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            domains: Vec::new(),
            // Constant is a valid URL
            wordlist: WordlistSource::Remote(Url::parse(DEFAULT_WORDLIST_URL).unwrap()),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            json_report: None,
            dns_concurrency: DEFAULT_DNS_CONCURRENCY,
            http_concurrency: DEFAULT_HTTP_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            insecure: false,
            nameservers: Vec::new(),
            console: Console::default(),
        }
    }
}

#[derive(Debug)]
pub struct ScanOutcome {
    pub summary: ScanSummary,
    pub sink: SinkOutcome,
}

/// Fetch the wordlist, run both stages against real DNS and HTTP, persist
pub async fn execute_scan(
    options: ScanOptions,
    shutdown: Option<watch::Receiver<bool>>,
) -> Result<ScanOutcome> {
    let ScanOptions {
        domains,
        wordlist,
        output,
        json_report,
        dns_concurrency,
        http_concurrency,
        timeout,
        user_agent,
        insecure,
        nameservers,
        console,
    } = options;

    if domains.is_empty() {
        return Err(PipelineError::NoDomains);
    }

    let client = build_client(timeout, &user_agent, insecure)?;

    console.info(&format!("Fetching subdomain wordlist from {}...", wordlist));
    let fragments = wordlist.fetch(&client).await?;
    console.info(&format!(
        "Loaded {} fragments for {} base domains",
        fragments.len(),
        domains.len()
    ));

    let resolver: Arc<dyn HostResolver> = if nameservers.is_empty() {
        Arc::new(DnsProbe::new(timeout))
    } else {
        Arc::new(DnsProbe::with_nameservers(&nameservers, timeout)?)
    };
    let prober: Arc<dyn TargetProber> = Arc::new(HttpProbe::with_client(client));

    let mut pipeline = Pipeline::new(resolver, prober)
        .with_dns_concurrency(dns_concurrency)
        .with_http_concurrency(http_concurrency)
        .with_console(console);
    if let Some(shutdown) = shutdown {
        pipeline = pipeline.with_shutdown(shutdown);
    }

    let summary = pipeline.run(&domains, &fragments).await?;

    if summary.interrupted {
        console.warn("Scan interrupted, saving partial results");
    }

    let mut sink = ResultSink::new(output);
    if let Some(path) = json_report {
        sink = sink.with_json_report(path);
    }
    let sink_outcome = sink.persist_summary(&summary)?;
    report_sink_outcome(&console, &sink_outcome, "subdomains");

    Ok(ScanOutcome {
        summary,
        sink: sink_outcome,
    })
}

pub fn report_sink_outcome(console: &Console, outcome: &SinkOutcome, noun: &str) {
    match outcome {
        SinkOutcome::Written { path, count } => console.success(&format!(
            "Saved {} live {} to {}",
            count,
            noun,
            path.display()
        )),
        SinkOutcome::NothingToWrite => console.warn(&format!("No live {} found.", noun)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use subspider_scanner::{DnsFailure, DnsOutcome, ProbeOutcome};

    struct NoneResolve;

    #[async_trait]
    impl HostResolver for NoneResolve {
        async fn resolve(&self, _host: &str) -> DnsOutcome {
            DnsOutcome::NotResolved(DnsFailure::NoRecords)
        }
    }

    struct NeverProbe;

    #[async_trait]
    impl TargetProber for NeverProbe {
        async fn probe(&self, url: &str) -> ProbeOutcome {
            panic!("{} should never be probed", url);
        }
    }

    #[tokio::test]
    async fn test_nothing_resolved_means_nothing_probed() {
        let pipeline = Pipeline::new(Arc::new(NoneResolve), Arc::new(NeverProbe));
        let domains = vec!["example.com".to_string()];
        let fragments = vec!["www".to_string(), "api".to_string()];

        let summary = pipeline.run(&domains, &fragments).await.unwrap();

        assert_eq!(summary.candidates, 2);
        assert!(summary.resolved.is_empty());
        assert_eq!(summary.probed, 0);
        assert!(summary.live.is_empty());
        assert!(!summary.interrupted);
    }

    #[tokio::test]
    async fn test_execute_scan_requires_domains() {
        let result = execute_scan(ScanOptions::default(), None).await;
        assert!(matches!(result, Err(PipelineError::NoDomains)));
    }

    #[test]
    fn test_default_options() {
        let options = ScanOptions::default();
        assert_eq!(options.output, PathBuf::from("found.txt"));
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert!(matches!(options.wordlist, WordlistSource::Remote(_)));
        assert!((150..=300).contains(&options.dns_concurrency));
        assert!((150..=300).contains(&options.http_concurrency));
        assert!(!options.insecure);
    }
}
