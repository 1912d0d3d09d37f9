use crate::console::Console;
use crate::error::Result;
use std::sync::Arc;
use subspider_scanner::{DnsOutcome, HostResolver, WorkerPool};
use tokio::sync::watch;
use tracing::{debug, info};

pub const DEFAULT_DNS_CONCURRENCY: usize = 200;

/// Called once per candidate as its lookup settles
pub type ResolutionCallback = Arc<dyn Fn(&str, DnsOutcome) + Send + Sync>;

#[derive(Debug, Clone, Default)]
pub struct ResolutionReport {
    /// Candidates handed to the stage
    pub submitted: usize,
    /// Hosts with at least one A record, in completion order
    pub resolved: Vec<String>,
    pub unresolved: usize,
}

impl ResolutionReport {
    /// Lookups that actually ran; lower than `submitted` only after a shutdown
    pub fn settled(&self) -> usize {
        self.resolved.len() + self.unresolved
    }
}

/// Resolves every candidate under a fixed concurrency ceiling
pub struct ResolutionStage {
    resolver: Arc<dyn HostResolver>,
    concurrency: usize,
    shutdown: Option<watch::Receiver<bool>>,
    callback: Option<ResolutionCallback>,
    console: Console,
}

impl ResolutionStage {
    pub fn new(resolver: Arc<dyn HostResolver>) -> Self {
        Self {
            resolver,
            concurrency: DEFAULT_DNS_CONCURRENCY,
            shutdown: None,
            callback: None,
            console: Console::silent(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn with_callback(mut self, callback: ResolutionCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub async fn run(&self, candidates: Vec<String>) -> Result<ResolutionReport> {
        let submitted = candidates.len();
        info!(
            "Resolving {} candidates with {} concurrent lookups",
            submitted, self.concurrency
        );

        let mut pool = WorkerPool::new(self.concurrency);
        if let Some(ref shutdown) = self.shutdown {
            pool = pool.with_shutdown(shutdown.clone());
        }

        let bar = self.console.stage_bar(submitted, "resolving").map(Arc::new);
        let resolver = self.resolver.clone();
        let callback = self.callback.clone();
        let bar_clone = bar.clone();

        let outcomes = pool
            .run(candidates, move |host: String| {
                let resolver = resolver.clone();
                let callback = callback.clone();
                let bar = bar_clone.clone();
                async move {
                    let outcome = resolver.resolve(&host).await;
                    debug!("{} -> {:?}", host, outcome);
                    if let Some(ref cb) = callback {
                        cb(&host, outcome);
                    }
                    if let Some(ref pb) = bar {
                        pb.inc(1);
                    }
                    (host, outcome)
                }
            })
            .await?;

        if let Some(ref pb) = bar {
            pb.finish_and_clear();
        }

        let mut report = ResolutionReport {
            submitted,
            ..Default::default()
        };
        for (host, outcome) in outcomes {
            if outcome.is_resolved() {
                report.resolved.push(host);
            } else {
                report.unresolved += 1;
            }
        }

        info!(
            "Resolution finished: {} resolved, {} unresolved",
            report.resolved.len(),
            report.unresolved
        );
        Ok(report)
    }
}
