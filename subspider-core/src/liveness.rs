use crate::console::Console;
use crate::error::Result;
use std::sync::Arc;
use subspider_scanner::{LiveResult, ProbeOutcome, TargetProber, WorkerPool};
use tokio::sync::watch;
use tracing::info;

pub const DEFAULT_HTTP_CONCURRENCY: usize = 200;

/// Both scheme variants for every host, http first
pub fn expand_targets(hosts: &[String]) -> Vec<String> {
    hosts
        .iter()
        .flat_map(|host| [format!("http://{}", host), format!("https://{}", host)])
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct LivenessReport {
    pub submitted: usize,
    pub live: Vec<LiveResult>,
    /// Answered with status >= 400
    pub reachable: usize,
    pub failed: usize,
}

impl LivenessReport {
    pub fn settled(&self) -> usize {
        self.live.len() + self.reachable + self.failed
    }
}

/// Probes a set of URLs under a fixed concurrency ceiling and keeps the live ones
pub struct LivenessStage {
    prober: Arc<dyn TargetProber>,
    concurrency: usize,
    shutdown: Option<watch::Receiver<bool>>,
    console: Console,
}

impl LivenessStage {
    pub fn new(prober: Arc<dyn TargetProber>) -> Self {
        Self {
            prober,
            concurrency: DEFAULT_HTTP_CONCURRENCY,
            shutdown: None,
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

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Expand resolved hosts into http/https targets and probe all of them
    pub async fn run_hosts(&self, hosts: &[String]) -> Result<LivenessReport> {
        self.run(expand_targets(hosts)).await
    }

    pub async fn run(&self, targets: Vec<String>) -> Result<LivenessReport> {
        let submitted = targets.len();
        info!(
            "Probing {} targets with {} concurrent requests",
            submitted, self.concurrency
        );

        let mut pool = WorkerPool::new(self.concurrency);
        if let Some(ref shutdown) = self.shutdown {
            pool = pool.with_shutdown(shutdown.clone());
        }

        let bar = self.console.stage_bar(submitted, "probing").map(Arc::new);
        let prober = self.prober.clone();
        let console = self.console;
        let bar_clone = bar.clone();

        let outcomes = pool
            .run(targets, move |url: String| {
                let prober = prober.clone();
                let bar = bar_clone.clone();
                async move {
                    let outcome = prober.probe(&url).await;
                    console.probe(bar.as_deref(), &url, &outcome);
                    if let Some(ref pb) = bar {
                        pb.inc(1);
                    }
                    (url, outcome)
                }
            })
            .await?;

        if let Some(ref pb) = bar {
            pb.finish_and_clear();
        }

        let mut report = LivenessReport {
            submitted,
            ..Default::default()
        };
        for (url, outcome) in outcomes {
            match LiveResult::from_outcome(&url, &outcome) {
                Some(live) => report.live.push(live),
                None if matches!(outcome, ProbeOutcome::Reachable { .. }) => report.reachable += 1,
                None => report.failed += 1,
            }
        }

        info!(
            "Probing finished: {} live, {} reachable, {} failed",
            report.live.len(),
            report.reachable,
            report.failed
        );
        Ok(report)
    }
}
