// End-to-end pipeline scenarios against stub DNS and HTTP

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use subspider_core::pipeline::Pipeline;
use subspider_core::sink::{ResultSink, SinkOutcome};
use subspider_scanner::{DnsFailure, DnsOutcome, HostResolver, ProbeOutcome, TargetProber};
use tempfile::TempDir;
use tokio::sync::watch;

/// Resolves only the hosts it was built with
struct StubResolver {
    known: HashSet<String>,
    asked: Mutex<Vec<String>>,
}

impl StubResolver {
    fn new(known: &[&str]) -> Self {
        Self {
            known: known.iter().map(|s| s.to_string()).collect(),
            asked: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl HostResolver for StubResolver {
    async fn resolve(&self, host: &str) -> DnsOutcome {
        self.asked.lock().unwrap().push(host.to_string());
        if self.known.contains(host) {
            DnsOutcome::Resolved
        } else {
            DnsOutcome::NotResolved(DnsFailure::NoRecords)
        }
    }
}

/// Answers from a fixed status table, 500 for anything unlisted
struct StubProber {
    statuses: HashMap<String, u16>,
    probed: Mutex<Vec<String>>,
}

impl StubProber {
    fn new(statuses: &[(&str, u16)]) -> Self {
        Self {
            statuses: statuses
                .iter()
                .map(|(url, status)| (url.to_string(), *status))
                .collect(),
            probed: Mutex::new(Vec::new()),
        }
    }

    fn probed(&self) -> HashSet<String> {
        self.probed.lock().unwrap().iter().cloned().collect()
    }
}

#[async_trait]
impl TargetProber for StubProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        self.probed.lock().unwrap().push(url.to_string());
        let status = self.statuses.get(url).copied().unwrap_or(500);
        if status < 400 {
            ProbeOutcome::Live {
                status,
                title: "No Title".to_string(),
            }
        } else {
            ProbeOutcome::Reachable {
                status,
                title: "No Title".to_string(),
            }
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_only_resolved_hosts_are_probed() {
    let resolver = Arc::new(StubResolver::new(&["www.example.com"]));
    let prober = Arc::new(StubProber::new(&[]));

    let pipeline = Pipeline::new(resolver.clone(), prober.clone());
    let summary = pipeline
        .run(&strings(&["example.com"]), &strings(&["www", "api"]))
        .await
        .unwrap();

    let asked: HashSet<String> = resolver.asked.lock().unwrap().iter().cloned().collect();
    assert_eq!(
        asked,
        HashSet::from(["www.example.com".to_string(), "api.example.com".to_string()])
    );

    assert_eq!(
        prober.probed(),
        HashSet::from([
            "http://www.example.com".to_string(),
            "https://www.example.com".to_string(),
        ])
    );
    assert_eq!(prober.probed.lock().unwrap().len(), 2);
    assert_eq!(summary.resolved, vec!["www.example.com".to_string()]);
    assert_eq!(summary.probed, 2);
}

#[tokio::test]
async fn test_zero_resolved_hosts_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("found.txt");
    fs::write(&output, "https://from-last-run.example.com\n").unwrap();

    let prober = Arc::new(StubProber::new(&[]));
    let pipeline = Pipeline::new(Arc::new(StubResolver::new(&[])), prober.clone());
    let summary = pipeline
        .run(&strings(&["example.com"]), &strings(&["www", "api", "mail"]))
        .await
        .unwrap();

    assert!(summary.resolved.is_empty());
    assert!(prober.probed().is_empty());

    let outcome = ResultSink::new(&output).persist_summary(&summary).unwrap();
    assert_eq!(outcome, SinkOutcome::NothingToWrite);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "https://from-last-run.example.com\n"
    );
}

#[tokio::test]
async fn test_only_sub_400_urls_are_persisted() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("found.txt");

    let resolver = Arc::new(StubResolver::new(&["www.example.com", "api.example.com"]));
    let prober = Arc::new(StubProber::new(&[("https://api.example.com", 200)]));

    let pipeline = Pipeline::new(resolver, prober.clone())
        .with_dns_concurrency(4)
        .with_http_concurrency(4);
    let summary = pipeline
        .run(&strings(&["example.com"]), &strings(&["www", "api", "dev"]))
        .await
        .unwrap();

    assert_eq!(prober.probed().len(), 4);
    assert_eq!(summary.live.len(), 1);
    assert_eq!(summary.reachable, 3);

    let outcome = ResultSink::new(&output).persist_summary(&summary).unwrap();
    assert!(matches!(outcome, SinkOutcome::Written { count: 1, .. }));
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "https://api.example.com\n"
    );
}

#[tokio::test]
async fn test_json_report_written_alongside() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("found.txt");
    let report = temp_dir.path().join("report.json");

    let pipeline = Pipeline::new(
        Arc::new(StubResolver::new(&["www.example.com"])),
        Arc::new(StubProber::new(&[("http://www.example.com", 301)])),
    );
    let summary = pipeline
        .run(&strings(&["example.com"]), &strings(&["www"]))
        .await
        .unwrap();

    ResultSink::new(&output)
        .with_json_report(&report)
        .persist_summary(&summary)
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["candidates"], 1);
    assert_eq!(json["live"][0]["url"], "http://www.example.com");
    assert_eq!(json["live"][0]["status_code"], 301);
    assert_eq!(json["interrupted"], false);
}

#[tokio::test]
async fn test_outcomes_independent_of_concurrency() {
    let fragments: Vec<String> = (0..1500).map(|i| format!("n{}", i)).collect();
    let domains = strings(&["example.com", "example.org"]);

    // Every third candidate resolves, every resolved https variant is live
    let known: Vec<String> = domains
        .iter()
        .flat_map(|d| fragments.iter().step_by(3).map(move |f| format!("{}.{}", f, d)))
        .collect();
    let known_refs: Vec<&str> = known.iter().map(String::as_str).collect();
    let live_urls: Vec<(String, u16)> = known.iter().map(|h| (format!("https://{}", h), 200)).collect();
    let live_refs: Vec<(&str, u16)> = live_urls.iter().map(|(u, s)| (u.as_str(), *s)).collect();

    let mut runs = Vec::new();
    for concurrency in [1, 10, 300] {
        let pipeline = Pipeline::new(
            Arc::new(StubResolver::new(&known_refs)),
            Arc::new(StubProber::new(&live_refs)),
        )
        .with_dns_concurrency(concurrency)
        .with_http_concurrency(concurrency);

        let summary = pipeline.run(&domains, &fragments).await.unwrap();
        assert_eq!(summary.candidates, 3000);
        assert_eq!(summary.resolved.len(), known.len());
        assert_eq!(summary.probed, known.len() * 2);

        let live: HashSet<String> = summary.live.iter().map(|r| r.url.clone()).collect();
        assert_eq!(live.len(), summary.live.len());
        runs.push(live);
    }

    assert_eq!(runs[0].len(), known.len());
    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0], runs[2]);
}

/// Resolves everything and raises the shutdown flag on its `after`-th lookup
struct InterruptingResolver {
    shutdown: watch::Sender<bool>,
    after: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl HostResolver for InterruptingResolver {
    async fn resolve(&self, _host: &str) -> DnsOutcome {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.after {
            let _ = self.shutdown.send(true);
        }
        DnsOutcome::Resolved
    }
}

/// Every target is live; raises the shutdown flag on its `after`-th probe
struct InterruptingProber {
    shutdown: watch::Sender<bool>,
    after: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl TargetProber for InterruptingProber {
    async fn probe(&self, _url: &str) -> ProbeOutcome {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.after {
            let _ = self.shutdown.send(true);
        }
        ProbeOutcome::Live {
            status: 200,
            title: "No Title".to_string(),
        }
    }
}

#[tokio::test]
async fn test_shutdown_during_http_stage_keeps_partial_results() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("found.txt");
    let report = temp_dir.path().join("report.json");

    let (tx, rx) = watch::channel(false);
    let prober = Arc::new(InterruptingProber {
        shutdown: tx,
        after: 3,
        calls: AtomicUsize::new(0),
    });
    let resolver = Arc::new(StubResolver::new(&[
        "a.example.com",
        "b.example.com",
        "c.example.com",
        "d.example.com",
        "e.example.com",
    ]));

    let pipeline = Pipeline::new(resolver, prober.clone())
        .with_http_concurrency(1)
        .with_shutdown(rx);
    let summary = pipeline
        .run(&strings(&["example.com"]), &strings(&["a", "b", "c", "d", "e"]))
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.resolved.len(), 5);
    assert_eq!(prober.calls.load(Ordering::SeqCst), 3);
    assert_eq!(summary.probed, 3);
    assert_eq!(summary.live.len(), 3);

    let outcome = ResultSink::new(&output)
        .with_json_report(&report)
        .persist_summary(&summary)
        .unwrap();
    assert!(matches!(outcome, SinkOutcome::Written { count: 3, .. }));
    assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 3);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["interrupted"], true);
}

#[tokio::test]
async fn test_shutdown_during_dns_stage_skips_http() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("found.txt");

    let (tx, rx) = watch::channel(false);
    let resolver = Arc::new(InterruptingResolver {
        shutdown: tx,
        after: 2,
        calls: AtomicUsize::new(0),
    });
    let prober = Arc::new(StubProber::new(&[]));

    let pipeline = Pipeline::new(resolver.clone(), prober.clone())
        .with_dns_concurrency(1)
        .with_shutdown(rx);
    let summary = pipeline
        .run(&strings(&["example.com"]), &strings(&["a", "b", "c", "d", "e"]))
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    assert_eq!(summary.resolved.len(), 2);
    assert!(prober.probed().is_empty());

    let outcome = ResultSink::new(&output).persist_summary(&summary).unwrap();
    assert_eq!(outcome, SinkOutcome::NothingToWrite);
    assert!(!output.exists());
}
