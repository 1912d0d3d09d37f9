// Query parameter discovery on a single URL

use crate::console::Console;
use crate::error::{PipelineError, Result};
use crate::liveness::{DEFAULT_HTTP_CONCURRENCY, LivenessStage};
use crate::pipeline::{DEFAULT_TIMEOUT, report_sink_outcome};
use crate::sink::{ResultSink, SinkOutcome};
use crate::wordlist::WordlistSource;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use subspider_scanner::{DEFAULT_USER_AGENT, HttpProbe, LiveResult, TargetProber, build_client};
use tokio::sync::watch;
use url::Url;

pub const DEFAULT_PARAM_WORDLIST_URL: &str = "https://raw.githubusercontent.com/danielmiessler/SecLists/master/Discovery/Web-Content/burp-parameter-names.txt";
pub const DEFAULT_PARAM_OUTPUT_FILE: &str = "params.txt";

/// Value sent with every candidate parameter
const PARAM_PROBE_VALUE: &str = "1";

/// Append `name=1` to the URL's query, keeping existing pairs
pub fn build_param_url(base_url: &str, name: &str) -> Result<String> {
    let mut url = Url::parse(base_url).map_err(|e| PipelineError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    url.query_pairs_mut().append_pair(name, PARAM_PROBE_VALUE);
    Ok(url.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct ParamReport {
    pub probed: usize,
    pub accepted: Vec<LiveResult>,
}

/// Sends one request per candidate parameter through the liveness stage
pub struct ParamFinder {
    prober: Arc<dyn TargetProber>,
    concurrency: usize,
    shutdown: Option<watch::Receiver<bool>>,
    console: Console,
}

impl ParamFinder {
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

    pub async fn run(&self, base_url: &str, names: &[String]) -> Result<ParamReport> {
        let targets = names
            .iter()
            .map(|name| build_param_url(base_url, name))
            .collect::<Result<Vec<String>>>()?;

        let mut stage = LivenessStage::new(self.prober.clone())
            .with_concurrency(self.concurrency)
            .with_console(self.console);
        if let Some(ref shutdown) = self.shutdown {
            stage = stage.with_shutdown(shutdown.clone());
        }

        let report = stage.run(targets).await?;

        Ok(ParamReport {
            probed: report.settled(),
            accepted: report.live,
        })
    }
}

/// Options for the `params` subcommand
pub struct ParamOptions {
    pub url: Url,
    pub wordlist: WordlistSource,
    pub output: PathBuf,
    pub concurrency: usize,
    pub timeout: Duration,
    pub user_agent: String,
    /// Skip TLS certificate verification
    pub insecure: bool,
    pub console: Console,
}

impl ParamOptions {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            // Constant is a valid URL
            wordlist: WordlistSource::Remote(Url::parse(DEFAULT_PARAM_WORDLIST_URL).unwrap()),
            output: PathBuf::from(DEFAULT_PARAM_OUTPUT_FILE),
            concurrency: DEFAULT_HTTP_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            insecure: false,
            console: Console::default(),
        }
    }
}

pub async fn execute_param_scan(
    options: ParamOptions,
    shutdown: Option<watch::Receiver<bool>>,
) -> Result<(ParamReport, SinkOutcome)> {
    let ParamOptions {
        url,
        wordlist,
        output,
        concurrency,
        timeout,
        user_agent,
        insecure,
        console,
    } = options;

    let client = build_client(timeout, &user_agent, insecure)?;

    console.info(&format!("Fetching parameter wordlist from {}...", wordlist));
    let names = wordlist.fetch(&client).await?;
    console.info(&format!("Testing {} parameters on {}", names.len(), url));

    let prober = Arc::new(HttpProbe::with_client(client));
    let mut finder = ParamFinder::new(prober)
        .with_concurrency(concurrency)
        .with_console(console);
    if let Some(shutdown) = shutdown {
        finder = finder.with_shutdown(shutdown);
    }

    let report = finder.run(url.as_str(), &names).await?;
    let sink_outcome = ResultSink::new(output).persist(&report.accepted)?;
    report_sink_outcome(&console, &sink_outcome, "parameters");

    Ok((report, sink_outcome))
}
