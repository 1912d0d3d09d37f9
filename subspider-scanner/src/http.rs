use crate::error::Result;
use crate::result::{ProbeFailure, ProbeOutcome};
use crate::title::{decode_body, extract_title};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = concat!("subspider/", env!("CARGO_PKG_VERSION"));

/// Issues one request against a target URL and classifies what came back
#[async_trait]
pub trait TargetProber: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// Build the client every probe (and the wordlist download) goes through.
///
/// Certificates are verified unless `accept_invalid_certs` is set, so a
/// TLS failure is a failed probe by default.
pub fn build_client(
    timeout: Duration,
    user_agent: &str,
    accept_invalid_certs: bool,
) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout)
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .redirect(reqwest::redirect::Policy::limited(10))
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()?;

    Ok(client)
}

pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self> {
        Self::with_options(Duration::from_secs(5), DEFAULT_USER_AGENT)
    }

    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        Ok(Self::with_client(build_client(timeout, user_agent, false)?))
    }

    /// Probe through an existing client, e.g. the one that fetched the wordlist
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &str) -> std::result::Result<ProbeOutcome, reqwest::Error> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response.bytes().await?;
        let body = decode_body(&bytes, content_type.as_deref());
        let title = extract_title(&body);

        if status < 400 {
            Ok(ProbeOutcome::Live { status, title })
        } else {
            Ok(ProbeOutcome::Reachable { status, title })
        }
    }
}

#[async_trait]
impl TargetProber for HttpProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        debug!("Probing {}", url);
        match self.fetch(url).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let kind = classify_error(&e);
                debug!("Probe of {} failed ({:?}): {}", url, kind, e);
                ProbeOutcome::Failed {
                    kind,
                    message: e.to_string(),
                }
            }
        }
    }
}

fn classify_error(e: &reqwest::Error) -> ProbeFailure {
    if e.is_timeout() {
        ProbeFailure::Timeout
    } else if e.is_connect() {
        ProbeFailure::Connect
    } else if e.is_redirect() {
        ProbeFailure::Redirect
    } else if e.is_body() || e.is_decode() {
        ProbeFailure::Body
    } else {
        ProbeFailure::Request
    }
}
