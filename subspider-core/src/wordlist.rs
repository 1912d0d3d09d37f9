// Wordlist acquisition, remote or local

use crate::error::{PipelineError, Result};
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

pub const DEFAULT_WORDLIST_URL: &str = "https://raw.githubusercontent.com/danielmiessler/SecLists/master/Discovery/DNS/subdomains-top1million-5000.txt";

/// Where subdomain fragments (or parameter names) come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordlistSource {
    Remote(Url),
    File(PathBuf),
}

impl WordlistSource {
    pub async fn fetch(&self, client: &Client) -> Result<Vec<String>> {
        match self {
            WordlistSource::Remote(url) => download_wordlist(client, url).await,
            WordlistSource::File(path) => load_wordlist(path),
        }
    }
}

impl fmt::Display for WordlistSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordlistSource::Remote(url) => write!(f, "{}", url),
            WordlistSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// GET a newline-delimited wordlist. Anything but a 200 is an error.
pub async fn download_wordlist(client: &Client, url: &Url) -> Result<Vec<String>> {
    let fetch_error = |reason: String| PipelineError::WordlistFetch {
        url: url.to_string(),
        reason,
    };

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| fetch_error(e.to_string()))?;

    if response.status() != StatusCode::OK {
        return Err(fetch_error(format!("status {}", response.status().as_u16())));
    }

    let body = response
        .text()
        .await
        .map_err(|e| fetch_error(e.to_string()))?;

    let words = parse_wordlist(&body);
    if words.is_empty() {
        return Err(PipelineError::EmptyWordlist(url.to_string()));
    }

    info!("Downloaded {} words from {}", words.len(), url);
    Ok(words)
}

/// Load wordlist from file
pub fn load_wordlist(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|source| PipelineError::WordlistRead {
        path: path.display().to_string(),
        source,
    })?;

    let words = parse_wordlist(&content);
    if words.is_empty() {
        return Err(PipelineError::EmptyWordlist(path.display().to_string()));
    }

    Ok(words)
}

/// Trimmed, non-empty, non-comment lines with duplicates dropped
pub fn parse_wordlist(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(*line))
        .map(String::from)
        .collect()
}
