// Persisting live results

use crate::error::{PipelineError, Result};
use crate::pipeline::ScanSummary;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use subspider_scanner::LiveResult;
use tracing::info;

pub const DEFAULT_OUTPUT_FILE: &str = "found.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    Written { path: PathBuf, count: usize },
    /// Nothing was live, no file was touched
    NothingToWrite,
}

/// Writes live URLs, one per line, sorted and without duplicates.
///
/// An empty result set never touches the filesystem, so the output of an
/// earlier run survives a run that found nothing.
pub struct ResultSink {
    output: PathBuf,
    json_report: Option<PathBuf>,
}

impl ResultSink {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            json_report: None,
        }
    }

    /// Also write a JSON summary of the run next to the URL list
    pub fn with_json_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.json_report = Some(path.into());
        self
    }

    pub fn persist(&self, live: &[LiveResult]) -> Result<SinkOutcome> {
        if live.is_empty() {
            return Ok(SinkOutcome::NothingToWrite);
        }

        let urls: BTreeSet<&str> = live.iter().map(|r| r.url.as_str()).collect();
        let mut content = String::new();
        for url in &urls {
            content.push_str(url);
            content.push('\n');
        }

        write_file(&self.output, &content)?;
        info!("Wrote {} URLs to {}", urls.len(), self.output.display());

        Ok(SinkOutcome::Written {
            path: self.output.clone(),
            count: urls.len(),
        })
    }

    /// Persist the summary's live set, plus the JSON report when configured
    pub fn persist_summary(&self, summary: &ScanSummary) -> Result<SinkOutcome> {
        let outcome = self.persist(&summary.live)?;

        if let (SinkOutcome::Written { .. }, Some(path)) = (&outcome, &self.json_report) {
            let json = serde_json::to_string_pretty(summary)?;
            write_file(path, &json)?;
            info!("Wrote JSON report to {}", path.display());
        }

        Ok(outcome)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| PipelineError::Write {
        path: path.display().to_string(),
        source,
    })
}
