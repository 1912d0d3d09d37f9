use serde::{Deserialize, Serialize};

/// Why an HTTP probe produced no response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeFailure {
    Timeout,
    Connect,
    Redirect,
    Body,
    Request,
}

/// Terminal observation for one probe target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeOutcome {
    /// Status below 400
    Live { status: u16, title: String },
    /// Answered, but with status 400 or above
    Reachable { status: u16, title: String },
    Failed { kind: ProbeFailure, message: String },
}

impl ProbeOutcome {
    pub fn is_live(&self) -> bool {
        matches!(self, ProbeOutcome::Live { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeOutcome::Live { status, .. } | ProbeOutcome::Reachable { status, .. } => {
                Some(*status)
            }
            ProbeOutcome::Failed { .. } => None,
        }
    }
}

/// A URL that answered with a sub-400 status
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LiveResult {
    pub url: String,
    pub status_code: u16,
    pub title: String,
}

impl LiveResult {
    /// Keeps only live outcomes
    pub fn from_outcome(url: &str, outcome: &ProbeOutcome) -> Option<Self> {
        match outcome {
            ProbeOutcome::Live { status, title } => Some(Self {
                url: url.to_string(),
                status_code: *status,
                title: title.clone(),
            }),
            _ => None,
        }
    }
}
