//! AI-generated code change proposals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::wire::WireError;

/// Review status of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProposalStatus {
    Pending,
    Approved,
    Rejected,
    Applied,
    TestPassed,
    TestFailed,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Applied => "applied",
            ProposalStatus::TestPassed => "test-passed",
            ProposalStatus::TestFailed => "test-failed",
        }
    }

    /// Only pending proposals can be approved or rejected.
    pub fn is_reviewable(&self) -> bool {
        matches!(self, ProposalStatus::Pending)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = WireError;

    /// Accepts the canonical names plus the spellings older backends emit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pending" => Ok(ProposalStatus::Pending),
            "approved" | "accepted" => Ok(ProposalStatus::Approved),
            "rejected" => Ok(ProposalStatus::Rejected),
            "applied" => Ok(ProposalStatus::Applied),
            "test-passed" => Ok(ProposalStatus::TestPassed),
            "test-failed" => Ok(ProposalStatus::TestFailed),
            _ => Err(WireError::UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub ai_type: String,
    pub file_path: String,
    pub code_before: String,
    pub code_after: String,
    pub description: Option<String>,
    pub status: ProposalStatus,
    /// Model confidence in [0, 1].
    pub confidence: f64,
    pub created_at: Option<DateTime<Utc>>,
}
