//! Input adapter for backend JSON payloads.
//!
//! # Responsibilities
//! - Accept the alternate key spellings backends have used
//!   (`_id`, `aiType`, `filePath`, ...)
//! - Accept bare arrays as well as wrapped list envelopes
//! - Convert into the canonical domain model or report why not
//!
//! # Design Decisions
//! - Entries that fail conversion are dropped with a warning instead of
//!   failing the whole list

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::learning::LearningStatus;
use crate::domain::proposal::{Proposal, ProposalStatus};

/// A payload entry that cannot become a domain value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("unknown proposal status '{0}'")]
    UnknownStatus(String),

    #[error("malformed entry: {0}")]
    Malformed(String),
}

/// Identifiers arrive as strings (UUID, ObjectId) or integers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

/// Both spellings of a key may be present; the snake_case one wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProposalWire {
    pub id: Option<WireId>,
    #[serde(rename = "_id")]
    pub legacy_id: Option<WireId>,
    pub ai_type: Option<String>,
    #[serde(rename = "aiType")]
    pub ai_type_camel: Option<String>,
    pub file_path: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path_camel: Option<String>,
    pub code_before: Option<String>,
    #[serde(rename = "codeBefore")]
    pub code_before_camel: Option<String>,
    pub code_after: Option<String>,
    #[serde(rename = "codeAfter")]
    pub code_after_camel: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub confidence: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at_camel: Option<DateTime<Utc>>,
}

impl TryFrom<ProposalWire> for Proposal {
    type Error = WireError;

    fn try_from(wire: ProposalWire) -> Result<Self, Self::Error> {
        let id = wire
            .id
            .map(WireId::into_string)
            .filter(|id| !id.is_empty())
            .or_else(|| wire.legacy_id.map(WireId::into_string))
            .filter(|id| !id.is_empty())
            .ok_or(WireError::MissingField("id"))?;
        let ai_type = wire
            .ai_type
            .or(wire.ai_type_camel)
            .ok_or(WireError::MissingField("ai_type"))?;
        let status = match wire.status {
            Some(raw) => raw.parse()?,
            None => ProposalStatus::Pending,
        };

        Ok(Proposal {
            id,
            ai_type,
            file_path: wire.file_path.or(wire.file_path_camel).unwrap_or_default(),
            code_before: wire.code_before.or(wire.code_before_camel).unwrap_or_default(),
            code_after: wire.code_after.or(wire.code_after_camel).unwrap_or_default(),
            description: wire.description,
            status,
            confidence: wire.confidence.unwrap_or(0.5).clamp(0.0, 1.0),
            created_at: wire.created_at.or(wire.created_at_camel),
        })
    }
}

/// `[...]`, `{"proposals": [...]}` or `{"data": [...]}`.
///
/// Entries stay raw JSON here so one bad entry cannot reject the list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProposalEnvelope {
    Bare(Vec<Value>),
    Wrapped { proposals: Vec<Value> },
    Data { data: Vec<Value> },
}

impl ProposalEnvelope {
    pub fn into_proposals(self) -> Vec<Proposal> {
        let entries = match self {
            ProposalEnvelope::Bare(entries) => entries,
            ProposalEnvelope::Wrapped { proposals } => proposals,
            ProposalEnvelope::Data { data } => data,
        };
        entries
            .into_iter()
            .filter_map(|raw| keep_valid(decode::<ProposalWire, Proposal, _>(raw, |_| {}), "proposal"))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LearningStatusWire {
    pub ai_type: Option<String>,
    #[serde(rename = "aiType")]
    pub ai_type_camel: Option<String>,
    pub learning_score: Option<f64>,
    #[serde(rename = "learningScore")]
    pub learning_score_camel: Option<f64>,
    pub success_rate: Option<f64>,
    #[serde(rename = "successRate")]
    pub success_rate_camel: Option<f64>,
    pub total_proposals: Option<u64>,
    #[serde(rename = "totalProposals")]
    pub total_proposals_camel: Option<u64>,
    pub approved: Option<u64>,
    #[serde(rename = "approvedProposals")]
    pub approved_camel: Option<u64>,
    pub rejected: Option<u64>,
    #[serde(rename = "rejectedProposals")]
    pub rejected_camel: Option<u64>,
    pub is_learning: Option<bool>,
    #[serde(rename = "isLearning")]
    pub is_learning_camel: Option<bool>,
    pub last_learned_at: Option<DateTime<Utc>>,
    #[serde(rename = "lastLearned")]
    pub last_learned: Option<DateTime<Utc>>,
    #[serde(rename = "lastLearnedAt")]
    pub last_learned_at_camel: Option<DateTime<Utc>>,
}

impl TryFrom<LearningStatusWire> for LearningStatus {
    type Error = WireError;

    fn try_from(wire: LearningStatusWire) -> Result<Self, Self::Error> {
        let ai_type = wire
            .ai_type
            .or(wire.ai_type_camel)
            .ok_or(WireError::MissingField("ai_type"))?;
        let approved = wire.approved.or(wire.approved_camel).unwrap_or(0);
        let rejected = wire.rejected.or(wire.rejected_camel).unwrap_or(0);
        Ok(LearningStatus {
            ai_type,
            learning_score: wire.learning_score.or(wire.learning_score_camel).unwrap_or(0.0),
            success_rate: wire
                .success_rate
                .or(wire.success_rate_camel)
                .unwrap_or_else(|| LearningStatus::approval_ratio(approved, rejected)),
            total_proposals: wire
                .total_proposals
                .or(wire.total_proposals_camel)
                .unwrap_or(approved + rejected),
            approved,
            rejected,
            is_learning: wire.is_learning.or(wire.is_learning_camel).unwrap_or(false),
            last_learned_at: wire
                .last_learned_at
                .or(wire.last_learned_at_camel)
                .or(wire.last_learned),
        })
    }
}

/// `[...]`, `{"data": [...]}`, `{"learning": [...]}` or a map keyed by AI type.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LearningEnvelope {
    Bare(Vec<Value>),
    Data { data: Vec<Value> },
    Wrapped { learning: Vec<Value> },
    Keyed(BTreeMap<String, Value>),
}

impl LearningEnvelope {
    pub fn into_statuses(self) -> Vec<LearningStatus> {
        let decode_entry = |raw: Value, key: Option<String>| {
            let fill_key = |wire: &mut LearningStatusWire| {
                if wire.ai_type.is_none() && wire.ai_type_camel.is_none() {
                    wire.ai_type = key.clone();
                }
            };
            keep_valid(
                decode::<LearningStatusWire, LearningStatus, _>(raw, fill_key),
                "learning status",
            )
        };

        match self {
            LearningEnvelope::Bare(entries)
            | LearningEnvelope::Data { data: entries }
            | LearningEnvelope::Wrapped { learning: entries } => entries
                .into_iter()
                .filter_map(|raw| decode_entry(raw, None))
                .collect(),
            LearningEnvelope::Keyed(map) => map
                .into_iter()
                .filter_map(|(ai_type, raw)| decode_entry(raw, Some(ai_type)))
                .collect(),
        }
    }
}

fn decode<W, T, F>(raw: Value, adjust: F) -> Result<T, WireError>
where
    W: DeserializeOwned,
    T: TryFrom<W, Error = WireError>,
    F: FnOnce(&mut W),
{
    let mut wire: W =
        serde_json::from_value(raw).map_err(|e| WireError::Malformed(e.to_string()))?;
    adjust(&mut wire);
    T::try_from(wire)
}

fn keep_valid<T>(result: Result<T, WireError>, what: &'static str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "Dropping malformed {} entry", what);
            None
        }
    }
}
