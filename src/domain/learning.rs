//! Per-AI learning statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningStatus {
    pub ai_type: String,
    /// Aggregate learning score, 0-100.
    pub learning_score: f64,
    /// Share of reviewed proposals that were approved, 0-1.
    pub success_rate: f64,
    pub total_proposals: u64,
    pub approved: u64,
    pub rejected: u64,
    pub is_learning: bool,
    pub last_learned_at: Option<DateTime<Utc>>,
}

impl LearningStatus {
    /// Approved over reviewed; 0 when nothing was reviewed yet.
    pub fn approval_ratio(approved: u64, rejected: u64) -> f64 {
        let reviewed = approved + rejected;
        if reviewed == 0 {
            0.0
        } else {
            approved as f64 / reviewed as f64
        }
    }
}
