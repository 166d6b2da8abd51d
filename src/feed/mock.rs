//! Local mock dataset served in mock mode.
//!
//! Generated once per process and mutated in memory, so proposals can be
//! reviewed offline. Learning statistics are derived from the proposals,
//! so reviewing a mock proposal moves the mock learning numbers.

use chrono::{Duration, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::{LearningStatus, Proposal, ProposalStatus};
use crate::feed::FeedError;

const AI_TYPES: [&str; 4] = ["Imperium", "Guardian", "Sandbox", "Conquest"];

const FILES: [&str; 3] = [
    "lib/providers/proposal_provider.dart",
    "lib/services/api_service.dart",
    "lib/screens/dashboard_screen.dart",
];

const STATUS_CYCLE: [ProposalStatus; 6] = [
    ProposalStatus::Pending,
    ProposalStatus::Approved,
    ProposalStatus::Pending,
    ProposalStatus::Rejected,
    ProposalStatus::TestPassed,
    ProposalStatus::TestFailed,
];

#[derive(Debug)]
pub struct MockDataset {
    proposals: Mutex<Vec<Proposal>>,
}

impl MockDataset {
    /// Build the default generated dataset.
    pub fn generate() -> Self {
        let now = Utc::now();
        let mut proposals = Vec::new();
        let mut n = 0usize;
        for ai_type in AI_TYPES {
            for (i, file) in FILES.iter().enumerate() {
                let status = STATUS_CYCLE[n % STATUS_CYCLE.len()];
                proposals.push(Proposal {
                    id: format!("mock-{}-{}", ai_type.to_ascii_lowercase(), i + 1),
                    ai_type: ai_type.to_string(),
                    file_path: file.to_string(),
                    code_before: "final timeout = Duration(seconds: 30);".to_string(),
                    code_after: "final timeout = Duration(seconds: 5);".to_string(),
                    description: Some(format!("{} suggests tightening a timeout in {}", ai_type, file)),
                    status,
                    confidence: 0.55 + 0.1 * ((n % 4) as f64),
                    created_at: Some(now - Duration::hours(n as i64)),
                });
                n += 1;
            }
        }
        Self::from_proposals(proposals)
    }

    pub fn from_proposals(proposals: Vec<Proposal>) -> Self {
        Self {
            proposals: Mutex::new(proposals),
        }
    }

    pub fn proposals(&self) -> Vec<Proposal> {
        self.lock().clone()
    }

    /// Move a pending proposal to `status`.
    pub fn review(&self, id: &str, status: ProposalStatus) -> Result<Proposal, FeedError> {
        let mut proposals = self.lock();
        let proposal = proposals
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| FeedError::NotFound(id.to_string()))?;
        if !proposal.status.is_reviewable() {
            return Err(FeedError::InvalidTransition {
                id: id.to_string(),
                status: proposal.status,
            });
        }
        proposal.status = status;
        Ok(proposal.clone())
    }

    /// Per-AI statistics derived from the current proposals.
    pub fn learning_status(&self) -> Vec<LearningStatus> {
        let proposals = self.lock();
        let mut ai_types: Vec<&str> = proposals.iter().map(|p| p.ai_type.as_str()).collect();
        ai_types.sort_unstable();
        ai_types.dedup();

        ai_types
            .into_iter()
            .map(|ai_type| {
                let mine: Vec<&Proposal> = proposals.iter().filter(|p| p.ai_type == ai_type).collect();
                let approved = mine
                    .iter()
                    .filter(|p| {
                        matches!(
                            p.status,
                            ProposalStatus::Approved | ProposalStatus::Applied | ProposalStatus::TestPassed
                        )
                    })
                    .count() as u64;
                let rejected = mine
                    .iter()
                    .filter(|p| matches!(p.status, ProposalStatus::Rejected | ProposalStatus::TestFailed))
                    .count() as u64;
                let success_rate = LearningStatus::approval_ratio(approved, rejected);
                LearningStatus {
                    ai_type: ai_type.to_string(),
                    learning_score: (50.0 + 50.0 * success_rate).round(),
                    success_rate,
                    total_proposals: mine.len() as u64,
                    approved,
                    rejected,
                    is_learning: mine.iter().any(|p| p.status == ProposalStatus::Pending),
                    last_learned_at: mine.iter().filter_map(|p| p.created_at).max(),
                }
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Proposal>> {
        self.proposals.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockDataset {
    fn default() -> Self {
        Self::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_dataset_covers_all_ai_types() {
        let dataset = MockDataset::generate();
        let proposals = dataset.proposals();
        assert_eq!(proposals.len(), AI_TYPES.len() * FILES.len());
        for ai_type in AI_TYPES {
            assert!(proposals.iter().any(|p| p.ai_type == ai_type));
        }
        assert!(proposals.iter().any(|p| p.status == ProposalStatus::Pending));
        assert_eq!(dataset.learning_status().len(), AI_TYPES.len());
    }

    #[test]
    fn test_review_pending_only() {
        let dataset = MockDataset::generate();
        let pending = dataset
            .proposals()
            .into_iter()
            .find(|p| p.status == ProposalStatus::Pending)
            .unwrap();

        let reviewed = dataset.review(&pending.id, ProposalStatus::Approved).unwrap();
        assert_eq!(reviewed.status, ProposalStatus::Approved);

        let again = dataset.review(&pending.id, ProposalStatus::Rejected);
        assert!(matches!(again, Err(FeedError::InvalidTransition { .. })));

        assert!(matches!(
            dataset.review("missing", ProposalStatus::Approved),
            Err(FeedError::NotFound(_))
        ));
    }

    #[test]
    fn test_learning_follows_reviews() {
        let dataset = MockDataset::generate();
        let before: u64 = dataset.learning_status().iter().map(|s| s.approved).sum();
        let pending = dataset
            .proposals()
            .into_iter()
            .find(|p| p.status == ProposalStatus::Pending)
            .unwrap();
        dataset.review(&pending.id, ProposalStatus::Approved).unwrap();
        let after: u64 = dataset.learning_status().iter().map(|s| s.approved).sum();
        assert_eq!(after, before + 1);
    }
}
