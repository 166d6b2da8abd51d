//! Proposal feed.

use serde::Serialize;
use std::sync::Arc;

use crate::backend::BackendClient;
use crate::connectivity::{ConnectivityModeController, Mode};
use crate::domain::{Proposal, ProposalStatus};
use crate::feed::{FeedError, FeedResponse, FeedSource, MockDataset};
use crate::observability::metrics;

/// Result of approving or rejecting a proposal.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResult {
    pub id: String,
    pub status: ProposalStatus,
    pub source: FeedSource,
}

#[derive(Debug, Clone)]
pub struct ProposalFeed {
    controller: Arc<ConnectivityModeController>,
    client: BackendClient,
    mock: Arc<MockDataset>,
}

impl ProposalFeed {
    pub fn new(
        controller: Arc<ConnectivityModeController>,
        client: BackendClient,
        mock: Arc<MockDataset>,
    ) -> Self {
        Self {
            controller,
            client,
            mock,
        }
    }

    pub fn controller(&self) -> &Arc<ConnectivityModeController> {
        &self.controller
    }

    pub async fn list(&self) -> FeedResponse<Vec<Proposal>> {
        let mode = self.controller.mode();
        let (source, data) = match mode {
            Mode::Real => match self.client.list_proposals().await {
                Ok(proposals) => (FeedSource::Backend, proposals),
                Err(e) => {
                    tracing::warn!(
                        domain = %self.controller.domain(),
                        error = %e,
                        "Proposal fetch failed, serving mock data"
                    );
                    (FeedSource::Mock, self.mock.proposals())
                }
            },
            Mode::Mock => (FeedSource::Mock, self.mock.proposals()),
        };
        metrics::record_feed_request(self.controller.domain(), source.as_str());

        FeedResponse {
            domain: self.controller.domain().to_string(),
            mode,
            source,
            data,
        }
    }

    pub async fn approve(&self, id: &str) -> Result<ReviewResult, FeedError> {
        self.review(id, ProposalStatus::Approved).await
    }

    pub async fn reject(&self, id: &str) -> Result<ReviewResult, FeedError> {
        self.review(id, ProposalStatus::Rejected).await
    }

    async fn review(&self, id: &str, status: ProposalStatus) -> Result<ReviewResult, FeedError> {
        let source = match self.controller.mode() {
            Mode::Real => {
                match status {
                    ProposalStatus::Rejected => self.client.reject_proposal(id).await?,
                    _ => self.client.approve_proposal(id).await?,
                }
                FeedSource::Backend
            }
            Mode::Mock => {
                self.mock.review(id, status)?;
                FeedSource::Mock
            }
        };

        tracing::info!(
            domain = %self.controller.domain(),
            id = %id,
            status = %status,
            source = source.as_str(),
            "Proposal reviewed"
        );
        Ok(ReviewResult {
            id: id.to_string(),
            status,
            source,
        })
    }
}
