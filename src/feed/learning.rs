//! AI learning status feed.

use std::sync::Arc;

use crate::backend::BackendClient;
use crate::connectivity::{ConnectivityModeController, Mode};
use crate::domain::LearningStatus;
use crate::feed::{FeedResponse, FeedSource, MockDataset};
use crate::observability::metrics;

#[derive(Debug, Clone)]
pub struct LearningFeed {
    controller: Arc<ConnectivityModeController>,
    client: BackendClient,
    mock: Arc<MockDataset>,
}

impl LearningFeed {
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

    pub async fn status(&self) -> FeedResponse<Vec<LearningStatus>> {
        let mode = self.controller.mode();
        let (source, data) = match mode {
            Mode::Real => match self.client.learning_status().await {
                Ok(statuses) => (FeedSource::Backend, statuses),
                Err(e) => {
                    tracing::warn!(
                        domain = %self.controller.domain(),
                        error = %e,
                        "Learning status fetch failed, serving mock data"
                    );
                    (FeedSource::Mock, self.mock.learning_status())
                }
            },
            Mode::Mock => (FeedSource::Mock, self.mock.learning_status()),
        };
        metrics::record_feed_request(self.controller.domain(), source.as_str());

        FeedResponse {
            domain: self.controller.domain().to_string(),
            mode,
            source,
            data,
        }
    }
}
