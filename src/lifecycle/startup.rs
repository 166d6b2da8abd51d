//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated config into controllers, feeds and background tasks
//! - Pick the backend URL from the configured candidates
//! - Start pollers and the policy reloader
//!
//! # Design Decisions
//! - Fail fast on configuration errors; an unreachable backend is not an
//!   error (controllers start optimistic and fall back on their own)
//! - One HTTP client (connection pool) shared by probes and feeds

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::{select_backend_url, BackendClient, BackendError};
use crate::config::watcher::apply_policy_updates;
use crate::config::LinkConfig;
use crate::connectivity::{
    ConnectivityError, ConnectivityModeController, ControllerRegistry, HttpHealthProbe, ModePoller,
    ModePolicy,
};
use crate::feed::{LearningFeed, MockDataset, ProposalFeed, LEARNING_DOMAIN, PROPOSALS_DOMAIN};
use crate::lifecycle::Shutdown;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Everything the service runs on, built from one config.
#[derive(Debug, Clone)]
pub struct LinkServices {
    pub config: LinkConfig,
    pub backend_url: String,
    pub registry: ControllerRegistry,
    pub mock: Arc<MockDataset>,
    pub proposals: Option<ProposalFeed>,
    pub learning: Option<LearningFeed>,
}

/// Build controllers and feeds. Probes candidate URLs, so this suspends for
/// up to one health timeout per unreachable candidate.
pub async fn build_services(config: LinkConfig) -> Result<LinkServices, StartupError> {
    let policy = ModePolicy::from_config(&config.connectivity)?;
    let health_timeout = Duration::from_millis(config.backend.health_timeout_ms);

    let backend_url = select_backend_url(
        &config.backend.base_url,
        &config.backend.candidates,
        &config.backend.health_path,
        health_timeout,
    )
    .await;

    let http = reqwest::Client::builder()
        .build()
        .map_err(|e| StartupError::Client(e.to_string()))?;

    let registry = ControllerRegistry::new();
    for domain in &config.connectivity.domains {
        let probe = HttpHealthProbe::with_client(
            http.clone(),
            &backend_url,
            &config.backend.health_path,
            health_timeout,
        )?;
        registry.insert(Arc::new(ConnectivityModeController::new(
            domain.clone(),
            Arc::new(probe),
            policy,
        )));
    }

    let client = BackendClient::with_client(
        http,
        &backend_url,
        Duration::from_millis(config.backend.request_timeout_ms),
    )?;
    let mock = Arc::new(MockDataset::generate());

    let proposals = registry
        .get(PROPOSALS_DOMAIN)
        .map(|c| ProposalFeed::new(c, client.clone(), mock.clone()));
    let learning = registry
        .get(LEARNING_DOMAIN)
        .map(|c| LearningFeed::new(c, client.clone(), mock.clone()));

    tracing::info!(
        backend_url = %backend_url,
        domains = ?registry.domains(),
        failure_threshold = policy.failure_threshold,
        window = %policy.window,
        "Connectivity controllers ready"
    );

    Ok(LinkServices {
        config,
        backend_url,
        registry,
        mock,
        proposals,
        learning,
    })
}

impl LinkServices {
    /// Spawn one poller per controller.
    pub fn spawn_pollers(&self, shutdown: &Shutdown) -> Vec<JoinHandle<()>> {
        let interval = Duration::from_millis(self.config.connectivity.poll_interval_ms);
        self.registry
            .all()
            .into_iter()
            .map(|controller| {
                let poller = ModePoller::new(controller, interval);
                tokio::spawn(poller.run(shutdown.subscribe()))
            })
            .collect()
    }

    /// Spawn the task applying reloaded policies to all controllers.
    pub fn spawn_policy_reloader(
        &self,
        updates: mpsc::UnboundedReceiver<LinkConfig>,
        shutdown: &Shutdown,
    ) -> JoinHandle<()> {
        tokio::spawn(apply_policy_updates(
            updates,
            self.registry.clone(),
            self.config.connectivity.clone(),
            shutdown.subscribe(),
        ))
    }
}
