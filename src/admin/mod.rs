//! Local status and control API.
//!
//! # Routes
//! - `GET  /status`, `GET /status/{domain}`: snapshots with banner
//! - `POST /retry/{domain}`: manual retry
//! - `GET  /feeds/proposals`, `POST /feeds/proposals/{id}/approve|reject`
//! - `GET  /feeds/learning`
//! - `POST /debug/mode/{domain}`: force mode, mounted only with debug hooks
//!
//! All routes require `Authorization: Bearer <admin.api_key>`.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::config::AdminConfig;
use crate::connectivity::ControllerRegistry;
use crate::feed::{LearningFeed, ProposalFeed};
use crate::lifecycle::startup::LinkServices;

/// Shared state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: ControllerRegistry,
    pub proposals: Option<ProposalFeed>,
    pub learning: Option<LearningFeed>,
    pub api_key: Arc<str>,
}

impl AppState {
    pub fn from_services(services: &LinkServices) -> Self {
        Self {
            registry: services.registry.clone(),
            proposals: services.proposals.clone(),
            learning: services.learning.clone(),
            api_key: Arc::from(services.config.admin.api_key.as_str()),
        }
    }
}

/// Build the status API router.
#[allow(deprecated)]
pub fn setup_admin_router(state: AppState, config: &AdminConfig) -> Router {
    let mut router = Router::new()
        .route("/status", get(get_status))
        .route("/status/{domain}", get(get_domain_status))
        .route("/retry/{domain}", post(post_retry))
        .route("/feeds/proposals", get(get_proposals))
        .route("/feeds/proposals/{id}/approve", post(post_approve))
        .route("/feeds/proposals/{id}/reject", post(post_reject))
        .route("/feeds/learning", get(get_learning));

    if config.debug_hooks {
        tracing::warn!("Debug hooks enabled: force-mode route is mounted");
        router = router.route("/debug/mode/{domain}", post(post_force_mode));
    }

    router
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
}

/// Serve the router until the shutdown signal fires.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    mut shutdown: broadcast::Receiver<()>,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Status API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("Status API stopped");
    Ok(())
}
