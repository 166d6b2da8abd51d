use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AppState;
use crate::connectivity::{ConnectionStatus, Mode, ProbeOutcome};
use crate::domain::{Badge, LearningStatus, Proposal};
use crate::feed::{FeedError, FeedResponse, ReviewResult};

/// Snapshot plus the banner a UI would show for it.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusView {
    #[serde(flatten)]
    pub status: ConnectionStatus,
    pub banner: BannerView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BannerView {
    pub label: String,
    pub color: String,
    pub icon: String,
}

impl From<Badge> for BannerView {
    fn from(badge: Badge) -> Self {
        Self {
            label: badge.label.to_string(),
            color: badge.color.to_string(),
            icon: badge.icon.to_string(),
        }
    }
}

impl From<ConnectionStatus> for StatusView {
    fn from(status: ConnectionStatus) -> Self {
        let banner = status.mode.banner().into();
        Self { status, banner }
    }
}

#[derive(Debug, Serialize)]
pub struct RetryResponse {
    pub outcome: ProbeOutcome,
    pub status: StatusView,
}

#[derive(Debug, Deserialize)]
pub struct ForceModeRequest {
    pub mode: Mode,
}

#[derive(Debug)]
pub enum ApiError {
    UnknownDomain(String),
    FeedUnavailable(&'static str),
    Feed(FeedError),
}

impl From<FeedError> for ApiError {
    fn from(e: FeedError) -> Self {
        ApiError::Feed(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::UnknownDomain(domain) => {
                (StatusCode::NOT_FOUND, format!("unknown domain '{}'", domain))
            }
            ApiError::FeedUnavailable(domain) => (
                StatusCode::NOT_FOUND,
                format!("domain '{}' is not configured", domain),
            ),
            ApiError::Feed(e @ FeedError::NotFound(_)) => (StatusCode::NOT_FOUND, e.to_string()),
            ApiError::Feed(e @ FeedError::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, e.to_string())
            }
            ApiError::Feed(e @ FeedError::Backend(_)) => (StatusCode::BAD_GATEWAY, e.to_string()),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub async fn get_status(State(state): State<AppState>) -> Json<Vec<StatusView>> {
    Json(state.registry.statuses().into_iter().map(StatusView::from).collect())
}

pub async fn get_domain_status(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<StatusView>, ApiError> {
    let controller = state
        .registry
        .get(&domain)
        .ok_or(ApiError::UnknownDomain(domain))?;
    Ok(Json(controller.connection_status().into()))
}

pub async fn post_retry(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<RetryResponse>, ApiError> {
    let controller = state
        .registry
        .get(&domain)
        .ok_or(ApiError::UnknownDomain(domain))?;
    let outcome = controller.retry_connection().await;
    Ok(Json(RetryResponse {
        outcome,
        status: controller.connection_status().into(),
    }))
}

pub async fn post_force_mode(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Json(request): Json<ForceModeRequest>,
) -> Result<Json<StatusView>, ApiError> {
    let controller = state
        .registry
        .get(&domain)
        .ok_or(ApiError::UnknownDomain(domain))?;
    controller.force_mode(request.mode);
    Ok(Json(controller.connection_status().into()))
}

pub async fn get_proposals(
    State(state): State<AppState>,
) -> Result<Json<FeedResponse<Vec<Proposal>>>, ApiError> {
    let feed = state
        .proposals
        .as_ref()
        .ok_or(ApiError::FeedUnavailable(crate::feed::PROPOSALS_DOMAIN))?;
    Ok(Json(feed.list().await))
}

pub async fn post_approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewResult>, ApiError> {
    let feed = state
        .proposals
        .as_ref()
        .ok_or(ApiError::FeedUnavailable(crate::feed::PROPOSALS_DOMAIN))?;
    Ok(Json(feed.approve(&id).await?))
}

pub async fn post_reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewResult>, ApiError> {
    let feed = state
        .proposals
        .as_ref()
        .ok_or(ApiError::FeedUnavailable(crate::feed::PROPOSALS_DOMAIN))?;
    Ok(Json(feed.reject(&id).await?))
}

pub async fn get_learning(
    State(state): State<AppState>,
) -> Result<Json<FeedResponse<Vec<LearningStatus>>>, ApiError> {
    let feed = state
        .learning
        .as_ref()
        .ok_or(ApiError::FeedUnavailable(crate::feed::LEARNING_DOMAIN))?;
    Ok(Json(feed.status().await))
}
