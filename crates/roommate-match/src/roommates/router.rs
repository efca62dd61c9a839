use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::preferences::{OwnerId, PreferenceAnswers};
use super::ranking::{PageRequest, RankRequest, DEFAULT_MIN_SCORE, DEFAULT_PAGE_SIZE};
use super::repository::{CandidateSource, PreferenceStore, StoreError};
use super::service::{DistributionScope, MatchingService, MatchingServiceError, PoolOutcome};
use super::session::SessionError;

/// Defaults and caps applied to match queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchLimits {
    pub min_score: u8,
    pub page_size: usize,
    pub max_page_size: usize,
}

impl Default for MatchLimits {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 100,
        }
    }
}

pub struct RouterState<S, C> {
    pub service: Arc<MatchingService<S, C>>,
    pub limits: MatchLimits,
}

impl<S, C> Clone for RouterState<S, C> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            limits: self.limits,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SavePreferencesRequest {
    pub answers: PreferenceAnswers,
}

#[derive(Debug, Default, Deserialize)]
pub struct MatchQuery {
    pub min_score: Option<u8>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DistributionQuery {
    pub scope: Option<String>,
    pub min_score: Option<u8>,
}

/// Router builder exposing questionnaire, preference, and match endpoints.
pub fn matching_router<S, C>(service: Arc<MatchingService<S, C>>, limits: MatchLimits) -> Router
where
    S: PreferenceStore + 'static,
    C: CandidateSource + 'static,
{
    Router::new()
        .route(
            "/api/v1/roommates/questionnaire",
            get(questionnaire_handler::<S, C>),
        )
        .route(
            "/api/v1/roommates/preferences/:owner_id",
            get(preferences_handler::<S, C>).put(save_preferences_handler::<S, C>),
        )
        .route(
            "/api/v1/roommates/matches/:owner_id",
            get(matches_handler::<S, C>),
        )
        .route(
            "/api/v1/roommates/matches/:owner_id/distribution",
            get(distribution_handler::<S, C>),
        )
        .route(
            "/api/v1/roommates/compatibility/:owner_id/:candidate_id",
            get(compatibility_handler::<S, C>),
        )
        .with_state(RouterState { service, limits })
}

pub(crate) async fn questionnaire_handler<S, C>(State(state): State<RouterState<S, C>>) -> Response
where
    S: PreferenceStore + 'static,
    C: CandidateSource + 'static,
{
    (StatusCode::OK, Json(state.service.questionnaire().clone())).into_response()
}

pub(crate) async fn preferences_handler<S, C>(
    State(state): State<RouterState<S, C>>,
    Path(owner_id): Path<String>,
) -> Response
where
    S: PreferenceStore + 'static,
    C: CandidateSource + 'static,
{
    let owner_id = OwnerId(owner_id);
    match state.service.preferences(&owner_id) {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => {
            let payload = json!({
                "owner_id": owner_id,
                "error": "no preference record",
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_preferences_handler<S, C>(
    State(state): State<RouterState<S, C>>,
    Path(owner_id): Path<String>,
    Json(request): Json<SavePreferencesRequest>,
) -> Response
where
    S: PreferenceStore + 'static,
    C: CandidateSource + 'static,
{
    let owner_id = OwnerId(owner_id);
    match state.service.save_preferences(&owner_id, request.answers) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn matches_handler<S, C>(
    State(state): State<RouterState<S, C>>,
    Path(owner_id): Path<String>,
    Query(query): Query<MatchQuery>,
) -> Response
where
    S: PreferenceStore + 'static,
    C: CandidateSource + 'static,
{
    let limits = state.limits;
    let request = RankRequest {
        min_score: query.min_score.unwrap_or(limits.min_score).min(100),
        page: PageRequest::new(
            query.page.unwrap_or(1),
            query
                .size
                .unwrap_or(limits.page_size)
                .clamp(1, limits.max_page_size.max(1)),
        ),
    };

    match state.service.rank(&OwnerId(owner_id), request) {
        Ok(outcome) => outcome_response(outcome),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn distribution_handler<S, C>(
    State(state): State<RouterState<S, C>>,
    Path(owner_id): Path<String>,
    Query(query): Query<DistributionQuery>,
) -> Response
where
    S: PreferenceStore + 'static,
    C: CandidateSource + 'static,
{
    let min_score = query.min_score.unwrap_or(state.limits.min_score);
    let scope = match query.scope.as_deref().map(str::trim) {
        None | Some("") | Some("all") => DistributionScope::All,
        Some("filtered") => DistributionScope::AboveThreshold(min_score),
        Some(other) => {
            let payload = json!({
                "error": format!("unknown scope '{other}', expected 'all' or 'filtered'"),
            });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match state.service.distribution(&OwnerId(owner_id), scope) {
        Ok(PoolOutcome::Available { data }) => {
            let payload = json!({
                "status": "available",
                "data": data,
                "insights": data.insights(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Ok(unavailable) => outcome_response(unavailable),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn compatibility_handler<S, C>(
    State(state): State<RouterState<S, C>>,
    Path((owner_id, candidate_id)): Path<(String, String)>,
) -> Response
where
    S: PreferenceStore + 'static,
    C: CandidateSource + 'static,
{
    match state
        .service
        .compatibility(&OwnerId(owner_id), &OwnerId(candidate_id))
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

fn outcome_response<T: serde::Serialize>(outcome: PoolOutcome<T>) -> Response {
    let status = if outcome.is_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(outcome)).into_response()
}

fn error_response(error: MatchingServiceError) -> Response {
    let status = match &error {
        MatchingServiceError::Validation(_)
        | MatchingServiceError::Session(SessionError::Validation(_))
        | MatchingServiceError::Store(StoreError::Rejected(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        MatchingServiceError::Session(SessionError::NotCompleted) => StatusCode::CONFLICT,
        MatchingServiceError::Store(StoreError::Unavailable(_))
        | MatchingServiceError::Session(SessionError::Persist(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        MatchingServiceError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
