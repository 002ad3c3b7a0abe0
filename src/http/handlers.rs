use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use crate::{
    app_state::AppState,
    audit::AuditError,
    entities::BrokenLink,
    http::dtos::{
        AuditRunResponse, CountResponse, ErrorResponse, RemoveLinkRequest, RemoveLinkResponse,
    },
    remediation::{self, RemediationError},
};

/// Feed for the admin table and its CSV export.
#[utoipa::path(
    get,
    path = "/v1/broken-links",
    tag = "broken-links",
    responses(
        (status = 200, description = "All broken links from the latest audit", body = Vec<BrokenLink>),
        (status = 500, description = "Result store unavailable")
    )
)]
pub async fn list_broken_links(State(state): State<AppState>) -> Response {
    match state.repo.list_all().await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err) => {
            error!(%err, "failed to list broken links");
            internal_error()
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/broken-links/count",
    tag = "broken-links",
    responses(
        (status = 200, description = "Number of broken links", body = CountResponse),
        (status = 500, description = "Result store unavailable")
    )
)]
pub async fn count_broken_links(State(state): State<AppState>) -> Response {
    match state.repo.count().await {
        Ok(count) => (StatusCode::OK, Json(CountResponse { count })).into_response(),
        Err(err) => {
            error!(%err, "failed to count broken links");
            internal_error()
        }
    }
}

/// Remove a broken reference from its source content and drop the matching
/// result rows.
#[utoipa::path(
    delete,
    path = "/v1/broken-links",
    tag = "broken-links",
    request_body = RemoveLinkRequest,
    responses(
        (status = 200, description = "Link removed from the content", body = RemoveLinkResponse),
        (status = 404, description = "Content or link occurrence not found", body = RemoveLinkResponse),
        (status = 500, description = "Store failure")
    )
)]
pub async fn remove_broken_link(
    State(state): State<AppState>,
    Json(payload): Json<RemoveLinkRequest>,
) -> Response {
    let result = remediation::remove_link(
        state.content_store.as_ref(),
        &state.repo,
        payload.content_id,
        &payload.url,
    )
    .await;

    match result {
        Ok(true) => {
            info!(
                content_id = payload.content_id,
                url = %payload.url,
                "link removed via admin request"
            );
            (
                StatusCode::OK,
                Json(RemoveLinkResponse {
                    removed: true,
                    message: "Link removed from content".to_string(),
                }),
            )
                .into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(RemoveLinkResponse {
                removed: false,
                message: "No occurrence of the URL was found in the content".to_string(),
            }),
        )
            .into_response(),
        Err(RemediationError::ContentNotFound(id)) => (
            StatusCode::NOT_FOUND,
            Json(RemoveLinkResponse {
                removed: false,
                message: format!("Content record {id} not found"),
            }),
        )
            .into_response(),
        Err(err) => {
            error!(%err, content_id = payload.content_id, "remediation failed");
            internal_error()
        }
    }
}

/// Manual audit trigger: runs synchronously and returns the count.
#[utoipa::path(
    post,
    path = "/v1/audit/run",
    tag = "audit",
    responses(
        (status = 200, description = "Audit finished", body = AuditRunResponse),
        (status = 409, description = "An audit run is already in progress"),
        (status = 500, description = "Audit failed")
    )
)]
pub async fn run_audit(State(state): State<AppState>) -> Response {
    match state.auditor.run(&state.audit_config).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(AuditRunResponse {
                broken_links: summary.broken_links,
                urls_checked: summary.urls_checked,
                records_scanned: summary.records_scanned,
            }),
        )
            .into_response(),
        Err(AuditError::AlreadyRunning) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "An audit run is already in progress".to_string(),
            }),
        )
            .into_response(),
        Err(err) => {
            error!(%err, "manual audit failed");
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
        }),
    )
        .into_response()
}
