//! Revalidation webhook and the admin route that forwards events to it.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Extension, Json,
};
use chrono::Utc;
use storefront_core::{RevalidationEvent, RevalidationPlan};
use storefront_revalidate::{RevalidateError, RevalidationReceipt};
use subtle::ConstantTimeEq;

use crate::middleware::{extract_bearer_token, RequestId};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// `POST /api/revalidate`
///
/// Checks run in order: secret configured, bearer token matches, body is a
/// valid event. Only then is anything evicted.
pub(super) async fn handle_webhook(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RevalidationReceipt>, ApiError> {
    let Some(secret) = state.revalidate_secret.as_deref() else {
        tracing::error!("revalidation webhook called but STOREFRONT_REVALIDATE_SECRET is not set");
        return Err(ApiError::new(
            req_id.0,
            "misconfigured",
            "revalidation secret is not configured",
        ));
    };

    let presented = extract_bearer_token(headers.get(AUTHORIZATION));
    if !presented.is_some_and(|token| secrets_match(token, secret)) {
        tracing::warn!(
            request_id = %req_id.0,
            has_token = presented.is_some(),
            "revalidation webhook rejected bearer token"
        );
        return Err(ApiError::new(
            req_id.0,
            "unauthorized",
            "missing or invalid bearer token",
        ));
    }

    let event: RevalidationEvent = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "revalidation webhook received malformed event");
        ApiError::new(req_id.0.clone(), "bad_request", format!("invalid event: {e}"))
    })?;

    let plan = RevalidationPlan::for_event(&event);

    let mut evicted = 0;
    for path in &plan.paths {
        evicted += state.cache.invalidate_path(path).await;
    }
    for tag in &plan.tags {
        evicted += state.cache.invalidate_tag(tag).await;
    }

    let remaining = state.cache.len().await;
    tracing::info!(
        request_id = %req_id.0,
        event_type = %event.event_type,
        paths = ?plan.paths,
        tags = ?plan.tags,
        evicted,
        remaining,
        "revalidated"
    );

    Ok(Json(RevalidationReceipt {
        revalidated: true,
        timestamp: Utc::now(),
        paths: plan.paths,
        tags: plan.tags,
    }))
}

/// `POST /api/v1/admin/revalidate`
///
/// Relays an event to the webhook through the configured forwarder so the
/// shared secret never leaves the server.
pub(super) async fn trigger_revalidation(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(event): Json<RevalidationEvent>,
) -> Result<Json<ApiResponse<RevalidationReceipt>>, ApiError> {
    let Some(forwarder) = state.forwarder.as_ref() else {
        tracing::error!("revalidation trigger called but no forwarder is configured");
        return Err(ApiError::new(
            req_id.0,
            "misconfigured",
            "revalidation secret is not configured",
        ));
    };

    let receipt = forwarder
        .forward(&event)
        .await
        .map_err(|e| map_forward_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: receipt,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_forward_error(request_id: String, error: &RevalidateError) -> ApiError {
    tracing::error!(error = %error, "revalidation forward failed");
    match error {
        RevalidateError::MissingSecret | RevalidateError::InvalidBaseUrl { .. } => {
            ApiError::new(request_id, "misconfigured", error.to_string())
        }
        _ => ApiError::new(request_id, "upstream_error", "revalidation webhook call failed"),
    }
}

fn secrets_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}
