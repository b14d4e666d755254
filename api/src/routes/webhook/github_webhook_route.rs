use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::{Instrument, debug, error, field::Empty, info, info_span, instrument};
use vcs_gateway::PullRequestEvent;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::webhook::github_webhook_response::WebhookAck,
};

const EVENT_HEADER: &str = "X-GitHub-Event";
const DELIVERY_HEADER: &str = "X-GitHub-Delivery";
const PULL_REQUEST_EVENT: &str = "pull_request";

/// Receives GitHub webhook deliveries.
///
/// Scannable `pull_request` actions start a detached pipeline run; the
/// delivery is acknowledged with `202 Accepted` before the scan finishes.
/// Other events and actions are acknowledged and ignored.
#[instrument(name = "github_webhook_route", skip_all, fields(event = Empty, delivery = Empty))]
pub async fn github_webhook_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let event = header(&headers, EVENT_HEADER)
        .ok_or_else(|| AppError::BadRequest(format!("missing {EVENT_HEADER} header")))?;
    let delivery = header(&headers, DELIVERY_HEADER);

    let span = tracing::Span::current();
    span.record("event", event.as_str());
    if let Some(id) = &delivery {
        span.record("delivery", id.as_str());
    }

    if event != PULL_REQUEST_EVENT {
        debug!("non pull_request event ignored");
        return Ok(ignored(delivery, format!("event '{event}' is not handled")));
    }

    let payload: PullRequestEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid pull_request payload: {e}")))?;

    if !payload.action.triggers_scan() {
        debug!(action = ?payload.action, "pull_request action ignored");
        return Ok(ignored(
            delivery,
            format!("action {:?} does not trigger a scan", payload.action),
        ));
    }

    let ctx = payload
        .to_context()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    info!(
        repo = %ctx.full_name(),
        pr = ctx.number,
        head = %ctx.head_sha,
        "scheduling pull request scan"
    );

    let pipeline = state.pipeline.clone();
    let task_span = info_span!("pr_scan", repo = %ctx.full_name(), pr = ctx.number);
    tokio::spawn(
        async move {
            match pipeline.run(&ctx).await {
                Ok(summary) => info!(
                    check_run = %summary.check_run_id,
                    conclusion = ?summary.conclusion,
                    "scan finished"
                ),
                Err(err) => error!(stage = err.stage(), error = %err, "scan aborted"),
            }
        }
        .instrument(task_span),
    );

    Ok(ApiResponse::success(WebhookAck {
        status: "scheduled",
        delivery,
        message: "pull request scan started".into(),
    })
    .into_response_with_status(StatusCode::ACCEPTED))
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn ignored(delivery: Option<String>, message: String) -> Response {
    ApiResponse::success(WebhookAck {
        status: "ignored",
        delivery,
        message,
    })
    .into_response_with_status(StatusCode::ACCEPTED)
}
