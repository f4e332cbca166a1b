use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::controllers::manifest::{plan, GroupSummary, NO_ADJACENT_SEATS};
use crate::models::{AdjacentGroup, PageSnapshot};
use crate::services::{apply_selection, LimitSignals, PageBridgeClient, SelectionOutcome};
use crate::AppState;

/// `document.body.id` страниц со схемой мест.
pub const MANIFEST_PAGE_IDS: [&str; 2] = ["add-seat-show-manifest", "add-seat-manifest"];

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/manifest/cart", post(add_to_cart))
}

// POST /api/manifest/cart
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CartRequest {
    #[validate(length(min = 1))]
    page_id: String,
    #[serde(default)]
    snapshot: PageSnapshot,
    #[serde(default)]
    limits: LimitSignals,
    adjacent_seats: Option<Vec<AdjacentGroup>>,
    /// `selectedImageIDByManifest`
    #[serde(default)]
    selected_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartResponse {
    ticket_limit: u32,
    limit_source: &'static str,
    group: Option<GroupSummary>,
    outcome: Option<SelectionOutcome>,
    message: String,
}

async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CartRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Некорректный запрос: {}", e)))?;

    if !MANIFEST_PAGE_IDS.contains(&req.page_id.as_str()) {
        tracing::error!("Not on the manifest page ({}) - navigate there first", req.page_id);
        return Err((StatusCode::CONFLICT, "Страница не является схемой мест".to_string()));
    }

    let bridge_url = state.config.bridge.url.as_deref().ok_or_else(|| {
        (StatusCode::SERVICE_UNAVAILABLE, "Мост страницы не настроен (BRIDGE_URL)".to_string())
    })?;

    let plan = plan(&state, &req.snapshot, &req.limits, req.adjacent_seats);
    if plan.seats.is_empty() {
        tracing::error!("No adjacent seat groups found");
        return Ok((
            StatusCode::OK,
            Json(CartResponse {
                ticket_limit: plan.limit.limit,
                limit_source: plan.limit.source,
                group: None,
                outcome: None,
                message: NO_ADJACENT_SEATS.to_string(),
            }),
        ));
    }

    let bridge = PageBridgeClient::new(bridge_url, state.http_client.clone())
        .with_known_selection(req.selected_ids);
    let outcome = apply_selection(&bridge, &plan.seats).await;

    let message = if outcome.committed {
        format!("Added {} of {} seats to cart", outcome.selected.len(), outcome.attempted)
    } else if outcome.selected.is_empty() {
        "No seats were successfully selected".to_string()
    } else {
        "Seats selected but cart submission failed".to_string()
    };

    Ok((
        StatusCode::OK,
        Json(CartResponse {
            ticket_limit: plan.limit.limit,
            limit_source: plan.limit.source,
            group: plan.group,
            outcome: Some(outcome),
            message,
        }),
    ))
}
