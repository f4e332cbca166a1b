use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{AdjacentGroup, PageSnapshot, PriceRange, SeatRecord};
use crate::services::{build_seat_map, select_seats_for_purchase, LimitSignals, ResolvedLimit};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/manifest/report", post(build_report))
        .route("/manifest/selection", post(plan_selection))
}

/* ---------- helpers ---------- */

pub(crate) const NO_ADJACENT_SEATS: &str = "No adjacent seats available";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroupSummary {
    pub row: String,
    pub count: usize,
    pub price_range: PriceRange,
}

impl From<&AdjacentGroup> for GroupSummary {
    fn from(group: &AdjacentGroup) -> Self {
        GroupSummary { row: group.row.clone(), count: group.count, price_range: group.price_range.clone() }
    }
}

/// Лимит, лучшая группа и места к выбору.
pub(crate) struct Plan {
    pub limit: ResolvedLimit,
    pub group: Option<GroupSummary>,
    pub seats: Vec<SeatRecord>,
}

/// Готовые группы со страницы используются как есть, иначе строятся по снимку.
pub(crate) fn plan(
    state: &AppState,
    snapshot: &PageSnapshot,
    limits: &LimitSignals,
    adjacent_seats: Option<Vec<AdjacentGroup>>,
) -> Plan {
    let groups = match adjacent_seats {
        Some(groups) => groups,
        None => {
            tracing::debug!("No adjacent groups supplied, rebuilding from snapshot");
            build_seat_map(snapshot, None).adjacent_seats
        }
    };

    let limit = state.limit_chain.resolve(limits);
    let group = groups.first().map(GroupSummary::from);
    let seats = select_seats_for_purchase(&groups, limit.limit).unwrap_or_default();

    if let Some(best) = &group {
        tracing::info!(
            "Selecting {} seats out of {} adjacent seats in row {}, starting from the end",
            seats.len(),
            best.count,
            best.row
        );
    }

    Plan { limit, group, seats }
}

/* ---------- REPORT ---------- */

// POST /api/manifest/report
#[derive(Debug, Deserialize)]
struct ReportRequest {
    section: Option<String>,
    #[serde(default)]
    snapshot: PageSnapshot,
}

async fn build_report(Json(req): Json<ReportRequest>) -> impl IntoResponse {
    let report = build_seat_map(&req.snapshot, req.section.as_deref());
    (StatusCode::OK, Json(report))
}

/* ---------- SELECTION ---------- */

// POST /api/manifest/selection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectionRequest {
    #[serde(default)]
    snapshot: PageSnapshot,
    #[serde(default)]
    limits: LimitSignals,
    adjacent_seats: Option<Vec<AdjacentGroup>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectionResponse {
    ticket_limit: u32,
    limit_source: &'static str,
    group: Option<GroupSummary>,
    seats: Vec<SeatRecord>,
    message: String,
}

async fn plan_selection(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectionRequest>,
) -> impl IntoResponse {
    let plan = plan(&state, &req.snapshot, &req.limits, req.adjacent_seats);

    let message = match &plan.group {
        Some(group) => format!("Selecting {} of {} seats in row {}", plan.seats.len(), group.count, group.row),
        None => NO_ADJACENT_SEATS.to_string(),
    };

    (
        StatusCode::OK,
        Json(SelectionResponse {
            ticket_limit: plan.limit.limit,
            limit_source: plan.limit.source,
            group: plan.group,
            seats: plan.seats,
            message,
        }),
    )
}
