use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::NavigationError;
use crate::services::navigation::{ExistingForm, ManifestForm, NavigationOutcome};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/manifest/navigate", post(navigate_to_manifest))
}

// POST /api/manifest/navigate
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct NavigateRequest {
    #[validate(length(min = 1))]
    section: String,
    #[serde(default)]
    page_url: String,
    existing_form: Option<ExistingForm>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NavigateResponse {
    form: ManifestForm,
    #[serde(flatten)]
    outcome: NavigationOutcome,
}

fn error_status(e: &NavigationError) -> StatusCode {
    match e {
        NavigationError::MissingPerformanceId(_)
        | NavigationError::InvalidUrl { .. }
        | NavigationError::Encode(_) => StatusCode::BAD_REQUEST,
        NavigationError::Transport(_) | NavigationError::Rejected(_) => StatusCode::BAD_GATEWAY,
    }
}

async fn navigate_to_manifest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NavigateRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Некорректный запрос: {}", e)))?;

    let form = ManifestForm::for_section(
        &req.section,
        &req.page_url,
        req.existing_form.as_ref(),
        &state.config.vendor.manifest_path,
    )
    .map_err(|e| (error_status(&e), e.to_string()))?;

    let outcome = state.navigator.submit(&form).await.map_err(|e| {
        tracing::error!("Manifest navigation for section {} failed: {}", req.section, e);
        (error_status(&e), e.to_string())
    })?;

    Ok((StatusCode::OK, Json(NavigateResponse { form, outcome })))
}
