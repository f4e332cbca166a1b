pub mod manifest;
#[cfg(feature = "cart")]
pub mod cart;
#[cfg(feature = "navigation")]
pub mod navigation;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn routes() -> Router<Arc<crate::AppState>> {
    let router = Router::new().merge(manifest::routes());
    #[cfg(feature = "cart")]
    let router = router.merge(cart::routes());
    #[cfg(feature = "navigation")]
    let router = router.merge(navigation::routes());
    router
}

/// Главный роутер сервиса.
pub fn app(state: Arc<crate::AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Seat Manifest API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
