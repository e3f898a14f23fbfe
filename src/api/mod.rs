use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod articles;
mod dashboard;
mod error;
mod state;

pub use articles::{ArticleDetail, ViewReceipt, THROTTLED_MESSAGE};
pub use error::*;
pub use state::*;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

pub fn create_router(app: App) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/articles/:id", get(articles::detail))
        .route("/articles/:id/view", post(articles::count_view))
        .route("/dashboard", get(dashboard::stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app)
}

async fn health() -> StatusCode {
    StatusCode::OK
}
