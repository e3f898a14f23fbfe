use axum::extract::State;
use axum::Json;
use tracing::instrument;

use super::App;
use crate::model::now;
use crate::service::DashboardStats;

#[instrument(skip(app))]
pub async fn stats(State(app): State<App>) -> Json<DashboardStats> {
    Json(app.dashboard.stats(now()).await)
}
