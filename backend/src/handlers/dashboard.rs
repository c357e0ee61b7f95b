//! Dashboard handler

use axum::{extract::State, Json};
use shared::{Action, Resource};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::dashboard::Dashboard;
use crate::services::DashboardService;
use crate::AppState;

/// Admin dashboard with welcome message and metrics
pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Dashboard>> {
    current_user.0.require(Resource::Dashboard, Action::View)?;

    let service = DashboardService::new(state.db);
    let dashboard = service
        .get_dashboard(current_user.0.user_id, current_user.0.role)
        .await?;
    Ok(Json(dashboard))
}
