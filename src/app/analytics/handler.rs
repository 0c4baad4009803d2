//! 仪表盘处理器

use axum::{
    extract::{Query, State},
    response::Json,
};

use super::model::{ChartRange, Dashboard, DashboardQuery};
use crate::app::AppState;
use crate::core::{error::CoreError, identity::Identity, response::ApiResponse};

pub async fn get_dashboard(
    State(state): State<AppState>,
    _identity: Identity,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<Dashboard>>, CoreError> {
    let range = match query.range.as_deref() {
        None | Some("") => ChartRange::default(),
        Some(raw) => raw.parse::<ChartRange>().map_err(CoreError::BadRequest)?,
    };

    let dashboard = state.dashboard.dashboard(range).await?;
    Ok(Json(ApiResponse::success(dashboard)))
}
