//! 销售处理器

use axum::{extract::State, http::StatusCode, response::Json};

use super::model::{RecordSaleRequest, Sale};
use crate::app::AppState;
use crate::core::{
    error::CoreError, extract::AppJson, identity::Identity, response::ApiResponse,
};

pub async fn record_sale(
    State(state): State<AppState>,
    _identity: Identity,
    AppJson(payload): AppJson<RecordSaleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Sale>>), CoreError> {
    let sale = state.sales.record_sale(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(sale))))
}

pub async fn list_sales(
    State(state): State<AppState>,
    _identity: Identity,
) -> Result<Json<ApiResponse<Vec<Sale>>>, CoreError> {
    let sales = state.sales.recent_sales().await?;
    Ok(Json(ApiResponse::list(sales)))
}
