//! 商品处理器

use axum::{extract::State, http::StatusCode, response::Json};
use uuid::Uuid;

use super::{
    model::{CreateProductRequest, Product, UpdateProductRequest},
    service::SellReceipt,
};
use crate::app::AppState;
use crate::core::{
    error::CoreError,
    extract::{AppJson, AppPath},
    identity::Identity,
    response::ApiResponse,
};

pub async fn list_products(
    State(state): State<AppState>,
    _identity: Identity,
) -> Result<Json<ApiResponse<Vec<Product>>>, CoreError> {
    let products = state.products.list_products().await?;
    Ok(Json(ApiResponse::list(products)))
}

pub async fn get_product(
    State(state): State<AppState>,
    _identity: Identity,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Product>>, CoreError> {
    let product = state.products.get_product(id).await?;
    Ok(Json(ApiResponse::success(product)))
}

pub async fn create_product(
    State(state): State<AppState>,
    _identity: Identity,
    AppJson(payload): AppJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), CoreError> {
    let product = state.products.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

pub async fn update_product(
    State(state): State<AppState>,
    _identity: Identity,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateProductRequest>,
) -> Result<Json<ApiResponse<Product>>, CoreError> {
    let product = state.products.update_product(id, payload).await?;
    Ok(Json(ApiResponse::success(product)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    _identity: Identity,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, CoreError> {
    state.products.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn sell_product(
    State(state): State<AppState>,
    identity: Identity,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<SellReceipt>>, CoreError> {
    tracing::debug!(subject = %identity.subject, %id, "卖出请求");
    let receipt = state.products.sell(id).await?;
    Ok(Json(ApiResponse::success(receipt)))
}
