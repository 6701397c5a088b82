//! Jewelry item HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{
    CreateItemInput, Item, ItemWithClient, ListQuery, SuccessResponse, UpdateItemInput,
    ValuationRequest, ValuationResponse,
};
use crate::services::ItemService;
use crate::AppState;

/// List the current user's items with their clients
pub async fn list_items(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ItemWithClient>>> {
    let service = ItemService::new(state.db.clone());
    Ok(Json(service.list_items(&user.user_id, &query).await?))
}

/// Get a single item
pub async fn get_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<ItemWithClient>> {
    let service = ItemService::new(state.db.clone());
    Ok(Json(service.get_item(&user.user_id, item_id).await?))
}

/// Create a new item
pub async fn create_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateItemInput>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let service = ItemService::new(state.db.clone());
    let item = service.create_item(&user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Partially update an item
pub async fn update_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(input): Json<UpdateItemInput>,
) -> AppResult<Json<Item>> {
    let service = ItemService::new(state.db.clone());
    Ok(Json(service.update_item(&user.user_id, item_id, input).await?))
}

/// Delete an item
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<SuccessResponse>> {
    let service = ItemService::new(state.db.clone());
    service.delete_item(&user.user_id, item_id).await?;
    Ok(Json(SuccessResponse::default()))
}

/// Preview net weight and fine for a raw item form
pub async fn preview_valuation(Json(request): Json<ValuationRequest>) -> Json<ValuationResponse> {
    Json(ItemService::preview_valuation(&request))
}
