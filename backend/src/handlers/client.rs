//! Client book HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Client, ClientInput, ListQuery, SuccessResponse};
use crate::services::ClientService;
use crate::AppState;

/// List the current user's clients, optionally filtered by `?search=`
pub async fn list_clients(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Client>>> {
    let service = ClientService::new(state.db.clone());
    let clients = service.list_clients(&user.user_id, &query).await?;
    Ok(Json(clients))
}

/// Get a single client
pub async fn get_client(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(client_id): Path<Uuid>,
) -> AppResult<Json<Client>> {
    let service = ClientService::new(state.db.clone());
    Ok(Json(service.get_client(&user.user_id, client_id).await?))
}

/// Create a new client
pub async fn create_client(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<ClientInput>,
) -> AppResult<(StatusCode, Json<Client>)> {
    let service = ClientService::new(state.db.clone());
    let client = service.create_client(&user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// Replace a client's details
pub async fn update_client(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(client_id): Path<Uuid>,
    Json(input): Json<ClientInput>,
) -> AppResult<Json<Client>> {
    let service = ClientService::new(state.db.clone());
    Ok(Json(
        service.update_client(&user.user_id, client_id, input).await?,
    ))
}

/// Delete a client
pub async fn delete_client(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(client_id): Path<Uuid>,
) -> AppResult<Json<SuccessResponse>> {
    let service = ClientService::new(state.db.clone());
    service.delete_client(&user.user_id, client_id).await?;
    Ok(Json(SuccessResponse::default()))
}
