//! Route definitions for the Jewel Ledger platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/onboarding", onboarding_routes())
        .nest("/clients", client_routes())
        .nest("/items", item_routes())
        .nest("/tasks", task_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        .merge(protected)
}

/// Onboarding routes
fn onboarding_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::get_onboarding_status).post(handlers::complete_onboarding),
    )
}

/// Client book routes
fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_clients).post(handlers::create_client))
        .route(
            "/:client_id",
            get(handlers::get_client)
                .put(handlers::update_client)
                .delete(handlers::delete_client),
        )
}

/// Item routes
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route("/valuation", post(handlers::preview_valuation))
        .route(
            "/:item_id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
}

/// Dashboard task routes
fn task_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::list_tasks).post(handlers::create_task))
}
