pub mod balances;
pub mod bills;
pub mod events;
pub mod health;
pub mod users;

use crate::ledger::LedgerService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<LedgerService>,
}

impl AppState {
    pub fn new(ledger: Arc<LedgerService>) -> Self {
        Self { ledger }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/users", post(users::create_user))
        .route(
            "/v1/events",
            post(events::create_event).get(events::get_events_by_ids),
        )
        .route("/v1/events/:id", get(events::get_event))
        .route("/v1/events/:id/participants", post(events::join_event))
        .route(
            "/v1/events/:id/available-users",
            get(events::get_available_users),
        )
        .route(
            "/v1/events/:id/bills",
            post(bills::create_bill).get(bills::get_bills),
        )
        .route("/v1/events/:id/balances", get(balances::get_balances))
        .layer(cors)
        .with_state(state)
}
