use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod birthdays;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod schema;
pub mod store;

use birthdays::{Clock, SystemClock};
use store::ContactStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContactStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store, clock: Arc::new(SystemClock) }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/contacts/",
            post(handlers::create_contact).get(handlers::list_contacts),
        )
        .route(
            "/contacts/:id",
            get(handlers::get_contact)
                .put(handlers::replace_contact)
                .delete(handlers::delete_contact),
        )
        .route("/search/", get(handlers::search_contacts))
        .route("/upcoming_birthdays/", get(handlers::upcoming_birthdays))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
