use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::people::handlers;
use crate::features::people::services::PeopleService;

/// Create routes for the people feature
pub fn routes(service: Arc<PeopleService>) -> Router {
    Router::new()
        .route("/api/people", get(handlers::list_people))
        .with_state(service)
}
