pub mod auth;
pub mod equipment;
pub mod people;

use std::sync::Arc;

use axum::Router;

use crate::features::equipment::EquipmentServices;
use crate::features::people::PeopleService;

/// All authenticated API routes
pub fn api_routes(people: Arc<PeopleService>, equipment: EquipmentServices) -> Router {
    Router::new()
        .merge(people::routes(people))
        .merge(equipment::routes(equipment))
}
