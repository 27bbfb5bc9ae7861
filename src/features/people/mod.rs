//! People directory feature.
//!
//! Lists the people who can be assigned as safety manager or authorized officer on a
//! piece of equipment. Roles are derived from profile and invitation records on every
//! fetch and never persisted.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/people` | People with derived manager/officer flags |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::{PeopleService, PgDirectoryStore};
