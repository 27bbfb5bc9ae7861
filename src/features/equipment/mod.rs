//! Equipment safety-check feature.
//!
//! Safety configuration (frequency, instructions, manager, authorized officers), the
//! training video slot and file attachments of an equipment record. The six safety
//! columns are optional on the equipment table and provisioned by the setup action.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/equipment/schema` | Cached readiness of the safety columns |
//! | POST | `/api/equipment/{id}/schema/setup` | One-time setup of columns and video bucket |
//! | GET | `/api/equipment/{id}/safety` | View tab |
//! | GET | `/api/equipment/{id}/safety/edit` | Edit tab with seeded form |
//! | PUT | `/api/equipment/{id}/safety` | Save (pending video first) |
//! | GET/POST/DELETE | `/api/equipment/{id}/training-video` | Video state, save, delete |
//! | POST/DELETE | `/api/equipment/{id}/training-video/preview` | Stage or release a local preview |
//! | GET | `/api/equipment/{id}/training-video/preview/{token}` | Staged preview bytes |
//! | GET/POST/DELETE | `/api/equipment/{id}/attachments` | List, upload, remove |
//! | GET | `/api/equipment/{id}/attachments/preview` | Preview URL with fallback |
//! | GET | `/api/equipment/{id}/attachments/download` | Redirect to a fresh URL |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;


pub use routes::{routes, EquipmentServices};
