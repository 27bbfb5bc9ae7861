pub mod attachment_dto;
pub mod panel_dto;
pub mod safety_dto;
pub mod schema_dto;
pub mod video_dto;

pub use attachment_dto::*;
pub use panel_dto::*;
pub use safety_dto::*;
pub use schema_dto::*;
pub use video_dto::*;
