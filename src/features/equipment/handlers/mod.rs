pub mod attachment_handler;
pub mod multipart;
pub mod safety_handler;
pub mod schema_handler;
pub mod training_video_handler;

pub use attachment_handler::*;
pub use safety_handler::*;
pub use schema_handler::*;
pub use training_video_handler::*;
