pub mod people_handler;

pub use people_handler::{__path_list_people, list_people};
