mod directory_store;
mod people_service;

pub use directory_store::{DirectoryStore, PgDirectoryStore};
pub use people_service::{PeopleListing, PeopleService};
