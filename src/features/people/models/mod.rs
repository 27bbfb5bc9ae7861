mod invitation;
mod person;
mod profile;

pub use invitation::Invitation;
pub use person::Person;
pub use profile::Profile;
