//! Bearer token authentication against the issuer's JWKS.

mod jwks;
mod validator;

pub mod model;

pub use jwks::JwksClient;
pub use validator::JwtValidator;
