//! Identity collaborator: bearer token validation.

mod jwt;

pub use jwt::{JwtConfig, JwtTokenService};
