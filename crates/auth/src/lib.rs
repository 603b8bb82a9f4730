//! `dovic-auth` — authentication boundary.
//!
//! Identity is an external collaborator to the freight core: this crate
//! produces an authenticated [`Principal`] with a [`Role`] flag, resolved once
//! at the HTTP boundary and passed into the core as a parameter. It is
//! intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod jwt;
pub mod principal;
pub mod roles;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use principal::Principal;
pub use roles::Role;
