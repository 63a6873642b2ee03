//! Signed-in identity: JWT validation for the optional bearer credential.

pub mod jwt;
