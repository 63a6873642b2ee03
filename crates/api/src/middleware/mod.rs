//! Request extractors for the two credentials this API understands.
//!
//! - [`auth`]: optional signed-in identity (JWT bearer), used only by quota
//!   and usage reporting.
//! - [`edit_token`]: the page capability, used by every gated mutation.

pub mod auth;
pub mod edit_token;
