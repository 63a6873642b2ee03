//! The hotspot editing surface as a library.
//!
//! A UI shell drives an [`editor::Editor`] (the optimistic mutation
//! protocol) and a [`projection::Canvas`] (pixel layout and click
//! classification), renders the notices the editor queues, and talks to the
//! server through a [`store::HotspotStore`], normally [`http::HttpStore`].

pub mod editor;
pub mod http;
pub mod links;
pub mod model;
pub mod notice;
pub mod projection;
pub mod session;
pub mod store;
