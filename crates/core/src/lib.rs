//! Domain logic for the hotspot canvas.
//!
//! Everything here is pure: no I/O, no database, no HTTP. The store
//! (`hotspot-db`), the server (`hotspot-api`) and the editing surface
//! (`hotspot-editor`) all build on these rules.

pub mod capability;
pub mod coords;
pub mod error;
pub mod hotspot;
pub mod page;
pub mod quota;
pub mod types;
