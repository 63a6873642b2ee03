pub mod hotspot;
pub mod page;
pub mod usage;
