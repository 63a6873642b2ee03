//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod hotspot_repo;
pub mod page_repo;
pub mod usage_repo;
pub mod user_profile_repo;

pub use hotspot_repo::{CreateHotspotError, HotspotRepo, QuotaContext};
pub use page_repo::PageRepo;
pub use usage_repo::UsageRepo;
pub use user_profile_repo::UserProfileRepo;
