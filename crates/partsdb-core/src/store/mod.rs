//! Storage backends for categories and parts.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Category, NewCategory, NewPart, Part, PartListing, PartUpdate};

/// Persistent store behind the KiCad API and the CLI.
#[async_trait]
pub trait PartStore: Send + Sync {
    /// Categories ordered by display name, case-insensitively. Inactive ones
    /// only when asked.
    async fn list_categories(&self, include_inactive: bool) -> Result<Vec<Category>>;

    async fn get_category(&self, id: i32) -> Result<Category>;

    async fn insert_category(&self, new: NewCategory) -> Result<Category>;

    async fn set_category_active(&self, id: i32, active: bool) -> Result<Category>;

    /// Active parts of a category, ordered by name case-insensitively with
    /// ties broken bytewise. Unknown categories yield an empty list.
    async fn parts_in_category(&self, category_id: i32) -> Result<Vec<PartListing>>;

    /// Look up a part by sequence number, active or not.
    async fn get_part(&self, sequence_number: i32) -> Result<Part>;

    /// Category with the lowest id, if any.
    async fn first_category(&self) -> Result<Option<Category>>;

    /// Part with the lowest sequence number, if any.
    async fn first_part(&self) -> Result<Option<Part>>;

    async fn insert_part(&self, new: NewPart) -> Result<Part>;

    async fn update_part(&self, sequence_number: i32, update: PartUpdate) -> Result<Part>;

    async fn set_part_active(&self, sequence_number: i32, active: bool) -> Result<Part>;

    /// Cheap liveness check for `/health`.
    async fn ping(&self) -> Result<()>;
}
