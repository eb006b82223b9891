//! Persistence layer.
//!
//! Storage sits behind the [`MemoryStore`] trait so handlers never see a
//! concrete database. `persistence.provider` in the configuration selects
//! the implementation: `surrealdb` for the document database, anything else
//! for the in-process map store used in development and tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{Couple, Memory, UserProfile};

pub mod providers;

/// Abstraction over the document store holding memories, user profiles,
/// and couples.
#[async_trait]
pub trait MemoryStore: Send + Sync + std::fmt::Debug {
    /// Insert or replace a memory document.
    async fn save_memory(&self, memory: &Memory) -> Result<()>;

    /// Fetch one memory by id.
    async fn get_memory(&self, id: &str) -> Result<Option<Memory>>;

    /// Remove a memory. Deleting a missing id is not an error.
    async fn delete_memory(&self, id: &str) -> Result<()>;

    /// All of a couple's memories, newest date first.
    async fn memories_for_couple(&self, couple_id: &str) -> Result<Vec<Memory>>;

    /// A couple's memories on one calendar day, most recently created
    /// first.
    async fn memories_on_date(&self, couple_id: &str, date: &str) -> Result<Vec<Memory>>;

    /// The `limit` newest memories by date.
    async fn recent_memories(&self, couple_id: &str, limit: usize) -> Result<Vec<Memory>>;

    /// Dates (`YYYY-MM-DD`) of every memory in one calendar month, for the
    /// calendar dot view. Days with several memories appear once per
    /// memory.
    async fn memory_dates_in_month(
        &self,
        couple_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<String>>;

    /// Insert or replace a user profile.
    async fn save_profile(&self, profile: &UserProfile) -> Result<()>;

    /// Fetch a profile by user id.
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Find the profile holding an outstanding invite code.
    async fn profile_by_invite_code(&self, code: &str) -> Result<Option<UserProfile>>;

    /// Insert or replace a couple record.
    async fn save_couple(&self, couple: &Couple) -> Result<()>;

    /// Fetch a couple by id.
    async fn get_couple(&self, id: &str) -> Result<Option<Couple>>;
}
