//! SurrealDB document-store provider.
//!
//! Connects through `engine::any`, so one connection string covers embedded
//! storage (`surrealkv://data/keepsake`) and a remote server
//! (`ws://localhost:8000`).
//!
//! SurrealDB owns the record id. Domain structs carry their id as a plain
//! string field, so writes strip `id` from the content before handing it
//! over, and reads project it back with `record::id(id)`.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};

use crate::domain::{Couple, Memory, UserProfile};
use crate::persistence::MemoryStore;

const MEMORIES_TABLE: &str = "memories";
const USERS_TABLE: &str = "users";
const COUPLES_TABLE: &str = "couples";

const NAMESPACE: &str = "keepsake";
const DATABASE: &str = "keepsake";

#[derive(Debug)]
pub struct SurrealDbProvider {
    db: Surreal<Any>,
}

impl SurrealDbProvider {
    /// Connect and select the application namespace and database.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let db = connect(connection_string).await?;
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        Ok(Self { db })
    }

    async fn upsert_record<T: Serialize>(&self, table: &'static str, id: &str, record: &T) -> Result<()> {
        let _: Option<serde_json::Value> = self
            .db
            .upsert((table, id))
            .content(content_without_id(record)?)
            .await?;
        Ok(())
    }
}

/// Serialize a record for storage, dropping the string `id` field that
/// would collide with SurrealDB's own record id.
fn content_without_id<T: Serialize>(record: &T) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(record)?;
    if let Some(object) = value.as_object_mut() {
        object.remove("id");
    }
    Ok(value)
}

#[async_trait]
impl MemoryStore for SurrealDbProvider {
    async fn save_memory(&self, memory: &Memory) -> Result<()> {
        self.upsert_record(MEMORIES_TABLE, &memory.id, memory).await
    }

    async fn get_memory(&self, id: &str) -> Result<Option<Memory>> {
        let mut response = self
            .db
            .query("SELECT *, record::id(id) AS id FROM type::thing($table, $id)")
            .bind(("table", MEMORIES_TABLE))
            .bind(("id", id.to_string()))
            .await?;
        let memories: Vec<Memory> = response.take(0)?;
        Ok(memories.into_iter().next())
    }

    async fn delete_memory(&self, id: &str) -> Result<()> {
        let _: Option<serde_json::Value> = self.db.delete((MEMORIES_TABLE, id)).await?;
        Ok(())
    }

    async fn memories_for_couple(&self, couple_id: &str) -> Result<Vec<Memory>> {
        let mut response = self
            .db
            .query(
                "SELECT *, record::id(id) AS id FROM type::table($table) \
                 WHERE coupleId = $couple ORDER BY date DESC",
            )
            .bind(("table", MEMORIES_TABLE))
            .bind(("couple", couple_id.to_string()))
            .await?;
        Ok(response.take(0)?)
    }

    async fn memories_on_date(&self, couple_id: &str, date: &str) -> Result<Vec<Memory>> {
        let mut response = self
            .db
            .query(
                "SELECT *, record::id(id) AS id FROM type::table($table) \
                 WHERE coupleId = $couple AND date = $date ORDER BY createdAt DESC",
            )
            .bind(("table", MEMORIES_TABLE))
            .bind(("couple", couple_id.to_string()))
            .bind(("date", date.to_string()))
            .await?;
        Ok(response.take(0)?)
    }

    async fn recent_memories(&self, couple_id: &str, limit: usize) -> Result<Vec<Memory>> {
        let mut response = self
            .db
            .query(
                "SELECT *, record::id(id) AS id FROM type::table($table) \
                 WHERE coupleId = $couple ORDER BY date DESC LIMIT $limit",
            )
            .bind(("table", MEMORIES_TABLE))
            .bind(("couple", couple_id.to_string()))
            .bind(("limit", limit))
            .await?;
        Ok(response.take(0)?)
    }

    async fn memory_dates_in_month(
        &self,
        couple_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<String>> {
        // Lexicographic range over zero-padded dates; "-31" is a safe upper
        // bound even for short months.
        let start = format!("{year:04}-{month:02}-01");
        let end = format!("{year:04}-{month:02}-31");
        let mut response = self
            .db
            .query(
                "SELECT date FROM type::table($table) WHERE coupleId = $couple \
                 AND date >= $start AND date <= $end ORDER BY date ASC",
            )
            .bind(("table", MEMORIES_TABLE))
            .bind(("couple", couple_id.to_string()))
            .bind(("start", start))
            .bind(("end", end))
            .await?;
        let dates: Vec<String> = response.take((0, "date"))?;
        Ok(dates)
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.upsert_record(USERS_TABLE, &profile.id, profile).await
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let mut response = self
            .db
            .query("SELECT *, record::id(id) AS id FROM type::thing($table, $id)")
            .bind(("table", USERS_TABLE))
            .bind(("id", user_id.to_string()))
            .await?;
        let profiles: Vec<UserProfile> = response.take(0)?;
        Ok(profiles.into_iter().next())
    }

    async fn profile_by_invite_code(&self, code: &str) -> Result<Option<UserProfile>> {
        let mut response = self
            .db
            .query(
                "SELECT *, record::id(id) AS id FROM type::table($table) \
                 WHERE inviteCode = $code LIMIT 1",
            )
            .bind(("table", USERS_TABLE))
            .bind(("code", code.to_string()))
            .await?;
        let profiles: Vec<UserProfile> = response.take(0)?;
        Ok(profiles.into_iter().next())
    }

    async fn save_couple(&self, couple: &Couple) -> Result<()> {
        self.upsert_record(COUPLES_TABLE, &couple.id, couple).await
    }

    async fn get_couple(&self, id: &str) -> Result<Option<Couple>> {
        let mut response = self
            .db
            .query("SELECT *, record::id(id) AS id FROM type::thing($table, $id)")
            .bind(("table", COUPLES_TABLE))
            .bind(("id", id.to_string()))
            .await?;
        let couples: Vec<Couple> = response.take(0)?;
        Ok(couples.into_iter().next())
    }
}
