//! In-process map store used in development and tests.
//!
//! Orderings match the SurrealDB provider so tests written against this
//! store describe production behaviour.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{Couple, Memory, UserProfile};
use crate::persistence::MemoryStore;

#[derive(Debug, Default)]
pub struct InMemoryProvider {
    memories: RwLock<HashMap<String, Memory>>,
    profiles: RwLock<HashMap<String, UserProfile>>,
    couples: RwLock<HashMap<String, Couple>>,
}

impl InMemoryProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn couple_memories(&self, couple_id: &str) -> Vec<Memory> {
        self.memories
            .read()
            .unwrap()
            .values()
            .filter(|m| m.couple_id == couple_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MemoryStore for InMemoryProvider {
    async fn save_memory(&self, memory: &Memory) -> Result<()> {
        self.memories
            .write()
            .unwrap()
            .insert(memory.id.clone(), memory.clone());
        Ok(())
    }

    async fn get_memory(&self, id: &str) -> Result<Option<Memory>> {
        Ok(self.memories.read().unwrap().get(id).cloned())
    }

    async fn delete_memory(&self, id: &str) -> Result<()> {
        self.memories.write().unwrap().remove(id);
        Ok(())
    }

    async fn memories_for_couple(&self, couple_id: &str) -> Result<Vec<Memory>> {
        let mut memories = self.couple_memories(couple_id);
        memories.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(memories)
    }

    async fn memories_on_date(&self, couple_id: &str, date: &str) -> Result<Vec<Memory>> {
        let mut memories: Vec<Memory> = self
            .couple_memories(couple_id)
            .into_iter()
            .filter(|m| m.date == date)
            .collect();
        memories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(memories)
    }

    async fn recent_memories(&self, couple_id: &str, limit: usize) -> Result<Vec<Memory>> {
        let mut memories = self.couple_memories(couple_id);
        memories.sort_by(|a, b| b.date.cmp(&a.date));
        memories.truncate(limit);
        Ok(memories)
    }

    async fn memory_dates_in_month(
        &self,
        couple_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<String>> {
        let start = format!("{year:04}-{month:02}-01");
        let end = format!("{year:04}-{month:02}-31");
        let mut dates: Vec<String> = self
            .couple_memories(couple_id)
            .into_iter()
            .filter(|m| m.date.as_str() >= start.as_str() && m.date.as_str() <= end.as_str())
            .map(|m| m.date)
            .collect();
        dates.sort();
        Ok(dates)
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.profiles
            .write()
            .unwrap()
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.read().unwrap().get(user_id).cloned())
    }

    async fn profile_by_invite_code(&self, code: &str) -> Result<Option<UserProfile>> {
        Ok(self
            .profiles
            .read()
            .unwrap()
            .values()
            .find(|p| p.invite_code.as_deref() == Some(code))
            .cloned())
    }

    async fn save_couple(&self, couple: &Couple) -> Result<()> {
        self.couples
            .write()
            .unwrap()
            .insert(couple.id.clone(), couple.clone());
        Ok(())
    }

    async fn get_couple(&self, id: &str) -> Result<Option<Couple>> {
        Ok(self.couples.read().unwrap().get(id).cloned())
    }
}
