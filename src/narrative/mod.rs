//! Nostalgic message generation.
//!
//! Time-machine buckets are handed to an external language model to turn
//! into a one-line greeting. The model sits behind the [`NarrativeEngine`]
//! trait; [`Narrator`] wraps an optional engine and always produces a
//! usable string. An unconfigured engine serves [`UNCONFIGURED_MESSAGE`], a
//! failing one serves [`FALLBACK_MESSAGE`], and neither case surfaces an
//! error to the caller.

pub mod gemini;

pub use gemini::GeminiEngine;

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::Memory;
use crate::time_machine::TemporalBuckets;

/// Copy served when no engine is configured.
pub const UNCONFIGURED_MESSAGE: &str = "Here's a blast from the past!";

/// Copy served when the engine is configured but the call fails.
pub const FALLBACK_MESSAGE: &str = "Rediscover your memories from this day in history! ✨";

/// Connection settings for a narrative engine.
#[derive(Debug, Clone)]
pub struct NarratorSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

/// Errors surfaced by narrative engines.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("engine not configured: {0}")]
    NotConfigured(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("provider error ({status}): {body}")]
    Provider { status: u16, body: String },
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// A model that can turn a prompt into a short piece of text.
#[async_trait]
pub trait NarrativeEngine: Send + Sync + std::fmt::Debug {
    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError>;
}

/// Bucket-to-message wrapper with mandatory fallback copy.
#[derive(Debug, Clone)]
pub struct Narrator {
    engine: Option<Arc<dyn NarrativeEngine>>,
}

impl Narrator {
    #[must_use]
    pub fn new(engine: Option<Arc<dyn NarrativeEngine>>) -> Self {
        Self { engine }
    }

    /// A narrator that always answers with [`UNCONFIGURED_MESSAGE`].
    #[must_use]
    pub fn disabled() -> Self {
        Self { engine: None }
    }

    /// Produce a short nostalgic message for non-empty recall buckets.
    ///
    /// Never fails; engine problems degrade to fixed copy.
    pub async fn nostalgic_message(&self, buckets: &TemporalBuckets) -> String {
        let Some(engine) = &self.engine else {
            tracing::warn!("narrative engine not configured, serving fallback copy");
            return UNCONFIGURED_MESSAGE.to_string();
        };

        let prompt = build_prompt(buckets);
        match engine.generate(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::error!(error = %e, "nostalgic message generation failed");
                FALLBACK_MESSAGE.to_string()
            }
        }
    }
}

/// Assemble the model prompt from the recall buckets.
fn build_prompt(buckets: &TemporalBuckets) -> String {
    let sections: Vec<String> = [
        format_bucket("ON THIS DAY (Previous Years)", &buckets.on_this_day),
        format_bucket("EXACTLY ONE MONTH AGO", &buckets.exactly_one_month_ago),
        format_bucket("AROUND THIS TIME LAST MONTH", &buckets.around_one_month_ago),
    ]
    .into_iter()
    .flatten()
    .collect();

    let descriptions = sections.join("\n\n");

    format!(
        "You are a warm, nostalgic memory assistant.\n\
         Look at these memories from the user's past:\n\n\
         {descriptions}\n\n\
         Write a short, heartwarming, 1-2 sentence message inviting the user to revisit these moments.\n\
         Acknowledge the mix of timeframes if present (e.g., \"From last year and last month...\").\n\
         Don't be too specific about details, just capture the vibe.\n\
         Use emojis."
    )
}

fn format_bucket(label: &str, memories: &[Memory]) -> Option<String> {
    if memories.is_empty() {
        return None;
    }
    let lines: Vec<String> = memories
        .iter()
        .map(|m| format!("- [{}] {}: {} ({})", m.date, m.title, m.caption, m.notes.join(", ")))
        .collect();
    Some(format!("{label}:\n{}", lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[derive(Debug)]
    struct CannedEngine {
        reply: &'static str,
    }

    #[async_trait]
    impl NarrativeEngine for CannedEngine {
        async fn generate(&self, _prompt: &str) -> Result<String, NarrativeError> {
            Ok(self.reply.to_string())
        }
    }

    #[derive(Debug)]
    struct BrokenEngine;

    #[async_trait]
    impl NarrativeEngine for BrokenEngine {
        async fn generate(&self, _prompt: &str) -> Result<String, NarrativeError> {
            Err(NarrativeError::Provider {
                status: 500,
                body: "upstream on fire".to_string(),
            })
        }
    }

    fn dated(id: &str, date: &str, title: &str, caption: &str, notes: &[&str]) -> Memory {
        Memory {
            id: id.to_string(),
            date: date.to_string(),
            title: title.to_string(),
            caption: caption.to_string(),
            notes: notes.iter().map(ToString::to_string).collect(),
            image_urls: Vec::new(),
            location: None,
            activity_tags: Vec::new(),
            couple_id: "c1".to_string(),
            created_by: "u1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_buckets() -> TemporalBuckets {
        TemporalBuckets {
            on_this_day: vec![dated(
                "m1",
                "2022-07-15",
                "Beach day",
                "Juhu in the rain",
                &["sandcastles", "chai"],
            )],
            exactly_one_month_ago: Vec::new(),
            around_one_month_ago: vec![dated("m2", "2024-06-13", "Movie night", "Old classics", &[])],
        }
    }

    #[tokio::test]
    async fn test_disabled_narrator_serves_unconfigured_copy() {
        let narrator = Narrator::disabled();
        let message = narrator.nostalgic_message(&sample_buckets()).await;
        assert_eq!(message, UNCONFIGURED_MESSAGE);
    }

    #[tokio::test]
    async fn test_engine_failure_degrades_to_fallback_copy() {
        let narrator = Narrator::new(Some(Arc::new(BrokenEngine)));
        let message = narrator.nostalgic_message(&sample_buckets()).await;
        assert_eq!(message, FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn test_engine_reply_is_trimmed() {
        let narrator = Narrator::new(Some(Arc::new(CannedEngine {
            reply: "  So many sweet moments! 💕\n",
        })));
        let message = narrator.nostalgic_message(&sample_buckets()).await;
        assert_eq!(message, "So many sweet moments! 💕");
    }

    #[test]
    fn test_prompt_lists_each_bucket_with_its_label() {
        let prompt = build_prompt(&sample_buckets());

        assert!(prompt.contains("ON THIS DAY (Previous Years):"));
        assert!(prompt.contains("AROUND THIS TIME LAST MONTH:"));
        assert!(!prompt.contains("EXACTLY ONE MONTH AGO"));
        assert!(prompt.contains("- [2022-07-15] Beach day: Juhu in the rain (sandcastles, chai)"));
        assert!(prompt.contains("- [2024-06-13] Movie night: Old classics ()"));
    }
}
