//! Keepsake
//!
//! A shared-memories service for two partnered users: dated entries with
//! photos or video, captions, notes, optional geolocation, and activity
//! tags, plus two rediscovery features built on top of them - a clustered
//! map of everywhere the couple has been, and a "time machine" that
//! resurfaces memories from this day in earlier years and from about one
//! month ago.
//!
//! # Architecture
//!
//! - **Server**: Axum JSON API behind bearer-JWT auth
//! - **Recall core**: pure in-memory clustering and bucketing over the
//!   couple's records ([`clusters`], [`time_machine`])
//! - **Collaborators**: document database (SurrealDB), media CDN
//!   (Cloudinary), narrative model (Gemini), mail relay (EmailJS)
//!
//! # Modules
//!
//! - [`api`]: HTTP handlers
//! - [`clusters`]: fixed-radius greedy clustering of geotagged memories
//! - [`time_machine`]: temporal recall buckets
//! - [`persistence`]: document-store trait and providers
//! - [`narrative`]: nostalgic-message generation with mandatory fallback

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod clusters;
pub mod config;
pub mod domain;
pub mod media;
pub mod narrative;
pub mod notify;
pub mod persistence;
pub mod security;
pub mod server;
pub mod telemetry;
pub mod time_machine;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::media::CloudinaryClient;
use crate::narrative::Narrator;
use crate::notify::EmailNotifier;
use crate::persistence::MemoryStore;
use crate::security::rate_limit::AppRateLimiter;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Document store holding memories, profiles, and couples.
    pub store: Arc<dyn MemoryStore>,
    /// Nostalgic-message generator.
    pub narrator: Arc<Narrator>,
    /// Media CDN client.
    pub media: Arc<CloudinaryClient>,
    /// Partner mail notifier.
    pub notifier: Arc<EmailNotifier>,
    /// Global rate limiter.
    pub rate_limiter: Arc<AppRateLimiter>,
    /// Global configuration.
    pub config: Arc<AppConfig>,
}
