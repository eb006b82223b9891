use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::api;
use crate::config::{self, AppConfig};
use crate::media::{CloudinaryClient, MAX_TOTAL_SIZE};
use crate::narrative::{GeminiEngine, Narrator};
use crate::notify::EmailNotifier;
use crate::persistence::MemoryStore;
use crate::persistence::providers::{InMemoryProvider, SurrealDbProvider};
use crate::security::middleware::auth_middleware;
use crate::security::rate_limit::{AppRateLimiter, rate_limit_middleware};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    // Persistence provider selection
    let store: Arc<dyn MemoryStore> = match config.persistence.provider.as_str() {
        "surrealdb" => {
            Arc::new(SurrealDbProvider::new(&config.persistence.database_url).await?)
        }
        _ => Arc::new(InMemoryProvider::new()),
    };
    info!(
        name: "persistence.ready",
        provider = %config.persistence.provider,
        "Persistence provider initialized"
    );

    // Narrative engine is optional; without a key the narrator serves
    // fallback copy only.
    let narrator_settings = config::load_narrator_settings();
    let narrator = if narrator_settings.api_key.is_some() {
        info!(
            name: "narrator.ready",
            model = %narrator_settings.model,
            "Narrative engine configured"
        );
        Narrator::new(Some(Arc::new(GeminiEngine::new(narrator_settings))))
    } else {
        info!(name: "narrator.fallback", "Narrative engine not configured");
        Narrator::disabled()
    };

    let media = CloudinaryClient::new(config::load_cloudinary_settings());
    if !media.is_configured() {
        tracing::warn!("Cloudinary not configured, uploads will be refused");
    }

    let notifier = EmailNotifier::new(config::load_email_settings());

    let rate_limiter = Arc::new(AppRateLimiter::new(
        config.resilience.requests_per_second,
        config.resilience.burst_size,
    ));

    let state = AppState {
        store,
        narrator: Arc::new(narrator),
        media: Arc::new(media),
        notifier: Arc::new(notifier),
        rate_limiter,
        config: Arc::clone(&config),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Assemble the router and middleware stack for the given state.
///
/// Split out from [`start_server`] so integration tests can drive the exact
/// production stack without binding a socket.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    // Conditional layering changes the router type, so "timeout disabled"
    // becomes a timeout long enough to never fire.
    let timeout_duration = if state.config.resilience.timeout_disabled {
        Duration::from_secs(365 * 24 * 60 * 60) // 1 year
    } else {
        Duration::from_secs(30)
    };

    api::router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn(
            move |request: Request, next: Next| {
                let duration = timeout_duration;
                async move {
                    match tokio::time::timeout(duration, next.run(request)).await {
                        Ok(response) => response,
                        Err(_) => {
                            (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response()
                        }
                    }
                }
            },
        ))
        .layer(DefaultBodyLimit::max(MAX_TOTAL_SIZE))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
