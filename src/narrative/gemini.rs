//! Gemini narrative engine.
//!
//! Talks to the `generateContent` REST endpoint directly over reqwest and
//! pulls the first candidate's text out of the response.

use async_trait::async_trait;

use super::{NarrativeEngine, NarrativeError, NarratorSettings};

#[derive(Clone)]
pub struct GeminiEngine {
    client: reqwest::Client,
    settings: NarratorSettings,
}

impl std::fmt::Debug for GeminiEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The API key stays out of debug output.
        f.debug_struct("GeminiEngine")
            .field("base_url", &self.settings.base_url)
            .field("model", &self.settings.model)
            .finish_non_exhaustive()
    }
}

impl GeminiEngine {
    #[must_use]
    pub fn new(settings: NarratorSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    /// Whether an API key is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.settings.api_key.is_some()
    }

    fn endpoint(&self, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model,
            api_key
        )
    }
}

#[async_trait]
impl NarrativeEngine for GeminiEngine {
    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or_else(|| NarrativeError::NotConfigured("Gemini API key missing".to_string()))?;

        let body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .client
            .post(self.endpoint(api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| NarrativeError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Provider { status, body });
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| NarrativeError::MalformedResponse(e.to_string()))?;

        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| {
                NarrativeError::MalformedResponse("response carries no candidate text".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(api_key: Option<&str>) -> GeminiEngine {
        GeminiEngine::new(NarratorSettings {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: api_key.map(ToString::to_string),
            model: "gemini-1.5-flash".to_string(),
        })
    }

    #[test]
    fn test_is_configured_tracks_api_key_presence() {
        assert!(engine(Some("key")).is_configured());
        assert!(!engine(None).is_configured());
    }

    #[test]
    fn test_endpoint_shape() {
        let url = engine(Some("secret")).endpoint("secret");
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent?key=secret"
        );
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let mut e = engine(Some("k"));
        e.settings.base_url = "https://example.test/".to_string();
        assert!(e.endpoint("k").starts_with("https://example.test/v1beta/"));
    }

    #[tokio::test]
    async fn test_generate_without_key_reports_not_configured() {
        let err = engine(None).generate("hello").await.unwrap_err();
        assert!(matches!(err, NarrativeError::NotConfigured(_)));
    }

    #[test]
    fn test_debug_output_hides_the_api_key() {
        let rendered = format!("{:?}", engine(Some("super-secret")));
        assert!(!rendered.contains("super-secret"));
    }
}
