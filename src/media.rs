//! Media storage collaborator.
//!
//! Uploads are proxied straight through to Cloudinary's unsigned upload
//! endpoint; the service keeps only the returned CDN URLs, never the bytes.
//! Images and videos use different resource endpoints, selected from the
//! declared content type.

use serde::{Deserialize, Serialize};

/// Per-file upload cap (50 MB).
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Cap on one whole upload request (100 MB).
pub const MAX_TOTAL_SIZE: usize = 100 * 1024 * 1024;

/// Maximum number of files accepted in one upload request.
pub const MAX_FILES: usize = 10;

/// Settings for the Cloudinary collaborator.
#[derive(Debug, Clone)]
pub struct CloudinarySettings {
    /// Without a cloud name the collaborator is unconfigured and uploads
    /// are refused.
    pub cloud_name: Option<String>,
    pub upload_preset: String,
}

/// Errors from the media collaborator.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media storage not configured: {0}")]
    NotConfigured(String),
    #[error("unsupported media type: {0}")]
    UnsupportedType(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("upload rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Cloudinary resource endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Video,
}

impl ResourceKind {
    /// Pick the endpoint from a MIME type. Anything that is neither image
    /// nor video is refused before any bytes leave the process.
    pub fn from_content_type(content_type: &str) -> Result<Self, MediaError> {
        if content_type.starts_with("image/") {
            Ok(Self::Image)
        } else if content_type.starts_with("video/") {
            Ok(Self::Video)
        } else {
            Err(MediaError::UnsupportedType(content_type.to_string()))
        }
    }

    fn path_segment(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// A stored asset as reported back by the CDN.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
    pub resource_type: ResourceKind,
}

/// Client for Cloudinary unsigned uploads.
#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    client: reqwest::Client,
    settings: CloudinarySettings,
}

impl CloudinaryClient {
    const API_BASE: &'static str = "https://api.cloudinary.com/v1_1";

    #[must_use]
    pub fn new(settings: CloudinarySettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    /// Whether a cloud name is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.settings.cloud_name.is_some()
    }

    fn upload_url(&self, cloud_name: &str, kind: ResourceKind) -> String {
        format!("{}/{}/{}/upload", Self::API_BASE, cloud_name, kind.path_segment())
    }

    /// Upload one file and return its CDN coordinates.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedMedia, MediaError> {
        let cloud_name = self.settings.cloud_name.as_deref().ok_or_else(|| {
            MediaError::NotConfigured("CLOUDINARY_CLOUD_NAME missing".to_string())
        })?;
        let kind = ResourceKind::from_content_type(content_type)?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| MediaError::UnsupportedType(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("upload_preset", self.settings.upload_preset.clone())
            .part("file", part);

        let response = self
            .client
            .post(self.upload_url(cloud_name, kind))
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MediaError::Http(e.to_string()))?;

        let url = payload["secure_url"].as_str().unwrap_or_default().to_string();
        let public_id = payload["public_id"].as_str().unwrap_or_default().to_string();
        if url.is_empty() {
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                body: "response missing secure_url".to_string(),
            });
        }

        Ok(UploadedMedia {
            url,
            public_id,
            resource_type: kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_routing() {
        assert_eq!(ResourceKind::from_content_type("image/jpeg").unwrap(), ResourceKind::Image);
        assert_eq!(ResourceKind::from_content_type("image/png").unwrap(), ResourceKind::Image);
        assert_eq!(ResourceKind::from_content_type("video/mp4").unwrap(), ResourceKind::Video);
        assert!(matches!(
            ResourceKind::from_content_type("application/pdf"),
            Err(MediaError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_upload_url_picks_the_resource_segment() {
        let client = CloudinaryClient::new(CloudinarySettings {
            cloud_name: Some("demo".to_string()),
            upload_preset: "ml_default".to_string(),
        });

        assert_eq!(
            client.upload_url("demo", ResourceKind::Image),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
        assert_eq!(
            client.upload_url("demo", ResourceKind::Video),
            "https://api.cloudinary.com/v1_1/demo/video/upload"
        );
    }

    #[tokio::test]
    async fn test_upload_without_cloud_name_is_refused_locally() {
        let client = CloudinaryClient::new(CloudinarySettings {
            cloud_name: None,
            upload_preset: "ml_default".to_string(),
        });

        let err = client
            .upload("photo.jpg", "image/jpeg", vec![1, 2, 3])
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::NotConfigured(_)));
    }

    #[test]
    fn test_uploaded_media_serializes_camel_case() {
        let media = UploadedMedia {
            url: "https://res.cloudinary.com/demo/x.jpg".to_string(),
            public_id: "x".to_string(),
            resource_type: ResourceKind::Image,
        };

        let json = serde_json::to_value(&media).unwrap();
        assert_eq!(json["publicId"], "x");
        assert_eq!(json["resourceType"], "image");
    }
}
