use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geotagged place attached to a memory.
///
/// Coordinates are WGS84 decimal degrees. `address` is the formatted
/// address; `place_name` is the short label shown on map pins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
}

/// One dated memory entry shared by a couple.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: String,
    /// Calendar day in `YYYY-MM-DD` form. Zero-padded, so lexicographic
    /// order on the string is chronological order.
    pub date: String,
    pub title: String,
    pub caption: String,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub activity_tags: Vec<String>,
    pub couple_id: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_wire_format_is_camel_case() {
        let memory = Memory {
            id: "m1".to_string(),
            date: "2024-07-15".to_string(),
            title: "Sunset walk".to_string(),
            caption: "Marine Drive at dusk".to_string(),
            notes: vec!["bring a jacket next time".to_string()],
            image_urls: vec!["https://cdn.example/m1.jpg".to_string()],
            location: Some(Location {
                address: "Marine Drive, Mumbai".to_string(),
                lat: 18.9432,
                lng: 72.8235,
                place_id: None,
                place_name: Some("Marine Drive".to_string()),
            }),
            activity_tags: vec!["walk".to_string()],
            couple_id: "c1".to_string(),
            created_by: "u1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&memory).unwrap();
        assert!(json.get("imageUrls").is_some());
        assert!(json.get("activityTags").is_some());
        assert!(json.get("coupleId").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["location"]["placeName"], "Marine Drive");
        // snake_case must not leak onto the wire
        assert!(json.get("image_urls").is_none());
        assert!(json.get("couple_id").is_none());
    }

    #[test]
    fn test_memory_deserializes_with_missing_optional_fields() {
        let json = serde_json::json!({
            "id": "m2",
            "date": "2023-01-02",
            "title": "Quiet evening",
            "caption": "Homemade pasta",
            "coupleId": "c1",
            "createdBy": "u2",
            "createdAt": "2023-01-02T19:30:00Z",
            "updatedAt": "2023-01-02T19:30:00Z"
        });

        let memory: Memory = serde_json::from_value(json).unwrap();
        assert!(memory.notes.is_empty());
        assert!(memory.image_urls.is_empty());
        assert!(memory.location.is_none());
        assert!(memory.activity_tags.is_empty());
    }
}
