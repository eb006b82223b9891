use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Characters allowed in invite codes. Ambiguous glyphs (I, O, 0, 1) are
/// excluded so codes survive being read aloud or typed from a screenshot.
const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a partner invite code.
pub const INVITE_CODE_LEN: usize = 6;

/// Per-user profile document, keyed by the identity provider's user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Set once the user is linked to a partner.
    #[serde(default)]
    pub couple_id: Option<String>,
    /// Outstanding invite code, if the user generated one.
    #[serde(default)]
    pub invite_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The pairing record linking exactly two user profiles.
///
/// Both emails are denormalised onto the record so partner lookups for
/// notifications need no second profile fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Couple {
    pub id: String,
    pub user_ids: [String; 2],
    pub partner1_email: String,
    pub partner2_email: String,
    pub created_at: DateTime<Utc>,
}

impl Couple {
    /// The other member of the couple, given one member's id.
    #[must_use]
    pub fn partner_of(&self, user_id: &str) -> Option<&str> {
        self.user_ids
            .iter()
            .map(String::as_str)
            .find(|id| *id != user_id)
    }
}

/// What a user is allowed to see about their partner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerInfo {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Generate a random six-character invite code.
///
/// Draws from the random bytes of a v4 UUID; 256 is an exact multiple of
/// the 32-character alphabet, so the modulo mapping stays uniform.
#[must_use]
pub fn generate_invite_code() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    bytes[..INVITE_CODE_LEN]
        .iter()
        .map(|b| INVITE_CODE_ALPHABET[usize::from(*b) % INVITE_CODE_ALPHABET.len()] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_code_shape() {
        for _ in 0..50 {
            let code = generate_invite_code();
            assert_eq!(code.len(), INVITE_CODE_LEN);
            assert!(code.bytes().all(|b| INVITE_CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_invite_code_avoids_ambiguous_characters() {
        for _ in 0..200 {
            let code = generate_invite_code();
            for forbidden in ['I', 'O', '0', '1'] {
                assert!(!code.contains(forbidden), "code {code} contains {forbidden}");
            }
        }
    }

    #[test]
    fn test_partner_of_returns_the_other_member() {
        let couple = Couple {
            id: "c1".to_string(),
            user_ids: ["alice".to_string(), "bob".to_string()],
            partner1_email: "alice@example.com".to_string(),
            partner2_email: "bob@example.com".to_string(),
            created_at: Utc::now(),
        };

        assert_eq!(couple.partner_of("alice"), Some("bob"));
        assert_eq!(couple.partner_of("bob"), Some("alice"));
    }
}
