//! Signed-in users and their profile documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;

/// The user currently signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Identity provider account id.
    pub uid: String,
    /// Account email, also the profile document key.
    pub email: Email,
    /// Name shown in the navigation bar.
    pub display_name: Option<String>,
    /// Profile photo as a data URL.
    pub photo: Option<String>,
}

impl AuthUser {
    /// The name to greet the user with: display name, else the email.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.email.as_str())
    }
}

/// A `users/{email}` profile document.
///
/// Field names follow the document store's camelCase convention. Every field
/// except `email` is optional because profiles are written piecemeal: sign-up
/// stores the registration fields, later profile edits merge in the display
/// name and photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Date of birth as entered (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// An otherwise empty profile for `email`.
    #[must_use]
    pub const fn new(email: Email) -> Self {
        Self {
            email,
            uid: None,
            display_name: None,
            photo: None,
            first_name: None,
            last_name: None,
            gender: None,
            dob: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_uses_camel_case() {
        let mut profile = UserProfile::new(Email::parse("a@b.co").unwrap());
        profile.display_name = Some("Ada".to_string());
        profile.first_name = Some("Ada".to_string());

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["displayName"], "Ada");
        assert_eq!(json["firstName"], "Ada");
        assert!(json.get("photo").is_none());
    }

    #[test]
    fn test_profile_tolerates_missing_fields() {
        let profile: UserProfile =
            serde_json::from_value(serde_json::json!({ "email": "x@y.io" })).unwrap();
        assert_eq!(profile.email.as_str(), "x@y.io");
        assert!(profile.display_name.is_none());
    }

    #[test]
    fn test_greeting_name_falls_back_to_email() {
        let user = AuthUser {
            uid: "u1".to_string(),
            email: Email::parse("x@y.io").unwrap(),
            display_name: Some(String::new()),
            photo: None,
        };
        assert_eq!(user.greeting_name(), "x@y.io");
    }
}
