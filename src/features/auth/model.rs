use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity supplied by the identity provider for the current request.
///
/// The core trusts this identity; `sub` is used as the user id everywhere.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    /// Display name, falling back to the local part of the email.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Citizen".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomClaims {
    #[serde(default)]
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: Option<&str>, email: Option<&str>) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "u-1".to_string(),
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            roles: vec![],
        }
    }

    #[test]
    fn test_display_name_prefers_name() {
        assert_eq!(user(Some("Asha"), Some("a@x.in")).display_name(), "Asha");
    }

    #[test]
    fn test_display_name_falls_back_to_email_then_default() {
        assert_eq!(user(Some("  "), Some("ravi@x.in")).display_name(), "ravi");
        assert_eq!(user(None, None).display_name(), "Citizen");
    }
}
