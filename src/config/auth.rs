//! Access gate configuration

use http::HeaderName;
use serde::Deserialize;

use super::error::ValidationError;

/// Who may use the planner.
///
/// With both lists empty the gate is open to everyone.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Allowed email addresses (comma-separated)
    pub authorized_emails: Option<String>,

    /// Allowed email domains (comma-separated)
    pub authorized_domains: Option<String>,

    /// Request header carrying the caller's email
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
}

impl AuthConfig {
    pub fn emails(&self) -> Vec<String> {
        split_list(self.authorized_emails.as_deref())
    }

    pub fn domains(&self) -> Vec<String> {
        split_list(self.authorized_domains.as_deref())
    }

    /// True when no allow-list is configured.
    pub fn is_open(&self) -> bool {
        self.emails().is_empty() && self.domains().is_empty()
    }

    /// Validate access gate configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if HeaderName::from_bytes(self.identity_header.as_bytes()).is_err() {
            return Err(ValidationError::InvalidIdentityHeader(
                self.identity_header.clone(),
            ));
        }
        if let Some(bad) = self.emails().into_iter().find(|e| !e.contains('@')) {
            return Err(ValidationError::InvalidAuthorizedEmail(bad));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            authorized_emails: None,
            authorized_domains: None,
            identity_header: default_identity_header(),
        }
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn default_identity_header() -> String {
    "x-user-email".to_string()
}
