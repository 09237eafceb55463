//! Allow-list access checker.
//!
//! A caller is allowed when their email is listed, or when the domain of
//! their email is listed. With both lists empty the checker is open and
//! lets every caller through, identified or not.

use std::collections::HashSet;

use crate::domain::foundation::UserEmail;
use crate::ports::{AccessChecker, AccessError};

/// Access checker backed by configured emails and domains.
#[derive(Debug, Clone, Default)]
pub struct AllowListAccessChecker {
    emails: HashSet<String>,
    domains: HashSet<String>,
}

impl AllowListAccessChecker {
    /// Creates a checker from raw list entries.
    ///
    /// Entries are trimmed and lowercased; blank entries are skipped.
    pub fn new<E, D>(emails: E, domains: D) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Self {
            emails: normalize(emails),
            domains: normalize(domains),
        }
    }

    /// A checker that allows everyone.
    pub fn open() -> Self {
        Self::default()
    }
}

fn normalize<I>(values: I) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

impl AccessChecker for AllowListAccessChecker {
    fn check(&self, identity: Option<&str>) -> Result<Option<UserEmail>, AccessError> {
        let identity = identity.map(str::trim).filter(|s| !s.is_empty());

        let email = match identity {
            Some(raw) => Some(
                UserEmail::new(raw).map_err(|e| AccessError::InvalidIdentity(e.to_string()))?,
            ),
            None => None,
        };

        if self.is_open() {
            return Ok(email);
        }

        let email = email.ok_or(AccessError::MissingIdentity)?;
        if self.emails.contains(email.as_str()) || self.domains.contains(email.domain()) {
            Ok(Some(email))
        } else {
            Err(AccessError::NotAuthorized(email))
        }
    }

    fn is_open(&self) -> bool {
        self.emails.is_empty() && self.domains.is_empty()
    }
}
