//! Authorization at the API boundary.
//!
//! The core never carries an allow-list of its own; callers inject an
//! [`AuthPolicy`] capability and handlers check it per request.

use crate::config::Config;
use crate::domain::MemberId;
use crate::error::AppError;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use std::collections::HashMap;

/// Capability check injected at the boundary.
pub trait AuthPolicy: Send + Sync {
    /// Resolve a bearer token to the member it authenticates, if any.
    fn member_for(&self, bearer: &str) -> Option<MemberId>;

    /// Whether the bearer token carries admin capability.
    fn is_admin(&self, bearer: &str) -> bool;
}

/// Config-backed policy: member tokens and the admin token come from the
/// environment, not from anything compiled into the core.
pub struct StaticTokenPolicy {
    members: HashMap<String, MemberId>,
    admin_token: String,
}

impl StaticTokenPolicy {
    pub fn from_config(config: &Config) -> Self {
        let members = config
            .member_tokens
            .iter()
            .map(|(token, member)| (token.clone(), MemberId::new(member.clone())))
            .collect();
        Self {
            members,
            admin_token: config.admin_token.clone(),
        }
    }
}

impl AuthPolicy for StaticTokenPolicy {
    fn member_for(&self, bearer: &str) -> Option<MemberId> {
        self.members.get(bearer).cloned()
    }

    fn is_admin(&self, bearer: &str) -> bool {
        !self.admin_token.is_empty() && bearer == self.admin_token
    }
}

/// Extract the bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Authenticate the calling member or fail with 401.
pub fn require_member(policy: &dyn AuthPolicy, headers: &HeaderMap) -> Result<MemberId, AppError> {
    bearer_token(headers)
        .and_then(|t| policy.member_for(t))
        .ok_or_else(|| AppError::Unauthorized("member authentication required".to_string()))
}

/// Require admin capability or fail with 401.
pub fn require_admin(policy: &dyn AuthPolicy, headers: &HeaderMap) -> Result<(), AppError> {
    match bearer_token(headers) {
        Some(t) if policy.is_admin(t) => Ok(()),
        _ => Err(AppError::Unauthorized(
            "admin authentication required".to_string(),
        )),
    }
}
