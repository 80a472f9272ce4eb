// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::JwksManager;
use crate::storage::ClubDatabase;

/// How bearer tokens are verified.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// JWKS source for asymmetric tokens
    pub jwks: Option<JwksManager>,
    /// Shared HS256 secret
    pub jwt_secret: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<ClubDatabase>,
    pub auth_config: AuthConfig,
}

impl AppState {
    pub fn new(db: ClubDatabase) -> Self {
        Self {
            db: Arc::new(db),
            auth_config: AuthConfig::default(),
        }
    }

    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = auth_config;
        self
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::auth::{AuthenticatedUser, PlatformRole};
    use tempfile::TempDir;

    pub const TEST_SECRET: &str = "test-secret";

    /// Fresh state over a temporary database, verifying HS256 tokens.
    pub fn test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = ClubDatabase::open(&temp_dir.path().join("clubs.redb")).unwrap();
        let state = AppState::new(db).with_auth_config(AuthConfig {
            jwt_secret: Some(TEST_SECRET.to_string()),
            ..Default::default()
        });
        (state, temp_dir)
    }

    pub fn user(user_id: &str, role: PlatformRole) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: user_id.to_string(),
            role,
            session_id: None,
            issuer: "test".to_string(),
            expires_at: 0,
        }
    }
}
