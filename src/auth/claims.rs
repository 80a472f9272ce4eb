// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::PlatformRole;

/// Claims read from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub exp: i64,
    #[serde(default)]
    pub iss: String,
    /// Session ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Audience (validated by jsonwebtoken, not read directly)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
    /// Public metadata containing the platform role
    #[serde(
        default,
        rename = "publicMetadata",
        skip_serializing_if = "Option::is_none"
    )]
    pub public_metadata: Option<PublicMetadata>,
}

/// Public metadata attached to the user.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PublicMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Authenticated user information extracted from JWT.
///
/// This is the primary type used throughout the application to represent
/// the actor making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user ID (`sub` claim)
    pub user_id: String,

    /// Platform role
    pub role: PlatformRole,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Token issuer (not serialized)
    #[serde(skip)]
    pub issuer: String,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Build from verified claims. Unknown or missing roles map to `User`.
    pub fn from_claims(claims: TokenClaims) -> Self {
        let role = claims
            .public_metadata
            .as_ref()
            .and_then(|m| m.role.as_deref())
            .and_then(PlatformRole::parse)
            .unwrap_or_default();

        Self {
            user_id: claims.sub,
            role,
            session_id: claims.sid,
            issuer: claims.iss,
            expires_at: claims.exp,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn is_superuser(&self) -> bool {
        self.role.is_superuser()
    }

    /// Staff and superusers skip club-level access checks.
    pub fn bypasses_club_policy(&self) -> bool {
        self.is_staff() || self.is_superuser()
    }
}
