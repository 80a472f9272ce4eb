// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Platform roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Platform-wide role carried in the token's public metadata.
///
/// ## Role Hierarchy
///
/// - `Superuser` - Everything staff can do; implies staff
/// - `Staff` - Bypasses club-level policy, manages memberships and settings
/// - `User` - Regular user; club access depends on club memberships
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlatformRole {
    Superuser,
    Staff,
    /// Least privilege for authenticated users
    #[default]
    User,
}

impl PlatformRole {
    /// Staff flag (superusers are staff).
    pub fn is_staff(&self) -> bool {
        matches!(self, PlatformRole::Staff | PlatformRole::Superuser)
    }

    pub fn is_superuser(&self) -> bool {
        *self == PlatformRole::Superuser
    }

    /// Parse role from string (case-insensitive).
    pub fn parse(s: &str) -> Option<PlatformRole> {
        match s.to_lowercase().as_str() {
            "superuser" => Some(PlatformRole::Superuser),
            "staff" => Some(PlatformRole::Staff),
            "user" => Some(PlatformRole::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlatformRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformRole::Superuser => write!(f, "superuser"),
            PlatformRole::Staff => write!(f, "staff"),
            PlatformRole::User => write!(f, "user"),
        }
    }
}
