// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Write hooks that keep stored records consistent.
//!
//! Repositories call these before every insert or update, inside the write
//! transaction that persists the record:
//!
//! - [`on_membership_write`]: permission flags always match the role
//! - [`on_club_write`]: at most one club has `is_default == true`

use chrono::Utc;
use redb::Table;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::database::{load_all, put, StoreResult};
use super::repository::{Club, ClubMembership, ClubRole};

/// Capabilities granted by a membership role.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PermissionFlags {
    pub can_create_events: bool,
    pub can_manage_members: bool,
    pub can_manage_payments: bool,
    pub can_view_analytics: bool,
}

/// Permission flags for a role.
///
/// | role          | events | members | payments | analytics |
/// |---------------|--------|---------|----------|-----------|
/// | admin         | yes    | yes     | yes      | yes       |
/// | moderator     | yes    | yes     | no       | yes       |
/// | event_manager | yes    | no      | no       | yes       |
/// | member        | no     | no      | no       | no        |
pub fn derive_flags(role: ClubRole) -> PermissionFlags {
    match role {
        ClubRole::Admin => PermissionFlags {
            can_create_events: true,
            can_manage_members: true,
            can_manage_payments: true,
            can_view_analytics: true,
        },
        ClubRole::Moderator => PermissionFlags {
            can_create_events: true,
            can_manage_members: true,
            can_manage_payments: false,
            can_view_analytics: true,
        },
        ClubRole::EventManager => PermissionFlags {
            can_create_events: true,
            can_manage_members: false,
            can_manage_payments: false,
            can_view_analytics: true,
        },
        ClubRole::Member => PermissionFlags::default(),
    }
}

/// Overwrite a membership's flags from its role and bump `updated_at`.
pub fn on_membership_write(membership: &mut ClubMembership) {
    membership.permissions = derive_flags(membership.role);
    membership.updated_at = Utc::now();
}

/// Clear `is_default` on every other club when `club` is the default.
///
/// Returns the number of clubs that lost the flag.
pub fn on_club_write(
    table: &mut Table<'_, &'static str, &'static [u8]>,
    club: &Club,
) -> StoreResult<usize> {
    if !club.is_default {
        return Ok(0);
    }

    let others: Vec<Club> = load_all(&*table)?;
    let mut cleared = 0usize;
    for mut other in others
        .into_iter()
        .filter(|c| c.is_default && c.id != club.id)
    {
        other.is_default = false;
        other.updated_at = Utc::now();
        put(table, &other.id, &other)?;
        cleared += 1;
    }
    Ok(cleared)
}
