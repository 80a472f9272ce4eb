// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Club access policy.
//!
//! Access is decided in two steps, composed by [`authorize`]:
//!
//! 1. [`has_permission`] (view level), checked for every club request
//! 2. [`has_object_permission`] (object level), checked when a single club is
//!    targeted
//!
//! ## View-level rules (first match wins)
//!
//! | Actor | Action | Result |
//! |-------|--------|--------|
//! | anonymous | any | deny |
//! | staff / superuser | any | allow |
//! | user | `list`, `retrieve`, `my_clubs` | allow iff active admin of *any* club |
//! | user | `create`, `update`, `partial_update`, `destroy` | deny |
//! | user | anything else | deny |
//!
//! The view-level membership check is global while the object-level check is
//! scoped to the targeted club, so an admin of club X passes `retrieve` at the
//! view level for club Y and is then denied by the object check.

use std::fmt;

use super::AuthenticatedUser;
use crate::storage::{Club, StoreResult};

/// Actions on the club resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClubAction {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
    MyClubs,
    Events,
    Members,
    Join,
    Leave,
    CheckAdminAccess,
}

impl fmt::Display for ClubAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClubAction::List => "list",
            ClubAction::Retrieve => "retrieve",
            ClubAction::Create => "create",
            ClubAction::Update => "update",
            ClubAction::PartialUpdate => "partial_update",
            ClubAction::Destroy => "destroy",
            ClubAction::MyClubs => "my_clubs",
            ClubAction::Events => "events",
            ClubAction::Members => "members",
            ClubAction::Join => "join",
            ClubAction::Leave => "leave",
            ClubAction::CheckAdminAccess => "check_admin_access",
        };
        f.write_str(name)
    }
}

/// Membership queries the policy depends on.
pub trait AdminMembershipLookup {
    /// Whether the user is an active admin of at least one club.
    fn has_any_active_admin_membership(&self, user_id: &str) -> StoreResult<bool>;

    /// Whether the user is an active admin of the given club.
    fn is_active_admin_of(&self, user_id: &str, club_id: &str) -> StoreResult<bool>;

    /// Number of clubs the user actively administers.
    fn active_admin_membership_count(&self, user_id: &str) -> StoreResult<usize>;
}

/// View-level check.
pub fn has_permission<L: AdminMembershipLookup + ?Sized>(
    actor: Option<&AuthenticatedUser>,
    action: ClubAction,
    lookup: &L,
) -> StoreResult<bool> {
    let Some(actor) = actor else {
        return Ok(false);
    };
    if actor.bypasses_club_policy() {
        return Ok(true);
    }
    match action {
        ClubAction::List | ClubAction::Retrieve | ClubAction::MyClubs => {
            lookup.has_any_active_admin_membership(&actor.user_id)
        }
        _ => Ok(false),
    }
}

/// Object-level check for a single club.
pub fn has_object_permission<L: AdminMembershipLookup + ?Sized>(
    actor: Option<&AuthenticatedUser>,
    club: &Club,
    lookup: &L,
) -> StoreResult<bool> {
    let Some(actor) = actor else {
        return Ok(false);
    };
    if actor.bypasses_club_policy() {
        return Ok(true);
    }
    lookup.is_active_admin_of(&actor.user_id, &club.id)
}

/// View-level check, then the object check when a club is targeted.
pub fn authorize<L: AdminMembershipLookup + ?Sized>(
    actor: Option<&AuthenticatedUser>,
    action: ClubAction,
    target: Option<&Club>,
    lookup: &L,
) -> StoreResult<bool> {
    if !has_permission(actor, action, lookup)? {
        return Ok(false);
    }
    match target {
        Some(club) => has_object_permission(actor, club, lookup),
        None => Ok(true),
    }
}
