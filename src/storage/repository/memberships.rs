// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Club membership repository.
//!
//! A membership links one user to one club and is unique per
//! `(club_id, user_id)`. Permission flags are never taken from callers: every
//! write re-derives them from the role (see [`crate::storage::invariants`]).
//!
//! ## Status transitions
//!
//! ```text
//! pending  --approve--> active
//! pending  --reject---> (deleted)
//! active   --leave----> inactive
//! inactive --join-----> active
//! ```

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{
    load, load_all, put, ClubDatabase, StoreError, StoreResult, CLUBS, MEMBERSHIPS,
};
use super::super::invariants::{self, PermissionFlags};
use super::distinct_ids;
use crate::auth::{AdminMembershipLookup, AuthenticatedUser};

/// Role of a user inside a club.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClubRole {
    /// Club admin
    Admin,
    Moderator,
    EventManager,
    #[default]
    Member,
}

/// Membership status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    #[default]
    Active,
    Inactive,
    /// Pending approval
    Pending,
}

/// Membership record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClubMembership {
    /// Unique membership identifier (UUID)
    pub id: String,
    pub club_id: String,
    pub user_id: String,
    pub role: ClubRole,
    pub status: MembershipStatus,
    /// Role-derived permission flags
    #[serde(flatten)]
    pub permissions: PermissionFlags,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClubMembership {
    pub fn new(
        club_id: impl Into<String>,
        user_id: impl Into<String>,
        role: ClubRole,
        status: MembershipStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            club_id: club_id.into(),
            user_id: user_id.into(),
            role,
            status,
            permissions: invariants::derive_flags(role),
            joined_at: now,
            updated_at: now,
        }
    }

    /// Active membership with the admin role.
    pub fn is_active_admin(&self) -> bool {
        self.role == ClubRole::Admin && self.status == MembershipStatus::Active
    }
}

/// Query filters for membership listings.
#[derive(Debug, Clone, Default)]
pub struct MembershipFilter {
    pub club_id: Option<String>,
    pub user_id: Option<String>,
    pub role: Option<ClubRole>,
    pub status: Option<MembershipStatus>,
}

impl MembershipFilter {
    fn matches(&self, m: &ClubMembership) -> bool {
        self.club_id.as_deref().is_none_or(|c| c == m.club_id)
            && self.user_id.as_deref().is_none_or(|u| u == m.user_id)
            && self.role.is_none_or(|r| r == m.role)
            && self.status.is_none_or(|s| s == m.status)
    }
}

/// Outcome of a join request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A new admin membership was created
    Created(ClubMembership),
    /// An inactive or pending membership was reactivated
    Reactivated(ClubMembership),
}

impl JoinOutcome {
    pub fn membership(&self) -> &ClubMembership {
        match self {
            JoinOutcome::Created(m) | JoinOutcome::Reactivated(m) => m,
        }
    }

    pub fn into_membership(self) -> ClubMembership {
        match self {
            JoinOutcome::Created(m) | JoinOutcome::Reactivated(m) => m,
        }
    }
}

fn newest_first(memberships: &mut [ClubMembership]) {
    memberships.sort_by(|a, b| b.joined_at.cmp(&a.joined_at).then_with(|| a.id.cmp(&b.id)));
}

/// Persist a membership after running the role hook.
fn write_membership(
    table: &mut redb::Table<'_, &'static str, &'static [u8]>,
    membership: &mut ClubMembership,
) -> StoreResult<()> {
    invariants::on_membership_write(membership);
    put(table, &membership.id, membership)
}

/// Repository for membership operations.
pub struct MembershipRepository<'a> {
    db: &'a ClubDatabase,
}

impl<'a> MembershipRepository<'a> {
    /// Create a new MembershipRepository.
    pub fn new(db: &'a ClubDatabase) -> Self {
        Self { db }
    }

    /// Get a membership by ID.
    pub fn get(&self, membership_id: &str) -> StoreResult<ClubMembership> {
        self.db
            .read(|txn| load(&txn.open_table(MEMBERSHIPS)?, membership_id))?
            .ok_or_else(|| StoreError::NotFound(format!("Membership {membership_id}")))
    }

    /// List memberships matching a filter, newest first.
    pub fn list(&self, filter: &MembershipFilter) -> StoreResult<Vec<ClubMembership>> {
        let all: Vec<ClubMembership> = self.db.read(|txn| load_all(&txn.open_table(MEMBERSHIPS)?))?;
        let mut matching: Vec<ClubMembership> =
            all.into_iter().filter(|m| filter.matches(m)).collect();
        newest_first(&mut matching);
        Ok(matching)
    }

    /// Find the membership of a user in a club, whatever its status.
    pub fn find(&self, club_id: &str, user_id: &str) -> StoreResult<Option<ClubMembership>> {
        Ok(self
            .list(&MembershipFilter {
                club_id: Some(club_id.to_string()),
                user_id: Some(user_id.to_string()),
                ..Default::default()
            })?
            .into_iter()
            .next())
    }

    /// Active members of a club, newest first.
    pub fn active_members(&self, club_id: &str) -> StoreResult<Vec<ClubMembership>> {
        self.list(&MembershipFilter {
            club_id: Some(club_id.to_string()),
            status: Some(MembershipStatus::Active),
            ..Default::default()
        })
    }

    /// Number of active members of a club.
    pub fn count_active(&self, club_id: &str) -> StoreResult<usize> {
        Ok(self.active_members(club_id)?.len())
    }

    /// Active memberships of a user, optionally restricted to the admin role.
    pub fn active_for_user(
        &self,
        user_id: &str,
        admins_only: bool,
    ) -> StoreResult<Vec<ClubMembership>> {
        self.list(&MembershipFilter {
            user_id: Some(user_id.to_string()),
            status: Some(MembershipStatus::Active),
            role: admins_only.then_some(ClubRole::Admin),
            ..Default::default()
        })
    }

    /// Create or update a membership.
    ///
    /// The club must exist and the `(club, user)` pair must be unique.
    /// Permission flags are re-derived from the role.
    pub fn save(&self, mut membership: ClubMembership) -> StoreResult<ClubMembership> {
        self.db.write(|txn| {
            let clubs = txn.open_table(CLUBS)?;
            if clubs.get(membership.club_id.as_str())?.is_none() {
                return Err(StoreError::Validation(format!(
                    "club {} does not exist",
                    membership.club_id
                )));
            }

            let mut table = txn.open_table(MEMBERSHIPS)?;
            let existing: Vec<ClubMembership> = load_all(&table)?;
            if existing.iter().any(|m| {
                m.id != membership.id
                    && m.club_id == membership.club_id
                    && m.user_id == membership.user_id
            }) {
                return Err(StoreError::Validation(
                    "membership with this club and user already exists".into(),
                ));
            }

            write_membership(&mut table, &mut membership)
        })?;
        Ok(membership)
    }

    /// Delete a membership.
    pub fn delete(&self, membership_id: &str) -> StoreResult<()> {
        self.db.write(|txn| {
            let mut table = txn.open_table(MEMBERSHIPS)?;
            if table.remove(membership_id)?.is_none() {
                return Err(StoreError::NotFound(format!("Membership {membership_id}")));
            }
            Ok(())
        })
    }

    /// Apply `mutate` to every listed membership in one transaction.
    ///
    /// Flags are re-derived for each updated record. Unknown IDs are skipped.
    pub fn update_matching<F>(&self, membership_ids: &[String], mut mutate: F) -> StoreResult<usize>
    where
        F: FnMut(&mut ClubMembership),
    {
        self.db.write(|txn| {
            let mut table = txn.open_table(MEMBERSHIPS)?;
            let mut updated = 0usize;
            for membership_id in distinct_ids(membership_ids) {
                let Some(mut membership) = load::<ClubMembership, _>(&table, membership_id)? else {
                    continue;
                };
                mutate(&mut membership);
                write_membership(&mut table, &mut membership)?;
                updated += 1;
            }
            Ok(updated)
        })
    }

    /// Join a club as the given actor.
    ///
    /// Only staff and superusers may join. An inactive or pending membership
    /// is reactivated; otherwise a new active admin membership is created.
    pub fn join(&self, actor: &AuthenticatedUser, club_id: &str) -> StoreResult<JoinOutcome> {
        if !actor.bypasses_club_policy() {
            return Err(StoreError::Forbidden(
                "Only staff users can join clubs through this interface".into(),
            ));
        }

        let outcome = self.db.write(|txn| {
            let clubs = txn.open_table(CLUBS)?;
            if clubs.get(club_id)?.is_none() {
                return Err(StoreError::NotFound(format!("Club {club_id}")));
            }

            let mut table = txn.open_table(MEMBERSHIPS)?;
            let existing: Vec<ClubMembership> = load_all(&table)?;
            let current = existing
                .into_iter()
                .find(|m| m.club_id == club_id && m.user_id == actor.user_id);

            match current {
                Some(m) if m.status == MembershipStatus::Active => Err(StoreError::AlreadyMember),
                Some(mut m) => {
                    m.status = MembershipStatus::Active;
                    write_membership(&mut table, &mut m)?;
                    Ok(JoinOutcome::Reactivated(m))
                }
                None => {
                    let mut m = ClubMembership::new(
                        club_id,
                        &actor.user_id,
                        ClubRole::Admin,
                        MembershipStatus::Active,
                    );
                    write_membership(&mut table, &mut m)?;
                    Ok(JoinOutcome::Created(m))
                }
            }
        })?;

        tracing::info!(
            club_id = %club_id,
            user_id = %actor.user_id,
            reactivated = matches!(outcome, JoinOutcome::Reactivated(_)),
            "User joined club"
        );
        Ok(outcome)
    }

    /// Leave a club: the actor's active membership becomes inactive.
    pub fn leave(&self, actor: &AuthenticatedUser, club_id: &str) -> StoreResult<ClubMembership> {
        let membership = self.db.write(|txn| {
            let mut table = txn.open_table(MEMBERSHIPS)?;
            let existing: Vec<ClubMembership> = load_all(&table)?;
            let mut membership = existing
                .into_iter()
                .find(|m| {
                    m.club_id == club_id
                        && m.user_id == actor.user_id
                        && m.status == MembershipStatus::Active
                })
                .ok_or(StoreError::NotAMember)?;

            membership.status = MembershipStatus::Inactive;
            write_membership(&mut table, &mut membership)?;
            Ok(membership)
        })?;

        tracing::info!(club_id = %club_id, user_id = %actor.user_id, "User left club");
        Ok(membership)
    }

    /// Approve a pending membership.
    pub fn approve(&self, membership_id: &str) -> StoreResult<ClubMembership> {
        self.db.write(|txn| {
            let mut table = txn.open_table(MEMBERSHIPS)?;
            let mut membership: ClubMembership = load(&table, membership_id)?
                .ok_or_else(|| StoreError::NotFound(format!("Membership {membership_id}")))?;

            if membership.status != MembershipStatus::Pending {
                return Err(StoreError::NotPending);
            }
            membership.status = MembershipStatus::Active;
            write_membership(&mut table, &mut membership)?;
            Ok(membership)
        })
    }

    /// Reject a pending membership, deleting the record.
    pub fn reject(&self, membership_id: &str) -> StoreResult<ClubMembership> {
        self.db.write(|txn| {
            let mut table = txn.open_table(MEMBERSHIPS)?;
            let membership: ClubMembership = load(&table, membership_id)?
                .ok_or_else(|| StoreError::NotFound(format!("Membership {membership_id}")))?;

            if membership.status != MembershipStatus::Pending {
                return Err(StoreError::NotPending);
            }
            table.remove(membership_id)?;
            Ok(membership)
        })
    }
}

impl AdminMembershipLookup for MembershipRepository<'_> {
    fn has_any_active_admin_membership(&self, user_id: &str) -> StoreResult<bool> {
        Ok(!self.active_for_user(user_id, true)?.is_empty())
    }

    fn is_active_admin_of(&self, user_id: &str, club_id: &str) -> StoreResult<bool> {
        Ok(self
            .find(club_id, user_id)?
            .is_some_and(|m| m.is_active_admin()))
    }

    fn active_admin_membership_count(&self, user_id: &str) -> StoreResult<usize> {
        Ok(self.active_for_user(user_id, true)?.len())
    }
}
