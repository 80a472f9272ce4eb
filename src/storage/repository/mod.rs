// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the club database.
//!
//! Each repository provides CRUD operations for a specific entity type and
//! runs every multi-step write inside a single redb write transaction.

pub mod choices;
pub mod clubs;
pub mod events;
pub mod memberships;
pub mod settings;

pub use choices::{
    Choice, ChoiceEntry, ChoiceKind, ChoiceRepository, Department, DepartmentCategory, Year,
};
pub use clubs::{slugify, Club, ClubFilter, ClubRepository, ClubStatus, ClubType, PaymentGateway};
pub use events::{ClubEvent, EventRepository};
pub use memberships::{
    ClubMembership, ClubRole, JoinOutcome, MembershipFilter, MembershipRepository,
    MembershipStatus,
};
pub use settings::{ClubSettings, SettingsRepository};

/// IDs of a bulk selection with repeats removed, in first-seen order.
pub(crate) fn distinct_ids(ids: &[String]) -> Vec<&str> {
    let mut unique: Vec<&str> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id.as_str()) {
            unique.push(id);
        }
    }
    unique
}
