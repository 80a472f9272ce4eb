// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Startup seeding: the default club and the year/department choices.
//!
//! Both operations are idempotent and safe to run on every start.

use crate::storage::{
    slugify, ChoiceRepository, Club, ClubDatabase, ClubMembership, ClubRepository, ClubRole,
    ClubStatus, ClubType, MembershipRepository, MembershipStatus, PaymentGateway,
    SettingsRepository, StoreResult,
};

/// What [`setup_default_club`] did.
#[derive(Debug)]
pub struct DefaultClubSetup {
    pub club: Club,
    pub club_created: bool,
    pub settings_created: bool,
    pub admin_added: bool,
}

/// Get or create the default club, its settings and optionally an admin.
///
/// An existing club with the same name is reused as is.
pub fn setup_default_club(
    db: &ClubDatabase,
    name: &str,
    email: &str,
    admin_user_id: Option<&str>,
) -> StoreResult<DefaultClubSetup> {
    let clubs = ClubRepository::new(db);
    let (club, club_created) = match clubs.find_by_name(name)? {
        Some(club) => (club, false),
        None => {
            let mut club = Club::new(name, slugify(name), email);
            club.description = format!("Default club for {name}");
            club.club_type = ClubType::Technical;
            club.status = ClubStatus::Active;
            club.is_default = true;
            club.payment_gateway = PaymentGateway::Cashfree;
            (clubs.save(club)?, true)
        }
    };

    let (_, settings_created) = SettingsRepository::new(db).get_or_create(&club.id, |s| {
        s.email_signature = format!("Best regards,\n{name} Team");
    })?;

    let mut admin_added = false;
    if let Some(user_id) = admin_user_id {
        let memberships = MembershipRepository::new(db);
        if memberships.find(&club.id, user_id)?.is_none() {
            memberships.save(ClubMembership::new(
                &club.id,
                user_id,
                ClubRole::Admin,
                MembershipStatus::Active,
            ))?;
            admin_added = true;
        }
    }

    tracing::info!(
        club_id = %club.id,
        slug = %club.slug,
        club_created,
        settings_created,
        admin_added,
        "Default club ready"
    );
    Ok(DefaultClubSetup {
        club,
        club_created,
        settings_created,
        admin_added,
    })
}

/// Insert the default years and departments, optionally clearing first.
pub fn populate_default_choices(db: &ClubDatabase, clear: bool) -> StoreResult<(usize, usize)> {
    let (years, departments) = ChoiceRepository::new(db).populate_defaults(clear)?;
    tracing::info!(years, departments, clear, "Default choices populated");
    Ok((years, departments))
}
