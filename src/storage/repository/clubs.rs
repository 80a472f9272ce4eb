// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Club repository.
//!
//! Clubs are stored in the `clubs` table keyed by club ID. Name and slug are
//! unique across the table. Every save runs the default-club write hook from
//! [`crate::storage::invariants`] inside the same write transaction, so at most
//! one club carries `is_default` once the transaction commits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{
    load, load_all, put, ClubDatabase, StoreError, StoreResult, CLUBS, CLUB_EVENTS, CLUB_SETTINGS,
    MEMBERSHIPS,
};
use super::super::invariants;
use super::distinct_ids;
use super::events::ClubEvent;
use super::memberships::ClubMembership;
use super::settings::ClubSettings;

pub const DEFAULT_PRIMARY_COLOR: &str = "#007bff";
pub const DEFAULT_SECONDARY_COLOR: &str = "#6c757d";

/// Kind of club.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClubType {
    Technical,
    Cultural,
    Sports,
    Academic,
    Social,
    #[default]
    Other,
}

/// Club lifecycle status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClubStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

/// Payment gateway used for the club's paid events.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentGateway {
    #[default]
    Cashfree,
    Payu,
}

/// Club record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Club {
    /// Unique club identifier (UUID)
    pub id: String,
    pub name: String,
    /// URL-friendly identifier, used for lookups by the API
    pub slug: String,
    pub description: String,
    pub club_type: ClubType,
    /// Official club email
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub status: ClubStatus,
    /// Default club for the system (at most one)
    pub is_default: bool,
    pub allow_public_events: bool,
    /// Require admin approval for event creation
    pub require_approval: bool,
    pub payment_gateway: PaymentGateway,
    /// Gateway credentials; stored, never exposed by the API
    #[serde(default)]
    pub gateway_credentials: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Club {
    /// Create a club with default settings.
    pub fn new(name: impl Into<String>, slug: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            slug: slug.into(),
            description: String::new(),
            club_type: ClubType::default(),
            email: email.into(),
            phone: None,
            website: None,
            logo: None,
            banner: None,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
            status: ClubStatus::default(),
            is_default: false,
            allow_public_events: true,
            require_approval: false,
            payment_gateway: PaymentGateway::default(),
            gateway_credentials: serde_json::Value::Object(Default::default()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ClubStatus::Active
    }

    /// Check field formats. Uniqueness is checked by the repository.
    pub fn validate(&self) -> StoreResult<()> {
        if self.name.trim().is_empty() || self.name.len() > 200 {
            return Err(StoreError::Validation(
                "name must be between 1 and 200 characters".into(),
            ));
        }
        if !is_valid_slug(&self.slug) || self.slug.len() > 200 {
            return Err(StoreError::Validation(
                "slug may only contain letters, numbers, underscores or hyphens".into(),
            ));
        }
        if !is_valid_email(&self.email) {
            return Err(StoreError::Validation("email is not a valid address".into()));
        }
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.is_empty()) {
            if !is_valid_phone(phone) {
                return Err(StoreError::Validation(
                    "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed."
                        .into(),
                ));
            }
        }
        if let Some(website) = self.website.as_deref().filter(|w| !w.is_empty()) {
            let parsed = url::Url::parse(website)
                .map_err(|_| StoreError::Validation("website must be a valid URL".into()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(StoreError::Validation(
                    "website must use http or https".into(),
                ));
            }
        }
        for color in [&self.primary_color, &self.secondary_color] {
            if !is_hex_color(color) {
                return Err(StoreError::Validation(format!(
                    "{color} is not a hex color code (#RRGGBB)"
                )));
            }
        }
        if !self.gateway_credentials.is_object() {
            return Err(StoreError::Validation(
                "gateway_credentials must be a JSON object".into(),
            ));
        }
        Ok(())
    }
}

/// Derive a slug from a club name (`"Devs Rec"` → `"devs-rec"`).
///
/// Whitespace becomes `-`, characters outside `[a-z0-9_-]` are dropped and
/// runs of `-` collapse into one.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().to_lowercase().chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        } else if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Accepts an optional `+`, an optional leading `1`, then 9-15 digits.
fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    (9..=15).contains(&digits.len()) || (digits.len() == 16 && digits.starts_with('1'))
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Query filters for club listings.
#[derive(Debug, Clone, Default)]
pub struct ClubFilter {
    pub status: Option<ClubStatus>,
    pub club_type: Option<ClubType>,
    /// Case-insensitive match against name or description
    pub search: Option<String>,
}

impl ClubFilter {
    fn matches(&self, club: &Club) -> bool {
        if self.status.is_some_and(|s| s != club.status) {
            return false;
        }
        if self.club_type.is_some_and(|t| t != club.club_type) {
            return false;
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            return club.name.to_lowercase().contains(&needle)
                || club.description.to_lowercase().contains(&needle);
        }
        true
    }
}

fn sort_by_name(clubs: &mut [Club]) {
    clubs.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

/// Repository for club operations.
pub struct ClubRepository<'a> {
    db: &'a ClubDatabase,
}

impl<'a> ClubRepository<'a> {
    /// Create a new ClubRepository.
    pub fn new(db: &'a ClubDatabase) -> Self {
        Self { db }
    }

    /// Get a club by ID.
    pub fn get(&self, club_id: &str) -> StoreResult<Club> {
        self.db
            .read(|txn| load(&txn.open_table(CLUBS)?, club_id))?
            .ok_or_else(|| StoreError::NotFound(format!("Club {club_id}")))
    }

    /// Get a club by slug.
    pub fn get_by_slug(&self, slug: &str) -> StoreResult<Club> {
        self.list_all()?
            .into_iter()
            .find(|club| club.slug == slug)
            .ok_or_else(|| StoreError::NotFound(format!("Club {slug}")))
    }

    /// Find a club by exact name.
    pub fn find_by_name(&self, name: &str) -> StoreResult<Option<Club>> {
        Ok(self.list_all()?.into_iter().find(|club| club.name == name))
    }

    /// List every club, ordered by name.
    pub fn list_all(&self) -> StoreResult<Vec<Club>> {
        let mut clubs: Vec<Club> = self.db.read(|txn| load_all(&txn.open_table(CLUBS)?))?;
        sort_by_name(&mut clubs);
        Ok(clubs)
    }

    /// List clubs matching a filter, ordered by name.
    pub fn list(&self, filter: &ClubFilter) -> StoreResult<Vec<Club>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|club| filter.matches(club))
            .collect())
    }

    /// Create or update a club.
    ///
    /// When the club is the default, every other club loses the flag in the
    /// same transaction.
    pub fn save(&self, mut club: Club) -> StoreResult<Club> {
        club.validate()?;
        club.updated_at = Utc::now();

        let cleared = self.db.write(|txn| {
            let mut table = txn.open_table(CLUBS)?;
            let existing: Vec<Club> = load_all(&table)?;
            for other in existing.iter().filter(|c| c.id != club.id) {
                if other.name == club.name {
                    return Err(StoreError::Validation(format!(
                        "club with name {} already exists",
                        club.name
                    )));
                }
                if other.slug == club.slug {
                    return Err(StoreError::Validation(format!(
                        "club with slug {} already exists",
                        club.slug
                    )));
                }
            }

            let cleared = invariants::on_club_write(&mut table, &club)?;
            put(&mut table, &club.id, &club)?;
            Ok(cleared)
        })?;

        if club.is_default {
            tracing::info!(
                club_id = %club.id,
                previous_defaults = cleared,
                "Default club set"
            );
        }
        Ok(club)
    }

    /// Delete a club together with its memberships, settings and events.
    pub fn delete(&self, club_id: &str) -> StoreResult<()> {
        let removed = self.db.write(|txn| {
            let mut clubs = txn.open_table(CLUBS)?;
            if clubs.remove(club_id)?.is_none() {
                return Err(StoreError::NotFound(format!("Club {club_id}")));
            }

            let mut removed = 0usize;

            let mut memberships = txn.open_table(MEMBERSHIPS)?;
            let owned: Vec<ClubMembership> = load_all(&memberships)?;
            for membership in owned.iter().filter(|m| m.club_id == club_id) {
                memberships.remove(membership.id.as_str())?;
                removed += 1;
            }

            let mut settings = txn.open_table(CLUB_SETTINGS)?;
            let owned: Vec<ClubSettings> = load_all(&settings)?;
            for entry in owned.iter().filter(|s| s.club_id == club_id) {
                settings.remove(entry.id.as_str())?;
                removed += 1;
            }

            let mut events = txn.open_table(CLUB_EVENTS)?;
            let owned: Vec<ClubEvent> = load_all(&events)?;
            for event in owned.iter().filter(|e| e.club_id == club_id) {
                events.remove(event.id.as_str())?;
                removed += 1;
            }

            Ok(removed)
        })?;

        tracing::info!(club_id = %club_id, dependents = removed, "Club deleted");
        Ok(())
    }

    /// Apply `mutate` to every listed club in one transaction.
    ///
    /// Each updated club goes through the same write hook as [`Self::save`].
    /// Unknown IDs are skipped. Returns the number of updated clubs.
    pub fn update_matching<F>(&self, club_ids: &[String], mut mutate: F) -> StoreResult<usize>
    where
        F: FnMut(&mut Club),
    {
        self.db.write(|txn| {
            let mut table = txn.open_table(CLUBS)?;
            let mut updated = 0usize;
            for club_id in distinct_ids(club_ids) {
                let Some(mut club) = load::<Club, _>(&table, club_id)? else {
                    continue;
                };
                mutate(&mut club);
                club.validate()?;
                club.updated_at = Utc::now();
                invariants::on_club_write(&mut table, &club)?;
                put(&mut table, &club.id, &club)?;
                updated += 1;
            }
            Ok(updated)
        })
    }

    /// Set the status of every listed club.
    pub fn set_status_many(&self, club_ids: &[String], status: ClubStatus) -> StoreResult<usize> {
        self.update_matching(club_ids, |club| club.status = status)
    }

    /// Make exactly one selected club the default.
    pub fn make_default(&self, club_ids: &[String]) -> StoreResult<Club> {
        let selected = distinct_ids(club_ids);
        let [club_id] = selected.as_slice() else {
            return Err(StoreError::AmbiguousBulkTarget(selected.len()));
        };
        let mut club = self.get(club_id)?;
        club.is_default = true;
        self.save(club)
    }

    /// The club used when no explicit club is given.
    ///
    /// Prefers the active default club, then the first active club by name.
    pub fn default_club(&self) -> StoreResult<Option<Club>> {
        let clubs = self.list_all()?;
        if let Some(default) = clubs.iter().find(|c| c.is_default && c.is_active()) {
            return Ok(Some(default.clone()));
        }
        Ok(clubs.into_iter().find(Club::is_active))
    }
}
