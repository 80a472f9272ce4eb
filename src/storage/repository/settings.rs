// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-club settings (one record per club).

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use super::super::database::{
    load, load_all, put, ClubDatabase, StoreError, StoreResult, CLUBS, CLUB_SETTINGS,
};

pub const DEFAULT_EVENT_DURATION_MINUTES: u32 = 120;
pub const DEFAULT_REGISTRATION_DEADLINE_DAYS: u32 = 1;
pub const DEFAULT_CURRENCY: &str = "INR";

/// Club-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClubSettings {
    pub id: String,
    pub club_id: String,
    pub email_signature: String,
    /// Addresses that receive club notifications
    #[serde(default)]
    pub notification_emails: Vec<String>,
    /// Minutes
    pub default_event_duration: u32,
    pub auto_approve_events: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_events_per_month: Option<u32>,
    /// Days before the event
    pub default_registration_deadline_days: u32,
    pub allow_late_registration: bool,
    /// ISO 4217 code
    pub default_currency: String,
    pub payment_terms: String,
    #[serde(default)]
    pub social_links: serde_json::Value,
    #[serde(default)]
    pub custom_fields: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClubSettings {
    /// Settings with default values for a club.
    pub fn new(club_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            club_id: club_id.into(),
            email_signature: String::new(),
            notification_emails: Vec::new(),
            default_event_duration: DEFAULT_EVENT_DURATION_MINUTES,
            auto_approve_events: true,
            max_events_per_month: None,
            default_registration_deadline_days: DEFAULT_REGISTRATION_DEADLINE_DAYS,
            allow_late_registration: false,
            default_currency: DEFAULT_CURRENCY.to_string(),
            payment_terms: String::new(),
            social_links: serde_json::Value::Object(Default::default()),
            custom_fields: serde_json::Value::Object(Default::default()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.default_currency.len() != 3
            || !self.default_currency.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(StoreError::Validation(
                "default_currency must be a 3-letter currency code".into(),
            ));
        }
        if let Some(bad) = self.notification_emails.iter().find(|e| !e.contains('@')) {
            return Err(StoreError::Validation(format!(
                "{bad} is not a valid notification email"
            )));
        }
        if !self.social_links.is_object() || !self.custom_fields.is_object() {
            return Err(StoreError::Validation(
                "social_links and custom_fields must be JSON objects".into(),
            ));
        }
        Ok(())
    }
}

/// Repository for club settings.
pub struct SettingsRepository<'a> {
    db: &'a ClubDatabase,
}

impl<'a> SettingsRepository<'a> {
    pub fn new(db: &'a ClubDatabase) -> Self {
        Self { db }
    }

    pub fn get(&self, settings_id: &str) -> StoreResult<ClubSettings> {
        self.db
            .read(|txn| load(&txn.open_table(CLUB_SETTINGS)?, settings_id))?
            .ok_or_else(|| StoreError::NotFound(format!("Settings {settings_id}")))
    }

    /// List settings, optionally for a single club.
    pub fn list(&self, club_id: Option<&str>) -> StoreResult<Vec<ClubSettings>> {
        let all: Vec<ClubSettings> = self.db.read(|txn| load_all(&txn.open_table(CLUB_SETTINGS)?))?;
        Ok(all
            .into_iter()
            .filter(|s| club_id.is_none_or(|c| c == s.club_id))
            .collect())
    }

    pub fn for_club(&self, club_id: &str) -> StoreResult<Option<ClubSettings>> {
        Ok(self.list(Some(club_id))?.into_iter().next())
    }

    /// Create or update settings. A club has at most one settings record.
    pub fn save(&self, mut settings: ClubSettings) -> StoreResult<ClubSettings> {
        settings.validate()?;
        settings.updated_at = Utc::now();

        self.db.write(|txn| {
            let clubs = txn.open_table(CLUBS)?;
            if clubs.get(settings.club_id.as_str())?.is_none() {
                return Err(StoreError::Validation(format!(
                    "club {} does not exist",
                    settings.club_id
                )));
            }

            let mut table = txn.open_table(CLUB_SETTINGS)?;
            let existing: Vec<ClubSettings> = load_all(&table)?;
            if existing
                .iter()
                .any(|s| s.id != settings.id && s.club_id == settings.club_id)
            {
                return Err(StoreError::Validation(
                    "club settings with this club already exists".into(),
                ));
            }
            put(&mut table, &settings.id, &settings)
        })?;
        Ok(settings)
    }

    pub fn delete(&self, settings_id: &str) -> StoreResult<()> {
        self.db.write(|txn| {
            let mut table = txn.open_table(CLUB_SETTINGS)?;
            if table.remove(settings_id)?.is_none() {
                return Err(StoreError::NotFound(format!("Settings {settings_id}")));
            }
            Ok(())
        })
    }

    /// Return the club's settings, creating them with `init` if missing.
    pub fn get_or_create<F>(&self, club_id: &str, init: F) -> StoreResult<(ClubSettings, bool)>
    where
        F: FnOnce(&mut ClubSettings),
    {
        if let Some(existing) = self.for_club(club_id)? {
            return Ok((existing, false));
        }
        let mut settings = ClubSettings::new(club_id);
        init(&mut settings);
        Ok((self.save(settings)?, true))
    }
}
