// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Club events.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{load_all, put, ClubDatabase, StoreError, StoreResult, CLUBS, CLUB_EVENTS};

/// An event hosted by a club.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ClubEvent {
    pub id: String,
    pub club_id: String,
    pub title: String,
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub is_active: bool,
    /// User ID of the creator
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl ClubEvent {
    pub fn new(
        club_id: impl Into<String>,
        title: impl Into<String>,
        event_date: DateTime<Utc>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            club_id: club_id.into(),
            title: title.into(),
            description: String::new(),
            event_date,
            is_active: true,
            created_by: created_by.into(),
            created_at: Utc::now(),
        }
    }
}

pub struct EventRepository<'a> {
    db: &'a ClubDatabase,
}

impl<'a> EventRepository<'a> {
    pub fn new(db: &'a ClubDatabase) -> Self {
        Self { db }
    }

    fn all(&self) -> StoreResult<Vec<ClubEvent>> {
        self.db.read(|txn| load_all(&txn.open_table(CLUB_EVENTS)?))
    }

    /// Persist a new event. The owning club must exist.
    pub fn create(&self, event: ClubEvent) -> StoreResult<ClubEvent> {
        if event.title.trim().is_empty() {
            return Err(StoreError::Validation("title is required".into()));
        }
        self.db.write(|txn| {
            let clubs = txn.open_table(CLUBS)?;
            if clubs.get(event.club_id.as_str())?.is_none() {
                return Err(StoreError::NotFound(format!("Club {}", event.club_id)));
            }
            let mut table = txn.open_table(CLUB_EVENTS)?;
            put(&mut table, &event.id, &event)
        })?;
        Ok(event)
    }

    /// Active events of a club, latest `event_date` first.
    pub fn list_active_by_club(&self, club_id: &str) -> StoreResult<Vec<ClubEvent>> {
        let mut events: Vec<ClubEvent> = self
            .all()?
            .into_iter()
            .filter(|e| e.club_id == club_id && e.is_active)
            .collect();
        events.sort_by(|a, b| b.event_date.cmp(&a.event_date));
        Ok(events)
    }

    /// Total events of a club, active or not.
    pub fn count_by_club(&self, club_id: &str) -> StoreResult<usize> {
        Ok(self.all()?.iter().filter(|e| e.club_id == club_id).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repository::{Club, ClubRepository};
    use chrono::Duration;

    #[test]
    fn active_events_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let db = ClubDatabase::open(&dir.path().join("clubs.redb")).unwrap();
        let club = ClubRepository::new(&db)
            .save(Club::new("Alpha", "alpha", "alpha@example.org"))
            .unwrap();
        let repo = EventRepository::new(&db);
        let now = Utc::now();

        repo.create(ClubEvent::new(&club.id, "Early", now - Duration::days(3), "u1"))
            .unwrap();
        repo.create(ClubEvent::new(&club.id, "Late", now + Duration::days(3), "u1"))
            .unwrap();
        let mut hidden = ClubEvent::new(&club.id, "Hidden", now, "u1");
        hidden.is_active = false;
        repo.create(hidden).unwrap();

        let titles: Vec<String> = repo
            .list_active_by_club(&club.id)
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Late", "Early"]);
        assert_eq!(repo.count_by_club(&club.id).unwrap(), 3);
    }

    #[test]
    fn create_requires_existing_club() {
        let dir = tempfile::tempdir().unwrap();
        let db = ClubDatabase::open(&dir.path().join("clubs.redb")).unwrap();
        let repo = EventRepository::new(&db);

        let result = repo.create(ClubEvent::new("missing", "Talk", Utc::now(), "u1"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
