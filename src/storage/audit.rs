// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit logging for security-relevant club operations.
//!
//! Club lifecycle changes, membership transitions, bulk admin actions and
//! policy denials are appended to the `audit_events` table. Keys are
//! `{timestamp}|{event_id}` so table order is chronological.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::database::{put, ClubDatabase, StoreResult, AUDIT_EVENTS};

/// Types of auditable events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Club events
    ClubCreated,
    ClubUpdated,
    ClubDeleted,
    DefaultClubChanged,

    // Membership events
    MembershipCreated,
    MembershipUpdated,
    MembershipDeleted,
    MembershipJoined,
    MembershipLeft,
    MembershipApproved,
    MembershipRejected,

    // Settings and lookup choices
    SettingsChanged,
    ChoicesChanged,

    EventCreated,

    // Admin events
    BulkAction,
    PermissionDenied,
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    /// User who triggered the event (if known).
    pub user_id: Option<String>,
    /// Resource affected (club id, membership id, ...).
    pub resource_id: Option<String>,
    /// Resource type (club, membership, ...).
    pub resource_type: Option<String>,
    /// Additional details as JSON.
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    /// Whether the operation succeeded.
    pub success: bool,
    pub error: Option<String>,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            user_id: None,
            resource_id: None,
            resource_type: None,
            details: None,
            success: true,
            error: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Mark as failed with error message.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }

    fn key(&self) -> String {
        format!(
            "{}|{}",
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
            self.event_id
        )
    }
}

/// Repository for audit events.
pub struct AuditRepository<'a> {
    db: &'a ClubDatabase,
}

impl<'a> AuditRepository<'a> {
    pub fn new(db: &'a ClubDatabase) -> Self {
        Self { db }
    }

    /// Append an event.
    pub fn log(&self, event: &AuditEvent) -> StoreResult<()> {
        self.db.write(|txn| {
            let mut table = txn.open_table(AUDIT_EVENTS)?;
            put(&mut table, &event.key(), event)
        })
    }

    /// Most recent events, newest first.
    pub fn recent(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        self.db.read(|txn| {
            let table = txn.open_table(AUDIT_EVENTS)?;
            let mut events = Vec::new();
            for entry in table.iter()?.rev().take(limit) {
                let (_, value) = entry?;
                events.push(serde_json::from_slice(value.value())?);
            }
            Ok(events)
        })
    }

    /// Recent events triggered by one user, newest first.
    pub fn recent_for_user(&self, user_id: &str, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        Ok(self
            .recent(usize::MAX)?
            .into_iter()
            .filter(|e| e.user_id.as_deref() == Some(user_id))
            .take(limit)
            .collect())
    }
}

/// Helper macro for logging audit events.
///
/// Failures are logged with `tracing` and never fail the request.
#[macro_export]
macro_rules! audit_log {
    ($db:expr, $event:expr) => {{
        let repo = $crate::storage::AuditRepository::new($db);
        if let Err(e) = repo.log(&$event) {
            tracing::warn!(error = %e, "Failed to write audit event");
        }
    }};
    ($db:expr, $event_type:expr, $user:expr, $resource_type:expr, $resource_id:expr) => {{
        let event = $crate::storage::AuditEvent::new($event_type)
            .with_user(&$user.user_id)
            .with_resource($resource_type, $resource_id);
        $crate::audit_log!($db, event);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ClubDatabase) {
        let temp = TempDir::new().unwrap();
        let db = ClubDatabase::open(&temp.path().join("clubs.redb")).unwrap();
        (temp, db)
    }

    #[test]
    fn create_audit_event() {
        let event = AuditEvent::new(AuditEventType::ClubCreated)
            .with_user("user_123")
            .with_resource("club", "club_abc");

        assert_eq!(event.event_type, AuditEventType::ClubCreated);
        assert_eq!(event.user_id, Some("user_123".to_string()));
        assert_eq!(event.resource_type, Some("club".to_string()));
        assert_eq!(event.resource_id, Some("club_abc".to_string()));
        assert!(event.success);
    }

    #[test]
    fn failed_event() {
        let event = AuditEvent::new(AuditEventType::PermissionDenied)
            .with_user("user_123")
            .failed("Not authorized");

        assert!(!event.success);
        assert_eq!(event.error, Some("Not authorized".to_string()));
    }

    #[test]
    fn recent_returns_newest_first() {
        let (_temp, db) = setup();
        let repo = AuditRepository::new(&db);

        let mut first = AuditEvent::new(AuditEventType::ClubCreated).with_user("user_1");
        first.timestamp -= chrono::Duration::seconds(5);
        repo.log(&first).unwrap();
        repo.log(&AuditEvent::new(AuditEventType::MembershipJoined).with_user("user_2"))
            .unwrap();

        let events = repo.recent(10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, AuditEventType::MembershipJoined);
        assert_eq!(events[1].event_type, AuditEventType::ClubCreated);

        assert_eq!(repo.recent(1).unwrap().len(), 1);
    }

    #[test]
    fn recent_for_user_filters() {
        let (_temp, db) = setup();
        let repo = AuditRepository::new(&db);

        repo.log(&AuditEvent::new(AuditEventType::ClubCreated).with_user("user_target"))
            .unwrap();
        repo.log(&AuditEvent::new(AuditEventType::ClubCreated).with_user("user_other"))
            .unwrap();

        let events = repo.recent_for_user("user_target", 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_id, Some("user_target".to_string()));
    }
}
