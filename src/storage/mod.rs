// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage for clubs and their dependents, backed by a single
//! redb file (`{DATA_DIR}/clubs.redb`).
//!
//! ## Layout
//!
//! ```text
//! database.rs     # tables, StoreError, ClubDatabase (read/write transactions)
//! invariants.rs   # write hooks: role -> flags, single default club
//! audit.rs        # audit_events table + audit_log! macro
//! repository/     # one repository per entity
//! ```
//!
//! ## Important Notes
//!
//! - Repositories never cache: the default club is always a query
//! - Every write that touches several records runs in one transaction

pub mod audit;
pub mod database;
pub mod invariants;
pub mod repository;

pub use audit::{AuditEvent, AuditEventType, AuditRepository};
pub use database::{ClubDatabase, StoreError, StoreResult};
pub use invariants::{derive_flags, PermissionFlags};
pub use repository::{
    Choice, ChoiceEntry, ChoiceKind, ChoiceRepository, Club, ClubEvent, ClubFilter, ClubMembership,
    ClubRepository, ClubRole, ClubSettings, ClubStatus, ClubType, Department, DepartmentCategory,
    EventRepository, JoinOutcome, MembershipFilter, MembershipRepository, MembershipStatus,
    PaymentGateway, SettingsRepository, Year, slugify,
};
