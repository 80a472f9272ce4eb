// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Radium Clubs - Multi-club Event Management Service
//!
//! Clubs, memberships and per-club settings behind a layered access policy,
//! stored in an embedded redb database.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum) and the OpenAPI document
//! - `auth` - JWT authentication, platform roles and the club access policy
//! - `bootstrap` - Default club and choice seeding
//! - `storage` - redb tables, repositories and the audit log

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
