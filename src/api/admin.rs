// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Staff-only administrative endpoints.
//!
//! These endpoints provide:
//! - Bulk club actions (make default, activate, deactivate)
//! - Bulk membership actions (activate, deactivate, promote, demote)
//! - Audit log queries

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::{
    audit_log,
    auth::{AuthenticatedUser, StaffOnly},
    error::ApiError,
    models::{BulkSelectionRequest, BulkUpdateResponse},
    state::AppState,
    storage::{
        AuditEvent, AuditEventType, AuditRepository, ClubRepository, ClubRole, ClubStatus,
        MembershipRepository, MembershipStatus,
    },
};

const DEFAULT_AUDIT_LIMIT: usize = 100;
const MAX_AUDIT_LIMIT: usize = 1000;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Bulk action on clubs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ClubBulkAction {
    /// Exactly one club must be selected.
    MakeDefault,
    Activate,
    Deactivate,
}

/// Bulk action on memberships.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MembershipBulkAction {
    Activate,
    Deactivate,
    /// Set the role to admin.
    Promote,
    /// Set the role to member.
    Demote,
}

/// Query parameters for audit log queries.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditQueryParams {
    /// Filter by user ID.
    pub user_id: Option<String>,
    /// Maximum number of results (default 100, max 1000).
    pub limit: Option<usize>,
}

/// Response for audit log queries.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuditLogResponse {
    /// Audit events, newest first.
    pub events: Vec<AuditEvent>,
    pub total: usize,
}

fn log_bulk(
    state: &AppState,
    user: &AuthenticatedUser,
    target: &str,
    action: &str,
    ids: &[String],
    updated: usize,
) {
    audit_log!(
        &state.db,
        AuditEvent::new(AuditEventType::BulkAction)
            .with_user(&user.user_id)
            .with_details(json!({
                "target": target,
                "action": action,
                "ids": ids,
                "updated": updated,
            }))
    );
}

// ============================================================================
// Handlers
// ============================================================================

/// Apply a bulk action to the selected clubs.
#[utoipa::path(
    post,
    path = "/api/admin/clubs/{action}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("action" = ClubBulkAction, Path, description = "`make-default`, `activate` or `deactivate`")),
    request_body = BulkSelectionRequest,
    responses(
        (status = 200, description = "Action applied", body = BulkUpdateResponse),
        (status = 400, description = "make-default needs exactly one club"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn bulk_clubs(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Path(action): Path<ClubBulkAction>,
    Json(request): Json<BulkSelectionRequest>,
) -> Result<Json<BulkUpdateResponse>, ApiError> {
    let repo = ClubRepository::new(&state.db);

    let (updated, message, label) = match action {
        ClubBulkAction::MakeDefault => {
            let club = repo.make_default(&request.ids)?;
            audit_log!(
                &state.db,
                AuditEventType::DefaultClubChanged,
                &user,
                "club",
                &club.id
            );
            (1, format!("{} is now the default club.", club.name), "make-default")
        }
        ClubBulkAction::Activate => {
            let n = repo.set_status_many(&request.ids, ClubStatus::Active)?;
            (n, format!("{n} club(s) activated."), "activate")
        }
        ClubBulkAction::Deactivate => {
            let n = repo.set_status_many(&request.ids, ClubStatus::Inactive)?;
            (n, format!("{n} club(s) deactivated."), "deactivate")
        }
    };

    tracing::info!(user_id = %user.user_id, action = label, updated, "Bulk club action");
    log_bulk(&state, &user, "club", label, &request.ids, updated);
    Ok(Json(BulkUpdateResponse { updated, message }))
}

/// Apply a bulk action to the selected memberships.
///
/// Role changes re-derive the permission flags of every updated membership.
#[utoipa::path(
    post,
    path = "/api/admin/memberships/{action}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("action" = MembershipBulkAction, Path, description = "`activate`, `deactivate`, `promote` or `demote`")),
    request_body = BulkSelectionRequest,
    responses(
        (status = 200, description = "Action applied", body = BulkUpdateResponse),
        (status = 403, description = "Staff only")
    )
)]
pub async fn bulk_memberships(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Path(action): Path<MembershipBulkAction>,
    Json(request): Json<BulkSelectionRequest>,
) -> Result<Json<BulkUpdateResponse>, ApiError> {
    let repo = MembershipRepository::new(&state.db);

    let (updated, message, label) = match action {
        MembershipBulkAction::Activate => {
            let n = repo.update_matching(&request.ids, |m| m.status = MembershipStatus::Active)?;
            (n, format!("{n} membership(s) activated."), "activate")
        }
        MembershipBulkAction::Deactivate => {
            let n = repo.update_matching(&request.ids, |m| m.status = MembershipStatus::Inactive)?;
            (n, format!("{n} membership(s) deactivated."), "deactivate")
        }
        MembershipBulkAction::Promote => {
            let n = repo.update_matching(&request.ids, |m| m.role = ClubRole::Admin)?;
            (n, format!("{n} member(s) promoted to admin."), "promote")
        }
        MembershipBulkAction::Demote => {
            let n = repo.update_matching(&request.ids, |m| m.role = ClubRole::Member)?;
            (n, format!("{n} user(s) demoted to member."), "demote")
        }
    };

    tracing::info!(user_id = %user.user_id, action = label, updated, "Bulk membership action");
    log_bulk(&state, &user, "membership", label, &request.ids, updated);
    Ok(Json(BulkUpdateResponse { updated, message }))
}

/// Query recent audit events.
#[utoipa::path(
    get,
    path = "/api/admin/audit",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(AuditQueryParams),
    responses(
        (status = 200, description = "Audit events", body = AuditLogResponse),
        (status = 403, description = "Staff only")
    )
)]
pub async fn query_audit_logs(
    StaffOnly(_user): StaffOnly,
    State(state): State<AppState>,
    Query(params): Query<AuditQueryParams>,
) -> Result<Json<AuditLogResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_AUDIT_LIMIT).min(MAX_AUDIT_LIMIT);
    let repo = AuditRepository::new(&state.db);

    let events = match params.user_id.as_deref() {
        Some(user_id) => repo.recent_for_user(user_id, limit)?,
        None => repo.recent(limit)?,
    };
    Ok(Json(AuditLogResponse {
        total: events.len(),
        events,
    }))
}
