// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Membership management endpoints (staff only).
//!
//! Permission flags are never accepted from clients; every write re-derives
//! them from the role.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    audit_log,
    auth::StaffOnly,
    error::ApiError,
    models::{
        CreateMembershipRequest, MembershipResponse, MessageResponse, UpdateMembershipRequest,
    },
    state::AppState,
    storage::{
        AuditEventType, ClubMembership, ClubRepository, ClubRole, MembershipFilter,
        MembershipRepository, MembershipStatus,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MembershipListQuery {
    /// Club ID.
    pub club: Option<String>,
    /// User ID.
    pub user: Option<String>,
    pub role: Option<ClubRole>,
    pub status: Option<MembershipStatus>,
}

fn respond(state: &AppState, membership: ClubMembership) -> Result<MembershipResponse, ApiError> {
    let club = ClubRepository::new(&state.db).get(&membership.club_id)?;
    Ok(MembershipResponse::new(membership, club.name))
}

/// List memberships, newest first.
#[utoipa::path(
    get,
    path = "/api/memberships",
    tag = "Memberships",
    security(("bearer_auth" = [])),
    params(MembershipListQuery),
    responses(
        (status = 200, description = "Memberships", body = [MembershipResponse]),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_memberships(
    StaffOnly(_user): StaffOnly,
    State(state): State<AppState>,
    Query(query): Query<MembershipListQuery>,
) -> Result<Json<Vec<MembershipResponse>>, ApiError> {
    let filter = MembershipFilter {
        club_id: query.club,
        user_id: query.user,
        role: query.role,
        status: query.status,
    };
    let memberships = MembershipRepository::new(&state.db).list(&filter)?;

    let mut items = Vec::with_capacity(memberships.len());
    for membership in memberships {
        items.push(respond(&state, membership)?);
    }
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/memberships",
    tag = "Memberships",
    security(("bearer_auth" = [])),
    request_body = CreateMembershipRequest,
    responses(
        (status = 201, description = "Membership created", body = MembershipResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_membership(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Json(request): Json<CreateMembershipRequest>,
) -> Result<(StatusCode, Json<MembershipResponse>), ApiError> {
    let membership = MembershipRepository::new(&state.db).save(ClubMembership::new(
        request.club,
        request.user,
        request.role.unwrap_or_default(),
        request.status.unwrap_or_default(),
    ))?;
    audit_log!(
        &state.db,
        AuditEventType::MembershipCreated,
        &user,
        "membership",
        &membership.id
    );

    Ok((StatusCode::CREATED, Json(respond(&state, membership)?)))
}

#[utoipa::path(
    get,
    path = "/api/memberships/{membership_id}",
    tag = "Memberships",
    security(("bearer_auth" = [])),
    params(("membership_id" = String, Path, description = "Membership ID")),
    responses(
        (status = 200, description = "Membership", body = MembershipResponse),
        (status = 404, description = "Membership not found")
    )
)]
pub async fn get_membership(
    StaffOnly(_user): StaffOnly,
    State(state): State<AppState>,
    Path(membership_id): Path<String>,
) -> Result<Json<MembershipResponse>, ApiError> {
    let membership = MembershipRepository::new(&state.db).get(&membership_id)?;
    Ok(Json(respond(&state, membership)?))
}

/// Replace a membership's club, user, role and status.
#[utoipa::path(
    put,
    path = "/api/memberships/{membership_id}",
    tag = "Memberships",
    security(("bearer_auth" = [])),
    params(("membership_id" = String, Path, description = "Membership ID")),
    request_body = CreateMembershipRequest,
    responses(
        (status = 200, description = "Membership updated", body = MembershipResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Membership not found")
    )
)]
pub async fn update_membership(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Path(membership_id): Path<String>,
    Json(request): Json<CreateMembershipRequest>,
) -> Result<Json<MembershipResponse>, ApiError> {
    let repo = MembershipRepository::new(&state.db);
    let mut membership = repo.get(&membership_id)?;
    membership.club_id = request.club;
    membership.user_id = request.user;
    membership.role = request.role.unwrap_or_default();
    membership.status = request.status.unwrap_or_default();

    let membership = repo.save(membership)?;
    audit_log!(
        &state.db,
        AuditEventType::MembershipUpdated,
        &user,
        "membership",
        &membership.id
    );
    Ok(Json(respond(&state, membership)?))
}

#[utoipa::path(
    patch,
    path = "/api/memberships/{membership_id}",
    tag = "Memberships",
    security(("bearer_auth" = [])),
    params(("membership_id" = String, Path, description = "Membership ID")),
    request_body = UpdateMembershipRequest,
    responses(
        (status = 200, description = "Membership updated", body = MembershipResponse),
        (status = 404, description = "Membership not found")
    )
)]
pub async fn partial_update_membership(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Path(membership_id): Path<String>,
    Json(request): Json<UpdateMembershipRequest>,
) -> Result<Json<MembershipResponse>, ApiError> {
    let repo = MembershipRepository::new(&state.db);
    let mut membership = repo.get(&membership_id)?;
    request.apply_to(&mut membership);

    let membership = repo.save(membership)?;
    audit_log!(
        &state.db,
        AuditEventType::MembershipUpdated,
        &user,
        "membership",
        &membership.id
    );
    Ok(Json(respond(&state, membership)?))
}

#[utoipa::path(
    delete,
    path = "/api/memberships/{membership_id}",
    tag = "Memberships",
    security(("bearer_auth" = [])),
    params(("membership_id" = String, Path, description = "Membership ID")),
    responses(
        (status = 204, description = "Membership deleted"),
        (status = 404, description = "Membership not found")
    )
)]
pub async fn delete_membership(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Path(membership_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    MembershipRepository::new(&state.db).delete(&membership_id)?;
    audit_log!(
        &state.db,
        AuditEventType::MembershipDeleted,
        &user,
        "membership",
        &membership_id
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Approve a pending membership.
#[utoipa::path(
    post,
    path = "/api/memberships/{membership_id}/approve",
    tag = "Memberships",
    security(("bearer_auth" = [])),
    params(("membership_id" = String, Path, description = "Membership ID")),
    responses(
        (status = 200, description = "Membership approved", body = MembershipResponse),
        (status = 400, description = "Membership is not pending"),
        (status = 404, description = "Membership not found")
    )
)]
pub async fn approve_membership(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Path(membership_id): Path<String>,
) -> Result<Json<MembershipResponse>, ApiError> {
    let membership = MembershipRepository::new(&state.db).approve(&membership_id)?;
    tracing::info!(membership_id = %membership.id, user_id = %user.user_id, "Membership approved");
    audit_log!(
        &state.db,
        AuditEventType::MembershipApproved,
        &user,
        "membership",
        &membership.id
    );
    Ok(Json(respond(&state, membership)?))
}

/// Reject a pending membership. The record is deleted.
#[utoipa::path(
    post,
    path = "/api/memberships/{membership_id}/reject",
    tag = "Memberships",
    security(("bearer_auth" = [])),
    params(("membership_id" = String, Path, description = "Membership ID")),
    responses(
        (status = 200, description = "Membership rejected", body = MessageResponse),
        (status = 400, description = "Membership is not pending"),
        (status = 404, description = "Membership not found")
    )
)]
pub async fn reject_membership(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Path(membership_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let membership = MembershipRepository::new(&state.db).reject(&membership_id)?;
    tracing::info!(membership_id = %membership.id, user_id = %user.user_id, "Membership rejected");
    audit_log!(
        &state.db,
        AuditEventType::MembershipRejected,
        &user,
        "membership",
        &membership.id
    );
    Ok(Json(MessageResponse::new("Membership request rejected")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PlatformRole;
    use crate::state::test_support::{test_state, user};
    use crate::storage::Club;

    fn staff() -> StaffOnly {
        StaffOnly(user("staff_1", PlatformRole::Staff))
    }

    fn setup_club(state: &AppState, name: &str) -> Club {
        ClubRepository::new(&state.db)
            .save(Club::new(name, name.to_lowercase(), "club@example.org"))
            .unwrap()
    }

    async fn create(
        state: &AppState,
        club_id: &str,
        user_id: &str,
        role: ClubRole,
        status: MembershipStatus,
    ) -> MembershipResponse {
        let (_, Json(m)) = create_membership(
            staff(),
            State(state.clone()),
            Json(CreateMembershipRequest {
                club: club_id.to_string(),
                user: user_id.to_string(),
                role: Some(role),
                status: Some(status),
            }),
        )
        .await
        .unwrap();
        m
    }

    #[tokio::test]
    async fn member_promoted_to_admin_gets_all_flags() {
        let (state, _dir) = test_state();
        let club = setup_club(&state, "Alpha");
        let m = create(&state, &club.id, "u1", ClubRole::Member, MembershipStatus::Active).await;
        assert!(!m.can_create_events);
        assert_eq!(m.club_name, "Alpha");

        let Json(updated) = partial_update_membership(
            staff(),
            State(state),
            Path(m.id),
            Json(UpdateMembershipRequest {
                role: Some(ClubRole::Admin),
                status: None,
            }),
        )
        .await
        .unwrap();
        assert!(updated.can_create_events);
        assert!(updated.can_manage_members);
        assert!(updated.can_manage_payments);
        assert!(updated.can_view_analytics);
    }

    #[tokio::test]
    async fn client_supplied_flags_are_ignored() {
        let (state, _dir) = test_state();
        let club = setup_club(&state, "Alpha");
        let body = serde_json::json!({
            "club": club.id,
            "user": "u1",
            "role": "event_manager",
            "can_manage_payments": true
        });
        let request: CreateMembershipRequest = serde_json::from_value(body).unwrap();
        let (status, Json(m)) = create_membership(staff(), State(state), Json(request))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert!(m.can_create_events);
        assert!(!m.can_manage_payments);
        assert_eq!(m.status, MembershipStatus::Active);
    }

    #[tokio::test]
    async fn duplicate_membership_is_rejected() {
        let (state, _dir) = test_state();
        let club = setup_club(&state, "Alpha");
        create(&state, &club.id, "u1", ClubRole::Member, MembershipStatus::Active).await;

        let err = create_membership(
            staff(),
            State(state),
            Json(CreateMembershipRequest {
                club: club.id.clone(),
                user: "u1".into(),
                role: None,
                status: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let (state, _dir) = test_state();
        let club = setup_club(&state, "Alpha");
        create(&state, &club.id, "u1", ClubRole::Member, MembershipStatus::Active).await;
        create(&state, &club.id, "u2", ClubRole::Member, MembershipStatus::Pending).await;

        let Json(pending) = list_memberships(
            staff(),
            State(state),
            Query(MembershipListQuery {
                status: Some(MembershipStatus::Pending),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user, "u2");
    }

    #[tokio::test]
    async fn approve_requires_pending() {
        let (state, _dir) = test_state();
        let club = setup_club(&state, "Alpha");
        let pending = create(&state, &club.id, "u1", ClubRole::Member, MembershipStatus::Pending).await;
        let active = create(&state, &club.id, "u2", ClubRole::Member, MembershipStatus::Active).await;

        let Json(approved) = approve_membership(staff(), State(state.clone()), Path(pending.id))
            .await
            .unwrap();
        assert_eq!(approved.status, MembershipStatus::Active);

        let err = approve_membership(staff(), State(state.clone()), Path(active.id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Membership is not pending approval");

        let Json(unchanged) = get_membership(staff(), State(state), Path(active.id))
            .await
            .unwrap();
        assert_eq!(unchanged.status, MembershipStatus::Active);
    }

    #[tokio::test]
    async fn reject_deletes_pending_membership() {
        let (state, _dir) = test_state();
        let club = setup_club(&state, "Alpha");
        let pending = create(&state, &club.id, "u1", ClubRole::Member, MembershipStatus::Pending).await;

        let Json(msg) = reject_membership(staff(), State(state.clone()), Path(pending.id.clone()))
            .await
            .unwrap();
        assert_eq!(msg.message, "Membership request rejected");

        let err = get_membership(staff(), State(state), Path(pending.id))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn put_replaces_role_and_status() {
        let (state, _dir) = test_state();
        let club = setup_club(&state, "Alpha");
        let m = create(&state, &club.id, "u1", ClubRole::Admin, MembershipStatus::Active).await;

        let Json(updated) = update_membership(
            staff(),
            State(state.clone()),
            Path(m.id.clone()),
            Json(CreateMembershipRequest {
                club: club.id.clone(),
                user: "u1".into(),
                role: Some(ClubRole::Moderator),
                status: Some(MembershipStatus::Inactive),
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.role, ClubRole::Moderator);
        assert!(updated.can_manage_members);
        assert!(!updated.can_manage_payments);

        let status = delete_membership(staff(), State(state), Path(m.id)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
