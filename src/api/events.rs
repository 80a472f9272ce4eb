// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Event creation.
//!
//! Events are attached to the named club, or to the default club when no club
//! is given.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    audit_log,
    auth::{Auth, AuthenticatedUser},
    error::ApiError,
    state::AppState,
    storage::{
        AuditEventType, Club, ClubEvent, ClubRepository, EventRepository, MembershipRepository,
        MembershipStatus,
    },
};

/// Request to create an event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Club slug. The default club is used when omitted.
    #[serde(default)]
    pub club: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub event_date: DateTime<Utc>,
}

fn resolve_club(state: &AppState, slug: Option<&str>) -> Result<Club, ApiError> {
    let clubs = ClubRepository::new(&state.db);
    match slug {
        Some(slug) => Ok(clubs.get_by_slug(slug)?),
        None => clubs.default_club()?.ok_or_else(|| {
            ApiError::bad_request("No club specified and no active default club is configured")
        }),
    }
}

fn can_create_events(
    state: &AppState,
    user: &AuthenticatedUser,
    club: &Club,
) -> Result<bool, ApiError> {
    if user.is_staff() {
        return Ok(true);
    }
    let membership = MembershipRepository::new(&state.db).find(&club.id, &user.user_id)?;
    Ok(membership.is_some_and(|m| {
        m.status == MembershipStatus::Active && m.permissions.can_create_events
    }))
}

#[utoipa::path(
    post,
    path = "/api/events",
    tag = "Events",
    security(("bearer_auth" = [])),
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = ClubEvent),
        (status = 400, description = "No club could be resolved"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Cannot create events in this club"),
        (status = 404, description = "Club not found")
    )
)]
pub async fn create_event(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<ClubEvent>), ApiError> {
    let club = resolve_club(&state, request.club.as_deref())?;
    if !can_create_events(&state, &user, &club)? {
        tracing::warn!(user_id = %user.user_id, club_id = %club.id, "Event creation denied");
        return Err(ApiError::permission_denied());
    }

    let mut event = ClubEvent::new(&club.id, request.title, request.event_date, &user.user_id);
    event.description = request.description;
    let event = EventRepository::new(&state.db).create(event)?;

    tracing::info!(event_id = %event.id, club_id = %club.id, "Event created");
    audit_log!(&state.db, AuditEventType::EventCreated, &user, "event", &event.id);
    Ok((StatusCode::CREATED, Json(event)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PlatformRole;
    use crate::state::test_support::{test_state, user};
    use crate::storage::{ClubMembership, ClubRole};

    fn request(club: Option<&str>) -> Json<CreateEventRequest> {
        Json(CreateEventRequest {
            club: club.map(str::to_string),
            title: "Hackathon".into(),
            description: "24 hours".into(),
            event_date: Utc::now(),
        })
    }

    fn save_club(state: &AppState, name: &str, is_default: bool) -> Club {
        let mut club = Club::new(name, name.to_lowercase(), "club@example.org");
        club.is_default = is_default;
        ClubRepository::new(&state.db).save(club).unwrap()
    }

    #[tokio::test]
    async fn without_club_uses_default() {
        let (state, _dir) = test_state();
        save_club(&state, "Alpha", false);
        let beta = save_club(&state, "Beta", true);

        let (status, Json(event)) = create_event(
            Auth(user("staff_1", PlatformRole::Staff)),
            State(state.clone()),
            request(None),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(event.club_id, beta.id);
        assert_eq!(event.description, "24 hours");
        assert_eq!(EventRepository::new(&state.db).count_by_club(&beta.id).unwrap(), 1);
    }

    #[tokio::test]
    async fn without_any_active_club_is_rejected() {
        let (state, _dir) = test_state();
        let err = create_event(
            Auth(user("staff_1", PlatformRole::Staff)),
            State(state),
            request(None),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn event_manager_may_create_but_member_may_not() {
        let (state, _dir) = test_state();
        let club = save_club(&state, "Alpha", false);
        let memberships = MembershipRepository::new(&state.db);
        memberships
            .save(ClubMembership::new(&club.id, "manager", ClubRole::EventManager, MembershipStatus::Active))
            .unwrap();
        memberships
            .save(ClubMembership::new(&club.id, "member", ClubRole::Member, MembershipStatus::Active))
            .unwrap();

        create_event(
            Auth(user("manager", PlatformRole::User)),
            State(state.clone()),
            request(Some("alpha")),
        )
        .await
        .unwrap();

        let err = create_event(
            Auth(user("member", PlatformRole::User)),
            State(state),
            request(Some("alpha")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }
}
