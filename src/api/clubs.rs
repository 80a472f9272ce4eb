// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Club API endpoints.
//!
//! Every handler runs the view-level check of the club access policy; handlers
//! addressing a single club (`/clubs/{slug}/...`) load it and then run the
//! object-level check. Anonymous callers get 401, denied callers get 403.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::{
    audit_log,
    auth::{
        authorize, policy::has_object_permission, AdminMembershipLookup, AuthenticatedUser,
        ClubAction, OptionalAuth,
    },
    error::ApiError,
    models::{
        CheckAdminAccessResponse, ClubListItem, ClubResponse, CreateClubRequest,
        MembershipResponse, MessageResponse, UpdateClubRequest, UserClubResponse,
    },
    state::AppState,
    storage::{
        AuditEvent, AuditEventType, Club, ClubEvent, ClubFilter, ClubRepository, ClubStatus,
        ClubType, EventRepository, JoinOutcome, MembershipRepository,
    },
};

/// Filters for the club listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClubListQuery {
    pub status: Option<ClubStatus>,
    #[serde(rename = "type")]
    pub club_type: Option<ClubType>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
}

fn deny(
    state: &AppState,
    actor: Option<&AuthenticatedUser>,
    action: ClubAction,
    club: Option<&Club>,
) -> ApiError {
    let Some(user) = actor else {
        return ApiError::unauthorized("Authentication credentials were not provided.");
    };

    tracing::warn!(
        user_id = %user.user_id,
        action = %action,
        club_id = ?club.map(|c| c.id.as_str()),
        "Club access denied"
    );
    let mut event = AuditEvent::new(AuditEventType::PermissionDenied)
        .with_user(&user.user_id)
        .with_details(json!({ "action": action.to_string() }))
        .failed("permission denied");
    if let Some(club) = club {
        event = event.with_resource("club", &club.id);
    }
    audit_log!(&state.db, event);

    ApiError::permission_denied()
}

/// View-level check. Returns the actor once allowed.
fn check_view<'u>(
    state: &AppState,
    actor: Option<&'u AuthenticatedUser>,
    action: ClubAction,
) -> Result<&'u AuthenticatedUser, ApiError> {
    let memberships = MembershipRepository::new(&state.db);
    let allowed = authorize(actor, action, None, &memberships)?;
    match actor {
        Some(user) if allowed => Ok(user),
        _ => Err(deny(state, actor, action, None)),
    }
}

/// View-level check, club lookup by slug, then the object-level check.
fn load_club<'u>(
    state: &AppState,
    actor: Option<&'u AuthenticatedUser>,
    action: ClubAction,
    slug: &str,
) -> Result<(&'u AuthenticatedUser, Club), ApiError> {
    let user = check_view(state, actor, action)?;
    let club = ClubRepository::new(&state.db).get_by_slug(slug)?;

    let memberships = MembershipRepository::new(&state.db);
    if !has_object_permission(Some(user), &club, &memberships)? {
        return Err(deny(state, Some(user), action, Some(&club)));
    }
    Ok((user, club))
}

/// `(total_events, total_members)` for a club.
fn club_counts(state: &AppState, club_id: &str) -> Result<(usize, usize), ApiError> {
    let events = EventRepository::new(&state.db).count_by_club(club_id)?;
    let members = MembershipRepository::new(&state.db).count_active(club_id)?;
    Ok((events, members))
}

fn detail(state: &AppState, club: Club) -> Result<ClubResponse, ApiError> {
    let (events, members) = club_counts(state, &club.id)?;
    Ok(ClubResponse::new(club, events, members))
}

fn log_club_write(state: &AppState, user: &AuthenticatedUser, club: &Club, event: AuditEventType) {
    audit_log!(&state.db, event, user, "club", &club.id);
    if club.is_default {
        audit_log!(
            &state.db,
            AuditEventType::DefaultClubChanged,
            user,
            "club",
            &club.id
        );
    }
}

/// List clubs ordered by name.
#[utoipa::path(
    get,
    path = "/api/clubs",
    tag = "Clubs",
    security(("bearer_auth" = [])),
    params(ClubListQuery),
    responses(
        (status = 200, description = "Clubs", body = [ClubListItem]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_clubs(
    OptionalAuth(actor): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<ClubListQuery>,
) -> Result<Json<Vec<ClubListItem>>, ApiError> {
    check_view(&state, actor.as_ref(), ClubAction::List)?;

    let filter = ClubFilter {
        status: query.status,
        club_type: query.club_type,
        search: query.search,
    };
    let clubs = ClubRepository::new(&state.db).list(&filter)?;

    let mut items = Vec::with_capacity(clubs.len());
    for club in clubs {
        let (events, members) = club_counts(&state, &club.id)?;
        items.push(ClubListItem::new(club, events, members));
    }
    Ok(Json(items))
}

/// Create a club.
#[utoipa::path(
    post,
    path = "/api/clubs",
    tag = "Clubs",
    security(("bearer_auth" = [])),
    request_body = CreateClubRequest,
    responses(
        (status = 201, description = "Club created", body = ClubResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create_club(
    OptionalAuth(actor): OptionalAuth,
    State(state): State<AppState>,
    Json(request): Json<CreateClubRequest>,
) -> Result<(StatusCode, Json<ClubResponse>), ApiError> {
    let user = check_view(&state, actor.as_ref(), ClubAction::Create)?;

    let club = ClubRepository::new(&state.db).save(request.into_club())?;
    tracing::info!(club_id = %club.id, slug = %club.slug, user_id = %user.user_id, "Club created");
    log_club_write(&state, user, &club, AuditEventType::ClubCreated);

    Ok((StatusCode::CREATED, Json(detail(&state, club)?)))
}

/// Whether the current user may use club management.
#[utoipa::path(
    get,
    path = "/api/clubs/check_admin_access",
    tag = "Clubs",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Access summary", body = CheckAdminAccessResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn check_admin_access(
    OptionalAuth(actor): OptionalAuth,
    State(state): State<AppState>,
) -> Result<Json<CheckAdminAccessResponse>, ApiError> {
    let user = check_view(&state, actor.as_ref(), ClubAction::CheckAdminAccess)?;

    let memberships = MembershipRepository::new(&state.db);
    let club_admin_count = memberships.active_admin_membership_count(&user.user_id)?;
    Ok(Json(CheckAdminAccessResponse {
        has_access: user.bypasses_club_policy() || club_admin_count > 0,
        is_staff: user.is_staff(),
        is_superuser: user.is_superuser(),
        club_admin_count,
    }))
}

/// Clubs the current user actively belongs to.
///
/// Regular users only see clubs they administer.
#[utoipa::path(
    get,
    path = "/api/clubs/my_clubs",
    tag = "Clubs",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Memberships with their clubs", body = [UserClubResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn my_clubs(
    OptionalAuth(actor): OptionalAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserClubResponse>>, ApiError> {
    let user = check_view(&state, actor.as_ref(), ClubAction::MyClubs)?;

    let memberships = MembershipRepository::new(&state.db)
        .active_for_user(&user.user_id, !user.bypasses_club_policy())?;
    let clubs = ClubRepository::new(&state.db);

    let mut items = Vec::with_capacity(memberships.len());
    for membership in memberships {
        let club = clubs.get(&membership.club_id)?;
        let (events, members) = club_counts(&state, &club.id)?;
        items.push(UserClubResponse {
            club: ClubListItem::new(club, events, members),
            role: membership.role,
            status: membership.status,
            joined_at: membership.joined_at,
        });
    }
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/clubs/{slug}",
    tag = "Clubs",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Club slug")),
    responses(
        (status = 200, description = "Club details", body = ClubResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Club not found")
    )
)]
pub async fn retrieve_club(
    OptionalAuth(actor): OptionalAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ClubResponse>, ApiError> {
    let (_, club) = load_club(&state, actor.as_ref(), ClubAction::Retrieve, &slug)?;
    Ok(Json(detail(&state, club)?))
}

/// Replace a club.
#[utoipa::path(
    put,
    path = "/api/clubs/{slug}",
    tag = "Clubs",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Club slug")),
    request_body = CreateClubRequest,
    responses(
        (status = 200, description = "Club updated", body = ClubResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Club not found")
    )
)]
pub async fn update_club(
    OptionalAuth(actor): OptionalAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<CreateClubRequest>,
) -> Result<Json<ClubResponse>, ApiError> {
    let (user, mut club) = load_club(&state, actor.as_ref(), ClubAction::Update, &slug)?;

    request.apply_to(&mut club);
    let club = ClubRepository::new(&state.db).save(club)?;
    log_club_write(&state, user, &club, AuditEventType::ClubUpdated);

    Ok(Json(detail(&state, club)?))
}

/// Update some fields of a club.
#[utoipa::path(
    patch,
    path = "/api/clubs/{slug}",
    tag = "Clubs",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Club slug")),
    request_body = UpdateClubRequest,
    responses(
        (status = 200, description = "Club updated", body = ClubResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Club not found")
    )
)]
pub async fn partial_update_club(
    OptionalAuth(actor): OptionalAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<UpdateClubRequest>,
) -> Result<Json<ClubResponse>, ApiError> {
    let (user, mut club) = load_club(&state, actor.as_ref(), ClubAction::PartialUpdate, &slug)?;

    request.apply_to(&mut club);
    let club = ClubRepository::new(&state.db).save(club)?;
    log_club_write(&state, user, &club, AuditEventType::ClubUpdated);

    Ok(Json(detail(&state, club)?))
}

/// Delete a club with its memberships, settings and events.
#[utoipa::path(
    delete,
    path = "/api/clubs/{slug}",
    tag = "Clubs",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Club slug")),
    responses(
        (status = 204, description = "Club deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Club not found")
    )
)]
pub async fn delete_club(
    OptionalAuth(actor): OptionalAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    let (user, club) = load_club(&state, actor.as_ref(), ClubAction::Destroy, &slug)?;

    ClubRepository::new(&state.db).delete(&club.id)?;
    audit_log!(&state.db, AuditEventType::ClubDeleted, user, "club", &club.id);

    Ok(StatusCode::NO_CONTENT)
}

/// Active events of a club, latest first.
#[utoipa::path(
    get,
    path = "/api/clubs/{slug}/events",
    tag = "Clubs",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Club slug")),
    responses(
        (status = 200, description = "Events", body = [ClubEvent]),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Club not found")
    )
)]
pub async fn club_events(
    OptionalAuth(actor): OptionalAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ClubEvent>>, ApiError> {
    let (_, club) = load_club(&state, actor.as_ref(), ClubAction::Events, &slug)?;
    Ok(Json(EventRepository::new(&state.db).list_active_by_club(&club.id)?))
}

/// Active members of a club, newest first.
#[utoipa::path(
    get,
    path = "/api/clubs/{slug}/members",
    tag = "Clubs",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Club slug")),
    responses(
        (status = 200, description = "Members", body = [MembershipResponse]),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Club not found")
    )
)]
pub async fn club_members(
    OptionalAuth(actor): OptionalAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<MembershipResponse>>, ApiError> {
    let (_, club) = load_club(&state, actor.as_ref(), ClubAction::Members, &slug)?;

    let members = MembershipRepository::new(&state.db)
        .active_members(&club.id)?
        .into_iter()
        .map(|m| MembershipResponse::new(m, club.name.as_str()))
        .collect();
    Ok(Json(members))
}

/// Join a club as an admin, or reactivate a previous membership.
#[utoipa::path(
    post,
    path = "/api/clubs/{slug}/join",
    tag = "Clubs",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Club slug")),
    responses(
        (status = 201, description = "Membership created", body = MembershipResponse),
        (status = 200, description = "Membership reactivated", body = MembershipResponse),
        (status = 400, description = "Already a member"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Club not found")
    )
)]
pub async fn join_club(
    OptionalAuth(actor): OptionalAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<(StatusCode, Json<MembershipResponse>), ApiError> {
    let (user, club) = load_club(&state, actor.as_ref(), ClubAction::Join, &slug)?;

    let outcome = MembershipRepository::new(&state.db).join(user, &club.id)?;
    let status = match outcome {
        JoinOutcome::Created(_) => StatusCode::CREATED,
        JoinOutcome::Reactivated(_) => StatusCode::OK,
    };
    let membership = outcome.into_membership();
    audit_log!(
        &state.db,
        AuditEventType::MembershipJoined,
        user,
        "membership",
        &membership.id
    );

    Ok((status, Json(MembershipResponse::new(membership, club.name))))
}

/// Leave a club.
#[utoipa::path(
    post,
    path = "/api/clubs/{slug}/leave",
    tag = "Clubs",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Club slug")),
    responses(
        (status = 200, description = "Left the club", body = MessageResponse),
        (status = 400, description = "Not a member"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Club not found")
    )
)]
pub async fn leave_club(
    OptionalAuth(actor): OptionalAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (user, club) = load_club(&state, actor.as_ref(), ClubAction::Leave, &slug)?;

    let membership = MembershipRepository::new(&state.db).leave(user, &club.id)?;
    audit_log!(
        &state.db,
        AuditEventType::MembershipLeft,
        user,
        "membership",
        &membership.id
    );

    Ok(Json(MessageResponse::new("Successfully left the club")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PlatformRole;
    use crate::state::test_support::{test_state, user};
    use crate::storage::{AuditRepository, ClubMembership, ClubRole, MembershipStatus};

    fn staff() -> OptionalAuth {
        OptionalAuth(Some(user("staff_1", PlatformRole::Staff)))
    }

    fn regular(id: &str) -> OptionalAuth {
        OptionalAuth(Some(user(id, PlatformRole::User)))
    }

    fn request(name: &str) -> CreateClubRequest {
        CreateClubRequest {
            name: name.to_string(),
            email: "club@example.org".to_string(),
            ..Default::default()
        }
    }

    async fn create(state: &AppState, name: &str) -> ClubResponse {
        let (_, Json(club)) = create_club(staff(), State(state.clone()), Json(request(name)))
            .await
            .unwrap();
        club
    }

    fn make_admin(state: &AppState, club_id: &str, user_id: &str) {
        MembershipRepository::new(&state.db)
            .save(ClubMembership::new(
                club_id,
                user_id,
                ClubRole::Admin,
                MembershipStatus::Active,
            ))
            .unwrap();
    }

    #[tokio::test]
    async fn staff_creates_club_with_derived_slug() {
        let (state, _dir) = test_state();
        let (status, Json(club)) =
            create_club(staff(), State(state.clone()), Json(request("Devs Rec")))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(club.slug, "devs-rec");
        assert_eq!(club.total_members, 0);

        let audit = AuditRepository::new(&state.db).recent(10).unwrap();
        assert_eq!(audit[0].event_type, AuditEventType::ClubCreated);
    }

    #[tokio::test]
    async fn anonymous_list_is_unauthorized() {
        let (state, _dir) = test_state();
        let err = list_clubs(OptionalAuth(None), State(state), Query(ClubListQuery::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn user_without_admin_membership_is_forbidden() {
        let (state, _dir) = test_state();
        create(&state, "Alpha").await;

        let err = list_clubs(regular("u1"), State(state.clone()), Query(ClubListQuery::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let audit = AuditRepository::new(&state.db).recent(1).unwrap();
        assert_eq!(audit[0].event_type, AuditEventType::PermissionDenied);
        assert!(!audit[0].success);
    }

    #[tokio::test]
    async fn club_admin_lists_all_but_retrieves_only_own_club() {
        let (state, _dir) = test_state();
        let x = create(&state, "Xylo").await;
        create(&state, "Yodel").await;
        make_admin(&state, &x.id, "u1");

        let Json(items) =
            list_clubs(regular("u1"), State(state.clone()), Query(ClubListQuery::default()))
                .await
                .unwrap();
        assert_eq!(items.len(), 2);

        let Json(own) = retrieve_club(regular("u1"), State(state.clone()), Path("xylo".into()))
            .await
            .unwrap();
        assert_eq!(own.id, x.id);
        assert_eq!(own.total_members, 1);

        let err = retrieve_club(regular("u1"), State(state.clone()), Path("yodel".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn club_admin_cannot_modify_own_club() {
        let (state, _dir) = test_state();
        let x = create(&state, "Xylo").await;
        make_admin(&state, &x.id, "u1");

        let err = partial_update_club(
            regular("u1"),
            State(state.clone()),
            Path("xylo".into()),
            Json(UpdateClubRequest::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let err = delete_club(regular("u1"), State(state), Path("xylo".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn list_filters_by_type_and_search() {
        let (state, _dir) = test_state();
        create(&state, "Chess").await;
        let mut robotics = request("Robotics");
        robotics.club_type = Some(ClubType::Technical);
        robotics.description = Some("Builds robots".into());
        create_club(staff(), State(state.clone()), Json(robotics))
            .await
            .unwrap();

        let Json(items) = list_clubs(
            staff(),
            State(state.clone()),
            Query(ClubListQuery {
                club_type: Some(ClubType::Technical),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Robotics");

        let Json(items) = list_clubs(
            staff(),
            State(state),
            Query(ClubListQuery {
                search: Some("robots".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn new_default_club_clears_previous_default() {
        let (state, _dir) = test_state();
        let mut a = request("Alpha");
        a.is_default = Some(true);
        let (_, Json(a)) = create_club(staff(), State(state.clone()), Json(a)).await.unwrap();

        let mut b = request("Beta");
        b.is_default = Some(true);
        let (_, Json(b)) = create_club(staff(), State(state.clone()), Json(b)).await.unwrap();

        let Json(a) = retrieve_club(staff(), State(state.clone()), Path(a.slug)).await.unwrap();
        assert!(!a.is_default);
        assert!(b.is_default);
    }

    #[tokio::test]
    async fn patch_updates_only_given_fields() {
        let (state, _dir) = test_state();
        let mut req = request("Alpha");
        req.phone = Some("+919876543210".into());
        create_club(staff(), State(state.clone()), Json(req)).await.unwrap();

        let patch: UpdateClubRequest =
            serde_json::from_str(r##"{"phone":null,"primary_color":"#112233"}"##).unwrap();
        let Json(club) =
            partial_update_club(staff(), State(state.clone()), Path("alpha".into()), Json(patch))
                .await
                .unwrap();
        assert_eq!(club.phone, None);
        assert_eq!(club.primary_color, "#112233");
        assert_eq!(club.email, "club@example.org");

        let bad: UpdateClubRequest = serde_json::from_str(r#"{"primary_color":"red"}"#).unwrap();
        let err = partial_update_club(staff(), State(state), Path("alpha".into()), Json(bad))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let (state, _dir) = test_state();
        let err = retrieve_club(staff(), State(state), Path("missing".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn join_leave_rejoin_lifecycle() {
        let (state, _dir) = test_state();
        create(&state, "Alpha").await;

        let (status, Json(m)) = join_club(staff(), State(state.clone()), Path("alpha".into()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(m.role, ClubRole::Admin);
        assert!(m.can_manage_payments);

        let err = join_club(staff(), State(state.clone()), Path("alpha".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "You are already a member of this club");

        let Json(msg) = leave_club(staff(), State(state.clone()), Path("alpha".into()))
            .await
            .unwrap();
        assert_eq!(msg.message, "Successfully left the club");

        let err = leave_club(staff(), State(state.clone()), Path("alpha".into()))
            .await
            .unwrap_err();
        assert_eq!(err.message, "You are not a member of this club");

        let (status, Json(again)) = join_club(staff(), State(state), Path("alpha".into()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again.id, m.id);
        assert_eq!(again.status, MembershipStatus::Active);
    }

    #[tokio::test]
    async fn regular_user_cannot_join_or_list_members() {
        let (state, _dir) = test_state();
        let x = create(&state, "Alpha").await;
        make_admin(&state, &x.id, "u1");

        for err in [
            join_club(regular("u1"), State(state.clone()), Path("alpha".into()))
                .await
                .unwrap_err(),
            leave_club(regular("u1"), State(state.clone()), Path("alpha".into()))
                .await
                .unwrap_err(),
        ] {
            assert_eq!(err.status, StatusCode::FORBIDDEN);
        }
        let err = club_members(regular("u1"), State(state), Path("alpha".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn members_lists_active_only() {
        let (state, _dir) = test_state();
        let x = create(&state, "Alpha").await;
        let repo = MembershipRepository::new(&state.db);
        repo.save(ClubMembership::new(&x.id, "a", ClubRole::Member, MembershipStatus::Active))
            .unwrap();
        repo.save(ClubMembership::new(&x.id, "b", ClubRole::Member, MembershipStatus::Pending))
            .unwrap();

        let Json(members) = club_members(staff(), State(state), Path("alpha".into()))
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user, "a");
        assert_eq!(members[0].club_name, "Alpha");
    }

    #[tokio::test]
    async fn my_clubs_for_admin_and_staff() {
        let (state, _dir) = test_state();
        let x = create(&state, "Alpha").await;
        let y = create(&state, "Beta").await;
        make_admin(&state, &x.id, "u1");
        MembershipRepository::new(&state.db)
            .save(ClubMembership::new(&y.id, "u1", ClubRole::Member, MembershipStatus::Active))
            .unwrap();

        let Json(mine) = my_clubs(regular("u1"), State(state.clone())).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].club.id, x.id);

        join_club(staff(), State(state.clone()), Path("beta".into()))
            .await
            .unwrap();
        let Json(mine) = my_clubs(staff(), State(state)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].role, ClubRole::Admin);
    }

    #[tokio::test]
    async fn check_admin_access_reports_counts() {
        let (state, _dir) = test_state();
        create(&state, "Alpha").await;
        join_club(staff(), State(state.clone()), Path("alpha".into()))
            .await
            .unwrap();

        let Json(access) = check_admin_access(staff(), State(state.clone())).await.unwrap();
        assert_eq!(
            access,
            CheckAdminAccessResponse {
                has_access: true,
                is_staff: true,
                is_superuser: false,
                club_admin_count: 1,
            }
        );

        let err = check_admin_access(regular("u1"), State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn delete_removes_club_and_memberships() {
        let (state, _dir) = test_state();
        let x = create(&state, "Alpha").await;
        make_admin(&state, &x.id, "u1");

        let status = delete_club(staff(), State(state.clone()), Path("alpha".into()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(MembershipRepository::new(&state.db)
            .find(&x.id, "u1")
            .unwrap()
            .is_none());
    }
}
