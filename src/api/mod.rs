// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        BulkSelectionRequest, BulkUpdateResponse, CheckAdminAccessResponse, ClubListItem,
        ClubResponse, CreateClubRequest, CreateMembershipRequest, CreateSettingsRequest,
        MembershipResponse, MessageResponse, SettingsFields, SettingsResponse, UpdateClubRequest,
        UpdateMembershipRequest, UserClubResponse,
    },
    state::AppState,
    storage::{
        AuditEvent, AuditEventType, Choice, ChoiceKind, ClubEvent, ClubRole, ClubStatus, ClubType,
        Department, DepartmentCategory, MembershipStatus, PaymentGateway, Year,
    },
};

pub mod admin;
pub mod choices;
pub mod clubs;
pub mod events;
pub mod health;
pub mod memberships;
pub mod settings;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/clubs", get(clubs::list_clubs).post(clubs::create_club))
        .route("/clubs/check_admin_access", get(clubs::check_admin_access))
        .route("/clubs/my_clubs", get(clubs::my_clubs))
        .route(
            "/clubs/{slug}",
            get(clubs::retrieve_club)
                .put(clubs::update_club)
                .patch(clubs::partial_update_club)
                .delete(clubs::delete_club),
        )
        .route("/clubs/{slug}/events", get(clubs::club_events))
        .route("/clubs/{slug}/members", get(clubs::club_members))
        .route("/clubs/{slug}/join", post(clubs::join_club))
        .route("/clubs/{slug}/leave", post(clubs::leave_club))
        .route(
            "/memberships",
            get(memberships::list_memberships).post(memberships::create_membership),
        )
        .route(
            "/memberships/{membership_id}",
            get(memberships::get_membership)
                .put(memberships::update_membership)
                .patch(memberships::partial_update_membership)
                .delete(memberships::delete_membership),
        )
        .route(
            "/memberships/{membership_id}/approve",
            post(memberships::approve_membership),
        )
        .route(
            "/memberships/{membership_id}/reject",
            post(memberships::reject_membership),
        )
        .route(
            "/settings",
            get(settings::list_settings).post(settings::create_settings),
        )
        .route(
            "/settings/{settings_id}",
            get(settings::get_settings)
                .put(settings::update_settings)
                .patch(settings::partial_update_settings)
                .delete(settings::delete_settings),
        )
        .route(
            "/choices/{kind}",
            get(choices::active_choices).post(choices::create_choice),
        )
        .route(
            "/choices/{kind}/{code}",
            patch(choices::update_choice).delete(choices::delete_choice),
        )
        .route("/events", post(events::create_event))
        .route("/admin/clubs/{action}", post(admin::bulk_clubs))
        .route("/admin/memberships/{action}", post(admin::bulk_memberships))
        .route("/admin/audit", get(admin::query_audit_logs));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Registers the `bearer_auth` scheme referenced by secured paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        clubs::list_clubs,
        clubs::create_club,
        clubs::check_admin_access,
        clubs::my_clubs,
        clubs::retrieve_club,
        clubs::update_club,
        clubs::partial_update_club,
        clubs::delete_club,
        clubs::club_events,
        clubs::club_members,
        clubs::join_club,
        clubs::leave_club,
        memberships::list_memberships,
        memberships::create_membership,
        memberships::get_membership,
        memberships::update_membership,
        memberships::partial_update_membership,
        memberships::delete_membership,
        memberships::approve_membership,
        memberships::reject_membership,
        settings::list_settings,
        settings::create_settings,
        settings::get_settings,
        settings::update_settings,
        settings::partial_update_settings,
        settings::delete_settings,
        choices::active_choices,
        choices::create_choice,
        choices::update_choice,
        choices::delete_choice,
        events::create_event,
        admin::bulk_clubs,
        admin::bulk_memberships,
        admin::query_audit_logs,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            ClubResponse,
            ClubListItem,
            UserClubResponse,
            CreateClubRequest,
            UpdateClubRequest,
            CheckAdminAccessResponse,
            MembershipResponse,
            CreateMembershipRequest,
            UpdateMembershipRequest,
            SettingsResponse,
            SettingsFields,
            CreateSettingsRequest,
            BulkSelectionRequest,
            BulkUpdateResponse,
            MessageResponse,
            ClubType,
            ClubStatus,
            PaymentGateway,
            ClubRole,
            MembershipStatus,
            ClubEvent,
            Choice,
            ChoiceKind,
            Year,
            Department,
            DepartmentCategory,
            AuditEvent,
            AuditEventType,
            choices::ChoiceRequest,
            choices::ChoiceItem,
            events::CreateEventRequest,
            admin::ClubBulkAction,
            admin::MembershipBulkAction,
            admin::AuditLogResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Clubs", description = "Club management and membership lifecycle"),
        (name = "Memberships", description = "Membership administration"),
        (name = "Settings", description = "Per-club settings"),
        (name = "Choices", description = "Academic years and departments"),
        (name = "Events", description = "Event creation"),
        (name = "Admin", description = "Bulk actions and audit log"),
        (name = "Health", description = "Health probes")
    )
)]
pub struct ApiDoc;
