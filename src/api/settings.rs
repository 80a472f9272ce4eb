// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Club settings endpoints (staff only).

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
    models::{CreateSettingsRequest, SettingsFields, SettingsResponse},
    state::AppState,
    storage::{AuditEventType, ClubSettings, SettingsRepository},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SettingsListQuery {
    /// Club ID.
    pub club: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    security(("bearer_auth" = [])),
    params(SettingsListQuery),
    responses(
        (status = 200, description = "Club settings", body = [SettingsResponse]),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_settings(
    StaffOnly(_user): StaffOnly,
    State(state): State<AppState>,
    Query(query): Query<SettingsListQuery>,
) -> Result<Json<Vec<SettingsResponse>>, ApiError> {
    let settings = SettingsRepository::new(&state.db).list(query.club.as_deref())?;
    Ok(Json(settings.into_iter().map(SettingsResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/settings",
    tag = "Settings",
    security(("bearer_auth" = [])),
    request_body = CreateSettingsRequest,
    responses(
        (status = 201, description = "Settings created", body = SettingsResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_settings(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Json(request): Json<CreateSettingsRequest>,
) -> Result<(StatusCode, Json<SettingsResponse>), ApiError> {
    let mut settings = ClubSettings::new(request.club);
    request.fields.apply_to(&mut settings);

    let settings = SettingsRepository::new(&state.db).save(settings)?;
    audit_log!(&state.db, AuditEventType::SettingsChanged, &user, "settings", &settings.id);
    Ok((StatusCode::CREATED, Json(settings.into())))
}

#[utoipa::path(
    get,
    path = "/api/settings/{settings_id}",
    tag = "Settings",
    security(("bearer_auth" = [])),
    params(("settings_id" = String, Path, description = "Settings ID")),
    responses(
        (status = 200, description = "Club settings", body = SettingsResponse),
        (status = 404, description = "Settings not found")
    )
)]
pub async fn get_settings(
    StaffOnly(_user): StaffOnly,
    State(state): State<AppState>,
    Path(settings_id): Path<String>,
) -> Result<Json<SettingsResponse>, ApiError> {
    Ok(Json(SettingsRepository::new(&state.db).get(&settings_id)?.into()))
}

/// Replace settings. Omitted fields return to their defaults.
#[utoipa::path(
    put,
    path = "/api/settings/{settings_id}",
    tag = "Settings",
    security(("bearer_auth" = [])),
    params(("settings_id" = String, Path, description = "Settings ID")),
    request_body = CreateSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = SettingsResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Settings not found")
    )
)]
pub async fn update_settings(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Path(settings_id): Path<String>,
    Json(request): Json<CreateSettingsRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let repo = SettingsRepository::new(&state.db);
    let existing = repo.get(&settings_id)?;

    let mut settings = ClubSettings::new(request.club);
    settings.id = existing.id;
    settings.created_at = existing.created_at;
    request.fields.apply_to(&mut settings);

    let settings = repo.save(settings)?;
    audit_log!(&state.db, AuditEventType::SettingsChanged, &user, "settings", &settings.id);
    Ok(Json(settings.into()))
}

#[utoipa::path(
    patch,
    path = "/api/settings/{settings_id}",
    tag = "Settings",
    security(("bearer_auth" = [])),
    params(("settings_id" = String, Path, description = "Settings ID")),
    request_body = SettingsFields,
    responses(
        (status = 200, description = "Settings updated", body = SettingsResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Settings not found")
    )
)]
pub async fn partial_update_settings(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Path(settings_id): Path<String>,
    Json(fields): Json<SettingsFields>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let repo = SettingsRepository::new(&state.db);
    let mut settings = repo.get(&settings_id)?;
    fields.apply_to(&mut settings);

    let settings = repo.save(settings)?;
    audit_log!(&state.db, AuditEventType::SettingsChanged, &user, "settings", &settings.id);
    Ok(Json(settings.into()))
}

#[utoipa::path(
    delete,
    path = "/api/settings/{settings_id}",
    tag = "Settings",
    security(("bearer_auth" = [])),
    params(("settings_id" = String, Path, description = "Settings ID")),
    responses(
        (status = 204, description = "Settings deleted"),
        (status = 404, description = "Settings not found")
    )
)]
pub async fn delete_settings(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Path(settings_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    SettingsRepository::new(&state.db).delete(&settings_id)?;
    audit_log!(&state.db, AuditEventType::SettingsChanged, &user, "settings", &settings_id);
    Ok(StatusCode::NO_CONTENT)
}
