// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Academic lookup choices.
//!
//! Reading active choices is public; managing entries requires staff.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::{
    audit_log,
    auth::StaffOnly,
    error::ApiError,
    state::AppState,
    storage::{
        AuditEvent, AuditEventType, Choice, ChoiceKind, ChoiceRepository, Department,
        DepartmentCategory, Year,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChoiceQuery {
    /// Department category filter. Ignored for years.
    pub category: Option<DepartmentCategory>,
}

/// Create or update a lookup entry.
///
/// `label` is also accepted as `display_name` (years) or `full_name`
/// (departments).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ChoiceRequest {
    /// Required on create. Immutable afterwards.
    pub code: Option<String>,
    #[serde(alias = "display_name", alias = "full_name")]
    pub label: Option<String>,
    /// Departments only.
    pub category: Option<DepartmentCategory>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}

/// A stored year or department.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(untagged)]
pub enum ChoiceItem {
    Year(Year),
    Department(Department),
}

fn log_change(state: &AppState, user_id: &str, kind: ChoiceKind, code: &str, op: &str) {
    audit_log!(
        &state.db,
        AuditEvent::new(AuditEventType::ChoicesChanged)
            .with_user(user_id)
            .with_resource("choice", code)
            .with_details(json!({ "kind": kind, "op": op }))
    );
}

/// Active `(code, label)` pairs for a lookup table.
#[utoipa::path(
    get,
    path = "/api/choices/{kind}",
    tag = "Choices",
    params(
        ("kind" = ChoiceKind, Path, description = "`years` or `departments`"),
        ChoiceQuery
    ),
    responses((status = 200, description = "Active choices", body = [Choice]))
)]
pub async fn active_choices(
    State(state): State<AppState>,
    Path(kind): Path<ChoiceKind>,
    Query(query): Query<ChoiceQuery>,
) -> Result<Json<Vec<Choice>>, ApiError> {
    let choices = ChoiceRepository::new(&state.db).active_choices(kind, query.category)?;
    Ok(Json(choices))
}

#[utoipa::path(
    post,
    path = "/api/choices/{kind}",
    tag = "Choices",
    security(("bearer_auth" = [])),
    params(("kind" = ChoiceKind, Path, description = "`years` or `departments`")),
    request_body = ChoiceRequest,
    responses(
        (status = 201, description = "Choice created", body = ChoiceItem),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_choice(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Path(kind): Path<ChoiceKind>,
    Json(request): Json<ChoiceRequest>,
) -> Result<(StatusCode, Json<ChoiceItem>), ApiError> {
    let code = request
        .code
        .ok_or_else(|| ApiError::bad_request("code is required"))?;
    let label = request.label.unwrap_or_default();
    let order = request.order.unwrap_or_default();
    let repo = ChoiceRepository::new(&state.db);

    let item = match kind {
        ChoiceKind::Years => {
            let mut year = Year::new(code, label, order);
            if let Some(active) = request.is_active {
                year.is_active = active;
            }
            ChoiceItem::Year(repo.create(year)?)
        }
        ChoiceKind::Departments => {
            let category = request.category.unwrap_or_default();
            let mut department = Department::new(code, label, category, order);
            if let Some(active) = request.is_active {
                department.is_active = active;
            }
            ChoiceItem::Department(repo.create(department)?)
        }
    };

    let code = match &item {
        ChoiceItem::Year(y) => y.code.as_str(),
        ChoiceItem::Department(d) => d.code.as_str(),
    };
    log_change(&state, &user.user_id, kind, code, "create");
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    patch,
    path = "/api/choices/{kind}/{code}",
    tag = "Choices",
    security(("bearer_auth" = [])),
    params(
        ("kind" = ChoiceKind, Path, description = "`years` or `departments`"),
        ("code" = String, Path, description = "Choice code")
    ),
    request_body = ChoiceRequest,
    responses(
        (status = 200, description = "Choice updated", body = ChoiceItem),
        (status = 400, description = "Code cannot be changed"),
        (status = 404, description = "Choice not found")
    )
)]
pub async fn update_choice(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Path((kind, code)): Path<(ChoiceKind, String)>,
    Json(request): Json<ChoiceRequest>,
) -> Result<Json<ChoiceItem>, ApiError> {
    let repo = ChoiceRepository::new(&state.db);
    let item = match kind {
        ChoiceKind::Years => ChoiceItem::Year(repo.update::<Year, _>(&code, |y| {
            if let Some(new_code) = request.code {
                y.code = new_code;
            }
            if let Some(label) = request.label {
                y.display_name = label;
            }
            if let Some(active) = request.is_active {
                y.is_active = active;
            }
            if let Some(order) = request.order {
                y.order = order;
            }
        })?),
        ChoiceKind::Departments => ChoiceItem::Department(repo.update::<Department, _>(&code, |d| {
            if let Some(new_code) = request.code {
                d.code = new_code;
            }
            if let Some(label) = request.label {
                d.full_name = label;
            }
            if let Some(category) = request.category {
                d.category = category;
            }
            if let Some(active) = request.is_active {
                d.is_active = active;
            }
            if let Some(order) = request.order {
                d.order = order;
            }
        })?),
    };

    log_change(&state, &user.user_id, kind, &code, "update");
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/api/choices/{kind}/{code}",
    tag = "Choices",
    security(("bearer_auth" = [])),
    params(
        ("kind" = ChoiceKind, Path, description = "`years` or `departments`"),
        ("code" = String, Path, description = "Choice code")
    ),
    responses(
        (status = 204, description = "Choice deleted"),
        (status = 404, description = "Choice not found")
    )
)]
pub async fn delete_choice(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Path((kind, code)): Path<(ChoiceKind, String)>,
) -> Result<StatusCode, ApiError> {
    let repo = ChoiceRepository::new(&state.db);
    match kind {
        ChoiceKind::Years => repo.delete::<Year>(&code)?,
        ChoiceKind::Departments => repo.delete::<Department>(&code)?,
    }
    log_change(&state, &user.user_id, kind, &code, "delete");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PlatformRole;
    use crate::state::test_support::{test_state, user};

    fn staff() -> StaffOnly {
        StaffOnly(user("staff_1", PlatformRole::Staff))
    }

    fn request(body: serde_json::Value) -> Json<ChoiceRequest> {
        Json(serde_json::from_value(body).unwrap())
    }

    #[tokio::test]
    async fn defaults_are_listed_in_order() {
        let (state, _dir) = test_state();
        ChoiceRepository::new(&state.db).populate_defaults(false).unwrap();

        let Json(years) = active_choices(
            State(state.clone()),
            Path(ChoiceKind::Years),
            Query(ChoiceQuery::default()),
        )
        .await
        .unwrap();
        let codes: Vec<&str> = years.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["1", "2", "3", "4", "PG1", "PG2", "PhD"]);

        let Json(departments) = active_choices(
            State(state.clone()),
            Path(ChoiceKind::Departments),
            Query(ChoiceQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(departments.len(), 21);

        let Json(pg) = active_choices(
            State(state),
            Path(ChoiceKind::Departments),
            Query(ChoiceQuery {
                category: Some(DepartmentCategory::PG),
            }),
        )
        .await
        .unwrap();
        assert!(pg.is_empty());
    }

    #[tokio::test]
    async fn create_filter_and_deactivate_department() {
        let (state, _dir) = test_state();
        let (status, Json(item)) = create_choice(
            staff(),
            State(state.clone()),
            Path(ChoiceKind::Departments),
            request(json!({"code": "MBA", "full_name": "Business Administration", "category": "PG"})),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(matches!(item, ChoiceItem::Department(ref d) if d.category == DepartmentCategory::PG));

        let Json(pg) = active_choices(
            State(state.clone()),
            Path(ChoiceKind::Departments),
            Query(ChoiceQuery {
                category: Some(DepartmentCategory::PG),
            }),
        )
        .await
        .unwrap();
        assert_eq!(
            pg,
            vec![Choice {
                code: "MBA".into(),
                label: "Business Administration".into()
            }]
        );

        update_choice(
            staff(),
            State(state.clone()),
            Path((ChoiceKind::Departments, "MBA".into())),
            request(json!({"is_active": false})),
        )
        .await
        .unwrap();
        let Json(pg) = active_choices(
            State(state),
            Path(ChoiceKind::Departments),
            Query(ChoiceQuery {
                category: Some(DepartmentCategory::PG),
            }),
        )
        .await
        .unwrap();
        assert!(pg.is_empty());
    }

    #[tokio::test]
    async fn duplicate_code_and_code_change_are_rejected() {
        let (state, _dir) = test_state();
        create_choice(
            staff(),
            State(state.clone()),
            Path(ChoiceKind::Years),
            request(json!({"code": "5", "display_name": "Year V"})),
        )
        .await
        .unwrap();

        let err = create_choice(
            staff(),
            State(state.clone()),
            Path(ChoiceKind::Years),
            request(json!({"code": "5", "label": "Again"})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = update_choice(
            staff(),
            State(state.clone()),
            Path((ChoiceKind::Years, "5".into())),
            request(json!({"code": "6"})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = create_choice(
            staff(),
            State(state.clone()),
            Path(ChoiceKind::Years),
            request(json!({"label": "No code"})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "code is required");

        delete_choice(staff(), State(state.clone()), Path((ChoiceKind::Years, "5".into())))
            .await
            .unwrap();
        let err = delete_choice(staff(), State(state), Path((ChoiceKind::Years, "5".into())))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
