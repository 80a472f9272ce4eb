// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies shared by the REST handlers. All types derive
//! `Serialize` and/or `Deserialize` plus `ToSchema` for OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Clubs**: detail view, list item view, "my clubs" view, create/update
//! - **Memberships**: membership view with club name, create/update
//! - **Settings**: per-club settings view, create/update
//! - **Common**: bulk selection, message and count responses
//!
//! Update requests are partial: absent fields are left unchanged. Nullable
//! fields distinguish "absent" from an explicit `null`, which clears them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::storage::{
    slugify, Club, ClubMembership, ClubRole, ClubSettings, ClubStatus, ClubType,
    MembershipStatus, PaymentGateway,
};

/// Deserialize a present field (even `null`) as `Some(..)`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Club Models
// =============================================================================

/// Full club view.
///
/// Gateway credentials are never included.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ClubResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub club_type: ClubType,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
    pub banner: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub status: ClubStatus,
    pub is_default: bool,
    pub allow_public_events: bool,
    pub require_approval: bool,
    pub payment_gateway: PaymentGateway,
    /// Number of events hosted by the club.
    pub total_events: usize,
    /// Number of active memberships.
    pub total_members: usize,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClubResponse {
    pub fn new(club: Club, total_events: usize, total_members: usize) -> Self {
        let is_active = club.is_active();
        Self {
            id: club.id,
            name: club.name,
            slug: club.slug,
            description: club.description,
            club_type: club.club_type,
            email: club.email,
            phone: club.phone,
            website: club.website,
            logo: club.logo,
            banner: club.banner,
            primary_color: club.primary_color,
            secondary_color: club.secondary_color,
            status: club.status,
            is_default: club.is_default,
            allow_public_events: club.allow_public_events,
            require_approval: club.require_approval,
            payment_gateway: club.payment_gateway,
            total_events,
            total_members,
            is_active,
            created_at: club.created_at,
            updated_at: club.updated_at,
        }
    }
}

/// Compact club view used by listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ClubListItem {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub club_type: ClubType,
    pub logo: Option<String>,
    pub primary_color: String,
    pub status: ClubStatus,
    pub total_events: usize,
    pub total_members: usize,
}

impl ClubListItem {
    pub fn new(club: Club, total_events: usize, total_members: usize) -> Self {
        Self {
            id: club.id,
            name: club.name,
            slug: club.slug,
            club_type: club.club_type,
            logo: club.logo,
            primary_color: club.primary_color,
            status: club.status,
            total_events,
            total_members,
        }
    }
}

/// A club the current user belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserClubResponse {
    pub club: ClubListItem,
    pub role: ClubRole,
    pub status: MembershipStatus,
    pub joined_at: DateTime<Utc>,
}

/// Request to create (or fully replace) a club.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateClubRequest {
    pub name: String,
    /// Derived from the name when omitted.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub club_type: Option<ClubType>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
    #[serde(default)]
    pub status: Option<ClubStatus>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub allow_public_events: Option<bool>,
    #[serde(default)]
    pub require_approval: Option<bool>,
    #[serde(default)]
    pub payment_gateway: Option<PaymentGateway>,
    /// Write-only gateway credentials.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub gateway_credentials: Option<serde_json::Value>,
}

impl CreateClubRequest {
    /// Build a new club from the request.
    pub fn into_club(self) -> Club {
        let mut club = Club::new(self.name.clone(), String::new(), self.email.clone());
        self.apply_to(&mut club);
        club
    }

    /// Overwrite every writable field of `club` (PUT semantics).
    pub fn apply_to(self, club: &mut Club) {
        let defaults = Club::new(String::new(), String::new(), String::new());
        club.slug = non_empty(self.slug).unwrap_or_else(|| slugify(&self.name));
        club.name = self.name;
        club.email = self.email;
        club.description = self.description.unwrap_or_default();
        club.club_type = self.club_type.unwrap_or_default();
        club.phone = non_empty(self.phone);
        club.website = non_empty(self.website);
        club.logo = non_empty(self.logo);
        club.banner = non_empty(self.banner);
        club.primary_color = self.primary_color.unwrap_or(defaults.primary_color);
        club.secondary_color = self.secondary_color.unwrap_or(defaults.secondary_color);
        club.status = self.status.unwrap_or_default();
        club.is_default = self.is_default.unwrap_or(false);
        club.allow_public_events = self.allow_public_events.unwrap_or(defaults.allow_public_events);
        club.require_approval = self.require_approval.unwrap_or(defaults.require_approval);
        club.payment_gateway = self.payment_gateway.unwrap_or_default();
        if let Some(credentials) = self.gateway_credentials {
            club.gateway_credentials = credentials;
        }
    }
}

/// Partial club update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateClubRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub club_type: Option<ClubType>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub logo: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub banner: Option<Option<String>>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub status: Option<ClubStatus>,
    pub is_default: Option<bool>,
    pub allow_public_events: Option<bool>,
    pub require_approval: Option<bool>,
    pub payment_gateway: Option<PaymentGateway>,
    #[schema(value_type = Option<Object>)]
    pub gateway_credentials: Option<serde_json::Value>,
}

impl UpdateClubRequest {
    pub fn apply_to(self, club: &mut Club) {
        if let Some(v) = self.name {
            club.name = v;
        }
        if let Some(v) = self.slug {
            club.slug = v;
        }
        if let Some(v) = self.description {
            club.description = v;
        }
        if let Some(v) = self.club_type {
            club.club_type = v;
        }
        if let Some(v) = self.email {
            club.email = v;
        }
        if let Some(v) = self.phone {
            club.phone = non_empty(v);
        }
        if let Some(v) = self.website {
            club.website = non_empty(v);
        }
        if let Some(v) = self.logo {
            club.logo = non_empty(v);
        }
        if let Some(v) = self.banner {
            club.banner = non_empty(v);
        }
        if let Some(v) = self.primary_color {
            club.primary_color = v;
        }
        if let Some(v) = self.secondary_color {
            club.secondary_color = v;
        }
        if let Some(v) = self.status {
            club.status = v;
        }
        if let Some(v) = self.is_default {
            club.is_default = v;
        }
        if let Some(v) = self.allow_public_events {
            club.allow_public_events = v;
        }
        if let Some(v) = self.require_approval {
            club.require_approval = v;
        }
        if let Some(v) = self.payment_gateway {
            club.payment_gateway = v;
        }
        if let Some(v) = self.gateway_credentials {
            club.gateway_credentials = v;
        }
    }
}

/// Result of the admin-access check.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CheckAdminAccessResponse {
    pub has_access: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    /// Clubs the user actively administers.
    pub club_admin_count: usize,
}

// =============================================================================
// Membership Models
// =============================================================================

/// Membership view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MembershipResponse {
    pub id: String,
    /// Club ID.
    pub club: String,
    pub club_name: String,
    /// User ID.
    pub user: String,
    pub role: ClubRole,
    pub status: MembershipStatus,
    pub can_create_events: bool,
    pub can_manage_members: bool,
    pub can_manage_payments: bool,
    pub can_view_analytics: bool,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MembershipResponse {
    pub fn new(membership: ClubMembership, club_name: impl Into<String>) -> Self {
        let flags = membership.permissions;
        Self {
            id: membership.id,
            club: membership.club_id,
            club_name: club_name.into(),
            user: membership.user_id,
            role: membership.role,
            status: membership.status,
            can_create_events: flags.can_create_events,
            can_manage_members: flags.can_manage_members,
            can_manage_payments: flags.can_manage_payments,
            can_view_analytics: flags.can_view_analytics,
            joined_at: membership.joined_at,
            updated_at: membership.updated_at,
        }
    }
}

/// Request to create (or fully replace) a membership.
///
/// Permission flags are not accepted: they follow from the role.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMembershipRequest {
    /// Club ID.
    pub club: String,
    /// User ID.
    pub user: String,
    #[serde(default)]
    pub role: Option<ClubRole>,
    #[serde(default)]
    pub status: Option<MembershipStatus>,
}

/// Partial membership update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateMembershipRequest {
    pub role: Option<ClubRole>,
    pub status: Option<MembershipStatus>,
}

impl UpdateMembershipRequest {
    pub fn apply_to(self, membership: &mut ClubMembership) {
        if let Some(role) = self.role {
            membership.role = role;
        }
        if let Some(status) = self.status {
            membership.status = status;
        }
    }
}

// =============================================================================
// Settings Models
// =============================================================================

/// Club settings view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SettingsResponse {
    pub id: String,
    /// Club ID.
    pub club: String,
    pub email_signature: String,
    pub notification_emails: Vec<String>,
    pub default_event_duration: u32,
    pub auto_approve_events: bool,
    pub max_events_per_month: Option<u32>,
    pub default_registration_deadline_days: u32,
    pub allow_late_registration: bool,
    pub default_currency: String,
    pub payment_terms: String,
    #[schema(value_type = Object)]
    pub social_links: serde_json::Value,
    #[schema(value_type = Object)]
    pub custom_fields: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClubSettings> for SettingsResponse {
    fn from(s: ClubSettings) -> Self {
        Self {
            id: s.id,
            club: s.club_id,
            email_signature: s.email_signature,
            notification_emails: s.notification_emails,
            default_event_duration: s.default_event_duration,
            auto_approve_events: s.auto_approve_events,
            max_events_per_month: s.max_events_per_month,
            default_registration_deadline_days: s.default_registration_deadline_days,
            allow_late_registration: s.allow_late_registration,
            default_currency: s.default_currency,
            payment_terms: s.payment_terms,
            social_links: s.social_links,
            custom_fields: s.custom_fields,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Settings fields accepted on create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SettingsFields {
    pub email_signature: Option<String>,
    pub notification_emails: Option<Vec<String>>,
    pub default_event_duration: Option<u32>,
    pub auto_approve_events: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<u32>)]
    pub max_events_per_month: Option<Option<u32>>,
    pub default_registration_deadline_days: Option<u32>,
    pub allow_late_registration: Option<bool>,
    pub default_currency: Option<String>,
    pub payment_terms: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub social_links: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub custom_fields: Option<serde_json::Value>,
}

impl SettingsFields {
    pub fn apply_to(self, s: &mut ClubSettings) {
        if let Some(v) = self.email_signature {
            s.email_signature = v;
        }
        if let Some(v) = self.notification_emails {
            s.notification_emails = v;
        }
        if let Some(v) = self.default_event_duration {
            s.default_event_duration = v;
        }
        if let Some(v) = self.auto_approve_events {
            s.auto_approve_events = v;
        }
        if let Some(v) = self.max_events_per_month {
            s.max_events_per_month = v;
        }
        if let Some(v) = self.default_registration_deadline_days {
            s.default_registration_deadline_days = v;
        }
        if let Some(v) = self.allow_late_registration {
            s.allow_late_registration = v;
        }
        if let Some(v) = self.default_currency {
            s.default_currency = v.to_uppercase();
        }
        if let Some(v) = self.payment_terms {
            s.payment_terms = v;
        }
        if let Some(v) = self.social_links {
            s.social_links = v;
        }
        if let Some(v) = self.custom_fields {
            s.custom_fields = v;
        }
    }
}

/// Request to create settings for a club.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSettingsRequest {
    /// Club ID.
    pub club: String,
    #[serde(flatten)]
    pub fields: SettingsFields,
}

// =============================================================================
// Common Models
// =============================================================================

/// Selection of records for a bulk action.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkSelectionRequest {
    pub ids: Vec<String>,
}

/// Number of records changed by a bulk action.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct BulkUpdateResponse {
    pub updated: usize,
    pub message: String,
}

/// Plain confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_derives_slug_and_defaults() {
        let req: CreateClubRequest =
            serde_json::from_str(r#"{"name":"Devs Rec","email":"devs@example.org"}"#).unwrap();
        let club = req.into_club();
        assert_eq!(club.slug, "devs-rec");
        assert_eq!(club.club_type, ClubType::Other);
        assert_eq!(club.primary_color, "#007bff");
        assert!(club.allow_public_events);
        assert!(!club.is_default);
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let mut club = Club::new("Alpha", "alpha", "a@example.org");
        club.phone = Some("+919876543210".into());
        club.website = Some("https://alpha.example.org".into());

        let patch: UpdateClubRequest =
            serde_json::from_str(r#"{"phone":null,"description":"New"}"#).unwrap();
        patch.apply_to(&mut club);

        assert_eq!(club.phone, None);
        assert_eq!(club.website.as_deref(), Some("https://alpha.example.org"));
        assert_eq!(club.description, "New");
    }

    #[test]
    fn club_response_hides_gateway_credentials() {
        let mut club = Club::new("Alpha", "alpha", "a@example.org");
        club.gateway_credentials = serde_json::json!({"secret": "s3cr3t"});
        let json = serde_json::to_value(ClubResponse::new(club, 2, 5)).unwrap();

        assert!(json.get("gateway_credentials").is_none());
        assert_eq!(json["total_events"], 2);
        assert_eq!(json["total_members"], 5);
        assert_eq!(json["is_active"], true);
    }

    #[test]
    fn settings_fields_clear_nullable_limit() {
        let mut s = ClubSettings::new("club");
        s.max_events_per_month = Some(4);

        let fields: SettingsFields =
            serde_json::from_str(r#"{"max_events_per_month":null,"default_currency":"usd"}"#)
                .unwrap();
        fields.apply_to(&mut s);
        assert_eq!(s.max_events_per_month, None);
        assert_eq!(s.default_currency, "USD");
    }

    #[test]
    fn membership_response_flattens_flags() {
        let m = ClubMembership::new("club", "user", ClubRole::Moderator, MembershipStatus::Active);
        let json = serde_json::to_value(MembershipResponse::new(m, "Alpha")).unwrap();
        assert_eq!(json["club_name"], "Alpha");
        assert_eq!(json["role"], "moderator");
        assert_eq!(json["can_manage_members"], true);
        assert_eq!(json["can_manage_payments"], false);
    }
}
