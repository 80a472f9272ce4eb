// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer JWT authentication and the club access policy.
//!
//! ## Auth Flow
//!
//! 1. Client sends `Authorization: Bearer <JWT>`
//! 2. Server verifies the signature (JWKS or shared secret), expiry, issuer
//!    and audience
//! 3. Extracts:
//!    - `sub` → canonical `user_id`
//!    - `publicMetadata.role` → platform role (`superuser`, `staff`, `user`)
//! 4. Club handlers consult [`policy::authorize`] with the resolved actor
//!
//! ## Security
//!
//! - All club, membership, settings and admin endpoints require a token
//! - JWKS is cached with TTL; stale keys are served if a refresh fails
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod policy;
pub mod roles;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth, StaffOnly};
pub use jwks::JwksManager;
pub use policy::{authorize, AdminMembershipLookup, ClubAction};
pub use roles::PlatformRole;
