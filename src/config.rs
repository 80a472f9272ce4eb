// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`Config`] loaded once at
//! startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding `clubs.redb` | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_JWKS_URL` | JWKS endpoint for JWT verification | unset |
//! | `AUTH_JWT_SECRET` | Shared HS256 secret (alternative to JWKS) | unset |
//! | `AUTH_ISSUER` | Expected JWT issuer claim | unset |
//! | `AUTH_AUDIENCE` | Expected JWT audience claim | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `SEED_DEFAULT_CLUB` | Name of the default club to bootstrap | unset |
//! | `SEED_DEFAULT_CLUB_EMAIL` | Email of the bootstrapped club | `devs@example.org` |
//! | `SEED_ADMIN_USER_ID` | User added as admin of the bootstrapped club | unset |
//! | `SEED_CHOICES` | Populate default years/departments (`1`/`true`) | unset |

use std::env;
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "./data";
/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "clubs.redb";

pub const HOST_ENV: &str = "HOST";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8080;

pub const AUTH_JWKS_URL_ENV: &str = "AUTH_JWKS_URL";
pub const AUTH_JWT_SECRET_ENV: &str = "AUTH_JWT_SECRET";
pub const AUTH_ISSUER_ENV: &str = "AUTH_ISSUER";
pub const AUTH_AUDIENCE_ENV: &str = "AUTH_AUDIENCE";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

pub const SEED_DEFAULT_CLUB_ENV: &str = "SEED_DEFAULT_CLUB";
pub const SEED_DEFAULT_CLUB_EMAIL_ENV: &str = "SEED_DEFAULT_CLUB_EMAIL";
pub const DEFAULT_SEED_CLUB_EMAIL: &str = "devs@example.org";
pub const SEED_ADMIN_USER_ID_ENV: &str = "SEED_ADMIN_USER_ID";
pub const SEED_CHOICES_ENV: &str = "SEED_CHOICES";

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Token verification settings.
#[derive(Clone, Debug, Default)]
pub struct AuthSettings {
    pub jwks_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

/// Startup bootstrap settings.
#[derive(Clone, Debug, Default)]
pub struct SeedSettings {
    pub default_club: Option<String>,
    pub default_club_email: String,
    pub admin_user_id: Option<String>,
    pub choices: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub auth: AuthSettings,
    pub seed: SeedSettings,
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_flag(key: &str) -> bool {
    env_opt(key).is_some_and(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            data_dir: PathBuf::from(env_or(DATA_DIR_ENV, DEFAULT_DATA_DIR)),
            host: env_or(HOST_ENV, DEFAULT_HOST),
            port: env_or_parse(PORT_ENV, DEFAULT_PORT),
            log_format: LogFormat::parse(&env_or(LOG_FORMAT_ENV, "pretty")),
            auth: AuthSettings {
                jwks_url: env_opt(AUTH_JWKS_URL_ENV),
                jwt_secret: env_opt(AUTH_JWT_SECRET_ENV),
                issuer: env_opt(AUTH_ISSUER_ENV),
                audience: env_opt(AUTH_AUDIENCE_ENV),
            },
            seed: SeedSettings {
                default_club: env_opt(SEED_DEFAULT_CLUB_ENV),
                default_club_email: env_or(SEED_DEFAULT_CLUB_EMAIL_ENV, DEFAULT_SEED_CLUB_EMAIL),
                admin_user_id: env_opt(SEED_ADMIN_USER_ID_ENV),
                choices: env_flag(SEED_CHOICES_ENV),
            },
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
