use crate::hash::DEFAULT_ITERATIONS;
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;

pub static DATABASE_URL: &str = "DATABASE_URL";
pub static BIND_ADDRESS: &str = "BIND_ADDRESS";
pub static DOMAIN: &str = "DOMAIN";
pub static SECURE_COOKIE: &str = "SECURE_COOKIE";
pub static SESSION_TTL_DAYS: &str = "SESSION_TTL_DAYS";
pub static PBKDF2_ITERATIONS: &str = "PBKDF2_ITERATIONS";

#[derive(Debug, Error)]
#[error("{name}: invalid value {value:?}")]
pub struct ConfigError {
    name: &'static str,
    value: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub cookie_domain: Option<String>,
    pub secure_cookie: bool,
    pub session_ttl_days: NonZeroU32,
    pub pbkdf2_iterations: NonZeroU32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: "users.db".to_string(),
            bind_address: "localhost:8080".to_string(),
            cookie_domain: None,
            secure_cookie: false,
            session_ttl_days: NonZeroU32::MIN,
            pbkdf2_iterations: DEFAULT_ITERATIONS,
        }
    }
}

fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError { name, value }),
    }
}

impl Settings {
    pub fn from_env() -> Result<Settings, ConfigError> {
        Settings::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source; unset names keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        Ok(Settings {
            database_url: lookup(DATABASE_URL).unwrap_or(defaults.database_url),
            bind_address: lookup(BIND_ADDRESS).unwrap_or(defaults.bind_address),
            cookie_domain: lookup(DOMAIN).filter(|d| !d.trim().is_empty()),
            secure_cookie: parse_or(&lookup, SECURE_COOKIE, defaults.secure_cookie)?,
            session_ttl_days: parse_or(&lookup, SESSION_TTL_DAYS, defaults.session_ttl_days)?,
            pbkdf2_iterations: parse_or(&lookup, PBKDF2_ITERATIONS, defaults.pbkdf2_iterations)?,
        })
    }
}
