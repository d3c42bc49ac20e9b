// Runtime settings read from the environment (after `.env` is loaded).
// Everything has a default, so an empty environment is a valid one.

use crate::infra::ai::gemini_client::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::infra::ai::GeminiSettings;
use crate::infra::google_docs::google_docs_client::{DEFAULT_DOCS_BASE_URL, DEFAULT_DRIVE_BASE_URL};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CLIENT_SECRETS_FILE: &str = "credentials.json";
pub const DEFAULT_TOKEN_CACHE_FILE: &str = "token.json";
pub const DEFAULT_OAUTH_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Error)]
#[error("Invalid value for {var} ({value:?}): {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub client_secrets_file: PathBuf,
    pub token_cache_file: PathBuf,
    pub gemini: GeminiSettings,
    pub docs_base_url: String,
    pub drive_base_url: String,
    /// 0 picks a free port for every consent flow.
    pub oauth_redirect_port: u16,
    pub oauth_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let string_or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        Ok(Self {
            client_secrets_file: PathBuf::from(string_or(
                "GOOGLE_CLIENT_SECRETS_FILE",
                DEFAULT_CLIENT_SECRETS_FILE,
            )),
            token_cache_file: PathBuf::from(string_or(
                "TOKEN_CACHE_FILE",
                DEFAULT_TOKEN_CACHE_FILE,
            )),
            gemini: GeminiSettings {
                base_url: string_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
                model: string_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                temperature: parse_optional::<f32>("GEMINI_TEMPERATURE", get("GEMINI_TEMPERATURE"))?,
                max_output_tokens: parse_optional::<u32>(
                    "GEMINI_MAX_OUTPUT_TOKENS",
                    get("GEMINI_MAX_OUTPUT_TOKENS"),
                )?,
            },
            docs_base_url: string_or("GOOGLE_DOCS_BASE_URL", DEFAULT_DOCS_BASE_URL),
            drive_base_url: string_or("GOOGLE_DRIVE_BASE_URL", DEFAULT_DRIVE_BASE_URL),
            oauth_redirect_port: parse_optional::<u16>(
                "OAUTH_REDIRECT_PORT",
                get("OAUTH_REDIRECT_PORT"),
            )?
            .unwrap_or(0),
            oauth_timeout: Duration::from_secs(
                parse_optional::<u64>("OAUTH_TIMEOUT_SECS", get("OAUTH_TIMEOUT_SECS"))?
                    .unwrap_or(DEFAULT_OAUTH_TIMEOUT_SECS),
            ),
        })
    }
}

fn parse_optional<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}
