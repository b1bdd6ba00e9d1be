//! Environment-backed runtime configuration for `gallery-cli`.

use std::{env, error::Error, fmt, time::Duration};

use gallery_core::{DEFAULT_TERMINAL_PHOTO_ID, page_size_for_width};
use gallery_feed::{DEFAULT_FEED_URL, HttpFeedConfig};
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_VIEWPORT_WIDTH_PX: u32 = 1_024;

/// Runtime configuration used by the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Photo catalog endpoint accepting `offset`/`limit` query parameters.
    pub feed_url: String,
    /// Id of the last photo in the catalog.
    pub terminal_photo_id: i64,
    /// Per-request timeout for feed calls.
    pub request_timeout_ms: u64,
    /// Simulated viewport width used to derive the page size.
    pub viewport_width_px: u32,
    /// Fixed page size overriding the viewport breakpoints.
    pub page_size_override: Option<u32>,
}

impl CliConfig {
    /// Parse configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let feed_url = optional_trimmed_env("GALLERY_FEED_URL", &mut lookup)
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_owned());
        if let Err(err) = Url::parse(&feed_url) {
            return Err(ConfigError::InvalidValue {
                key: "GALLERY_FEED_URL",
                value: feed_url,
                reason: err.to_string(),
            });
        }

        let terminal_photo_id = parse_with_default(
            "GALLERY_TERMINAL_PHOTO_ID",
            DEFAULT_TERMINAL_PHOTO_ID,
            &mut lookup,
        )?;
        let request_timeout_ms = parse_with_default(
            "GALLERY_REQUEST_TIMEOUT_MS",
            DEFAULT_REQUEST_TIMEOUT_MS,
            &mut lookup,
        )?;
        let viewport_width_px = parse_with_default(
            "GALLERY_VIEWPORT_WIDTH",
            DEFAULT_VIEWPORT_WIDTH_PX,
            &mut lookup,
        )?;
        let page_size_override = parse_optional::<u32, _>("GALLERY_PAGE_SIZE", &mut lookup)?;

        if request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "GALLERY_REQUEST_TIMEOUT_MS",
                value: "0".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        if page_size_override == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "GALLERY_PAGE_SIZE",
                value: "0".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }

        Ok(Self {
            feed_url,
            terminal_photo_id,
            request_timeout_ms,
            viewport_width_px,
            page_size_override,
        })
    }

    /// Page size the session starts with.
    pub fn page_size(&self) -> u32 {
        self.page_size_override
            .unwrap_or_else(|| page_size_for_width(self.viewport_width_px))
    }

    /// Feed client settings.
    pub fn feed_config(&self) -> HttpFeedConfig {
        HttpFeedConfig::new(self.feed_url.clone())
            .with_terminal_photo_id(self.terminal_photo_id)
            .with_request_timeout(Duration::from_millis(self.request_timeout_ms))
    }
}

/// Errors produced while parsing runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid {key}='{value}': {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

fn optional_trimmed_env<F>(key: &'static str, lookup: &mut F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_optional<T, F>(key: &'static str, lookup: &mut F) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
    F: FnMut(&str) -> Option<String>,
{
    let Some(value) = optional_trimmed_env(key, lookup) else {
        return Ok(None);
    };
    value
        .parse::<T>()
        .map(Some)
        .map_err(|err| ConfigError::InvalidValue {
            key,
            value,
            reason: err.to_string(),
        })
}

fn parse_with_default<T, F>(key: &'static str, default: T, lookup: &mut F) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
    F: FnMut(&str) -> Option<String>,
{
    Ok(parse_optional(key, lookup)?.unwrap_or(default))
}
