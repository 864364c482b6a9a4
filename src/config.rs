//! Runtime configuration resolved once at startup.
//!
//! All requests target configurable roots: the hosted price dataset and
//! the search backend. Values come from the process environment (the CLI
//! loads a `.env` file first), so test, staging and production can differ
//! without code changes.

use secrecy::SecretString;
use url::Url;

use crate::error::{PriceCompareError, Result};

/// Environment variable holding the price dataset root URL.
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";

/// Environment variable holding the price dataset API key.
pub const SUPABASE_KEY_ENV: &str = "SUPABASE_ANON_KEY";

/// Environment variable holding the search backend root URL.
pub const BACKEND_URL_ENV: &str = "BACKEND_URL";

/// A URL setting as loaded: unset, or the outcome of parsing it.
type UrlSetting = Option<core::result::Result<Url, url::ParseError>>;

/// Resolved configuration.
///
/// Every value is optional at load time; accessors fail only when a
/// missing or unparseable value is needed.
#[derive(Debug, Default)]
pub struct Config {
    /// Price dataset root.
    supabase_url: UrlSetting,
    /// Price dataset API key.
    supabase_key: Option<SecretString>,
    /// Search backend root.
    backend_url: UrlSetting,
}

impl Config {
    /// Loads configuration from the process environment.
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset. URL values that fail to parse
    /// are kept as errors and reported by the matching accessor.
    #[inline]
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let parse_url = |name: &str| {
            read(name).map(|raw| {
                Url::parse(raw.trim()).inspect_err(|err| {
                    tracing::warn!(name, error = %err, "unparseable URL, failing on use");
                })
            })
        };

        let config = Self {
            supabase_url: parse_url(SUPABASE_URL_ENV),
            supabase_key: read(SUPABASE_KEY_ENV).map(SecretString::from),
            backend_url: parse_url(BACKEND_URL_ENV),
        };
        tracing::debug!(
            has_supabase_url = config.supabase_url.is_some(),
            has_backend_url = config.backend_url.is_some(),
            has_key = config.supabase_key.is_some(),
            "configuration loaded"
        );
        config
    }

    /// Sets the price dataset root.
    #[inline]
    #[must_use]
    pub fn with_supabase_url(mut self, url: Url) -> Self {
        self.supabase_url = Some(Ok(url));
        self
    }

    /// Sets the price dataset API key.
    #[inline]
    #[must_use]
    pub fn with_supabase_key<T: Into<String>>(mut self, key: T) -> Self {
        self.supabase_key = Some(SecretString::from(key.into()));
        self
    }

    /// Sets the search backend root.
    #[inline]
    #[must_use]
    pub fn with_backend_url(mut self, url: Url) -> Self {
        self.backend_url = Some(Ok(url));
        self
    }

    /// Returns the price dataset root.
    ///
    /// # Errors
    ///
    /// Returns [`PriceCompareError::Config`] if it is not configured, or
    /// [`PriceCompareError::InvalidUrl`] if it could not be parsed.
    #[inline]
    pub fn supabase_url(&self) -> Result<&Url> {
        resolve_url(self.supabase_url.as_ref(), SUPABASE_URL_ENV)
    }

    /// Returns the price dataset API key.
    ///
    /// # Errors
    ///
    /// Returns [`PriceCompareError::Config`] if it is not configured.
    #[inline]
    pub fn supabase_key(&self) -> Result<&SecretString> {
        self.supabase_key
            .as_ref()
            .ok_or_else(|| missing(SUPABASE_KEY_ENV))
    }

    /// Returns the search backend root.
    ///
    /// # Errors
    ///
    /// Returns [`PriceCompareError::Config`] if it is not configured, or
    /// [`PriceCompareError::InvalidUrl`] if it could not be parsed.
    #[inline]
    pub fn backend_url(&self) -> Result<&Url> {
        resolve_url(self.backend_url.as_ref(), BACKEND_URL_ENV)
    }
}

/// Turns a loaded URL setting into the URL or the error for `name`.
fn resolve_url<'a>(
    setting: Option<&'a core::result::Result<Url, url::ParseError>>,
    name: &'static str,
) -> Result<&'a Url> {
    setting
        .ok_or_else(|| missing(name))?
        .as_ref()
        .map_err(|&source| PriceCompareError::InvalidUrl { name, source })
}

/// Builds the error for an unset variable.
fn missing(name: &str) -> PriceCompareError {
    PriceCompareError::Config(format!("{name} environment variable is not set"))
}
