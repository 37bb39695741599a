//! Runtime configuration.
//!
//! Settings come from environment variables, optionally backed by env
//! files (feature `env-file`). Variables already set in the process win over
//! files, and earlier files win over later ones.

#[cfg(feature = "env-file")]
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{MoneyAppError, Result};
use crate::money::format_money;

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "MONEYAPP_API_URL";

/// Environment variable holding the currency symbol.
pub const CURRENCY_ENV: &str = "MONEYAPP_CURRENCY";

/// API base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Currency symbol used when none is configured.
pub const DEFAULT_CURRENCY: &str = "₹";

/// Application directory name under the platform config directory.
#[cfg(feature = "env-file")]
const APP_NAME: &str = "moneyapp";

/// Env file name inside the application config directory.
#[cfg(feature = "env-file")]
const ENV_FILE_NAME: &str = "moneyapp.env";

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the MoneyApp API.
    pub api_url: Url,
    /// Symbol prefixed to rendered amounts.
    pub currency: String,
}

impl Config {
    /// Reads the settings from the process environment, falling back to
    /// the given env files in order. Missing files are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::EnvFile`] if a file exists but cannot be
    /// parsed, or [`MoneyAppError::Config`] for an unusable value.
    #[cfg(feature = "env-file")]
    pub fn from_env_and_files<P: AsRef<Path>>(files: &[P]) -> Result<Self> {
        let mut layered = Vec::new();
        for file in files {
            if let Some(vars) = read_env_file(file.as_ref())? {
                layered.extend(vars);
            }
        }
        Self::from_layers(|key| std::env::var(key).ok(), &layered)
    }

    /// Resolves each variable from `process` first, then from the first
    /// file pair carrying it. Empty values count as unset in every layer.
    #[cfg(feature = "env-file")]
    fn from_layers<F: Fn(&str) -> Option<String>>(
        process: F,
        layered: &[(String, String)],
    ) -> Result<Self> {
        Self::from_lookup(|key| {
            process(key).filter(|value| !value.is_empty()).or_else(|| {
                layered
                    .iter()
                    .find(|pair| pair.0 == key && !pair.1.is_empty())
                    .map(|pair| pair.1.clone())
            })
        })
    }

    /// Builds the settings from an arbitrary variable lookup.
    ///
    /// Unset and empty variables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::Config`] if the API URL does not parse or
    /// is not `http`/`https`.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let raw_url = lookup(API_URL_ENV)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let currency = lookup(CURRENCY_ENV)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned());
        let config = Self {
            api_url: parse_api_url(&raw_url)?,
            currency,
        };
        tracing::debug!(api_url = %config.api_url, currency = %config.currency, "configuration resolved");
        Ok(config)
    }

    /// Replaces the API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAppError::Config`] if `raw` does not parse or is not
    /// `http`/`https`.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self> {
        self.api_url = parse_api_url(raw)?;
        Ok(self)
    }

    /// Replaces the currency symbol.
    #[inline]
    #[must_use]
    pub fn with_currency<T: Into<String>>(mut self, currency: T) -> Self {
        self.currency = currency.into();
        self
    }

    /// Renders an amount with the currency symbol, e.g. `₹12.50`.
    #[inline]
    #[must_use]
    pub fn display_money(&self, amount: f64) -> String {
        format!("{}{}", self.currency, format_money(amount))
    }

    /// Returns the env files consulted by default: `./.env`, then
    /// `<config dir>/moneyapp/moneyapp.env` when the platform has one.
    #[cfg(feature = "env-file")]
    #[must_use]
    pub fn default_env_files() -> Vec<PathBuf> {
        let mut files = vec![PathBuf::from(".env")];
        if let Some(config_dir) = dirs::config_dir() {
            files.push(config_dir.join(APP_NAME).join(ENV_FILE_NAME));
        }
        files
    }
}

/// Parses an API base URL, accepting only `http` and `https`.
fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|err| MoneyAppError::Config {
        key: API_URL_ENV,
        reason: format!("{raw:?}: {err}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(MoneyAppError::Config {
            key: API_URL_ENV,
            reason: format!("unsupported scheme {:?}", url.scheme()),
        });
    }
    Ok(url)
}

/// Reads `KEY=value` pairs from an env file without touching the process
/// environment. Returns `None` if the file does not exist.
///
/// # Errors
///
/// Returns [`MoneyAppError::EnvFile`] if the file cannot be read or parsed.
#[cfg(feature = "env-file")]
pub fn read_env_file(path: &Path) -> Result<Option<Vec<(String, String)>>> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(err) if err.not_found() => {
            tracing::trace!(path = %path.display(), "env file not found");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };
    let vars = iter.collect::<core::result::Result<Vec<_>, _>>()?;
    tracing::debug!(path = %path.display(), count = vars.len(), "env file loaded");
    Ok(Some(vars))
}
