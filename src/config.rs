//! Runtime configuration
//!
//! Everything the tools read from the environment is read once, at startup,
//! into these structs and passed down explicitly.

use std::env;
use std::time::Duration;

use crate::error::{Result, TrackscanError};

/// Environment variable holding the Genius client access token
pub const ACCESS_TOKEN_VAR: &str = "GENIUS_CLIENT_ACCESS_TOKEN";

/// Environment variable overriding the Genius API base URL
pub const API_URL_VAR: &str = "GENIUS_API_URL";

/// Environment variable setting an HTTP timeout in seconds
pub const TIMEOUT_VAR: &str = "GENIUS_TIMEOUT_SECS";

/// Default Genius API base URL
pub const DEFAULT_API_URL: &str = "https://api.genius.com";

/// Settings for the Genius lyrics client
#[derive(Debug, Clone)]
pub struct GeniusConfig {
    /// Client access token sent as a bearer token
    pub access_token: String,
    /// API base URL without trailing slash
    pub api_url: String,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Strip `[Verse 1]`-style annotations and close the gaps they leave
    pub remove_section_headers: bool,
}

impl GeniusConfig {
    /// Create a config with the given token and default settings
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: None,
            remove_section_headers: true,
        }
    }

    /// Read the config from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    ///
    /// An empty token counts as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = lookup(ACCESS_TOKEN_VAR)
            .filter(|token| !token.trim().is_empty())
            .ok_or(TrackscanError::MissingCredential {
                var: ACCESS_TOKEN_VAR,
            })?;

        let mut config = Self::new(access_token);

        if let Some(url) = lookup(API_URL_VAR).filter(|u| !u.trim().is_empty()) {
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| TrackscanError::InvalidConfig {
                key: TIMEOUT_VAR.to_string(),
                reason: format!("expected a positive number of seconds, got '{}'", raw),
            })?;
            if secs == 0 {
                return Err(TrackscanError::InvalidConfig {
                    key: TIMEOUT_VAR.to_string(),
                    reason: "timeout must be greater than zero".to_string(),
                });
            }
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Builder-style override of the API base URL
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Fixed parameters of the feature extractor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    /// Rate every input is resampled to before analysis
    pub sample_rate: u32,
    /// STFT frame length in samples
    pub frame_size: usize,
    /// STFT hop length in samples
    pub hop_size: usize,
    /// Lowest tempo considered
    pub min_bpm: f64,
    /// Highest tempo considered
    pub max_bpm: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            sample_rate: 44100,
            frame_size: 2048,
            hop_size: 512,
            min_bpm: 40.0,
            max_bpm: 208.0,
        }
    }
}

impl AnalysisConfig {
    /// Onset envelope frames per second
    pub fn frame_rate(&self) -> f64 {
        self.sample_rate as f64 / self.hop_size as f64
    }
}
