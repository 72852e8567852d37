//! Session configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Retry limit applied when none is configured.
pub const DEFAULT_RETRY_LIMIT: u32 = 4;
/// Largest accepted retry limit.
pub const MAX_RETRY_LIMIT: u32 = 100;

/// Per-session settings fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
	/// Number of retries a retry loop may perform after the first attempt.
	pub retry_limit: u32,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			retry_limit: DEFAULT_RETRY_LIMIT,
		}
	}
}

impl SessionConfig {
	pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
		self.retry_limit = retry_limit;
		self
	}

	/// Parses and validates a JSON document. Missing fields take their defaults.
	pub fn from_json_str(json: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses, and validates a JSON config file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
		let json = std::fs::read_to_string(path)?;
		Self::from_json_str(&json)
	}

	pub fn validate(&self) -> Result<()> {
		if self.retry_limit > MAX_RETRY_LIMIT {
			return Err(Error::InvalidConfig(format!(
				"retryLimit {} exceeds maximum of {MAX_RETRY_LIMIT}",
				self.retry_limit
			)));
		}
		Ok(())
	}
}
