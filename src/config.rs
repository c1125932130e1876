//! Per-datasource settings handed to drivers.
//!
//! Settings can be loaded from TOML or from the JSON blob a datasource is configured with.
//! Missing fields fall back to their defaults.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Settings of one configured datasource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriverSettings {
	/// Display name of the datasource.
	#[serde(default)]
	pub name: String,

	/// How long a query may run before it is abandoned.
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
	60
}

impl Default for DriverSettings {
	fn default() -> Self {
		Self {
			name: String::new(),
			timeout_secs: default_timeout_secs(),
		}
	}
}

/// An error raised while loading [`DriverSettings`].
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The TOML was malformed or had the wrong shape.
	#[error("invalid TOML settings: {0}")]
	Toml(#[from] toml::de::Error),

	/// The JSON was malformed or had the wrong shape.
	#[error("invalid JSON settings: {0}")]
	Json(#[from] serde_json::Error),
}

impl DriverSettings {
	/// The query timeout.
	#[must_use]
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	/// Loads settings from TOML.
	///
	/// # Errors
	/// Errors if the text is not valid TOML or a field has the wrong type.
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(content)?)
	}

	/// Loads settings from JSON.
	///
	/// # Errors
	/// Errors if the bytes are not valid JSON or a field has the wrong type.
	pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
		Ok(serde_json::from_slice(bytes)?)
	}
}
