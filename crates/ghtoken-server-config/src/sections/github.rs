// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! GitHub App configuration section.

use std::path::PathBuf;
use std::time::Duration;

use ghtoken_common_config::{read_secret_file, SecretString};
use ghtoken_github_app::GithubAppConfig;
use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// App id as written in a TOML file or an environment variable.
///
/// TOML may carry either `app_id = 123` or `app_id = "123"`; both are
/// validated the same way when the layer is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AppIdSetting {
	Number(i64),
	Text(String),
}

impl AppIdSetting {
	pub fn parse(&self) -> Result<u64, ConfigError> {
		let parsed = match self {
			AppIdSetting::Number(n) => u64::try_from(*n).ok(),
			AppIdSetting::Text(s) => s.trim().parse::<u64>().ok(),
		};
		parsed.filter(|id| *id > 0).ok_or_else(|| ConfigError::InvalidAppId {
			value: match self {
				AppIdSetting::Number(n) => n.to_string(),
				AppIdSetting::Text(s) => s.clone(),
			},
		})
	}
}

/// Configuration layer for the GitHub App (all fields optional for layering).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubConfigLayer {
	/// Organization to issue installation tokens for.
	#[serde(default)]
	pub organization: Option<String>,
	#[serde(default)]
	pub app_id: Option<AppIdSetting>,
	/// Path to a PEM-encoded RSA private key.
	#[serde(default)]
	pub private_key_path: Option<PathBuf>,
	/// Inline PEM; wins over `private_key_path` when both are set.
	#[serde(default)]
	pub private_key_pem: Option<SecretString>,
	#[serde(default)]
	pub base_url: Option<String>,
}

impl GithubConfigLayer {
	/// Merge with another layer, preferring values from `other`.
	pub fn merge(&mut self, other: GithubConfigLayer) {
		if other.organization.is_some() {
			self.organization = other.organization;
		}
		if other.app_id.is_some() {
			self.app_id = other.app_id;
		}
		if other.private_key_path.is_some() {
			self.private_key_path = other.private_key_path;
		}
		if other.private_key_pem.is_some() {
			self.private_key_pem = other.private_key_pem;
		}
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
	}

	/// Validate the layer, reading the private key from disk if needed.
	pub fn finalize(self, request_timeout: Duration) -> Result<GithubConfig, ConfigError> {
		let organization = self
			.organization
			.map(|o| o.trim().to_string())
			.filter(|o| !o.is_empty())
			.ok_or_else(|| ConfigError::missing("github.organization"))?;

		let app_id = self
			.app_id
			.as_ref()
			.ok_or_else(|| ConfigError::missing("github.app_id"))?
			.parse()?;

		let private_key = resolve_private_key(self.private_key_pem, self.private_key_path)?;

		let base_url = self
			.base_url
			.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
		let app = GithubAppConfig::new(app_id, private_key.expose().as_str())
			.with_base_url(&base_url)
			.map_err(|e| ConfigError::InvalidValue {
				key: "github.base_url".to_string(),
				message: e.to_string(),
			})?
			.with_request_timeout(request_timeout);

		Ok(GithubConfig { organization, app })
	}
}

fn resolve_private_key(
	inline: Option<SecretString>,
	path: Option<PathBuf>,
) -> Result<SecretString, ConfigError> {
	if let Some(pem) = inline.filter(|pem| !pem.is_blank()) {
		return Ok(pem);
	}

	let path = path.ok_or_else(|| ConfigError::missing("github.private_key_path"))?;
	let source_name = path.display().to_string();
	let pem = read_secret_file(&path).map_err(|e| ConfigError::private_key(&source_name, e))?;
	if pem.is_blank() {
		return Err(ConfigError::private_key(source_name, "file is empty"));
	}
	Ok(pem)
}

/// Validated GitHub configuration.
#[derive(Debug, Clone)]
pub struct GithubConfig {
	pub organization: String,
	pub app: GithubAppConfig,
}
