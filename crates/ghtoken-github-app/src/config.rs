// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration for the GitHub App client.

use std::sync::LazyLock;
use std::time::Duration;

use ghtoken_common_config::{Secret, SecretString};
use reqwest::Url;

use crate::error::GithubAppError;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com/";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Parsed once; `DEFAULT_BASE_URL` is a constant that always parses.
static DEFAULT_API_URL: LazyLock<Url> =
	LazyLock::new(|| Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid URL"));

/// Identity and endpoint of the GitHub App.
///
/// The private key is held as a [`SecretString`] so the config can be logged
/// with `?config`.
#[derive(Clone)]
pub struct GithubAppConfig {
	/// GitHub App numeric ID
	app_id: u64,

	/// PEM-encoded RSA private key for JWT signing
	private_key_pem: SecretString,

	/// Base URL for the GitHub REST API, always ending in `/`
	base_url: Url,

	/// Upper bound for each outbound request
	request_timeout: Duration,
}

impl std::fmt::Debug for GithubAppConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GithubAppConfig")
			.field("app_id", &self.app_id)
			.field("private_key_pem", &self.private_key_pem)
			.field("base_url", &self.base_url.as_str())
			.field("request_timeout", &self.request_timeout)
			.finish()
	}
}

impl GithubAppConfig {
	/// Validate and normalize an API base URL.
	///
	/// The URL must have a host and use `https`; plain `http` is accepted
	/// only for loopback hosts so local mocks work. A trailing slash is
	/// added so relative joins keep prefixes like `/api/v3`.
	pub fn parse_base_url(raw: &str) -> Result<Url, GithubAppError> {
		let mut url = Url::parse(raw)
			.map_err(|e| GithubAppError::Config(format!("Invalid GitHub base URL '{raw}': {e}")))?;

		let host = url
			.host_str()
			.ok_or_else(|| GithubAppError::Config("GitHub base URL must include a host".to_string()))?;

		let loopback = matches!(host, "localhost" | "127.0.0.1" | "[::1]");
		match url.scheme() {
			"https" => {}
			"http" if loopback => {}
			other => {
				return Err(GithubAppError::Config(format!(
					"GitHub base URL must use https, got '{other}'"
				)))
			}
		}

		if !url.path().ends_with('/') {
			let path = format!("{}/", url.path());
			url.set_path(&path);
		}

		Ok(url)
	}

	/// Create a configuration against the public GitHub API.
	pub fn new(app_id: u64, private_key_pem: impl Into<String>) -> Self {
		Self {
			app_id,
			private_key_pem: Secret::new(private_key_pem.into()),
			base_url: DEFAULT_API_URL.clone(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Point the client at another API root (GitHub Enterprise, a mock).
	pub fn with_base_url(mut self, raw: &str) -> Result<Self, GithubAppError> {
		self.base_url = Self::parse_base_url(raw)?;
		Ok(self)
	}

	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	pub fn app_id(&self) -> u64 {
		self.app_id
	}

	pub fn private_key_pem(&self) -> &str {
		self.private_key_pem.expose()
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	pub fn request_timeout(&self) -> Duration {
		self.request_timeout
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_config_new() {
		let config = GithubAppConfig::new(293384, "test-private-key");
		assert_eq!(config.app_id(), 293384);
		assert_eq!(config.private_key_pem(), "test-private-key");
		assert_eq!(config.base_url().as_str(), "https://api.github.com/");
		assert_eq!(config.request_timeout(), Duration::from_secs(30));
	}

	#[test]
	fn test_default_url_passes_validation() {
		let parsed = GithubAppConfig::parse_base_url(DEFAULT_BASE_URL).unwrap();
		assert_eq!(&parsed, &*DEFAULT_API_URL);
	}

	#[test]
	fn test_enterprise_url_keeps_prefix() {
		let config = GithubAppConfig::new(1, "key")
			.with_base_url("https://github.example.com/api/v3")
			.unwrap();
		assert_eq!(
			config.base_url().as_str(),
			"https://github.example.com/api/v3/"
		);
		assert_eq!(
			config.base_url().join("app/installations").unwrap().as_str(),
			"https://github.example.com/api/v3/app/installations"
		);
	}

	#[test]
	fn test_rejects_plain_http() {
		let err = GithubAppConfig::parse_base_url("http://api.github.com").unwrap_err();
		assert!(err.to_string().contains("https"));
	}

	#[test]
	fn test_allows_http_on_loopback() {
		assert!(GithubAppConfig::parse_base_url("http://127.0.0.1:4321").is_ok());
		assert!(GithubAppConfig::parse_base_url("http://localhost:4321").is_ok());
	}

	#[test]
	fn test_rejects_garbage() {
		assert!(GithubAppConfig::parse_base_url("not-a-url").is_err());
	}

	#[test]
	fn test_debug_redacts_key() {
		let config = GithubAppConfig::new(1, "super-secret-key");
		let debug = format!("{config:?}");
		assert!(!debug.contains("super-secret-key"));
		assert!(debug.contains("[REDACTED]"));
	}
}
