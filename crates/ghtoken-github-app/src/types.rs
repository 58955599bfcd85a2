// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Request and response types for the GitHub App API operations we use.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitHub App installation, as returned by `GET /orgs/{org}/installation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installation {
	/// Installation ID.
	pub id: i64,
	/// Account that owns the installation.
	#[serde(default)]
	pub account: Option<InstallationAccount>,
	/// App the installation belongs to.
	#[serde(default)]
	pub app_id: Option<i64>,
}

/// Account that owns a GitHub App installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationAccount {
	pub id: i64,
	pub login: String,
	/// "User" or "Organization".
	#[serde(rename = "type")]
	pub account_type: String,
}

/// Resolved installation of the app within one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallationIdentity {
	pub installation_id: i64,
	pub organization: String,
}

/// Body of `POST /app/installations/{id}/access_tokens`.
///
/// Empty fields are omitted, so the default value serializes to `{}` and
/// requests a token with every permission the installation holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallationTokenOptions {
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub repositories: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub repository_ids: Vec<i64>,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub permissions: BTreeMap<String, String>,
}

/// Installation access token minted by GitHub.
///
/// Serializes back to the same shape GitHub uses, which is what callers of
/// `/createInstallationToken` receive.
#[derive(Clone, Serialize, Deserialize)]
pub struct InstallationAccessToken {
	pub token: String,
	pub expires_at: DateTime<Utc>,
	/// Permission name to granted level, e.g. `"contents": "read"`.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub permissions: BTreeMap<String, String>,
	/// "all" or "selected".
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub repository_selection: Option<String>,
	/// Only present when the token is scoped to specific repositories.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub repositories: Vec<Repository>,
}

impl std::fmt::Debug for InstallationAccessToken {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InstallationAccessToken")
			.field("token", &ghtoken_common_config::REDACTED)
			.field("expires_at", &self.expires_at)
			.field("permissions", &self.permissions)
			.field("repository_selection", &self.repository_selection)
			.field("repositories", &self.repositories)
			.finish()
	}
}

/// Repository descriptor attached to a scoped token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
	pub id: i64,
	pub name: String,
	pub full_name: String,
	#[serde(default)]
	pub private: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub html_url: Option<String>,
}
