// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Token issuance for one organization.
//!
//! The installation is `Unresolved` until a resolution succeeds, either at
//! startup through [`TokenIssuer::prime`] or lazily inside [`TokenIssuer::issue`].
//! Once `Resolved` it stays resolved for the life of the process; a failed
//! token exchange does not invalidate it.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::client::GithubAppClient;
use crate::error::{ErrorClass, GithubAppError};
use crate::installation::InstallationResolver;
use crate::types::{InstallationAccessToken, InstallationIdentity, InstallationTokenOptions};

/// Whether the installation id for the organization is known yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InstallationState {
	Unresolved,
	Resolved { installation_id: i64 },
}

/// Failure of a single issuance request.
#[derive(Debug, Error)]
pub enum IssueError {
	#[error(
		"GitHub App is not installed in organization '{organization}'; install the app in the organization and retry"
	)]
	NotInstalled { organization: String },

	#[error("failed to resolve installation for organization '{organization}': {source}")]
	Resolution {
		organization: String,
		#[source]
		source: GithubAppError,
	},

	#[error("failed to create installation token for installation {installation_id}: {source}")]
	Exchange {
		installation_id: i64,
		#[source]
		source: GithubAppError,
	},
}

impl IssueError {
	pub fn class(&self) -> ErrorClass {
		match self {
			IssueError::NotInstalled { .. } => ErrorClass::NotInstalled,
			IssueError::Resolution { source, .. } | IssueError::Exchange { source, .. } => source.class(),
		}
	}

	/// Which outbound step failed.
	pub fn stage(&self) -> &'static str {
		match self {
			IssueError::NotInstalled { .. } | IssueError::Resolution { .. } => "installation lookup",
			IssueError::Exchange { .. } => "token exchange",
		}
	}

	/// The upstream HTTP status behind the failure, if any.
	pub fn upstream_status(&self) -> Option<u16> {
		match self {
			IssueError::NotInstalled { .. } => Some(404),
			IssueError::Resolution { source, .. } | IssueError::Exchange { source, .. } => {
				source.upstream_status()
			}
		}
	}
}

/// Issues installation access tokens for a single configured organization.
#[derive(Debug)]
pub struct TokenIssuer {
	organization: String,
	resolver: InstallationResolver,
	client: GithubAppClient,
	options: InstallationTokenOptions,
}

impl TokenIssuer {
	/// Create an issuer requesting unscoped tokens.
	pub fn new(organization: impl Into<String>, client: GithubAppClient) -> Self {
		Self {
			organization: organization.into(),
			resolver: InstallationResolver::new(client.clone()),
			client,
			options: InstallationTokenOptions::default(),
		}
	}

	pub fn organization(&self) -> &str {
		&self.organization
	}

	pub async fn state(&self) -> InstallationState {
		match self.resolver.cached(&self.organization).await {
			Some(identity) => InstallationState::Resolved {
				installation_id: identity.installation_id,
			},
			None => InstallationState::Unresolved,
		}
	}

	/// Best-effort resolution at startup.
	///
	/// Failure is not fatal: the next [`issue`](Self::issue) retries.
	pub async fn prime(&self) -> Result<InstallationIdentity, IssueError> {
		let result = self.ensure_installation().await;
		match &result {
			Ok(identity) => info!(
				organization = %self.organization,
				installation_id = identity.installation_id,
				"Ready to serve tokens for installation {}",
				identity.installation_id
			),
			Err(e @ IssueError::NotInstalled { .. }) => warn!(
				organization = %self.organization,
				error = %e,
				"GitHub App not installed (yet)"
			),
			Err(e) => warn!(
				organization = %self.organization,
				error = %e,
				"Installation lookup failed at startup, will retry on request"
			),
		}
		result
	}

	/// Mint a fresh installation access token.
	///
	/// Single attempt, no retries. The token is returned to the caller and
	/// kept nowhere else.
	#[instrument(skip(self), fields(organization = %self.organization))]
	pub async fn issue(&self) -> Result<InstallationAccessToken, IssueError> {
		let identity = self.ensure_installation().await?;

		self
			.client
			.create_installation_token(identity.installation_id, &self.options)
			.await
			.map_err(|source| IssueError::Exchange {
				installation_id: identity.installation_id,
				source,
			})
	}

	async fn ensure_installation(&self) -> Result<InstallationIdentity, IssueError> {
		self
			.resolver
			.resolve(&self.organization)
			.await
			.map_err(|source| match source {
				GithubAppError::NotInstalled { organization } => IssueError::NotInstalled { organization },
				source => IssueError::Resolution {
					organization: self.organization.clone(),
					source,
				},
			})
	}
}
