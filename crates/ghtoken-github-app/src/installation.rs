// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Organization installation resolution with a process-wide cache.
//!
//! Installation ids do not change once the app is installed, so a resolved
//! id is kept for the life of the process. Failures are never cached: "not
//! installed yet" is retried on the next call.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::client::GithubAppClient;
use crate::error::GithubAppError;
use crate::types::InstallationIdentity;

/// Resolves and memoizes the installation id per organization.
#[derive(Debug)]
pub struct InstallationResolver {
	client: GithubAppClient,
	/// organization -> installation id
	cache: RwLock<HashMap<String, i64>>,
}

impl InstallationResolver {
	pub fn new(client: GithubAppClient) -> Self {
		Self {
			client,
			cache: RwLock::new(HashMap::new()),
		}
	}

	/// The cached identity, without touching the network.
	pub async fn cached(&self, organization: &str) -> Option<InstallationIdentity> {
		let cache = self.cache.read().await;
		cache
			.get(organization)
			.map(|&installation_id| InstallationIdentity {
				installation_id,
				organization: organization.to_string(),
			})
	}

	/// Return the cached identity or look it up.
	///
	/// Concurrent first calls may each query GitHub. The first successful
	/// writer wins and later writers return the stored value, so every caller
	/// observes the same id.
	#[instrument(skip(self))]
	pub async fn resolve(&self, organization: &str) -> Result<InstallationIdentity, GithubAppError> {
		if let Some(identity) = self.cached(organization).await {
			debug!(
				installation_id = identity.installation_id,
				"Using cached installation"
			);
			return Ok(identity);
		}

		let installation = self
			.client
			.find_organization_installation(organization)
			.await?;

		let installation_id = {
			let mut cache = self.cache.write().await;
			*cache
				.entry(organization.to_string())
				.or_insert(installation.id)
		};

		info!(installation_id, "Resolved organization installation");
		Ok(InstallationIdentity {
			installation_id,
			organization: organization.to_string(),
		})
	}
}
