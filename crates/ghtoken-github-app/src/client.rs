// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! GitHub App API client: installation lookup and token exchange.
//!
//! Authentication is not handled here. Requests go through a client built by
//! [`crate::http::authenticated_client`], whose middleware signs each call.

use std::sync::Arc;

use reqwest::{Response, StatusCode, Url};
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use crate::config::GithubAppConfig;
use crate::error::{GithubAppError, SigningError};
use crate::http::authenticated_client;
use crate::jwt::{JwtSigner, RsaJwtSigner};
use crate::types::{Installation, InstallationAccessToken, InstallationTokenOptions};

/// Client for the app-authenticated GitHub endpoints.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct GithubAppClient {
	http_client: ClientWithMiddleware,
	base_url: Url,
}

impl std::fmt::Debug for GithubAppClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GithubAppClient")
			.field("base_url", &self.base_url.as_str())
			.finish_non_exhaustive()
	}
}

impl GithubAppClient {
	/// Create a client signing with the configured RSA key.
	pub fn new(config: &GithubAppConfig) -> Result<Self, GithubAppError> {
		let signer = RsaJwtSigner::from_pem(config.private_key_pem().as_bytes())?;
		Self::with_signer(config, Arc::new(signer))
	}

	/// Create a client around an already constructed signer.
	pub fn with_signer(
		config: &GithubAppConfig,
		signer: Arc<dyn JwtSigner>,
	) -> Result<Self, GithubAppError> {
		let http_client =
			authenticated_client(config.app_id(), signer, config.request_timeout())?;

		info!(
			app_id = config.app_id(),
			base_url = %config.base_url(),
			"Created GitHub App client"
		);

		Ok(Self {
			http_client,
			base_url: config.base_url().clone(),
		})
	}

	/// Look up the app's installation in `organization`.
	///
	/// A 404 means the app is not installed there and maps to
	/// [`GithubAppError::NotInstalled`].
	#[instrument(skip(self))]
	pub async fn find_organization_installation(
		&self,
		organization: &str,
	) -> Result<Installation, GithubAppError> {
		let url = self.endpoint(&["orgs", organization, "installation"])?;
		debug!(url = %url, "Finding organization installation");

		let response = self
			.http_client
			.get(url)
			.send()
			.await
			.map_err(map_send_error)?;

		if response.status() == StatusCode::NOT_FOUND {
			warn!(organization, "GitHub App is not installed in organization");
			return Err(GithubAppError::not_installed(organization));
		}

		let installation: Installation = read_json(response).await?;
		debug!(
			installation_id = installation.id,
			"Organization installation found"
		);
		Ok(installation)
	}

	/// Exchange the app JWT for an installation access token.
	///
	/// Single attempt; the returned token is neither cached nor logged.
	#[instrument(skip(self, options))]
	pub async fn create_installation_token(
		&self,
		installation_id: i64,
		options: &InstallationTokenOptions,
	) -> Result<InstallationAccessToken, GithubAppError> {
		let id = installation_id.to_string();
		let url = self.endpoint(&["app", "installations", &id, "access_tokens"])?;
		debug!(url = %url, "Creating installation access token");

		let response = self
			.http_client
			.post(url)
			.json(options)
			.send()
			.await
			.map_err(map_send_error)?;

		let token: InstallationAccessToken = read_json(response).await?;
		info!(
			installation_id,
			expires_at = %token.expires_at,
			"Installation access token created"
		);
		Ok(token)
	}

	/// Append path segments to the base URL, percent-encoding each one.
	fn endpoint(&self, segments: &[&str]) -> Result<Url, GithubAppError> {
		let mut url = self.base_url.clone();
		url
			.path_segments_mut()
			.map_err(|_| GithubAppError::Config(format!("Invalid base URL: {}", self.base_url)))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}
}

/// Classify a failure to get any response at all.
fn map_send_error(err: reqwest_middleware::Error) -> GithubAppError {
	match err {
		reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => {
			error!("GitHub request timed out");
			GithubAppError::Timeout
		}
		reqwest_middleware::Error::Reqwest(e) => {
			error!(error = %e, "Network error talking to GitHub");
			GithubAppError::Network(e)
		}
		reqwest_middleware::Error::Middleware(e) => match e.downcast::<SigningError>() {
			Ok(signing) => GithubAppError::Signing(signing),
			Err(other) => GithubAppError::Middleware(other.to_string()),
		},
	}
}

/// Read the body and decode it, turning non-2xx statuses and malformed
/// bodies into errors that carry the status and a body excerpt.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GithubAppError> {
	let status = response.status();
	let body = response.text().await.map_err(|e| {
		if e.is_timeout() {
			GithubAppError::Timeout
		} else {
			GithubAppError::Network(e)
		}
	})?;

	if !status.is_success() {
		let err = GithubAppError::api_error(status.as_u16(), &body);
		error!(status = status.as_u16(), error = %err, "GitHub API error");
		return Err(err);
	}

	serde_json::from_str(&body).map_err(|e| {
		error!(status = status.as_u16(), error = %e, "Failed to parse GitHub response");
		GithubAppError::invalid_response(status.as_u16(), format!("JSON parse error: {e}"), &body)
	})
}
