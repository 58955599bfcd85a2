// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Outbound HTTP client construction.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use reqwest_middleware::ClientWithMiddleware;

use crate::error::GithubAppError;
use crate::jwt::JwtSigner;
use crate::middleware::AppAuthMiddleware;

/// Returns the User-Agent sent to GitHub: `ghtoken/{version}`.
pub fn user_agent() -> String {
	format!("ghtoken/{}", env!("CARGO_PKG_VERSION"))
}

/// Plain client builder with the standard User-Agent.
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Client whose every request is authenticated as the app.
///
/// `timeout` bounds each outbound call end to end.
pub fn authenticated_client(
	app_id: u64,
	signer: Arc<dyn JwtSigner>,
	timeout: Duration,
) -> Result<ClientWithMiddleware, GithubAppError> {
	let base = builder()
		.timeout(timeout)
		.build()
		.map_err(|e| GithubAppError::Config(format!("Failed to create HTTP client: {e}")))?;

	Ok(
		reqwest_middleware::ClientBuilder::new(base)
			.with(AppAuthMiddleware::new(app_id, signer))
			.build(),
	)
}
