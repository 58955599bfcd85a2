// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Installation token issuance handler.

use axum::{extract::State, Json};
use ghtoken_github_app::InstallationAccessToken;

use crate::{api::AppState, error::ServerError};

/// GET|POST /createInstallationToken - mint a fresh installation token for
/// the configured organization.
pub async fn create_installation_token(
	State(state): State<AppState>,
) -> Result<Json<InstallationAccessToken>, ServerError> {
	let token = state.issuer.issue().await?;
	Ok(Json(token))
}
