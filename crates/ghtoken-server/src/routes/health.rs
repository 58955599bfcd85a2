// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Health handler.

use axum::{extract::State, Json};
use ghtoken_github_app::InstallationState;
use serde::Serialize;

use crate::api::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
	pub organization: String,
	pub installation: InstallationState,
}

/// GET /health - liveness plus the cached installation state. Never calls
/// GitHub.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok",
		organization: state.issuer.organization().to_string(),
		installation: state.issuer.state().await,
	})
}
