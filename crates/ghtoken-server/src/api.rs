// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Router and shared handler state.

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use ghtoken_github_app::TokenIssuer;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::routes;

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
	pub issuer: Arc<TokenIssuer>,
}

impl AppState {
	pub fn new(issuer: TokenIssuer) -> Self {
		Self {
			issuer: Arc::new(issuer),
		}
	}
}

/// Build the HTTP router.
///
/// Each request is bounded by `request_timeout`. When the bound is hit or the
/// client goes away, the handler future is dropped along with any GitHub call
/// it was awaiting.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
	Router::new()
		.route(
			"/createInstallationToken",
			get(routes::token::create_installation_token)
				.post(routes::token::create_installation_token),
		)
		.route("/health", get(routes::health::health_check))
		.layer(TimeoutLayer::with_status_code(
			StatusCode::REQUEST_TIMEOUT,
			request_timeout,
		))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}
