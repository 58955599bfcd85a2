// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use ghtoken_github_app::{ErrorClass, IssueError};
use serde::{Deserialize, Serialize};

/// Errors returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// The app is not installed in the organization yet.
	#[error("{0}")]
	NotInstalled(String),

	/// GitHub failed or could not be reached.
	#[error("Upstream error: {message}")]
	Upstream {
		message: String,
		upstream_status: Option<u16>,
	},

	/// Internal server error. Only `message` is sent to the caller; `detail`
	/// is logged.
	#[error("Internal error: {detail}")]
	Internal { message: String, detail: String },
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl From<IssueError> for ServerError {
	fn from(err: IssueError) -> Self {
		match err.class() {
			ErrorClass::NotInstalled => ServerError::NotInstalled(err.to_string()),
			ErrorClass::Transport => ServerError::Upstream {
				upstream_status: err.upstream_status(),
				message: err.to_string(),
			},
			ErrorClass::Signing => ServerError::Internal {
				message: format!("could not sign app JWT for {}", err.stage()),
				detail: err.to_string(),
			},
			ErrorClass::Configuration => ServerError::Internal {
				message: format!("GitHub App client is misconfigured for {}", err.stage()),
				detail: err.to_string(),
			},
		}
	}
}

impl ServerError {
	pub fn status(&self) -> StatusCode {
		match self {
			ServerError::NotInstalled(_) => StatusCode::NOT_FOUND,
			ServerError::Upstream { .. } => StatusCode::BAD_GATEWAY,
			ServerError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let status = self.status();
		let body = match self {
			ServerError::NotInstalled(msg) => {
				tracing::warn!(error = %msg, "installation token requested before app install");
				ErrorResponse {
					error: "not_installed".to_string(),
					message: msg,
				}
			}
			ServerError::Upstream {
				message,
				upstream_status,
			} => {
				tracing::error!(error = %message, ?upstream_status, "upstream error");
				ErrorResponse {
					error: "upstream_error".to_string(),
					message,
				}
			}
			ServerError::Internal { message, detail } => {
				tracing::error!(error = %detail, "internal error");
				ErrorResponse {
					error: "internal_error".to_string(),
					message,
				}
			}
		};

		(status, Json(body)).into_response()
	}
}
