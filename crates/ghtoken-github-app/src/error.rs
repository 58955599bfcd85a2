// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the GitHub App client.

use thiserror::Error;

/// Longest upstream body excerpt carried in an error, in characters.
pub const BODY_EXCERPT_LIMIT: usize = 512;

/// Errors produced while building or using the app JWT signer.
#[derive(Debug, Error)]
pub enum SigningError {
	/// The PEM could not be parsed as an RSA private key.
	#[error("invalid RSA private key: {0}")]
	InvalidKey(String),

	/// The key parsed but cannot produce an RS256 signature.
	#[error("private key cannot sign RS256 tokens: {0}")]
	UnusableKey(String),

	/// `issued_at` was not strictly before `expires_at`.
	#[error("invalid JWT window: issued at {issued_at} is not before expiry {expires_at}")]
	InvalidWindow { issued_at: i64, expires_at: i64 },

	/// The encoder rejected the claims.
	#[error("failed to encode JWT: {0}")]
	Encode(String),
}

/// Coarse classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
	/// Fatal at startup; bad key, bad id, bad URL.
	Configuration,
	/// The app JWT could not be minted; no request was sent.
	Signing,
	/// The app is not installed in the organization (yet).
	NotInstalled,
	/// Network failure, non-2xx status or malformed upstream body.
	Transport,
}

/// Errors that can occur when talking to the GitHub App API.
#[derive(Debug, Error)]
pub enum GithubAppError {
	/// Client configuration error.
	#[error("Configuration error: {0}")]
	Config(String),

	/// App JWT signing failed before any network I/O.
	#[error("Signing error: {0}")]
	Signing(#[from] SigningError),

	/// GitHub has no installation of this app for the organization.
	#[error("GitHub App not installed for organization {organization}")]
	NotInstalled { organization: String },

	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// Request timed out.
	#[error("Request timed out")]
	Timeout,

	/// A middleware other than the signer failed the request.
	#[error("Request middleware error: {0}")]
	Middleware(String),

	/// GitHub answered with a non-2xx status.
	#[error("GitHub API error: {status} - {message}")]
	ApiError { status: u16, message: String },

	/// GitHub answered 2xx but the body did not match the expected shape.
	#[error("Invalid response from GitHub ({status}): {message}")]
	InvalidResponse { status: u16, message: String },
}

impl GithubAppError {
	/// Create an API error, keeping only an excerpt of the body.
	pub fn api_error(status: u16, body: &str) -> Self {
		Self::ApiError {
			status,
			message: body_excerpt(body),
		}
	}

	/// Create an invalid-response error from a parse failure and the raw body.
	pub fn invalid_response(status: u16, cause: impl std::fmt::Display, body: &str) -> Self {
		Self::InvalidResponse {
			status,
			message: format!("{cause}; body: {}", body_excerpt(body)),
		}
	}

	pub fn not_installed(organization: impl Into<String>) -> Self {
		Self::NotInstalled {
			organization: organization.into(),
		}
	}

	pub fn class(&self) -> ErrorClass {
		match self {
			GithubAppError::Config(_) => ErrorClass::Configuration,
			GithubAppError::Signing(_) => ErrorClass::Signing,
			GithubAppError::NotInstalled { .. } => ErrorClass::NotInstalled,
			GithubAppError::Network(_)
			| GithubAppError::Timeout
			| GithubAppError::Middleware(_)
			| GithubAppError::ApiError { .. }
			| GithubAppError::InvalidResponse { .. } => ErrorClass::Transport,
		}
	}

	/// The upstream HTTP status, when GitHub answered at all.
	pub fn upstream_status(&self) -> Option<u16> {
		match self {
			GithubAppError::ApiError { status, .. } | GithubAppError::InvalidResponse { status, .. } => {
				Some(*status)
			}
			GithubAppError::Network(e) => e.status().map(|s| s.as_u16()),
			_ => None,
		}
	}
}

/// Trim an upstream body to [`BODY_EXCERPT_LIMIT`] characters.
pub fn body_excerpt(body: &str) -> String {
	let body = body.trim();
	match body.char_indices().nth(BODY_EXCERPT_LIMIT) {
		Some((cut, _)) => format!("{}...", &body[..cut]),
		None => body.to_string(),
	}
}
