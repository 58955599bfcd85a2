// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! GitHub App installation token issuance.
//!
//! This crate authenticates as a GitHub App with a short-lived RS256 JWT,
//! resolves the app's installation in an organization, and exchanges the app
//! JWT for installation access tokens.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod installation;
pub mod issuer;
pub mod jwt;
pub mod middleware;
pub mod types;

pub use client::GithubAppClient;
pub use config::GithubAppConfig;
pub use error::{ErrorClass, GithubAppError, SigningError};
pub use installation::InstallationResolver;
pub use issuer::{InstallationState, IssueError, TokenIssuer};
pub use jwt::{JwtSigner, JwtWindow, RsaJwtSigner};
pub use middleware::AppAuthMiddleware;
pub use types::{
	Installation, InstallationAccessToken, InstallationAccount, InstallationIdentity,
	InstallationTokenOptions, Repository,
};
