// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Process exit statuses.
//!
//! The numeric values are an operational contract; do not renumber.

use ghtoken_github_app::{GithubAppError, SigningError};
use ghtoken_server_config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
	Ok = 0,
	Config = 1,
	PrivateKey = 2,
	AppId = 3,
	Signer = 4,
	Bind = 5,
	Server = 6,
}

impl ExitStatus {
	pub fn code(self) -> u8 {
		self as u8
	}
}

impl From<ExitStatus> for std::process::ExitCode {
	fn from(status: ExitStatus) -> Self {
		std::process::ExitCode::from(status.code())
	}
}

/// Fatal errors from startup and serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error("could not build app JWT signer: {0}")]
	Signer(#[from] SigningError),

	#[error("could not build GitHub client: {0}")]
	Client(#[from] GithubAppError),

	#[error("failed to bind {addr}: {source}")]
	Bind {
		addr: String,
		#[source]
		source: std::io::Error,
	},

	#[error("server error: {0}")]
	Serve(#[source] std::io::Error),
}

impl StartupError {
	pub fn exit_status(&self) -> ExitStatus {
		match self {
			StartupError::Config(ConfigError::PrivateKeyRead { .. }) => ExitStatus::PrivateKey,
			StartupError::Config(ConfigError::InvalidAppId { .. }) => ExitStatus::AppId,
			StartupError::Config(_) => ExitStatus::Config,
			StartupError::Signer(SigningError::InvalidKey(_)) => ExitStatus::PrivateKey,
			StartupError::Signer(_) => ExitStatus::Signer,
			StartupError::Client(GithubAppError::Signing(SigningError::InvalidKey(_))) => {
				ExitStatus::PrivateKey
			}
			StartupError::Client(GithubAppError::Signing(_)) => ExitStatus::Signer,
			StartupError::Client(_) => ExitStatus::Config,
			StartupError::Bind { .. } => ExitStatus::Bind,
			StartupError::Serve(_) => ExitStatus::Server,
		}
	}
}
