// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Missing required configuration value: {key}")]
	MissingValue { key: String },

	#[error("Invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("Invalid GitHub App id '{value}': expected a positive integer")]
	InvalidAppId { value: String },

	#[error("Failed to read GitHub App private key from {source_name}: {message}")]
	PrivateKeyRead {
		source_name: String,
		message: String,
	},

	#[error("Failed to parse TOML config at {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

impl ConfigError {
	pub fn missing(key: impl Into<String>) -> Self {
		Self::MissingValue { key: key.into() }
	}

	pub fn private_key(source_name: impl Into<String>, message: impl std::fmt::Display) -> Self {
		Self::PrivateKeyRead {
			source_name: source_name.into(),
			message: message.to_string(),
		}
	}
}
