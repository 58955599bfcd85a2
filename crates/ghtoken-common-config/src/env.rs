// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Loading secrets from the environment and from mounted files.
//!
//! Supports the `VAR` / `VAR_FILE` convention used by Docker and Kubernetes
//! secret mounts: `GITHUB_PRIVATE_KEY_FILE=/run/secrets/app.pem` takes
//! precedence over an inline `GITHUB_PRIVATE_KEY`.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::secret::Secret;

#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Load a secret from `{var}_FILE` (a path) or `{var}` (the value), resolving
/// variables through `lookup`.
///
/// Returns `Ok(None)` when neither variable is set. A single trailing newline
/// is stripped from file contents.
pub fn load_secret_with<F>(var: &str, lookup: F) -> Result<Option<Secret<String>>, SecretEnvError>
where
	F: Fn(&str) -> Option<String>,
{
	let file_var = format!("{var}_FILE");

	if let Some(path) = lookup(&file_var) {
		if path.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}
		return read_secret_file(Path::new(&path)).map(Some);
	}

	Ok(lookup(var).map(Secret::new))
}

/// Read a secret from `path`, stripping one trailing newline.
pub fn read_secret_file(path: &Path) -> Result<Secret<String>, SecretEnvError> {
	let content = fs::read_to_string(path).map_err(|source| SecretEnvError::Io {
		path: path.to_path_buf(),
		source,
	})?;

	let trimmed = content.strip_suffix('\n').unwrap_or(&content).to_string();
	Ok(Secret::new(trimmed))
}
