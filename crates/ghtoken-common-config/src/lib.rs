// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration primitives shared by the ghtoken crates.
//!
//! - [`Secret<T>`]: keeps private keys and tokens out of logs and config dumps
//! - [`load_secret_with`]: reads a secret from `VAR` or from the file named by
//!   `VAR_FILE`

pub mod env;
pub mod secret;

pub use env::{load_secret_with, read_secret_file, SecretEnvError};
pub use secret::{Secret, SecretString, REDACTED};
