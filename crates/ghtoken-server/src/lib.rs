// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP server issuing GitHub App installation tokens.

pub mod api;
pub mod error;
pub mod exit;
pub mod routes;
pub mod telemetry;

pub use api::{create_router, AppState};
pub use error::{ErrorResponse, ServerError};
pub use exit::{ExitStatus, StartupError};
