// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! ghtoken server binary.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ghtoken_github_app::{GithubAppClient, RsaJwtSigner, TokenIssuer};
use ghtoken_server::{create_router, telemetry, AppState, ExitStatus, StartupError};
use ghtoken_server_config::ServerConfig;

/// Issues GitHub App installation tokens over HTTP.
#[derive(Parser, Debug)]
#[command(name = "ghtoken-server", about = "GitHub App installation token server", version)]
struct Args {
	/// Path to a TOML config file; environment variables override it.
	#[arg(long, env = "GHTOKEN_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("ghtoken-server {}", env!("CARGO_PKG_VERSION"));
		return ExitStatus::Ok.into();
	}

	dotenvy::dotenv().ok();

	let config = match ghtoken_server_config::load_config(args.config.as_deref()) {
		Ok(config) => config,
		Err(e) => {
			let err = StartupError::from(e);
			eprintln!("ghtoken-server: {err}");
			return err.exit_status().into();
		}
	};

	telemetry::init(&config.logging);

	match run(config).await {
		Ok(()) => ExitStatus::Ok.into(),
		Err(err) => {
			let status = err.exit_status();
			tracing::error!(error = %err, exit_status = status.code(), "ghtoken-server exiting");
			status.into()
		}
	}
}

async fn run(config: ServerConfig) -> Result<(), StartupError> {
	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		organization = %config.github.organization,
		"starting ghtoken-server"
	);

	let signer = RsaJwtSigner::from_pem(config.github.app.private_key_pem().as_bytes())?;
	let client = GithubAppClient::with_signer(&config.github.app, Arc::new(signer))?;
	let issuer = TokenIssuer::new(config.github.organization.clone(), client);

	// Failure here is logged by `prime` and retried on the first request.
	let _ = issuer.prime().await;

	let app = create_router(AppState::new(issuer), config.http.request_timeout);

	let addr = config.socket_addr();
	let listener = tokio::net::TcpListener::bind(&addr)
		.await
		.map_err(|source| StartupError::Bind {
			addr: addr.clone(),
			source,
		})?;
	tracing::info!("listening on {}", addr);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(StartupError::Serve)?;

	tracing::info!("Server shutdown complete");
	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "Failed to listen for Ctrl-C");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(e) => {
				tracing::error!(error = %e, "Failed to listen for SIGTERM");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	tracing::info!("Received shutdown signal");
}
