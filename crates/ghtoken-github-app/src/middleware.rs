// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Request middleware that authenticates every outbound call as the app.
//!
//! This is the only place that writes an `Authorization` header. Any client
//! built through [`crate::http::authenticated_client`] gets a freshly signed
//! app JWT on each request; tokens are never reused across calls.

use std::sync::Arc;

use http::header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use tracing::{trace, warn};

use crate::error::SigningError;
use crate::jwt::{JwtSigner, JwtWindow};

/// Versioned media type pinned on every request.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// REST API version pinned on every request.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

const API_VERSION_HEADER: HeaderName = HeaderName::from_static("x-github-api-version");

/// Attaches `Authorization: Bearer <app JWT>` and the GitHub media type
/// headers, then hands the request to the next layer.
#[derive(Clone)]
pub struct AppAuthMiddleware {
	app_id: u64,
	signer: Arc<dyn JwtSigner>,
}

impl std::fmt::Debug for AppAuthMiddleware {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppAuthMiddleware")
			.field("app_id", &self.app_id)
			.finish_non_exhaustive()
	}
}

impl AppAuthMiddleware {
	pub fn new(app_id: u64, signer: Arc<dyn JwtSigner>) -> Self {
		Self { app_id, signer }
	}

	/// Mint an app JWT valid from 30s ago for two minutes.
	fn app_token(&self) -> Result<String, SigningError> {
		let window = JwtWindow::now();
		self
			.signer
			.sign(&self.app_id.to_string(), window.issued_at, window.expires_at)
	}

	fn authenticate(&self, req: &mut Request) -> Result<(), reqwest_middleware::Error> {
		let jwt = self.app_token().map_err(|e| {
			warn!(app_id = self.app_id, error = %e, "Could not sign app JWT, aborting request");
			reqwest_middleware::Error::middleware(e)
		})?;

		let mut bearer =
			HeaderValue::from_str(&format!("Bearer {jwt}")).map_err(reqwest_middleware::Error::middleware)?;
		bearer.set_sensitive(true);

		let has_body = req.body().is_some();
		let headers = req.headers_mut();
		headers.insert(AUTHORIZATION, bearer);
		headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
		headers.insert(
			API_VERSION_HEADER,
			HeaderValue::from_static(GITHUB_API_VERSION),
		);
		if has_body {
			headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		}

		Ok(())
	}
}

#[async_trait::async_trait]
impl Middleware for AppAuthMiddleware {
	async fn handle(
		&self,
		mut req: Request,
		extensions: &mut Extensions,
		next: Next<'_>,
	) -> reqwest_middleware::Result<Response> {
		self.authenticate(&mut req)?;
		trace!(method = %req.method(), url = %req.url(), "Sending authenticated request");
		next.run(req, extensions).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::jwt::{test_keys, AppClaims, RsaJwtSigner};
	use chrono::{DateTime, Utc};
	use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Duration;
	use wiremock::matchers::{method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	struct FailingSigner;

	impl JwtSigner for FailingSigner {
		fn sign(&self, _: &str, _: DateTime<Utc>, _: DateTime<Utc>) -> Result<String, SigningError> {
			Err(SigningError::Encode("key unavailable".to_string()))
		}
	}

	#[derive(Default)]
	struct CountingSigner {
		calls: AtomicUsize,
	}

	impl JwtSigner for CountingSigner {
		fn sign(&self, iss: &str, _: DateTime<Utc>, _: DateTime<Utc>) -> Result<String, SigningError> {
			let n = self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(format!("jwt-{iss}-{n}"))
		}
	}

	fn client(signer: Arc<dyn JwtSigner>) -> reqwest_middleware::ClientWithMiddleware {
		crate::http::authenticated_client(4242, signer, Duration::from_secs(5)).unwrap()
	}

	async fn server_accepting_anything() -> MockServer {
		let server = MockServer::start().await;
		Mock::given(path("/echo"))
			.respond_with(ResponseTemplate::new(200))
			.mount(&server)
			.await;
		server
	}

	#[tokio::test]
	async fn test_get_carries_bearer_jwt_and_accept() {
		let signer = RsaJwtSigner::from_pem(test_keys::pair().0.as_bytes()).unwrap();
		let server = server_accepting_anything().await;

		client(Arc::new(signer))
			.get(format!("{}/echo", server.uri()))
			.send()
			.await
			.unwrap();

		let requests = server.received_requests().await.unwrap();
		assert_eq!(requests.len(), 1);
		let headers = &requests[0].headers;

		assert_eq!(headers.get("accept").unwrap(), GITHUB_ACCEPT);
		assert_eq!(headers.get("x-github-api-version").unwrap(), GITHUB_API_VERSION);
		assert!(headers.get("content-type").is_none());
		assert!(headers
			.get("user-agent")
			.unwrap()
			.to_str()
			.unwrap()
			.starts_with("ghtoken/"));

		let auth = headers.get("authorization").unwrap().to_str().unwrap();
		let jwt = auth.strip_prefix("Bearer ").expect("bearer scheme");

		let mut validation = Validation::new(Algorithm::RS256);
		validation.required_spec_claims.clear();
		let key = DecodingKey::from_rsa_pem(test_keys::pair().1.as_bytes()).unwrap();
		let claims = decode::<AppClaims>(jwt, &key, &validation).unwrap().claims;

		let now = Utc::now().timestamp();
		assert_eq!(claims.iss, "4242");
		assert_eq!(claims.exp - claims.iat, 120);
		assert!(claims.iat <= now - 29, "iat must be backdated");
		assert!(claims.exp > now);
	}

	#[tokio::test]
	async fn test_request_with_body_gets_json_content_type() {
		let server = server_accepting_anything().await;

		client(Arc::new(CountingSigner::default()))
			.post(format!("{}/echo", server.uri()))
			.body("{}")
			.send()
			.await
			.unwrap();

		let requests = server.received_requests().await.unwrap();
		let headers = &requests[0].headers;
		assert_eq!(headers.get("content-type").unwrap(), "application/json");
		assert_eq!(headers.get("authorization").unwrap(), "Bearer jwt-4242-0");
	}

	#[tokio::test]
	async fn test_every_request_gets_a_fresh_token() {
		let signer = Arc::new(CountingSigner::default());
		let server = server_accepting_anything().await;
		let client = client(signer.clone());

		for _ in 0..3 {
			client
				.get(format!("{}/echo", server.uri()))
				.send()
				.await
				.unwrap();
		}

		assert_eq!(signer.calls.load(Ordering::SeqCst), 3);
		let requests = server.received_requests().await.unwrap();
		let tokens: Vec<_> = requests
			.iter()
			.map(|r| r.headers.get("authorization").unwrap().to_str().unwrap().to_string())
			.collect();
		assert_eq!(
			tokens,
			vec!["Bearer jwt-4242-0", "Bearer jwt-4242-1", "Bearer jwt-4242-2"]
		);
	}

	#[tokio::test]
	async fn test_signing_failure_aborts_before_network() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(200))
			.expect(0)
			.mount(&server)
			.await;

		let err = client(Arc::new(FailingSigner))
			.get(format!("{}/echo", server.uri()))
			.send()
			.await
			.unwrap_err();

		match err {
			reqwest_middleware::Error::Middleware(inner) => {
				assert!(inner.downcast_ref::<SigningError>().is_some());
			}
			other => panic!("expected middleware error, got {other:?}"),
		}
	}
}
