// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! App JWT signing for GitHub App authentication.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::SigningError;

/// How far `iat` is backdated to tolerate clock drift against GitHub.
pub const CLOCK_SKEW_ALLOWANCE: Duration = Duration::seconds(30);

/// Lifetime of every app JWT, measured from the backdated `iat`.
pub const APP_JWT_LIFETIME: Duration = Duration::minutes(2);

/// Registered claims of an app JWT. GitHub rejects tokens carrying `aud` or
/// `sub`, so there are only three.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppClaims {
	/// Issued at, seconds since epoch.
	pub iat: i64,
	/// Expiry, seconds since epoch.
	pub exp: i64,
	/// The numeric app id as a decimal string.
	pub iss: String,
}

/// Validity window of a single app JWT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JwtWindow {
	pub issued_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

impl JwtWindow {
	/// Window for a token minted at `now`: backdated by the skew allowance,
	/// truncated to whole seconds, valid for [`APP_JWT_LIFETIME`].
	pub fn starting_at(now: DateTime<Utc>) -> Self {
		let issued_at = (now - CLOCK_SKEW_ALLOWANCE).trunc_subsecs(0);
		Self {
			issued_at,
			expires_at: issued_at + APP_JWT_LIFETIME,
		}
	}

	pub fn now() -> Self {
		Self::starting_at(Utc::now())
	}
}

/// Produces signed app JWTs.
///
/// The transport holds this as a trait object so tests can substitute a
/// signer that fails or records its inputs.
pub trait JwtSigner: Send + Sync {
	fn sign(
		&self,
		issuer: &str,
		issued_at: DateTime<Utc>,
		expires_at: DateTime<Utc>,
	) -> Result<String, SigningError>;
}

/// RS256 signer backed by the app's private key.
#[derive(Clone)]
pub struct RsaJwtSigner {
	encoding_key: EncodingKey,
}

impl std::fmt::Debug for RsaJwtSigner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RsaJwtSigner").finish_non_exhaustive()
	}
}

impl RsaJwtSigner {
	/// Build a signer from a PEM-encoded PKCS#1 or PKCS#8 RSA private key.
	///
	/// The key is exercised with a throwaway signature so that a key which
	/// parses but cannot sign (for example one shorter than 2048 bits) fails
	/// here instead of on the first request.
	pub fn from_pem(private_key_pem: &[u8]) -> Result<Self, SigningError> {
		let encoding_key = EncodingKey::from_rsa_pem(private_key_pem)
			.map_err(|e| SigningError::InvalidKey(e.to_string()))?;

		let signer = Self { encoding_key };
		let probe = JwtWindow::now();
		signer
			.sign("0", probe.issued_at, probe.expires_at)
			.map_err(|e| SigningError::UnusableKey(e.to_string()))?;

		Ok(signer)
	}
}

impl JwtSigner for RsaJwtSigner {
	#[instrument(level = "trace", skip(self))]
	fn sign(
		&self,
		issuer: &str,
		issued_at: DateTime<Utc>,
		expires_at: DateTime<Utc>,
	) -> Result<String, SigningError> {
		if issued_at >= expires_at {
			return Err(SigningError::InvalidWindow {
				issued_at: issued_at.timestamp(),
				expires_at: expires_at.timestamp(),
			});
		}

		let claims = AppClaims {
			iat: issued_at.timestamp(),
			exp: expires_at.timestamp(),
			iss: issuer.to_string(),
		};

		let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
			.map_err(|e| SigningError::Encode(e.to_string()))?;

		debug!(iss = %claims.iss, exp = claims.exp, "Signed app JWT");
		Ok(token)
	}
}
