// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, a TOML file and environment
//! variables.

use std::path::PathBuf;

use ghtoken_common_config::load_secret_with;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AppIdSetting, GithubConfigLayer, HttpConfigLayer, LogFormat, LoggingConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is skipped.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// | variable | key |
/// |----------|-----|
/// | `HOST`, `PORT`, `REQUEST_TIMEOUT_SECS` | `http.*` |
/// | `GITHUB_ORG` | `github.organization` |
/// | `GITHUB_APP_ID` | `github.app_id` |
/// | `GITHUB_PRIVATE_KEY_PATH` | `github.private_key_path` |
/// | `GITHUB_PRIVATE_KEY` / `GITHUB_PRIVATE_KEY_FILE` | `github.private_key_pem` |
/// | `GITHUB_API_BASE_URL` | `github.base_url` |
/// | `LOG_LEVEL`, `LOG_FORMAT` | `logging.*` |
pub struct EnvSource;

impl EnvSource {
	/// Build a layer resolving variables through `lookup` instead of the
	/// process environment.
	pub fn load_with<F>(lookup: F) -> Result<ServerConfigLayer, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let env = EnvReader { lookup };
		Ok(ServerConfigLayer {
			http: Some(env.http()?),
			github: Some(env.github()?),
			logging: Some(env.logging()?),
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Self::load_with(|name| std::env::var(name).ok())
	}
}

struct EnvReader<F> {
	lookup: F,
}

impl<F> EnvReader<F>
where
	F: Fn(&str) -> Option<String>,
{
	fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.is_empty())
	}

	fn u16(&self, name: &str) -> Result<Option<u16>, ConfigError> {
		match self.var(name) {
			Some(v) => v.trim().parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid u16 value '{v}'"),
			}),
			None => Ok(None),
		}
	}

	fn u64(&self, name: &str) -> Result<Option<u64>, ConfigError> {
		match self.var(name) {
			Some(v) => v.trim().parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid u64 value '{v}'"),
			}),
			None => Ok(None),
		}
	}

	fn http(&self) -> Result<HttpConfigLayer, ConfigError> {
		Ok(HttpConfigLayer {
			host: self.var("HOST"),
			port: self.u16("PORT")?,
			request_timeout_secs: self.u64("REQUEST_TIMEOUT_SECS")?,
		})
	}

	fn github(&self) -> Result<GithubConfigLayer, ConfigError> {
		let private_key_pem = load_secret_with("GITHUB_PRIVATE_KEY", |name| self.var(name))
			.map_err(|e| ConfigError::private_key("GITHUB_PRIVATE_KEY_FILE", e))?;

		Ok(GithubConfigLayer {
			organization: self.var("GITHUB_ORG"),
			app_id: self.var("GITHUB_APP_ID").map(AppIdSetting::Text),
			private_key_path: self.var("GITHUB_PRIVATE_KEY_PATH").map(PathBuf::from),
			private_key_pem,
			base_url: self.var("GITHUB_API_BASE_URL"),
		})
	}

	fn logging(&self) -> Result<LoggingConfigLayer, ConfigError> {
		let format = self
			.var("LOG_FORMAT")
			.map(|v| {
				v.parse::<LogFormat>().map_err(|message| ConfigError::InvalidValue {
					key: "LOG_FORMAT".to_string(),
					message,
				})
			})
			.transpose()?;

		Ok(LoggingConfigLayer {
			level: self.var("LOG_LEVEL"),
			format,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name: &str| map.get(name).cloned()
	}

	#[test]
	fn test_precedence_order() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn test_env_maps_variables() {
		let layer = EnvSource::load_with(env(&[
			("PORT", "9000"),
			("GITHUB_ORG", "nais"),
			("GITHUB_APP_ID", "123"),
			("GITHUB_PRIVATE_KEY_PATH", "/keys/app.pem"),
			("GITHUB_API_BASE_URL", "https://ghe.example.com/api/v3"),
			("LOG_FORMAT", "json"),
		]))
		.unwrap();

		let http = layer.http.unwrap();
		assert_eq!(http.port, Some(9000));
		assert_eq!(http.host, None);

		let github = layer.github.unwrap();
		assert_eq!(github.organization.as_deref(), Some("nais"));
		assert_eq!(github.app_id, Some(AppIdSetting::Text("123".to_string())));
		assert_eq!(github.private_key_path, Some(PathBuf::from("/keys/app.pem")));
		assert!(github.private_key_pem.is_none());

		assert_eq!(layer.logging.unwrap().format, Some(LogFormat::Json));
	}

	#[test]
	fn test_empty_vars_are_unset() {
		let layer = EnvSource::load_with(env(&[("GITHUB_ORG", ""), ("PORT", "")])).unwrap();
		assert!(layer.github.unwrap().organization.is_none());
		assert!(layer.http.unwrap().port.is_none());
	}

	#[test]
	fn test_bad_port() {
		let err = EnvSource::load_with(env(&[("PORT", "http")])).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));
	}

	#[test]
	fn test_bad_log_format() {
		let err = EnvSource::load_with(env(&[("LOG_FORMAT", "xml")])).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "LOG_FORMAT"));
	}

	#[test]
	fn test_private_key_file_variable() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "pem-from-file").unwrap();
		let path = file.path().to_string_lossy().into_owned();

		let layer = EnvSource::load_with(env(&[
			("GITHUB_PRIVATE_KEY", "inline"),
			("GITHUB_PRIVATE_KEY_FILE", path.as_str()),
		]))
		.unwrap();
		let pem = layer.github.unwrap().private_key_pem.unwrap();
		assert_eq!(pem.expose(), "pem-from-file");
	}

	#[test]
	fn test_private_key_file_unreadable() {
		let err =
			EnvSource::load_with(env(&[("GITHUB_PRIVATE_KEY_FILE", "/nonexistent/app.pem")])).unwrap_err();
		assert!(matches!(err, ConfigError::PrivateKeyRead { .. }));
	}

	#[test]
	fn test_toml_missing_file_is_skipped() {
		let layer = TomlSource::new("/nonexistent/ghtoken.toml").load().unwrap();
		assert!(layer.http.is_none());
		assert!(layer.github.is_none());
	}

	#[test]
	fn test_toml_parse_error() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "[http\nport = ").unwrap();
		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_toml_sections() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[http]
port = 3000

[github]
organization = "nais"
app_id = 7
private_key_path = "/keys/app.pem"

[logging]
level = "debug"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.http.unwrap().port, Some(3000));
		let github = layer.github.unwrap();
		assert_eq!(github.app_id, Some(AppIdSetting::Number(7)));
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("debug"));
	}
}
