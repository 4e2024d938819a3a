use std::net::IpAddr;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_aux::prelude::deserialize_vec_from_string_or_vec;
use site_csp::CspVariant;
use tracing_subscriber::EnvFilter;

/// Application configuration loaded from multiple sources.
///
/// Configuration is loaded in priority order (lowest to highest):
/// 1. Struct defaults
/// 2. config.yaml file (if exists)
/// 3. Environment variables with SITE_ prefix (always wins)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security_headers: SecurityHeadersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP server bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Directory of prebuilt site assets served for unmatched paths.
    #[serde(default)]
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (debug, info, warn, error, or a full directive list).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Which CSP directive set to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CspMode {
    /// Default-deny with every fetch directive listed.
    Strict,
    /// `'self'` plus `site_origin` on the fetch directives.
    Permissive,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityHeadersConfig {
    /// Enable the security header middleware (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// CSP directive set (default: strict).
    #[serde(default = "default_csp_variant")]
    pub csp_variant: CspMode,

    /// Public origin listed by the permissive variant.
    #[serde(default = "default_site_origin")]
    pub site_origin: String,

    /// Redirect alias hosts to `canonical_host` with a 301 (default: true).
    #[serde(default = "default_true")]
    pub enforce_canonical_host: bool,

    /// Host name every alias redirects to.
    #[serde(default = "default_canonical_host")]
    pub canonical_host: String,

    /// Hosts that redirect to `canonical_host`.
    /// Accepts either an array or comma-separated string.
    #[serde(
        default = "default_host_aliases",
        deserialize_with = "deserialize_hosts"
    )]
    pub host_aliases: Vec<String>,

    /// Reject cross-site form submissions with 403 (default: true).
    #[serde(default = "default_true")]
    pub check_origin: bool,
}

impl SecurityHeadersConfig {
    /// The directive set described by this configuration.
    #[must_use]
    pub fn csp_variant(&self) -> CspVariant {
        match self.csp_variant {
            CspMode::Strict => CspVariant::Strict,
            CspMode::Permissive => CspVariant::Permissive {
                site_origin: self.site_origin.clone(),
            },
        }
    }
}

/// Deserialize hosts from comma-separated string or array, filtering empty values.
fn deserialize_hosts<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let hosts: Vec<String> = deserialize_vec_from_string_or_vec(deserializer)?;
    Ok(hosts
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

// These functions cannot be const because serde uses function pointers for defaults
#[allow(clippy::missing_const_for_fn)]
fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_csp_variant() -> CspMode {
    CspMode::Strict
}

fn default_site_origin() -> String {
    "https://phwu.dev".to_string()
}

fn default_canonical_host() -> String {
    "phwu.dev".to_string()
}

fn default_host_aliases() -> Vec<String> {
    vec!["www.phwu.dev".to_string()]
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            csp_variant: default_csp_variant(),
            site_origin: default_site_origin(),
            enforce_canonical_host: default_true(),
            canonical_host: default_canonical_host(),
            host_aliases: default_host_aliases(),
            check_origin: default_true(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Sources are merged in priority order:
    /// 1. Struct defaults (lowest)
    /// 2. config.yaml file (if exists)
    /// 3. Environment variables with SITE_ prefix (highest)
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.yaml")
    }

    /// Load configuration with a custom YAML file path.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load_from(yaml_path: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(yaml_path))
            .merge(Env::prefixed("SITE_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port cannot be 0".into()));
        }

        if self.server.host.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "server.host must be an IP address, got: '{}'",
                self.server.host
            )));
        }

        if EnvFilter::try_new(&self.logging.level).is_err() {
            return Err(ConfigError::Validation(format!(
                "logging.level '{}' is not a valid filter directive",
                self.logging.level
            )));
        }

        let security = &self.security_headers;

        // Checked for both variants; strict ignores it
        validate_origin(&security.site_origin)?;

        if security.enforce_canonical_host {
            let canonical = &security.canonical_host;
            if canonical.is_empty() || canonical.contains(|c: char| c.is_whitespace() || c == '/')
            {
                return Err(ConfigError::Validation(format!(
                    "security_headers.canonical_host must be a bare host name, got: '{canonical}'"
                )));
            }

            // An alias equal to the target would redirect to itself forever
            if let Some(alias) = security
                .host_aliases
                .iter()
                .find(|alias| alias.eq_ignore_ascii_case(canonical))
            {
                return Err(ConfigError::Validation(format!(
                    "security_headers.host_aliases contains the canonical host '{alias}'"
                )));
            }
        }

        Ok(())
    }
}

fn validate_origin(origin: &str) -> Result<(), ConfigError> {
    let rest = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"));

    let valid = rest.is_some_and(|host| {
        !host.is_empty()
            && !host.contains('/')
            && host
                .chars()
                .all(|c| c.is_ascii_graphic() && c != '\'' && c != ';' && c != ',')
    });

    if valid {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "security_headers.site_origin must be scheme and host only (e.g. https://example.com), got: '{origin}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.server.static_dir.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.security_headers.enabled);
        assert_eq!(config.security_headers.csp_variant, CspMode::Strict);
        assert!(config.security_headers.enforce_canonical_host);
        assert_eq!(config.security_headers.canonical_host, "phwu.dev");
        assert_eq!(config.security_headers.host_aliases, vec!["www.phwu.dev"]);
        assert!(config.security_headers.check_origin);
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_csp_variant_mapping() {
        let mut config = SecurityHeadersConfig::default();
        assert_eq!(config.csp_variant(), CspVariant::Strict);

        config.csp_variant = CspMode::Permissive;
        config.site_origin = "https://preview.phwu.dev".into();
        assert_eq!(
            config.csp_variant(),
            CspVariant::Permissive {
                site_origin: "https://preview.phwu.dev".into()
            }
        );
    }

    #[test]
    fn test_validation_rejects_alias_equal_to_canonical() {
        let mut config = Config::default();
        config.security_headers.host_aliases = vec!["www.phwu.dev".into(), "PHWU.dev".into()];
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("host_aliases contains the canonical host"));
    }

    #[test]
    fn test_validation_ignores_aliases_when_enforcement_off() {
        let mut config = Config::default();
        config.security_headers.enforce_canonical_host = false;
        config.security_headers.canonical_host = String::new();
        config.security_headers.host_aliases = vec!["phwu.dev".into()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_log_level() {
        let mut config = Config::default();
        config.logging.level = "site=loud".into();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("logging.level"));
    }

    #[test]
    fn test_host_aliases_deserialize_comma_separated_string() {
        // Simulate what figment does with env var
        let json = r#"{"host_aliases": "www.phwu.dev, old.phwu.dev"}"#;
        let config: SecurityHeadersConfig = serde_json::from_str(json).expect("should parse");
        assert_eq!(config.host_aliases, vec!["www.phwu.dev", "old.phwu.dev"]);
    }

    #[test]
    fn test_host_aliases_deserialize_empty_string() {
        let json = r#"{"host_aliases": ""}"#;
        let config: SecurityHeadersConfig = serde_json::from_str(json).expect("should parse");
        assert!(config.host_aliases.is_empty());
    }

    #[test]
    fn test_csp_variant_deserializes_lowercase() {
        let json = r#"{"csp_variant": "permissive"}"#;
        let config: SecurityHeadersConfig = serde_json::from_str(json).expect("should parse");
        assert_eq!(config.csp_variant, CspMode::Permissive);
        assert!(serde_json::from_str::<SecurityHeadersConfig>(r#"{"csp_variant": "lax"}"#).is_err());
    }

    #[test]
    fn test_env_overrides_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "site.yaml",
                r"
server:
  port: 3000
security_headers:
  csp_variant: permissive
  site_origin: https://preview.phwu.dev
",
            )?;
            jail.set_env("SITE_SERVER__PORT", "4000");
            jail.set_env("SITE_SECURITY_HEADERS__ENFORCE_CANONICAL_HOST", "false");

            let config = Config::load_from("site.yaml").map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 4000);
            assert_eq!(config.security_headers.csp_variant, CspMode::Permissive);
            assert_eq!(
                config.security_headers.site_origin,
                "https://preview.phwu.dev"
            );
            assert!(!config.security_headers.enforce_canonical_host);
            Ok(())
        });
    }

    #[test]
    fn test_missing_yaml_uses_defaults() {
        Jail::expect_with(|_| {
            let config = Config::load_from("absent.yaml").map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.security_headers.csp_variant, CspMode::Strict);
            Ok(())
        });
    }

    // Table-driven boundary tests for validation rules

    #[test]
    fn port_boundaries() {
        let cases = [
            (0u16, false, "zero port"),
            (1, true, "minimum valid port"),
            (8080, true, "default port"),
            (65535, true, "maximum port"),
        ];

        for (port, should_pass, desc) in cases {
            let mut config = Config::default();
            config.server.port = port;
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn server_host_boundaries() {
        let cases = [
            ("0.0.0.0", true, "any v4"),
            ("127.0.0.1", true, "loopback"),
            ("::", true, "any v6"),
            ("localhost", false, "host name"),
            ("", false, "empty"),
        ];

        for (host, should_pass, desc) in cases {
            let mut config = Config::default();
            config.server.host = host.into();
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn site_origin_boundaries() {
        let cases = [
            ("https://phwu.dev", true, "https origin"),
            ("http://localhost:4321", true, "http with port"),
            ("https://phwu.dev/", false, "trailing slash"),
            ("https://phwu.dev/blog", false, "with path"),
            ("phwu.dev", false, "no scheme"),
            ("ftp://phwu.dev", false, "ftp scheme"),
            ("https://", false, "empty host"),
            ("https://phwu.dev 'unsafe-eval'", false, "injected source"),
            ("https://phwu.dev;script-src", false, "injected directive"),
        ];

        for (origin, should_pass, desc) in cases {
            let mut config = Config::default();
            config.security_headers.site_origin = origin.into();
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn canonical_host_boundaries() {
        let cases = [
            ("phwu.dev", true, "bare host"),
            ("localhost", true, "single label"),
            ("", false, "empty"),
            ("phwu.dev/", false, "trailing slash"),
            ("phwu dev", false, "whitespace"),
        ];

        for (host, should_pass, desc) in cases {
            let mut config = Config::default();
            config.security_headers.canonical_host = host.into();
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }
}
