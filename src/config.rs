use crate::domain::types::{
    EndpointUrl, PrivateKeySet, UpstreamAuthCode, VerificationSecret,
};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Prefix for structured environment overrides, e.g. `MANIFEST_GATEWAY__APPLICATION__PORT`
pub const ENV_PREFIX: &str = "MANIFEST_GATEWAY";

/// Well-known variables read verbatim from the environment
pub mod env_vars {
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    pub const VERIFICATION_SECRET: &str = "TURNSTILE_SECRET_KEY";
    pub const UPSTREAM_AUTH_CODE: &str = "AUTH_CODE";
    pub const PRIVATE_KEYS: &str = "KEY";
}

pub mod defaults {
    pub const MANIFEST_ENDPOINT: &str = "https://generator.ryuu.lol/secure_download";
    pub const SCRIPT_ENDPOINT: &str = "https://generator.ryuu.lol/resellerlua";
    pub const VERIFICATION_ENDPOINT: &str =
        "https://challenges.cloudflare.com/turnstile/v0/siteverify";
    pub const STEAM_APPDETAILS_ENDPOINT: &str = "https://store.steampowered.com/api/appdetails";
    pub const STEAM_CACHE_TTL_SECS: u64 = 3600;
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub logging: LoggingSettings,
    pub upstream: UpstreamSettings,
    pub verification: VerificationSettings,
    pub steam: SteamSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamSettings {
    pub manifest_endpoint: String,
    pub script_endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VerificationSettings {
    pub endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SteamSettings {
    pub appdetails_endpoint: String,
    pub cache_ttl_secs: u64,
}

/// Secrets for the two trust models. Left optional here so that a missing
/// value is reported by [`GatewayConfig::from_settings`] with its variable name.
#[derive(Deserialize, Clone, Default)]
pub struct GatewaySettings {
    pub verification_secret: Option<String>,
    pub upstream_auth_code: Option<String>,
    pub private_keys: Option<String>,
}

impl fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("verification_secret", &self.verification_secret.as_ref().map(|_| ".."))
            .field("upstream_auth_code", &self.upstream_auth_code.as_ref().map(|_| ".."))
            .field("private_keys", &self.private_keys.as_ref().map(|_| ".."))
            .finish()
    }
}

impl Settings {
    /// Load settings from defaults, optional config files and the process environment
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Load settings using `vars` in place of the process environment
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let environment = vars
            .get(env_vars::ENVIRONMENT)
            .cloned()
            .unwrap_or_else(|| "development".to_string());

        let env_source: config::Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let config = Config::builder()
            .set_default("application.host", "0.0.0.0")?
            .set_default("application.port", 8080)?
            .set_default("application.environment", environment.clone())?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("upstream.manifest_endpoint", defaults::MANIFEST_ENDPOINT)?
            .set_default("upstream.script_endpoint", defaults::SCRIPT_ENDPOINT)?
            .set_default("verification.endpoint", defaults::VERIFICATION_ENDPOINT)?
            .set_default(
                "steam.appdetails_endpoint",
                defaults::STEAM_APPDETAILS_ENDPOINT,
            )?
            .set_default("steam.cache_ttl_secs", defaults::STEAM_CACHE_TTL_SECS)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env_source)),
            )
            .set_override_option(
                "gateway.verification_secret",
                vars.get(env_vars::VERIFICATION_SECRET).cloned(),
            )?
            .set_override_option(
                "gateway.upstream_auth_code",
                vars.get(env_vars::UPSTREAM_AUTH_CODE).cloned(),
            )?
            .set_override_option(
                "gateway.private_keys",
                vars.get(env_vars::PRIVATE_KEYS).cloned(),
            )?
            .build()?;

        config.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }
}

/// Errors raised while turning raw settings into a [`GatewayConfig`]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GatewayConfigError {
    #[error("Missing required configuration value: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Upstream generator base URLs
#[derive(Debug, Clone)]
pub struct UpstreamEndpoints {
    pub manifest: EndpointUrl,
    pub script: EndpointUrl,
}

#[derive(Debug, Clone)]
pub struct SteamLookupConfig {
    pub endpoint: EndpointUrl,
    pub cache_ttl: Duration,
}

/// Process-wide gateway configuration, validated once at startup and
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub verification_secret: VerificationSecret,
    pub upstream_auth_code: UpstreamAuthCode,
    pub private_keys: PrivateKeySet,
    pub upstream: UpstreamEndpoints,
    pub verification_endpoint: EndpointUrl,
    pub steam: SteamLookupConfig,
}

impl GatewayConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, GatewayConfigError> {
        let gateway = &settings.gateway;

        let verification_secret = gateway
            .verification_secret
            .clone()
            .and_then(|raw| VerificationSecret::try_new(raw).ok())
            .ok_or(GatewayConfigError::Missing(env_vars::VERIFICATION_SECRET))?;

        let upstream_auth_code = gateway
            .upstream_auth_code
            .clone()
            .and_then(|raw| UpstreamAuthCode::try_new(raw).ok())
            .ok_or(GatewayConfigError::Missing(env_vars::UPSTREAM_AUTH_CODE))?;

        // An absent key list is allowed: the private endpoint then rejects every key.
        let private_keys = gateway
            .private_keys
            .as_deref()
            .map(PrivateKeySet::parse)
            .unwrap_or_default();

        Ok(Self {
            verification_secret,
            upstream_auth_code,
            private_keys,
            upstream: UpstreamEndpoints {
                manifest: endpoint(
                    "upstream.manifest_endpoint",
                    &settings.upstream.manifest_endpoint,
                )?,
                script: endpoint("upstream.script_endpoint", &settings.upstream.script_endpoint)?,
            },
            verification_endpoint: endpoint(
                "verification.endpoint",
                &settings.verification.endpoint,
            )?,
            steam: SteamLookupConfig {
                endpoint: endpoint(
                    "steam.appdetails_endpoint",
                    &settings.steam.appdetails_endpoint,
                )?,
                cache_ttl: Duration::from_secs(settings.steam.cache_ttl_secs),
            },
        })
    }
}

impl TryFrom<&Settings> for GatewayConfig {
    type Error = GatewayConfigError;

    fn try_from(settings: &Settings) -> Result<Self, Self::Error> {
        Self::from_settings(settings)
    }
}

fn endpoint(key: &'static str, raw: &str) -> Result<EndpointUrl, GatewayConfigError> {
    EndpointUrl::try_new(raw.to_string()).map_err(|e| GatewayConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn complete_vars() -> HashMap<String, String> {
        vars(&[
            (env_vars::VERIFICATION_SECRET, "turnstile-secret"),
            (env_vars::UPSTREAM_AUTH_CODE, "auth-code"),
            (env_vars::PRIVATE_KEYS, " key-one , key-two,,"),
        ])
    }

    #[test]
    fn test_settings_can_be_loaded_without_environment() {
        let settings = Settings::from_vars(&HashMap::new()).unwrap();
        assert_eq!(settings.application.port, 8080);
        assert_eq!(settings.application.environment, "development");
        assert_eq!(settings.upstream.manifest_endpoint, defaults::MANIFEST_ENDPOINT);
        assert_eq!(settings.upstream.script_endpoint, defaults::SCRIPT_ENDPOINT);
        assert_eq!(
            settings.verification.endpoint,
            defaults::VERIFICATION_ENDPOINT
        );
        assert!(settings.gateway.verification_secret.is_none());
    }

    #[test]
    fn test_well_known_variables_populate_gateway_section() {
        let settings = Settings::from_vars(&complete_vars()).unwrap();
        assert_eq!(
            settings.gateway.verification_secret.as_deref(),
            Some("turnstile-secret")
        );
        assert_eq!(settings.gateway.upstream_auth_code.as_deref(), Some("auth-code"));
        assert_eq!(
            settings.gateway.private_keys.as_deref(),
            Some(" key-one , key-two,,")
        );
    }

    #[test]
    fn test_prefixed_variables_override_defaults() {
        let settings = Settings::from_vars(&vars(&[
            ("MANIFEST_GATEWAY__APPLICATION__PORT", "9090"),
            (
                "MANIFEST_GATEWAY__UPSTREAM__MANIFEST_ENDPOINT",
                "http://127.0.0.1:4000/secure_download",
            ),
        ]))
        .unwrap();

        assert_eq!(settings.application.port, 9090);
        assert_eq!(
            settings.upstream.manifest_endpoint,
            "http://127.0.0.1:4000/secure_download"
        );
        assert_eq!(settings.bind_address(), "0.0.0.0:9090");
    }

    #[test]
    fn test_gateway_config_from_complete_settings() {
        let settings = Settings::from_vars(&complete_vars()).unwrap();
        let config = GatewayConfig::try_from(&settings).unwrap();

        assert_eq!(config.verification_secret.as_ref(), "turnstile-secret");
        assert_eq!(config.upstream_auth_code.as_ref(), "auth-code");
        assert_eq!(config.private_keys.len(), 2);
        assert!(config.private_keys.contains("key-one"));
        assert!(config.private_keys.contains("key-two"));
        assert_eq!(config.steam.cache_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_missing_verification_secret_is_a_configuration_error() {
        let mut vars = complete_vars();
        vars.remove(env_vars::VERIFICATION_SECRET);
        let settings = Settings::from_vars(&vars).unwrap();

        assert_eq!(
            GatewayConfig::try_from(&settings).unwrap_err(),
            GatewayConfigError::Missing("TURNSTILE_SECRET_KEY")
        );
    }

    #[test]
    fn test_blank_auth_code_is_a_configuration_error() {
        let mut vars = complete_vars();
        vars.insert(env_vars::UPSTREAM_AUTH_CODE.to_string(), "   ".to_string());
        let settings = Settings::from_vars(&vars).unwrap();

        assert_eq!(
            GatewayConfig::try_from(&settings).unwrap_err(),
            GatewayConfigError::Missing("AUTH_CODE")
        );
    }

    #[test]
    fn test_missing_key_list_yields_empty_allow_list() {
        let mut vars = complete_vars();
        vars.remove(env_vars::PRIVATE_KEYS);
        let settings = Settings::from_vars(&vars).unwrap();
        let config = GatewayConfig::try_from(&settings).unwrap();

        assert!(config.private_keys.is_empty());
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let mut vars = complete_vars();
        vars.insert(
            "MANIFEST_GATEWAY__VERIFICATION__ENDPOINT".to_string(),
            "challenges.example.com".to_string(),
        );
        let settings = Settings::from_vars(&vars).unwrap();

        assert!(matches!(
            GatewayConfig::try_from(&settings),
            Err(GatewayConfigError::Invalid {
                key: "verification.endpoint",
                ..
            })
        ));
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let settings = Settings::from_vars(&complete_vars()).unwrap();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("turnstile-secret"));
        assert!(!rendered.contains("auth-code"));
        assert!(!rendered.contains("key-one"));
    }
}
