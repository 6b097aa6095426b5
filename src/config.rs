use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub oauth: OAuthConfig,

    pub email: EmailConfig,

    pub storage: StorageConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub log_json: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/til.db".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    /// Externally reachable base URL, used to build links in emails.
    pub public_url: String,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    pub session_inactivity_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            public_url: "http://localhost:8080".to_string(),
            cors_allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            secure_cookies: true,
            session_inactivity_minutes: 60 * 24 * 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,

    /// Bearer tokens older than this stop resolving. Unset means no expiry.
    pub bearer_token_ttl_hours: Option<i64>,

    /// Reset links older than this are treated as unknown. Unset means no expiry.
    pub reset_token_ttl_minutes: Option<i64>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            bearer_token_ttl_hours: None,
            reset_token_ttl_minutes: None,
        }
    }
}

impl SecurityConfig {
    /// Bearer token lifetime, `None` when unset or too large to represent.
    #[must_use]
    pub fn bearer_token_ttl(&self) -> Option<TimeDelta> {
        self.bearer_token_ttl_hours.and_then(TimeDelta::try_hours)
    }

    #[must_use]
    pub fn reset_token_ttl(&self) -> Option<TimeDelta> {
        self.reset_token_ttl_minutes.and_then(TimeDelta::try_minutes)
    }

    #[must_use]
    pub fn bearer_token_expired(&self, issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        expired(issued_at, self.bearer_token_ttl(), now)
    }

    #[must_use]
    pub fn reset_token_expired(&self, issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        expired(issued_at, self.reset_token_ttl(), now)
    }
}

/// A deadline past the representable range never arrives.
fn expired(issued_at: DateTime<Utc>, ttl: Option<TimeDelta>, now: DateTime<Utc>) -> bool {
    ttl.is_some_and(|ttl| {
        issued_at
            .checked_add_signed(ttl)
            .is_some_and(|deadline| deadline < now)
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub google: OAuthProviderConfig,

    pub github: OAuthProviderConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthProviderConfig {
    pub client_id: String,

    pub client_secret: String,

    pub callback_url: String,
}

impl OAuthProviderConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty() && !self.callback_url.is_empty()
    }

    /// Path component of the callback URL, where the callback route is mounted.
    #[must_use]
    pub fn callback_path(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.callback_url).ok()?;
        let path = parsed.path();
        if path.is_empty() || path == "/" {
            None
        } else {
            Some(path.to_string())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// `SendGrid` API key. When empty, outgoing mail is only logged.
    pub sendgrid_api_key: String,

    pub from_email: String,

    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            sendgrid_api_key: String::new(),
            from_email: "noreply@localhost.com".to_string(),
            from_name: "TIL".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub profile_pictures_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            profile_pictures_path: "data/profile-pictures".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overlay values taken from the environment (or `.env`) on top of the file config.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DATABASE_URL") {
            self.general.database_path = v;
        }
        if let Some(v) = get("TIL_PUBLIC_URL") {
            self.server.public_url = v;
        }
        if let Some(v) = get("SENDGRID_API_KEY") {
            self.email.sendgrid_api_key = v;
        }
        if let Some(v) = get("GOOGLE_CALLBACK_URL") {
            self.oauth.google.callback_url = v;
        }
        if let Some(v) = get("GOOGLE_CLIENT_ID") {
            self.oauth.google.client_id = v;
        }
        if let Some(v) = get("GOOGLE_CLIENT_SECRET") {
            self.oauth.google.client_secret = v;
        }
        if let Some(v) = get("GITHUB_CALLBACK_URL") {
            self.oauth.github.callback_url = v;
        }
        if let Some(v) = get("GITHUB_CLIENT_ID") {
            self.oauth.github.client_id = v;
        }
        if let Some(v) = get("GITHUB_CLIENT_SECRET") {
            self.oauth.github.client_secret = v;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("til").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".til").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("min_db_connections cannot exceed max_db_connections");
        }

        if url::Url::parse(&self.server.public_url).is_err() {
            anyhow::bail!("server.public_url must be an absolute URL");
        }

        if self.server.session_inactivity_minutes <= 0 {
            anyhow::bail!("session_inactivity_minutes must be > 0");
        }

        for (name, provider) in [("google", &self.oauth.google), ("github", &self.oauth.github)] {
            if provider.is_configured() && provider.callback_path().is_none() {
                anyhow::bail!("oauth.{name}.callback_url must be an absolute URL with a path");
            }
        }

        if let Some(hours) = self.security.bearer_token_ttl_hours {
            if hours <= 0 || self.security.bearer_token_ttl().is_none() {
                anyhow::bail!("bearer_token_ttl_hours must be > 0 and within range when set");
            }
        }

        if let Some(minutes) = self.security.reset_token_ttl_minutes {
            if minutes <= 0 || self.security.reset_token_ttl().is_none() {
                anyhow::bail!("reset_token_ttl_minutes must be > 0 and within range when set");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.database_path, "sqlite:data/til.db");
        assert_eq!(config.security.argon2_parallelism, 1);
        assert!(config.security.bearer_token_ttl_hours.is_none());
        assert!(!config.oauth.google.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[security]"));
        assert!(toml_str.contains("[storage]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [oauth.github]
            client_id = "abc"
            client_secret = "shh"
            callback_url = "http://localhost:8080/oauth/github"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert!(config.oauth.github.is_configured());
        assert_eq!(
            config.oauth.github.callback_path().as_deref(),
            Some("/oauth/github")
        );
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "sqlite:/tmp/other.db"),
            ("GOOGLE_CLIENT_ID", "gid"),
            ("GOOGLE_CLIENT_SECRET", "gsecret"),
            ("GOOGLE_CALLBACK_URL", "https://til.example/oauth/google"),
            ("SENDGRID_API_KEY", "  "),
        ]);

        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.general.database_path, "sqlite:/tmp/other.db");
        assert!(config.oauth.google.is_configured());
        assert!(config.email.sendgrid_api_key.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_callback() {
        let mut config = Config::default();
        config.oauth.google = OAuthProviderConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            callback_url: "not a url".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut config = Config::default();
        config.security.bearer_token_ttl_hours = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_ttl() {
        let mut config = Config::default();
        config.security.bearer_token_ttl_hours = Some(i64::MAX / 2);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.security.reset_token_ttl_minutes = Some(i64::MAX);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        let mut security = SecurityConfig::default();
        assert!(!security.bearer_token_expired(now - TimeDelta::days(3650), now));

        security.bearer_token_ttl_hours = Some(1);
        assert!(security.bearer_token_expired(now - TimeDelta::hours(2), now));
        assert!(!security.bearer_token_expired(now - TimeDelta::minutes(30), now));

        security.reset_token_ttl_minutes = Some(15);
        assert!(security.reset_token_expired(now - TimeDelta::minutes(16), now));
        assert!(!security.reset_token_expired(now, now));
    }

    #[test]
    fn test_out_of_range_ttl_never_expires() {
        let now = Utc::now();
        let security = SecurityConfig {
            bearer_token_ttl_hours: Some(i64::MAX / 2),
            reset_token_ttl_minutes: Some(i64::MAX),
            ..SecurityConfig::default()
        };
        assert!(security.bearer_token_ttl().is_none());
        assert!(!security.bearer_token_expired(now - TimeDelta::days(3650), now));
        assert!(!security.reset_token_expired(now - TimeDelta::days(3650), now));

        // In range, but the deadline overflows the calendar.
        let security = SecurityConfig {
            bearer_token_ttl_hours: Some(i64::MAX / 3_600_000),
            ..SecurityConfig::default()
        };
        assert!(security.bearer_token_ttl().is_some());
        assert!(!security.bearer_token_expired(now, now));
    }
}
