//! Configuration management for the Youniverse CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use youniverse::{cache::MemoryCache, YouniverseClient};

/// How long profiles stay cached within one process.
const PROFILE_CACHE_TTL: Duration = Duration::from_secs(300);

/// CLI configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub project_url: Option<String>,
    /// Public (anon) API key.
    pub api_key: Option<String>,
    /// Authentication credentials.
    pub auth: Option<AuthConfig>,
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Access token (JWT).
    pub access_token: String,
    /// User ID.
    pub user_id: String,
}

/// Connection settings given on the command line or in the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub project_url: Option<String>,
    pub api_key: Option<String>,
}

static OVERRIDES: OnceLock<Overrides> = OnceLock::new();

/// Install overrides taking precedence over the config file. First call wins.
pub fn set_overrides(overrides: Overrides) {
    let _ = OVERRIDES.set(overrides);
}

impl Config {
    /// Project URL after overrides.
    pub fn effective_url(&self) -> Option<String> {
        OVERRIDES
            .get()
            .and_then(|o| o.project_url.clone())
            .or_else(|| self.project_url.clone())
            .filter(|u| !u.trim().is_empty())
    }

    /// API key after overrides.
    pub fn effective_api_key(&self) -> Option<String> {
        OVERRIDES
            .get()
            .and_then(|o| o.api_key.clone())
            .or_else(|| self.api_key.clone())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Get the configuration file path.
pub fn config_path() -> Result<PathBuf> {
    let exe_path = env::current_exe().context("Could not determine executable path")?;
    let exe_dir = exe_path
        .parent()
        .context("Could not determine executable directory")?;

    Ok(exe_dir.join("youniverse.toml"))
}

/// Load configuration from file.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path).context("Failed to read config file")?;

    toml::from_str(&content).context("Failed to parse config file")
}

/// Save configuration to file.
pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path()?;
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(&path, content).context("Failed to write config file")?;

    Ok(())
}

fn base_builder(config: &Config) -> Result<youniverse::YouniverseClientBuilder> {
    let url = config
        .effective_url()
        .context("Project URL not configured. Set YOUNIVERSE_URL or project_url in youniverse.toml.")?;
    let key = config.effective_api_key().unwrap_or_default();

    Ok(YouniverseClient::builder()
        .project_url(url)
        .api_key(key)
        .cache(Arc::new(MemoryCache::with_default_ttl(PROFILE_CACHE_TTL))))
}

/// Build a client from the current configuration.
pub fn build_client() -> Result<YouniverseClient> {
    let config = load_config()?;

    let mut builder = base_builder(&config)?;

    if let Some(auth) = &config.auth {
        builder = builder.auth(&auth.access_token, auth.user_id.as_str());
    }

    builder.build().context("Failed to build Youniverse client")
}

/// Build a client that requires authentication.
pub fn build_authed_client() -> Result<YouniverseClient> {
    let config = load_config()?;

    let auth = config
        .auth
        .as_ref()
        .context("Authentication required. Run 'yuv auth login' first.")?;

    base_builder(&config)?
        .auth(&auth.access_token, auth.user_id.as_str())
        .build()
        .context("Failed to build Youniverse client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config {
            project_url: Some("https://abc.supabase.co".into()),
            api_key: Some("anon".into()),
            auth: Some(AuthConfig {
                access_token: "eyJ".into(),
                user_id: "7d3f".into(),
            }),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[auth]"));

        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.auth.map(|a| a.user_id), Some("7d3f".to_owned()));
    }

    #[test]
    fn test_empty_config_parses() {
        let parsed: Config = toml::from_str("").unwrap();
        assert!(parsed.auth.is_none());
        assert!(parsed.project_url.is_none());
    }
}
