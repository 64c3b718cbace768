use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// Everything lives relative to the working directory so the whole
/// installation can be moved as one folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_music_dir")]
    pub music_dir: PathBuf,
    #[serde(default = "default_photo_dir")]
    pub photo_dir: PathBuf,
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_enabled")]
    pub enabled: bool,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Chat-completion endpoint settings. The API key itself is never written
/// to disk; only the name of the environment variable holding it is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_user_prompt")]
    pub user_prompt: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Local time of day the daily refresh fires, "HH:MM".
    #[serde(default = "default_refresh_at")]
    pub at: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_music_dir() -> PathBuf {
    PathBuf::from("music")
}

fn default_photo_dir() -> PathBuf {
    PathBuf::from("photo")
}

fn default_state_file() -> PathBuf {
    PathBuf::from("data.json")
}

fn default_http_enabled() -> bool {
    true
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_api_key_env() -> String {
    "MUSEBOX_API_KEY".to_string()
}

fn default_system_prompt() -> String {
    "You are a tender romantic poet. Write a short love poem of at most \
     four lines, warm and playful, addressed to the reader."
        .to_string()
}

/// `{year}`, `{month}` and `{day}` are substituted at request time.
fn default_user_prompt() -> String {
    "Today is {year}-{month}-{day}. Write today's little poem.".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_refresh_at() -> String {
    "02:00".to_string()
}

fn default_poll_interval_secs() -> u64 {
    60
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            music_dir: default_music_dir(),
            photo_dir: default_photo_dir(),
            state_file: default_state_file(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: default_http_enabled(),
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            system_prompt: default_system_prompt(),
            user_prompt: default_user_prompt(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            at: default_refresh_at(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            http: HttpConfig::default(),
            ai: AiConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        PathBuf::from("musebox.toml")
    }

    /// Idempotent: called every startup.
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.paths.music_dir)?;
        std::fs::create_dir_all(&self.paths.photo_dir)?;
        Ok(())
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.ai.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.http.enabled);
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.paths.music_dir, PathBuf::from("music"));
        assert_eq!(config.paths.photo_dir, PathBuf::from("photo"));
        assert_eq!(config.paths.state_file, PathBuf::from("data.json"));
        assert_eq!(config.refresh.at, "02:00");
        assert!(config.ai.base_url.starts_with("https://"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.http.port, config.http.port);
        assert_eq!(parsed.ai.model, config.ai.model);
        assert_eq!(parsed.refresh.at, config.refresh.at);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.http.port, 8080);
        assert_eq!(parsed.ai.api_key_env, "MUSEBOX_API_KEY");
    }
}
