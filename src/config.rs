use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
}

fn default_feed_url() -> String {
    "https://dannycastonguay1.substack.com/feed".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { url: default_feed_url() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImagesConfig {
    #[serde(default = "default_images_dir")]
    pub dir: PathBuf,
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { dir: default_images_dir() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_s: u64,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_model() -> String {
    "gpt-image-1".to_string()
}

fn default_size() -> String {
    "1024x1024".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_api_base() -> String {
    "https://api.openai.com".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            size: default_size(),
            request_timeout_s: default_request_timeout(),
            api_base: default_api_base(),
        }
    }
}

impl Config {
    /// Load `config.toml` if present; a missing file means all defaults.
    /// A present-but-malformed file is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {}", path.display()));
            }
        };
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }

    /// The API key comes from the environment (or .env). This runs headless in
    /// CI, so an absent key is fatal rather than prompted for.
    pub fn openai_api_key() -> Result<String> {
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(sanitize_key(&key)),
            _ => anyhow::bail!(
                "OPENAI_API_KEY is not set. Configure it in the environment \
                 (e.g. GitHub Actions secrets) or in {}",
                ENV_FILE
            ),
        }
    }
}

/// Strip carriage returns, BOM, and other invisible chars from a key value.
fn sanitize_key(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_config_parses() {
        let config = Config::load_or_default(Path::new("config.toml")).unwrap();
        assert_eq!(config.generation.model, "gpt-image-1");
        assert_eq!(config.generation.size, "1024x1024");
        assert_eq!(config.images.dir, PathBuf::from("images"));
        assert!(config.feed.url.starts_with("https://"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load_or_default(Path::new("no-such-config.toml")).unwrap();
        assert_eq!(config.generation.request_timeout_s, 60);
        assert_eq!(config.generation.api_base, "https://api.openai.com");
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: Config =
            toml::from_str("[feed]\nurl = \"https://example.com/feed\"\n").unwrap();
        assert_eq!(config.feed.url, "https://example.com/feed");
        assert_eq!(config.generation.model, "gpt-image-1");
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(toml::from_str::<Config>("[feed\nurl = 3").is_err());
    }

    #[test]
    fn missing_api_key_is_an_error() {
        // No other test touches this variable, so clearing it is safe even
        // with the parallel test runner.
        std::env::remove_var("OPENAI_API_KEY");
        assert!(Config::openai_api_key().is_err());
    }

    #[test]
    fn sanitize_strips_invisible_chars() {
        assert_eq!(sanitize_key("\u{feff}sk-abc\r\n"), "sk-abc");
    }
}
