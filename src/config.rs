use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, TranslateError};

pub const DEFAULT_ENDPOINT: &str = "https://www2.deepl.com/jsonrpc";
pub const DEFAULT_TARGET_LANG: &str = "ZH";

/// File names probed in the working directory when no path is given
const CONFIG_CANDIDATES: [&str; 3] = ["deepl-pipe.yaml", "deepl-pipe.yml", "deepl-pipe.json"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_target_lang")]
    pub default_target_lang: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub client: ClientIdentity,
}

/// Strings the requests use to pass as the iOS app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientIdentity {
    #[serde(default = "default_app_version")]
    pub app_version: String,
    #[serde(default = "default_app_build")]
    pub app_build: String,
    #[serde(default = "default_os_version")]
    pub os_version: String,
    #[serde(default = "default_device")]
    pub device: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_target_lang() -> String {
    DEFAULT_TARGET_LANG.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_app_version() -> String {
    "2.9.1".to_string()
}

fn default_app_build() -> String {
    "510265".to_string()
}

fn default_os_version() -> String {
    "16.3.0".to_string()
}

fn default_device() -> String {
    "iPhone13,2".to_string()
}

impl ClientIdentity {
    pub fn user_agent(&self) -> String {
        format!(
            "DeepL-iOS/{} iOS {} ({})",
            self.app_version, self.os_version, self.device
        )
    }
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self {
            app_version: default_app_version(),
            app_build: default_app_build(),
            os_version: default_os_version(),
            device: default_device(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            default_target_lang: default_target_lang(),
            timeout_secs: default_timeout_secs(),
            client: ClientIdentity::default(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load a config file, YAML or JSON depending on the extension.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .map_err(|e| TranslateError::Config(format!("{}: {}", path.display(), e)))?;
        let content = substitute_env_vars(&decode_text(&bytes));

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config: Config = if is_json {
            serde_json::from_str(&content)
                .map_err(|e| TranslateError::Config(format!("{}: {}", path.display(), e)))?
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| TranslateError::Config(format!("{}: {}", path.display(), e)))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Pick the config to run with.
    ///
    /// An explicit path must exist. Without one, `CONFIG_PATH` is tried and
    /// then the candidate names in the working directory; if nothing is found
    /// the built-in defaults are used.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidates: Vec<PathBuf> = std::env::var("CONFIG_PATH")
            .ok()
            .map(PathBuf::from)
            .into_iter()
            .chain(CONFIG_CANDIDATES.iter().map(PathBuf::from))
            .collect();

        for path in candidates {
            if path.is_file() {
                debug!("Loading config from {}", path.display());
                return Self::load(&path);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(TranslateError::Config("endpoint must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(TranslateError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Decode config text as UTF-8, dropping a BOM if there is one.
fn decode_text(bytes: &[u8]) -> String {
    let (cow, _, _) = encoding_rs::UTF_8.decode(bytes);
    cow.into_owned()
}

/// Replace `${VAR_NAME}` with the environment value, leaving unknown names as-is.
fn substitute_env_vars(content: &str) -> String {
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("static pattern");
    pattern
        .replace_all(content, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn defaults_match_ios_client() {
        let config = Config::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.default_target_lang, "ZH");
        assert_eq!(
            config.client.user_agent(),
            "DeepL-iOS/2.9.1 iOS 16.3.0 (iPhone13,2)"
        );
    }

    #[test]
    fn loads_partial_yaml() {
        let file = write_temp(".yaml", b"default_target_lang: DE\nclient:\n  app_version: 3.0.0\n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.default_target_lang, "DE");
        assert_eq!(config.client.app_version, "3.0.0");
        assert_eq!(config.client.app_build, "510265");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn loads_json_with_bom() {
        let mut content = vec![0xEF, 0xBB, 0xBF];
        content.extend_from_slice(br#"{"timeout_secs": 5}"#);
        let file = write_temp(".json", &content);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn substitutes_environment_variables() {
        std::env::set_var("DEEPL_PIPE_TEST_ENDPOINT", "http://127.0.0.1:9/jsonrpc");
        let file = write_temp(".yaml", b"endpoint: ${DEEPL_PIPE_TEST_ENDPOINT}\n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:9/jsonrpc");
    }

    #[test]
    fn unknown_variables_are_left_alone() {
        assert_eq!(
            substitute_env_vars("x: ${DEEPL_PIPE_SURELY_UNSET_VAR}"),
            "x: ${DEEPL_PIPE_SURELY_UNSET_VAR}"
        );
    }

    #[test]
    fn rejects_zero_timeout() {
        let file = write_temp(".yaml", b"timeout_secs: 0\n");
        assert!(matches!(
            Config::load(file.path()),
            Err(TranslateError::Config(_))
        ));
    }

    #[test]
    fn config_path_env_is_used_without_explicit_path() {
        let file = write_temp(".yaml", b"default_target_lang: JA\n");
        std::env::set_var("CONFIG_PATH", file.path());
        let config = Config::resolve(None);
        std::env::set_var("CONFIG_PATH", "/nonexistent/deepl-pipe-env.yaml");
        let fallback = Config::resolve(None);
        std::env::remove_var("CONFIG_PATH");

        assert_eq!(config.unwrap().default_target_lang, "JA");
        // a missing CONFIG_PATH file is skipped like the other candidates
        assert_eq!(fallback.unwrap().endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let result = Config::resolve(Some(Path::new("/nonexistent/deepl-pipe.yaml")));
        assert!(result.is_err());
    }
}
