//! Runtime configuration: defaults, optional YAML file, CLI overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_API_URL, DEFAULT_LOG_FILE, DEFAULT_TIMEOUT_SECS};
use crate::error::ConfigError;

const CONFIG_DIR_NAME: &str = "cyberbrain";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Effective configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub timeout_secs: u64,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: String::from(DEFAULT_API_URL),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// Values given on the command line; `None` keeps the file/default value
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Default location: `<config_dir>/cyberbrain/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from an explicit path, or from the default path if it exists.
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply CLI overrides, then validate and normalize
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Config, ConfigError> {
        if let Some(url) = overrides.api_url {
            self.api_url = url;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(log_file) = overrides.log_file {
            self.log_file = log_file;
        }
        self.validate()
    }

    fn validate(mut self) -> Result<Config, ConfigError> {
        let url = self.api_url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_url must start with http:// or https:// (got '{}')",
                self.api_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(String::from("timeout_secs must be greater than 0")));
        }
        self.api_url = url;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default().with_overrides(Overrides::default()).unwrap();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "api_url: https://soc.example.com/").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.api_url, "https://soc.example.com/");
        assert_eq!(config.timeout_secs, 30);

        let config = config.with_overrides(Overrides::default()).unwrap();
        assert_eq!(config.api_url, "https://soc.example.com");
    }

    #[test]
    fn test_overrides_win() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "api_url: http://a:1\ntimeout_secs: 5").unwrap();
        let config = Config::load(Some(file.path()))
            .unwrap()
            .with_overrides(Overrides {
                api_url: Some("http://b:2".into()),
                timeout_secs: None,
                log_file: Some(PathBuf::from("x.log")),
            })
            .unwrap();
        assert_eq!(config.api_url, "http://b:2");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.log_file, PathBuf::from("x.log"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs: [not, a, number]").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let source = std::error::Error::source(&err).expect("yaml error kept as source");
        assert!(source.to_string().contains("invalid type"));
    }

    #[test]
    fn test_rejects_bad_url_and_zero_timeout() {
        let bad_url = Config::default().with_overrides(Overrides {
            api_url: Some("localhost:5000".into()),
            ..Overrides::default()
        });
        assert!(matches!(bad_url, Err(ConfigError::Invalid(_))));

        let zero = Config::default().with_overrides(Overrides {
            timeout_secs: Some(0),
            ..Overrides::default()
        });
        assert!(matches!(zero, Err(ConfigError::Invalid(_))));
    }
}
