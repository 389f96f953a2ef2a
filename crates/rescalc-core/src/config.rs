use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize};

use crate::params::{ConnectionMode, SearchParameters};

pub const CONFIG_FILE_NAME: &str = "rescalc.toml";

/// Resistor values offered when nothing else is configured
pub const DEFAULT_RESISTORS: &str = "100, 220, 330, 470, 1000, 2200, 3300, 4700, 10000";

/// Number of combinations shown per connection type
pub const DEFAULT_LIMIT: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),
}

/// Contents of a `rescalc.toml`.
///
/// Every key is optional:
///
/// ```toml
/// resistors = ["100", "4k7", 10000]   # or "100, 4k7, 10000"
/// target = 1500
/// tolerance = 5
/// max-size = 3
/// mode = "both"                        # series | parallel | both
/// allow-repeats = false
/// limit = 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_resistors")]
    pub resistors: String,
    pub target: f64,
    pub tolerance: f64,
    pub max_size: usize,
    pub mode: ConnectionMode,
    pub allow_repeats: bool,
    pub limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        let params = SearchParameters::default();
        Self {
            resistors: DEFAULT_RESISTORS.to_string(),
            target: params.target,
            tolerance: params.tolerance,
            max_size: params.max_size,
            mode: params.mode,
            allow_repeats: params.allow_repeats,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Accept either one comma separated string or an array of numbers/strings.
fn deserialize_resistors<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Number(f64),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Resistors {
        Text(String),
        List(Vec<Entry>),
    }

    Ok(match Resistors::deserialize(deserializer)? {
        Resistors::Text(text) => text,
        Resistors::List(entries) => entries
            .into_iter()
            .map(|entry| match entry {
                Entry::Number(n) => n.to_string(),
                Entry::Text(s) => s,
            })
            .join(", "),
    })
}

impl Config {
    pub fn search_parameters(&self) -> SearchParameters {
        SearchParameters {
            target: self.target,
            tolerance: self.tolerance,
            max_size: self.max_size,
            mode: self.mode,
            allow_repeats: self.allow_repeats,
        }
    }

    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Load the first config file found in `start_dir`, then in the user
    /// config directory. Returns the defaults when neither exists.
    pub fn discover(start_dir: &Path) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let candidates = std::iter::once(start_dir.join(CONFIG_FILE_NAME)).chain(
            dirs::config_dir().map(|dir| dir.join("rescalc").join(CONFIG_FILE_NAME)),
        );

        for path in candidates {
            if path.is_file() {
                log::debug!("Using config file {}", path.display());
                let config = Self::load(&path)?;
                return Ok((config, Some(path)));
            }
        }

        log::debug!("No config file found, using defaults");
        Ok((Self::default(), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(contents: &str) -> Result<Config, ConfigError> {
        Config::from_toml_str(contents, Path::new("rescalc.toml"))
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_resistors_as_string_or_array() {
        let config = parse(r#"resistors = "100, 4k7""#).unwrap();
        assert_eq!(config.resistors, "100, 4k7");

        let config = parse(r#"resistors = [100, "4k7", 2.2]"#).unwrap();
        assert_eq!(config.resistors, "100, 4k7, 2.2");
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
target = 470
tolerance = 2.5
max-size = 2
mode = "parallel"
allow-repeats = true
limit = 10
"#,
        )
        .unwrap();

        let params = config.search_parameters();
        assert_eq!(params.target, 470.0);
        assert_eq!(params.tolerance, 2.5);
        assert_eq!(params.max_size, 2);
        assert_eq!(params.mode, ConnectionMode::Parallel);
        assert!(params.allow_repeats);
        assert_eq!(config.limit, 10);
        assert_eq!(config.resistors, DEFAULT_RESISTORS);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = parse("targett = 10").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_default_config_toml() {
        insta::assert_snapshot!(Config::default().to_toml_string().unwrap(), @r#"
        resistors = "100, 220, 330, 470, 1000, 2200, 3300, 4700, 10000"
        target = 1500.0
        tolerance = 5.0
        max-size = 3
        mode = "both"
        allow-repeats = false
        limit = 5
        "#);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config {
            resistors: "10, 22".to_string(),
            mode: ConnectionMode::Series,
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert!(text.contains(r#"mode = "series""#));
        assert_eq!(parse(&text).unwrap(), config);
    }

    #[test]
    fn test_discover_prefers_working_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "target = 42").unwrap();

        let (config, path) = Config::discover(dir.path()).unwrap();
        assert_eq!(config.target, 42.0);
        assert_eq!(path, Some(dir.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
