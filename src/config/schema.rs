use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_LABEL: &str = "HPI";

fn default_labels() -> Vec<String> {
    vec![DEFAULT_LABEL.to_string()]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Pick dark or light from the terminal background
    #[default]
    Auto,
    Dark,
    Light,
}

/// Contents of config.yaml. Every field is optional.
///
/// Example YAML:
/// ```yaml
/// roster: /srv/field/roster.csv
/// store: /srv/field/ratings.json
/// labels: [HPI]
/// sites: [ALF, BOS, CHI]
/// theme: dark
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Roster CSV (default: ~/.config/tech-rater/roster.csv)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roster: Option<PathBuf>,

    /// Rating store JSON (default: <data dir>/tech-rater/ratings.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<PathBuf>,

    /// Rating labels offered for selection, first is the default
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,

    /// Selectable site codes; empty means every site in the roster
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sites: Vec<String>,

    #[serde(default)]
    pub theme: ThemeMode,

    /// Log file used while the TUI owns the terminal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roster: None,
            store: None,
            labels: default_labels(),
            sites: Vec::new(),
            theme: ThemeMode::Auto,
            log_file: None,
        }
    }
}

impl Config {
    pub fn roster_path(&self) -> PathBuf {
        self.roster
            .clone()
            .unwrap_or_else(crate::roster::get_roster_path)
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .clone()
            .unwrap_or_else(crate::ratings::get_store_path)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| super::get_cache_dir().join("tech-rater.log"))
    }

    /// Label used when none is given on the command line
    pub fn default_label(&self) -> &str {
        self.labels
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.labels, vec!["HPI"]);
        assert_eq!(config.theme, ThemeMode::Auto);
    }

    #[test]
    fn test_parse_full() {
        let yaml = "roster: /tmp/roster.csv\nstore: /tmp/ratings.json\nlabels: [HPI, QA]\nsites: [ALF, BOS]\ntheme: light\n";
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.roster_path(), PathBuf::from("/tmp/roster.csv"));
        assert_eq!(config.store_path(), PathBuf::from("/tmp/ratings.json"));
        assert_eq!(config.labels, vec!["HPI", "QA"]);
        assert_eq!(config.sites, vec!["ALF", "BOS"]);
        assert_eq!(config.theme, ThemeMode::Light);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("queries: []\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_label_falls_back() {
        let config = Config {
            labels: vec![],
            ..Config::default()
        };
        assert_eq!(config.default_label(), "HPI");
    }
}
