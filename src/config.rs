use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::rarity::RarityConfig;
use crate::trending::RankConfig;

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Environment variable overriding [`CONFIG_PATH`].
pub const CONFIG_PATH_VAR: &str = "DOMAIN_RARITY_CONFIG";

/// Top-level application config deserialized from `config.toml`.
///
/// Every section is optional; an empty file yields the documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub rarity: RarityConfig,
    #[serde(default)]
    pub trending: RankConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// CLI runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Number of domains returned by `rank` and `recommend` when no
    /// `--limit` is given.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

fn default_limit() -> usize {
    10
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse and validate a TOML document.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.rarity.validate().context("invalid [rarity] section")?;
        self.trending
            .validate()
            .context("invalid [trending] section")?;
        Ok(())
    }

    /// Write config to the given TOML file path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StrategyConfig;

    #[test]
    fn empty_document_gives_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.settings.default_limit, 10);
        assert_eq!(config.rarity.tld_values.get(".com"), Some(&0.8));
        assert_eq!(config.trending.strategy, StrategyConfig::Simple);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::parse(
            r#"
            [rarity.weights]
            length = 0.30
            activity = 0.20

            [trending]
            known_terms = ["moon"]

            [trending.strategy]
            kind = "recency_window"
            window_days = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.rarity.weights.length, 0.30);
        assert_eq!(config.rarity.weights.pattern, 0.20);
        assert_eq!(config.trending.known_terms, vec!["moon"]);
        assert_eq!(
            config.trending.strategy,
            StrategyConfig::RecencyWindow { window_days: 7 }
        );
        assert_eq!(config.trending.tld_bonuses.get(".ai"), Some(&20));
    }

    #[test]
    fn example_config_parses() {
        let config = AppConfig::parse(include_str!("../config.example.toml")).unwrap();
        assert_eq!(config.rarity, RarityConfig::default());
        assert_eq!(config.trending.weights, RankConfig::default().weights);
        assert_eq!(config.trending.tld_bonuses, RankConfig::default().tld_bonuses);
        assert_eq!(config.trending.known_terms, RankConfig::default().known_terms);
    }

    #[test]
    fn invalid_weights_are_rejected() {
        let err = AppConfig::parse("[trending.weights]\nprice = 0.9\n").unwrap_err();
        assert!(format!("{err:#}").contains("weights must sum to 1"));
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("domain-rarity-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let mut config = AppConfig::default();
        config.settings.default_limit = 25;
        config.trending.strategy = StrategyConfig::RecentMix {
            window_days: 14,
            recent_ratio: 0.5,
        };
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/config.toml"));
    }
}
