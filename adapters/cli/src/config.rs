//! Editor configuration loaded from TOML.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use mapforge_system_history::DEFAULT_MAX_DEPTH;
use serde::Deserialize;

/// Settings for a scripted editing session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EditorConfig {
    pub(crate) map: MapConfig,
    pub(crate) history: HistoryConfig,
}

/// Size of the map created for the session.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MapConfig {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct HistoryConfig {
    pub(crate) max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EditorConfig {
    /// Reads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            log::debug!("no config file given, using defaults");
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read editor config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid editor config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse editor config toml contents")?;
        if config.map.width == 0 || config.map.height == 0 {
            bail!(
                "map dimensions must be non-zero; got {}x{}",
                config.map.width,
                config.map.height
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EditorConfig::parse("").expect("empty config is valid");
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.history.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = EditorConfig::parse(
            r#"
            [map]
            width = 128

            [history]
            max_depth = 16
            "#,
        )
        .expect("valid config");
        assert_eq!(config.map.width, 128);
        assert_eq!(config.map.height, 64);
        assert_eq!(config.history.max_depth, 16);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let error = EditorConfig::parse("[map]\nheight = 0\n").expect_err("zero height");
        assert!(
            format!("{error:#}").contains("non-zero"),
            "unexpected error: {error:#}"
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(EditorConfig::parse("[map]\ndepth = 3\n").is_err());
    }

    #[test]
    fn missing_path_falls_back_to_defaults() {
        assert_eq!(
            EditorConfig::load(None).expect("defaults"),
            EditorConfig::default()
        );
    }
}
