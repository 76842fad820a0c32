//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treeviz/treeviz.toml`
//! 3. Local config: `./.treeviz.toml`
//! 4. Environment variables: `TREEVIZ_*` prefix (`__` separates nesting)
//!
//! Command line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::services::{RenderStyle, Renderer};
use crate::application::ApplicationError;
use crate::domain::LayoutConfig;

/// Spacing of the tree drawing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutSettings {
    /// Horizontal distance per node of sibling subtree width
    pub horizontal_spacing: f64,
    /// Vertical distance between levels
    pub vertical_spacing: f64,
    /// y coordinate of the root
    pub top_margin: f64,
    /// Radius of node circles
    pub node_radius: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        let layout = LayoutConfig::default();
        Self {
            horizontal_spacing: layout.horizontal_spacing,
            vertical_spacing: layout.vertical_spacing,
            top_margin: layout.top_margin,
            node_radius: RenderStyle::default().node_radius,
        }
    }
}

/// Size of the drawing surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Unified configuration for treeviz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base url of the tree service
    pub server_url: String,
    /// Tree kind selected at start (e.g. "abb", "avl")
    pub tree_kind: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    pub layout: LayoutSettings,
    pub canvas: CanvasSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            tree_kind: "abb".into(),
            request_timeout_secs: 10,
            layout: LayoutSettings::default(),
            canvas: CanvasSettings::default(),
        }
    }
}

/// Get the XDG config directory for treeviz.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treeviz").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treeviz.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".treeviz.toml")
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory holding an optional `.treeviz.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path();
        let local = local_dir.map(local_config_path);
        Self::load_from(global.as_deref(), local.as_deref())
    }

    /// Load settings from explicit file locations; missing files are skipped.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let defaults = Config::try_from(&Settings::default()).map_err(config_err)?;
        let mut builder = Config::builder().add_source(defaults);

        for path in [global, local].into_iter().flatten() {
            if path.exists() {
                debug!("config file: {}", path.display());
                builder = builder.add_source(File::from(path).required(true));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("TREEVIZ")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.tree_kind.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "tree_kind must not be empty".to_string(),
            });
        }
        let l = &self.layout;
        if [l.horizontal_spacing, l.vertical_spacing, l.node_radius]
            .iter()
            .any(|v| !v.is_finite() || *v <= 0.0)
        {
            return Err(ApplicationError::Config {
                message: "layout spacing and node_radius must be positive".to_string(),
            });
        }
        if !l.top_margin.is_finite() {
            return Err(ApplicationError::Config {
                message: "layout top_margin must be a finite number".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ApplicationError::Config {
                message: "request_timeout_secs must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            horizontal_spacing: self.layout.horizontal_spacing,
            vertical_spacing: self.layout.vertical_spacing,
            top_margin: self.layout.top_margin,
        }
    }

    /// Renderer using the configured spacing and the default colors.
    pub fn renderer(&self) -> Renderer {
        let style = RenderStyle {
            node_radius: self.layout.node_radius,
            ..RenderStyle::default()
        };
        Renderer::new(self.layout_config(), style)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treeviz configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treeviz/treeviz.toml
#   Local:  ./.treeviz.toml
#   Env:    TREEVIZ_* environment variables, e.g. TREEVIZ_SERVER_URL,
#           TREEVIZ_LAYOUT__HORIZONTAL_SPACING
#   Flags:  --server, --kind, --width, --height

# Base url of the tree service
# server_url = "http://127.0.0.1:5000"

# Tree kind used when none is given ("abb" or "avl" on the reference backend)
# tree_kind = "abb"

# Seconds before a request is abandoned
# request_timeout_secs = 10

[layout]
# horizontal_spacing = 40.0
# vertical_spacing = 80.0
# top_margin = 50.0
# node_radius = 20.0

[canvas]
# width = 800
# height = 600
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn given_no_config_files_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None, None).expect("load defaults");
        assert_eq!(settings.tree_kind, "abb");
        assert_eq!(settings.layout.horizontal_spacing, 40.0);
        assert_eq!(settings.canvas.width, 800);
    }

    #[test]
    fn given_local_file_when_loading_then_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global.toml");
        let local = temp.path().join("local.toml");
        std::fs::write(
            &global,
            "server_url = \"http://global:1\"\ntree_kind = \"avl\"\n[layout]\nvertical_spacing = 60.0\n",
        )
        .unwrap();
        std::fs::write(&local, "server_url = \"http://local:2\"\n").unwrap();

        let settings = Settings::load_from(Some(&global), Some(&local)).unwrap();

        assert_eq!(settings.server_url, "http://local:2");
        assert_eq!(settings.tree_kind, "avl");
        assert_eq!(settings.layout.vertical_spacing, 60.0);
        // untouched nested keys keep their defaults
        assert_eq!(settings.layout.horizontal_spacing, 40.0);
    }

    #[test]
    fn given_missing_files_when_loading_then_they_are_skipped() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        let settings = Settings::load_from(Some(&missing), Some(&missing)).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn given_zero_spacing_when_loading_then_rejects() {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join("local.toml");
        std::fs::write(&local, "[layout]\nhorizontal_spacing = 0.0\n").unwrap();

        let err = Settings::load_from(None, Some(&local)).unwrap_err();
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn given_zero_timeout_when_loading_then_rejects() {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join("local.toml");
        std::fs::write(&local, "request_timeout_secs = 0\n").unwrap();

        let err = Settings::load_from(None, Some(&local)).unwrap_err();
        assert!(matches!(err, ApplicationError::Config { .. }));
        assert!(err.to_string().contains("request_timeout_secs"));
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn given_non_finite_top_margin_when_validating_then_rejects(#[case] margin: f64) {
        let mut settings = Settings::default();
        settings.layout.top_margin = margin;

        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("top_margin"));
    }

    #[test]
    fn given_negative_top_margin_when_validating_then_accepts() {
        let mut settings = Settings::default();
        settings.layout.top_margin = -10.0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn given_settings_when_serializing_then_toml_round_trips() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn given_template_when_parsed_then_yields_defaults() {
        let parsed: Settings = toml::from_str(&Settings::template()).unwrap();
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn given_settings_when_building_renderer_then_uses_configured_radius() {
        let mut settings = Settings::default();
        settings.layout.node_radius = 12.0;
        assert_eq!(settings.renderer().style().node_radius, 12.0);
    }
}
