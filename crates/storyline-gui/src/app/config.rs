use std::path::{Path, PathBuf};

use anyhow::Context;
use storyline_core::{EditMode, InteractionConfig, RegionLinkConfig, ViewportConfig};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, Default)]
pub(super) struct AppConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub interaction: InteractionSettings,
    #[serde(default)]
    pub history: HistorySettings,
    #[serde(default)]
    pub peaks: PeakSettings,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub(super) struct InteractionSettings {
    pub edit_mode: EditMode,
    pub edge_threshold_px: f64,
    pub click_slop_px: f64,
    pub wheel_zoom_sensitivity: f64,
    /// Linked region boundaries closer than this are already joined
    pub link_epsilon: f64,
    pub min_region_duration: f64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        let gesture = InteractionConfig::default();
        let link = RegionLinkConfig::default();
        Self {
            edit_mode: EditMode::default(),
            edge_threshold_px: gesture.edge_threshold_px,
            click_slop_px: gesture.click_slop_px,
            wheel_zoom_sensitivity: gesture.wheel_zoom_sensitivity,
            link_epsilon: link.epsilon,
            min_region_duration: link.min_duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub(super) struct HistorySettings {
    pub depth: usize,
    pub debounce_ms: u64,
}

impl Default for HistorySettings {
    fn default() -> Self {
        let link = RegionLinkConfig::default();
        Self {
            depth: link.history_depth,
            debounce_ms: link.debounce_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub(super) struct PeakSettings {
    /// Envelope resolution; higher keeps waveforms detailed at deep zoom
    pub peaks_per_second: u32,
}

impl Default for PeakSettings {
    fn default() -> Self {
        Self { peaks_per_second: 200 }
    }
}

impl AppConfig {
    pub fn interaction_config(&self) -> InteractionConfig {
        InteractionConfig {
            edge_threshold_px: self.interaction.edge_threshold_px,
            click_slop_px: self.interaction.click_slop_px,
            wheel_zoom_sensitivity: self.interaction.wheel_zoom_sensitivity,
        }
    }

    pub fn region_link_config(&self) -> RegionLinkConfig {
        RegionLinkConfig {
            epsilon: self.interaction.link_epsilon,
            min_duration: self.interaction.min_region_duration,
            history_depth: self.history.depth,
            debounce_ms: self.history.debounce_ms,
        }
    }
}

pub(super) fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("storyline")
        .join("config.toml")
}

pub(super) fn load_config() -> AppConfig {
    let path = config_path();
    std::fs::read_to_string(&path)
        .ok()
        .and_then(|s| parse_config(&s))
        .unwrap_or_default()
}

fn parse_config(s: &str) -> Option<AppConfig> {
    match toml::from_str(s) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Ignoring malformed config: {}", e);
            None
        }
    }
}

pub(super) fn save_config(config: &AppConfig) {
    let path = config_path();
    if let Err(e) = write_config(&path, config) {
        tracing::warn!("Failed to save config: {:#}", e);
    }
}

fn write_config(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let s = toml::to_string_pretty(config).context("serializing config")?;
    std::fs::write(path, s).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config = parse_config(
            r#"
            [viewport]
            zoom_rate = 0.3

            [interaction]
            edit_mode = "linked_regions"

            [history]
            depth = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.viewport.zoom_rate, 0.3);
        assert_eq!(config.viewport.friction, ViewportConfig::default().friction);
        assert_eq!(config.interaction.edit_mode, EditMode::LinkedRegions);
        assert_eq!(config.region_link_config().history_depth, 5);
        assert_eq!(config.peaks.peaks_per_second, 200);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(parse_config(&text), Some(config));
    }

    #[test]
    fn test_write_config_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storyline").join("config.toml");
        let config = AppConfig::default();
        write_config(&path, &config).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(parse_config(&text), Some(config));
    }

    #[test]
    fn test_write_config_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("storyline");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = write_config(&blocker.join("config.toml"), &AppConfig::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("creating"));
    }

    #[test]
    fn test_malformed_config_is_ignored() {
        assert!(parse_config("[viewport\nzoom_rate = ").is_none());
    }
}
