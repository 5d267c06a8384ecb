use crate::features::building::{default_buildings, BuildingSpec};
use crate::features::crane::{default_cranes, CraneSpec};
use crate::features::page::PageCopy;
use crate::features::site::StarsConfig;
use crate::features::trees::default_tree_positions;
use crate::features::EntityWindows;
use crate::gfx::camera::CameraConfig;
use crate::gfx::math::Color;
use crate::timeline::{default_loop_duration, default_phases, Phase, Timeline};
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_fps_cap")]
    pub fps_cap: u32,

    #[serde(default)]
    pub layer: LayerKind,

    #[serde(default)]
    pub timeline: TimelineConfig,

    #[serde(default)]
    pub windows: EntityWindows,

    #[serde(default)]
    pub camera: CameraConfig,

    #[serde(default = "default_buildings")]
    pub buildings: Vec<BuildingSpec>,

    #[serde(default = "default_cranes")]
    pub cranes: Vec<CraneSpec>,

    #[serde(default = "default_tree_positions")]
    pub trees: Vec<[f32; 3]>,

    #[serde(default)]
    pub stars: StarsConfig,

    #[serde(default = "default_theme")]
    pub theme: Theme,

    #[serde(default)]
    pub page: PageCopy,
}

/// Which layer-shell layer the surface lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    #[default]
    Background,
    Bottom,
    Top,
    Overlay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Seconds for one full pass through every phase.
    #[serde(default = "default_loop_duration")]
    pub loop_duration: f64,

    #[serde(default = "default_phases")]
    pub phases: Vec<Phase>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            loop_duration: default_loop_duration(),
            phases: default_phases(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub background: Color,
    pub panel: Color,
    pub panel_border: Color,
    pub text: Color,
    pub muted: Color,
    pub track: Color,
    pub accent: Color,
    pub accent_end: Color,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps_cap: default_fps_cap(),
            layer: LayerKind::default(),
            timeline: TimelineConfig::default(),
            windows: EntityWindows::default(),
            camera: CameraConfig::default(),
            buildings: default_buildings(),
            cranes: default_cranes(),
            trees: default_tree_positions(),
            stars: StarsConfig::default(),
            theme: default_theme(),
            page: PageCopy::default(),
        }
    }
}

fn default_theme() -> Theme {
    Theme {
        background: Color::hex(0x030712),
        panel: Color::rgba(0, 0, 0, 102),
        panel_border: Color::rgba(255, 255, 255, 26),
        text: Color::hex(0xffffff),
        muted: Color::hex(0x94a3b8),
        track: Color::rgba(255, 255, 255, 26),
        accent: Color::hex(0x38bdf8),
        accent_end: Color::hex(0x6ee7b7),
    }
}

fn default_fps_cap() -> u32 {
    60
}

fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
    Ok(config_dir.join("skyline"))
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir()?.join("config.toml"))
    }

    /// Reads `path`, or writes the defaults there on first run.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config = Self::from_toml_str(&contents)
                .with_context(|| format!("parsing {}", path.display()))?;
            info!("Loaded config from {}", path.display());
            config
        } else {
            let config = Config::default();
            match config.save_to(path) {
                Ok(()) => info!("Wrote default config to {}", path.display()),
                Err(e) => warn!("Could not write default config: {:#}", e),
            }
            config
        };

        // A broken phase list should stop start-up, not show up mid-loop.
        config.timeline()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn timeline(&self) -> Result<Timeline> {
        Timeline::new(self.timeline.loop_duration, self.timeline.phases.clone())
            .context("invalid [timeline] section")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.fps_cap, 60);
        assert_eq!(config.layer, LayerKind::Background);
        assert_eq!(config.timeline.loop_duration, 40.0);
        assert_eq!(config.timeline.phases.len(), 6);
        assert_eq!(config.buildings.len(), 6);
        assert_eq!(config.theme, default_theme());
        assert!(config.timeline().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r##"
fps_cap = 30
layer = "top"

[timeline]
loop_duration = 20.0

[windows]
glow = { start = 0.5, end = 0.6 }

[theme]
background = "#000000"
panel = "#00000066"
panel_border = "#ffffff1a"
text = "#ffffff"
muted = "#94a3b8"
track = "#ffffff1a"
accent = "#ff0000"
accent_end = "#00ff00"
"##,
        )
        .unwrap();
        assert_eq!(config.fps_cap, 30);
        assert_eq!(config.layer, LayerKind::Top);
        assert_eq!(config.timeline.phases.len(), 6);
        assert_eq!(config.windows.glow.start, 0.5);
        assert_eq!(config.windows.trees, EntityWindows::default().trees);
        assert_eq!(config.theme.accent, Color::hex(0xff0000));

        let timeline = config.timeline().unwrap();
        assert_eq!(timeline.loop_duration().as_secs(), 20);
    }

    #[test]
    fn custom_phases_are_validated() {
        let config = Config::from_toml_str(
            r#"
[timeline]
phases = [
  { label = "Dig", description = "Excavation", start = 0.0, end = 0.4 },
  { label = "Build", description = "Everything else", start = 0.5, end = 1.0 },
]
"#,
        )
        .unwrap();
        let err = config.timeline().unwrap_err();
        assert!(format!("{:#}", err).contains("gap"));
    }

    #[test]
    fn bad_colour_is_a_parse_error() {
        let toml = "[theme]\nbackground = \"blue\"";
        assert!(Config::from_toml_str(toml).is_err());
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("skyline-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn first_load_writes_the_defaults() {
        let dir = scratch_dir("first-load");
        let path = dir.join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.fps_cap, 60);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.theme, config.theme);
        assert_eq!(reloaded.timeline.phases.len(), config.timeline.phases.len());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn existing_file_is_not_overwritten() {
        let dir = scratch_dir("existing");
        let path = dir.join("config.toml");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "fps_cap = 24\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.fps_cap, 24);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fps_cap = 24\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unwritable_location_still_loads_defaults() {
        let dir = scratch_dir("blocked");
        std::fs::create_dir_all(&dir).unwrap();
        // A file where the parent directory should be.
        let blocker = dir.join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let config = Config::load_from(&blocker.join("config.toml")).unwrap();
        assert_eq!(config.fps_cap, 60);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back = Config::from_toml_str(&text).unwrap();
        assert_eq!(back.theme, config.theme);
        assert_eq!(back.buildings, config.buildings);
        assert_eq!(back.cranes, config.cranes);
        assert_eq!(back.timeline.phases.len(), config.timeline.phases.len());
    }
}
