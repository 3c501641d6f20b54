//! Demo configuration (window, flight, spotlight, camera, UI, assets).
//! Loaded from falcon.ron at startup; every field has a default so partial
//! files work.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::flight::{FlightTuning, TurnPriority};
use crate::help_panel::MIN_LATCH_INTERVAL_SECS;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "falcon.ron";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub window: WindowConfig,
    pub flight: FlightConfig,
    pub spotlight: SpotlightConfig,
    pub camera: CameraConfig,
    pub ui: UiConfig,
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub height: u32,
    #[serde(default = "default_true")]
    pub vsync: bool,
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_title() -> String {
    "Falcon Flight".to_string()
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
            vsync: default_true(),
            title: default_title(),
        }
    }
}

/// Per-tick flight constants (ticks run at 60 Hz).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub rotation_speed: f32,
    pub move_speed: f32,
    pub lean_angle: f32,
    pub smoothing: f32,
    pub turn_priority: TurnPriority,
    /// Heading at startup (radians). π faces the camera's start side.
    pub initial_yaw: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        let tuning = FlightTuning::default();
        Self {
            rotation_speed: tuning.rotation_speed,
            move_speed: tuning.move_speed,
            lean_angle: tuning.lean_angle,
            smoothing: tuning.smoothing,
            turn_priority: tuning.turn_priority,
            initial_yaw: std::f32::consts::PI,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotlightConfig {
    /// Position relative to the ship container.
    pub position: [f32; 3],
    pub aim_forward_offset: f32,
    pub aim_lateral_offset: f32,
    /// Linear RGB.
    pub color: [f32; 3],
    pub intensity: f32,
    pub distance: f32,
    /// Outer cone half-angle (radians).
    pub angle: f32,
    pub penumbra: f32,
    pub decay: f32,
    pub cast_shadow: bool,
    pub shadow_bias: f32,
    /// Flat fill light so unlit sides are not pitch black.
    pub ambient: [f32; 3],
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        let tuning = FlightTuning::default();
        Self {
            position: [0.0, 25.0, 0.0],
            aim_forward_offset: tuning.aim_forward_offset,
            aim_lateral_offset: tuning.aim_lateral_offset,
            color: [1.0, 1.0, 1.0],
            intensity: 3000.0,
            distance: 100.0,
            angle: 0.29,
            penumbra: 1.0,
            decay: 2.0,
            cast_shadow: true,
            shadow_bias: -0.0001,
            ambient: [0.02, 0.02, 0.025],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view (degrees).
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub start_position: [f32; 3],
    /// Chase offset in the ship's local space (behind and above).
    pub follow_offset: [f32; 3],
    pub smoothing: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 1.0,
            far: 2000.0,
            start_position: [10.0, 100.0, 10.0],
            follow_offset: [0.0, 5.0, 10.0],
            smoothing: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Period of the help panel latch check (seconds).
    pub latch_interval_secs: f32,
    /// Logical window width below which the ship is drawn smaller.
    pub narrow_width_threshold: f32,
    pub narrow_ship_scale: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            latch_interval_secs: 5.0,
            narrow_width_threshold: 788.0,
            narrow_ship_scale: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub skybox: PathBuf,
    pub skybox_scale: f32,
    pub ship: PathBuf,
    /// Extra yaw of the ship model inside its container (radians).
    pub ship_model_yaw: f32,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            skybox: PathBuf::from("public/skybox/scene.gltf"),
            skybox_scale: 2000.0,
            ship: PathBuf::from("public/millennium_falcon/scene.gltf"),
            ship_model_yaw: std::f32::consts::PI,
        }
    }
}

impl DemoConfig {
    /// Load config from `path`. If the file is missing or invalid, returns default config.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match ron::from_str(&data) {
                Ok(c) => {
                    log::info!("Loaded config from {:?}", path);
                    return Self::validated(c);
                }
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {:?}, using defaults", path);
            }
            Err(e) => log::warn!("Could not read config at {:?}: {}, using defaults", path, e),
        }
        Self::default()
    }

    /// Clamp values that would break the flight or panel rules: smoothing
    /// factors outside 0..=1 overshoot, and a tiny latch interval spins.
    fn validated(mut self) -> Self {
        fn clamp_field(name: &str, value: &mut f32, min: f32, max: f32) {
            let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
            if clamped != *value {
                log::warn!("Config {} = {} out of range, using {}", name, value, clamped);
                *value = clamped;
            }
        }
        clamp_field("flight.smoothing", &mut self.flight.smoothing, 0.0, 1.0);
        clamp_field("camera.smoothing", &mut self.camera.smoothing, 0.0, 1.0);
        clamp_field(
            "ui.latch_interval_secs",
            &mut self.ui.latch_interval_secs,
            MIN_LATCH_INTERVAL_SECS,
            f32::MAX,
        );
        self
    }

    /// Write this config to `path` as pretty RON.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let s = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, s)?;
        Ok(())
    }

    pub fn flight_tuning(&self) -> FlightTuning {
        FlightTuning {
            rotation_speed: self.flight.rotation_speed,
            move_speed: self.flight.move_speed,
            lean_angle: self.flight.lean_angle,
            smoothing: self.flight.smoothing,
            turn_priority: self.flight.turn_priority,
            aim_forward_offset: self.spotlight.aim_forward_offset,
            aim_lateral_offset: self.spotlight.aim_lateral_offset,
        }
    }
}

/// `falcon.ron` in the current directory.
pub fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("falcon-config-{}-{}", std::process::id(), name))
    }

    #[test]
    fn save_then_load_keeps_values() {
        let path = temp_path("roundtrip.ron");
        let mut config = DemoConfig::default();
        config.flight.turn_priority = TurnPriority::RightFirst;
        config.ui.latch_interval_secs = 3.0;
        config.window.title = "Test".to_string();
        config.save(&path).unwrap();
        assert_eq!(DemoConfig::load(&path), config);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn partial_file_fills_defaults() {
        let path = temp_path("partial.ron");
        std::fs::write(&path, "(flight: (move_speed: 0.5), window: (width: 640))").unwrap();
        let config = DemoConfig::load(&path);
        assert_eq!(config.flight.move_speed, 0.5);
        assert_eq!(config.flight.rotation_speed, 0.02);
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.ui, UiConfig::default());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_or_invalid_file_gives_defaults() {
        assert_eq!(DemoConfig::load(&temp_path("does-not-exist.ron")), DemoConfig::default());

        let path = temp_path("invalid.ron");
        std::fs::write(&path, "(flight: oops").unwrap();
        assert_eq!(DemoConfig::load(&path), DemoConfig::default());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn out_of_range_values_are_clamped_on_load() {
        let path = temp_path("clamped.ron");
        std::fs::write(
            &path,
            "(flight: (smoothing: 1.5), camera: (smoothing: -0.2), ui: (latch_interval_secs: 0.0))",
        )
        .unwrap();
        let config = DemoConfig::load(&path);
        assert_eq!(config.flight.smoothing, 1.0);
        assert_eq!(config.camera.smoothing, 0.0);
        assert_eq!(config.ui.latch_interval_secs, MIN_LATCH_INTERVAL_SECS);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn tuning_pulls_aim_offsets_from_spotlight_section() {
        let mut config = DemoConfig::default();
        config.spotlight.aim_lateral_offset = 4.0;
        let tuning = config.flight_tuning();
        assert_eq!(tuning.aim_lateral_offset, 4.0);
        assert_eq!(tuning.aim_forward_offset, 3.0);
        assert_eq!(tuning.turn_priority, TurnPriority::LeftFirst);
    }
}
