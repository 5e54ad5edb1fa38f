use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "WindowConfig::default_title")]
    pub title: String,
    #[serde(default = "WindowConfig::default_width")]
    pub width: u32,
    #[serde(default = "WindowConfig::default_height")]
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    #[serde(default = "GridConfig::default_cell_width")]
    pub cell_width: u32,
    #[serde(default = "GridConfig::default_cell_height")]
    pub cell_height: u32,
    #[serde(default = "GridConfig::default_cell_depth")]
    pub cell_depth: u32,
    #[serde(default = "GridConfig::default_depth_layers")]
    pub depth_layers: u32,
    #[serde(default = "GridConfig::default_label_offset_x")]
    pub label_offset_x: u32,
    #[serde(default = "GridConfig::default_label_offset_y")]
    pub label_offset_y: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "CameraConfig::default_zoom_min")]
    pub zoom_min: f32,
    #[serde(default = "CameraConfig::default_zoom_max")]
    pub zoom_max: f32,
    #[serde(default = "CameraConfig::default_perspective_fov")]
    pub perspective_fov_degrees: f32,
    #[serde(default = "CameraConfig::default_extreme_fov")]
    pub extreme_fov_degrees: f32,
    #[serde(default = "CameraConfig::default_rotate_sensitivity")]
    pub rotate_sensitivity: f32,
    #[serde(default = "CameraConfig::default_wheel_zoom_step")]
    pub wheel_zoom_step: f32,
    #[serde(default = "CameraConfig::default_eye_separation")]
    pub eye_separation: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuantumConfig {
    #[serde(default = "QuantumConfig::default_tick_interval")]
    pub tick_interval_frames: u64,
    #[serde(default = "QuantumConfig::default_amplitude")]
    pub amplitude: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HyperConfig {
    #[serde(default = "HyperConfig::default_phase_step")]
    pub phase_step: f32,
    #[serde(default = "HyperConfig::default_distortion")]
    pub distortion: f32,
    #[serde(default = "HyperConfig::default_projection_distance")]
    pub projection_distance: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "StorageConfig::default_directory")]
    pub directory: PathBuf,
    #[serde(default = "StorageConfig::default_autosave_name")]
    pub autosave_name: String,
    #[serde(default)]
    pub autoload: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub quantum: QuantumConfig,
    #[serde(default)]
    pub hyper: HyperConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Action name -> key strings; merged over the default bindings.
    #[serde(default)]
    pub bindings: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct AppConfigOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub depth_layers: Option<u32>,
    pub storage_dir: Option<PathBuf>,
    pub autoload: Option<bool>,
}

impl WindowConfig {
    fn default_title() -> String {
        "Cubesheet".to_string()
    }

    const fn default_width() -> u32 {
        1280
    }

    const fn default_height() -> u32 {
        720
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { title: Self::default_title(), width: Self::default_width(), height: Self::default_height() }
    }
}

impl GridConfig {
    const fn default_cell_width() -> u32 {
        100
    }

    const fn default_cell_height() -> u32 {
        40
    }

    const fn default_cell_depth() -> u32 {
        40
    }

    const fn default_depth_layers() -> u32 {
        5
    }

    const fn default_label_offset_x() -> u32 {
        60
    }

    const fn default_label_offset_y() -> u32 {
        40
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_width: Self::default_cell_width(),
            cell_height: Self::default_cell_height(),
            cell_depth: Self::default_cell_depth(),
            depth_layers: Self::default_depth_layers(),
            label_offset_x: Self::default_label_offset_x(),
            label_offset_y: Self::default_label_offset_y(),
        }
    }
}

impl CameraConfig {
    const fn default_zoom_min() -> f32 {
        0.1
    }

    const fn default_zoom_max() -> f32 {
        5.0
    }

    const fn default_perspective_fov() -> f32 {
        45.0
    }

    const fn default_extreme_fov() -> f32 {
        120.0
    }

    const fn default_rotate_sensitivity() -> f32 {
        0.01
    }

    const fn default_wheel_zoom_step() -> f32 {
        0.1
    }

    const fn default_eye_separation() -> f32 {
        6.0
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom_min: Self::default_zoom_min(),
            zoom_max: Self::default_zoom_max(),
            perspective_fov_degrees: Self::default_perspective_fov(),
            extreme_fov_degrees: Self::default_extreme_fov(),
            rotate_sensitivity: Self::default_rotate_sensitivity(),
            wheel_zoom_step: Self::default_wheel_zoom_step(),
            eye_separation: Self::default_eye_separation(),
        }
    }
}

impl QuantumConfig {
    const fn default_tick_interval() -> u64 {
        10
    }

    const fn default_amplitude() -> f64 {
        0.1
    }
}

impl Default for QuantumConfig {
    fn default() -> Self {
        Self { tick_interval_frames: Self::default_tick_interval(), amplitude: Self::default_amplitude(), seed: None }
    }
}

impl HyperConfig {
    const fn default_phase_step() -> f32 {
        0.01
    }

    const fn default_distortion() -> f32 {
        0.35
    }

    const fn default_projection_distance() -> f32 {
        4.0
    }
}

impl Default for HyperConfig {
    fn default() -> Self {
        Self {
            phase_step: Self::default_phase_step(),
            distortion: Self::default_distortion(),
            projection_distance: Self::default_projection_distance(),
        }
    }
}

impl StorageConfig {
    fn default_directory() -> PathBuf {
        PathBuf::from("saves")
    }

    fn default_autosave_name() -> String {
        "autosave".to_string()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
            autosave_name: Self::default_autosave_name(),
            autoload: false,
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &AppConfigOverrides) {
        if let Some(width) = overrides.width {
            self.window.width = width;
        }
        if let Some(height) = overrides.height {
            self.window.height = height;
        }
        if let Some(depth) = overrides.depth_layers {
            self.grid.depth_layers = depth;
        }
        if let Some(dir) = &overrides.storage_dir {
            self.storage.directory = dir.clone();
        }
        if let Some(autoload) = overrides.autoload {
            self.storage.autoload = autoload;
        }
    }
}

impl AppConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.width.is_none()
            && self.height.is_none()
            && self.depth_layers.is_none()
            && self.storage_dir.is_none()
            && self.autoload.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.width.is_some() {
            fields.push("width");
        }
        if self.height.is_some() {
            fields.push("height");
        }
        if self.depth_layers.is_some() {
            fields.push("depth");
        }
        if self.storage_dir.is_some() {
            fields.push("storage-dir");
        }
        if self.autoload.is_some() {
            fields.push("autoload");
        }
        fields
    }
}
