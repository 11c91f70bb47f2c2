use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Camera and model placement captured with a screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct ScreenshotTransform {
    pub model_scale: f64,
    pub yaw_angle: f64,
    pub camera_position_x: f64,
    pub camera_position_y: f64,
    pub camera_position_z: f64,
    pub camera_target_x: f64,
    pub camera_target_y: f64,
    pub camera_target_z: f64,
}

impl Default for ScreenshotTransform {
    fn default() -> Self {
        Self {
            model_scale: 1.0,
            yaw_angle: 0.0,
            camera_position_x: 0.0,
            camera_position_y: 0.0,
            camera_position_z: 0.0,
            camera_target_x: 0.0,
            camera_target_y: 0.0,
            camera_target_z: 0.0,
        }
    }
}

/// Screenshot row joined with the record name of its skybox, if any.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbScreenshot {
    pub id: i64,
    pub skybox_record_name: Option<String>,
    #[sqlx(flatten)]
    pub transform: ScreenshotTransform,
    pub image: Vec<u8>,
}

/// Reference to a catalog row by natural key, with the display name to use
/// if the row has to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRef {
    pub record_name: String,
    pub name: Option<String>,
}

impl RecordRef {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.record_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewScreenshot {
    pub model3d: RecordRef,
    pub skybox: Option<RecordRef>,
    pub transform: ScreenshotTransform,
    pub image: Vec<u8>,
}

/// Outcome of a get-or-create by record name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub id: i64,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewModel3D {
    pub record_name: String,
    pub name: String,
    pub description: String,
    pub extension: String,
    pub alt_extension: String,
    pub thumbnail: Option<Vec<u8>>,
    pub model: Option<Vec<u8>>,
    pub alt_model: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewSkybox {
    pub record_name: String,
    pub name: String,
    pub extension: String,
    pub height: Option<f64>,
    pub exposure: Option<f64>,
    pub shadow_intensity: Option<f64>,
    pub shadow_softness: Option<f64>,
    pub image: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct DbModel3DSummary {
    pub id: i64,
    pub record_name: String,
    pub name: String,
    pub description: String,
    pub extension: String,
    pub alt_extension: String,
    pub has_thumbnail: bool,
    pub has_model: bool,
    pub has_alt_model: bool,
    pub screenshot_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct DbSkyboxSummary {
    pub id: i64,
    pub record_name: String,
    pub name: String,
    pub extension: String,
    pub height: Option<f64>,
    pub exposure: Option<f64>,
    pub shadow_intensity: Option<f64>,
    pub shadow_softness: Option<f64>,
    pub has_image: bool,
    pub screenshot_count: i64,
}
