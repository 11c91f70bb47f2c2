use serde::{Deserialize, Serialize};

use crate::db::{DbScreenshot, NewScreenshot, RecordRef, ScreenshotTransform};
use crate::error::TxirimiriError;
use crate::types::encoding::{decode_base64_field, encode_base64};

/// Body of `POST /api/screenshots/save/`.
///
/// The viewer sends empty strings for the skybox fields when no skybox is
/// active; those are treated as absent. Missing transform fields take the
/// column defaults.
#[derive(Debug, Deserialize)]
pub struct SaveScreenshotRequest {
    pub model3d_record_name: String,
    #[serde(default)]
    pub model3d_name: Option<String>,
    #[serde(default)]
    pub skybox_record_name: Option<String>,
    #[serde(default)]
    pub skybox_name: Option<String>,
    #[serde(flatten)]
    pub transform: ScreenshotTransform,
    pub image_base64: String,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl SaveScreenshotRequest {
    pub fn into_new_screenshot(self) -> Result<NewScreenshot, TxirimiriError> {
        let record_name = self.model3d_record_name.trim();
        if record_name.is_empty() {
            return Err(TxirimiriError::bad_request(
                "model3d_record_name must not be empty",
            ));
        }
        let model3d = RecordRef {
            record_name: record_name.to_string(),
            name: non_blank(self.model3d_name),
        };
        let skybox = non_blank(self.skybox_record_name).map(|record_name| RecordRef {
            record_name,
            name: non_blank(self.skybox_name),
        });
        let image = decode_base64_field("image_base64", &self.image_base64)?;

        Ok(NewScreenshot {
            model3d,
            skybox,
            transform: self.transform,
            image,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ScreenshotListQuery {
    pub model3d_record_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotView {
    pub id: i64,
    pub skybox_record_name: Option<String>,
    #[serde(flatten)]
    pub transform: ScreenshotTransform,
    pub image_base64: String,
}

impl From<DbScreenshot> for ScreenshotView {
    fn from(row: DbScreenshot) -> Self {
        Self {
            id: row.id,
            skybox_record_name: row.skybox_record_name,
            transform: row.transform,
            image_base64: encode_base64(&row.image),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScreenshotList {
    pub screenshots: Vec<ScreenshotView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}
