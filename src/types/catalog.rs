use serde::{Deserialize, Serialize};

use crate::db::models::{DbModel3DSummary, DbSkyboxSummary, NewModel3D, NewSkybox};
use crate::error::TxirimiriError;
use crate::types::encoding::decode_optional_base64_field;

fn required_record_name(raw: &str) -> Result<String, TxirimiriError> {
    let record_name = raw.trim();
    if record_name.is_empty() {
        return Err(TxirimiriError::bad_request("record_name must not be empty"));
    }
    Ok(record_name.to_string())
}

fn name_or_record(name: Option<String>, record_name: &str) -> String {
    name.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| record_name.to_string())
}

#[derive(Debug, Deserialize)]
pub struct SaveModel3DRequest {
    pub record_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub alt_extension: String,
    #[serde(default)]
    pub thumbnail_base64: Option<String>,
    #[serde(default)]
    pub model_base64: Option<String>,
    #[serde(default)]
    pub alt_model_base64: Option<String>,
}

impl SaveModel3DRequest {
    pub fn into_new_model(self) -> Result<NewModel3D, TxirimiriError> {
        let record_name = required_record_name(&self.record_name)?;
        Ok(NewModel3D {
            name: name_or_record(self.name, &record_name),
            description: self.description,
            extension: self.extension,
            alt_extension: self.alt_extension,
            thumbnail: decode_optional_base64_field(
                "thumbnail_base64",
                self.thumbnail_base64.as_deref(),
            )?,
            model: decode_optional_base64_field("model_base64", self.model_base64.as_deref())?,
            alt_model: decode_optional_base64_field(
                "alt_model_base64",
                self.alt_model_base64.as_deref(),
            )?,
            record_name,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveSkyboxRequest {
    pub record_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub exposure: Option<f64>,
    #[serde(default)]
    pub shadow_intensity: Option<f64>,
    #[serde(default)]
    pub shadow_softness: Option<f64>,
    #[serde(default)]
    pub image_base64: Option<String>,
}

impl SaveSkyboxRequest {
    pub fn into_new_skybox(self) -> Result<NewSkybox, TxirimiriError> {
        let record_name = required_record_name(&self.record_name)?;
        Ok(NewSkybox {
            name: name_or_record(self.name, &record_name),
            extension: self.extension,
            height: self.height,
            exposure: self.exposure,
            shadow_intensity: self.shadow_intensity,
            shadow_softness: self.shadow_softness,
            image: decode_optional_base64_field("image_base64", self.image_base64.as_deref())?,
            record_name,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ModelList {
    pub models: Vec<DbModel3DSummary>,
}

#[derive(Debug, Serialize)]
pub struct SkyboxList {
    pub skyboxes: Vec<DbSkyboxSummary>,
}
