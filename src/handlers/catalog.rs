//! JSON management of the Model3D and Skybox catalog.

use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use serde_json::{Value, json};
use tracing::info;

use crate::types::catalog::{ModelList, SaveModel3DRequest, SaveSkyboxRequest, SkyboxList};
use crate::types::screenshot::CreatedResponse;
use crate::{TxirimiriError, router::TxirimiriState};

/// GET /api/models/
pub async fn list_models(
    State(state): State<TxirimiriState>,
) -> Result<Json<ModelList>, TxirimiriError> {
    let models = state.storage.list_models().await?;
    Ok(Json(ModelList { models }))
}

/// POST /api/models/save/ -> upsert by record name.
pub async fn save_model3d(
    State(state): State<TxirimiriState>,
    WithRejection(Json(body), _): WithRejection<Json<SaveModel3DRequest>, TxirimiriError>,
) -> Result<Json<CreatedResponse>, TxirimiriError> {
    let model = body.into_new_model()?;
    let record_name = model.record_name.clone();
    let id = state.storage.upsert_model3d(model).await?;
    info!(model3d_id = id, record_name = %record_name, "Model3D saved");
    Ok(Json(CreatedResponse { id }))
}

/// POST /api/models/{record_name}/delete/ -> also removes the model's screenshots.
pub async fn delete_model3d(
    State(state): State<TxirimiriState>,
    WithRejection(Path(record_name), _): WithRejection<Path<String>, TxirimiriError>,
) -> Result<Json<Value>, TxirimiriError> {
    if !state.storage.delete_model3d(&record_name).await? {
        return Err(TxirimiriError::NotFound { entity: "Model3D" });
    }
    info!(record_name = %record_name, "Model3D deleted");
    Ok(Json(json!({ "ok": true })))
}

/// GET /api/skyboxes/
pub async fn list_skyboxes(
    State(state): State<TxirimiriState>,
) -> Result<Json<SkyboxList>, TxirimiriError> {
    let skyboxes = state.storage.list_skyboxes().await?;
    Ok(Json(SkyboxList { skyboxes }))
}

/// POST /api/skyboxes/save/ -> upsert by record name.
pub async fn save_skybox(
    State(state): State<TxirimiriState>,
    WithRejection(Json(body), _): WithRejection<Json<SaveSkyboxRequest>, TxirimiriError>,
) -> Result<Json<CreatedResponse>, TxirimiriError> {
    let skybox = body.into_new_skybox()?;
    let record_name = skybox.record_name.clone();
    let id = state.storage.upsert_skybox(skybox).await?;
    info!(skybox_id = id, record_name = %record_name, "Skybox saved");
    Ok(Json(CreatedResponse { id }))
}

/// POST /api/skyboxes/{record_name}/delete/ -> screenshots keep living without a skybox.
pub async fn delete_skybox(
    State(state): State<TxirimiriState>,
    WithRejection(Path(record_name), _): WithRejection<Path<String>, TxirimiriError>,
) -> Result<Json<Value>, TxirimiriError> {
    if !state.storage.delete_skybox(&record_name).await? {
        return Err(TxirimiriError::NotFound { entity: "Skybox" });
    }
    info!(record_name = %record_name, "Skybox deleted");
    Ok(Json(json!({ "ok": true })))
}
