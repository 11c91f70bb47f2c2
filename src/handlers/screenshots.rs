use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use serde_json::{Value, json};
use tracing::info;

use crate::types::screenshot::{
    CreatedResponse, SaveScreenshotRequest, ScreenshotList, ScreenshotListQuery, ScreenshotView,
};
use crate::{TxirimiriError, router::TxirimiriState};

/// POST /api/screenshots/save/ -> persists a capture, creating its model/skybox on first use.
pub async fn save_screenshot(
    State(state): State<TxirimiriState>,
    WithRejection(Json(body), _): WithRejection<Json<SaveScreenshotRequest>, TxirimiriError>,
) -> Result<Json<CreatedResponse>, TxirimiriError> {
    let new = body.into_new_screenshot()?;
    let saved = state.storage.save_screenshot(&new).await?;

    info!(
        screenshot_id = saved.id,
        model3d = %new.model3d.record_name,
        model3d_created = saved.model3d.created,
        skybox = new.skybox.as_ref().map(|s| s.record_name.as_str()).unwrap_or("<none>"),
        image_bytes = new.image.len(),
        "Screenshot saved"
    );
    Ok(Json(CreatedResponse { id: saved.id }))
}

/// GET /api/screenshots/?model3d_record_name=... -> empty list for unknown models.
pub async fn list_screenshots(
    State(state): State<TxirimiriState>,
    WithRejection(Query(query), _): WithRejection<Query<ScreenshotListQuery>, TxirimiriError>,
) -> Result<Json<ScreenshotList>, TxirimiriError> {
    let rows = state
        .storage
        .list_screenshots(&query.model3d_record_name)
        .await?;
    let screenshots = rows.into_iter().map(ScreenshotView::from).collect();
    Ok(Json(ScreenshotList { screenshots }))
}

/// POST /api/screenshots/{id}/delete/
pub async fn delete_screenshot(
    State(state): State<TxirimiriState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, TxirimiriError>,
) -> Result<Json<Value>, TxirimiriError> {
    if !state.storage.delete_screenshot(id).await? {
        return Err(TxirimiriError::NotFound {
            entity: "Screenshot",
        });
    }
    info!(screenshot_id = id, "Screenshot deleted");
    Ok(Json(json!({ "ok": true })))
}
