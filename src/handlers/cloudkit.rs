use axum::{Json, extract::State};
use serde::Serialize;

use crate::router::TxirimiriState;

#[derive(Debug, Serialize)]
pub struct CloudKitTokenResponse {
    pub api_token: String,
}

/// POST /api/cloudkit-token/ -> the CloudKit JS API token the server was started with.
pub async fn cloudkit_token(State(state): State<TxirimiriState>) -> Json<CloudKitTokenResponse> {
    Json(CloudKitTokenResponse {
        api_token: state.cloudkit_token.to_string(),
    })
}
