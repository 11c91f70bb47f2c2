use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;
use axum_extra::extract::cookie::PrivateCookieJar;
use serde_json::{Value, json};
use tracing::info;

use crate::middleware::BrowserSession;
use crate::session::{USER_SESSION_KEY, UserIdentity};
use crate::{TxirimiriError, router::TxirimiriState};

/// POST /api/save-user-session/ -> remember the signed-in CloudKit user for this browser.
pub async fn save_user_session(
    State(state): State<TxirimiriState>,
    session: BrowserSession,
    WithRejection(Json(user), _): WithRejection<Json<UserIdentity>, TxirimiriError>,
) -> Result<(PrivateCookieJar, Json<Value>), TxirimiriError> {
    if user.user_record_name.trim().is_empty() {
        return Err(TxirimiriError::bad_request("userRecordName must not be empty"));
    }
    let (jar, id) = session.establish();
    state.sessions.put(&id, USER_SESSION_KEY, &user).await?;

    info!(user_record_name = %user.user_record_name, "User session saved");
    Ok((jar, Json(json!({ "ok": true }))))
}

/// POST /api/clear-user-session/
pub async fn clear_user_session(
    State(state): State<TxirimiriState>,
    session: BrowserSession,
) -> Result<(PrivateCookieJar, Json<Value>), TxirimiriError> {
    if let Some(id) = session.id() {
        state.sessions.remove(id, USER_SESSION_KEY).await?;
        info!("User session cleared");
    }
    Ok((session.into_jar(), Json(json!({ "ok": true }))))
}

/// GET /api/get-user-session/ -> `{"user": {...}}` or `{"user": null}`.
pub async fn get_user_session(
    State(state): State<TxirimiriState>,
    session: BrowserSession,
) -> Result<Json<Value>, TxirimiriError> {
    let user: Option<UserIdentity> = match session.id() {
        Some(id) => state.sessions.get(id, USER_SESSION_KEY).await?,
        None => None,
    };
    Ok(Json(json!({ "user": user })))
}
