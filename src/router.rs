use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{BasicConfig, Config};
use crate::db::ViewerStorage;
use crate::handlers::{catalog, cloudkit, pages, screenshots, session};
use crate::middleware::CookiePolicy;
use crate::session::SessionStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct TxirimiriState {
    pub storage: ViewerStorage,
    pub sessions: SessionStore,
    pub cloudkit_token: Arc<str>,
    pub cookie_policy: CookiePolicy,
    cookie_key: Key,
}

impl TxirimiriState {
    pub fn new(storage: ViewerStorage, sessions: SessionStore, cfg: &Config) -> Self {
        let cookie_policy = CookiePolicy {
            ttl: sessions.ttl(),
            secure: !cfg.basic.insecure_cookie,
        };
        Self {
            storage,
            sessions,
            cloudkit_token: Arc::from(cfg.cloudkit.api_token.as_str()),
            cookie_policy,
            cookie_key: cfg.cookie_key(),
        }
    }
}

impl FromRef<TxirimiriState> for Key {
    fn from_ref(state: &TxirimiriState) -> Self {
        state.cookie_key.clone()
    }
}

pub fn txirimiri_router(state: TxirimiriState, basic: &BasicConfig) -> Router {
    let api = Router::new()
        .route("/api/cloudkit-token/", post(cloudkit::cloudkit_token))
        .route("/api/screenshots/", get(screenshots::list_screenshots))
        .route("/api/screenshots/save/", post(screenshots::save_screenshot))
        .route(
            "/api/screenshots/{id}/delete/",
            post(screenshots::delete_screenshot),
        )
        .route("/api/save-user-session/", post(session::save_user_session))
        .route("/api/clear-user-session/", post(session::clear_user_session))
        .route("/api/get-user-session/", get(session::get_user_session))
        .route("/api/models/", get(catalog::list_models))
        .route("/api/models/save/", post(catalog::save_model3d))
        .route(
            "/api/models/{record_name}/delete/",
            post(catalog::delete_model3d),
        )
        .route("/api/skyboxes/", get(catalog::list_skyboxes))
        .route("/api/skyboxes/save/", post(catalog::save_skybox))
        .route(
            "/api/skyboxes/{record_name}/delete/",
            post(catalog::delete_skybox),
        );

    let mut router = Router::new()
        .route("/", get(pages::index))
        .route(
            "/authentication",
            get(pages::authentication).post(pages::authentication),
        )
        .merge(api);

    match basic.static_dir.as_ref() {
        Some(dir) if dir.is_dir() => {
            info!(path = %dir.display(), "serving static files under /static");
            router = router.nest_service("/static", ServeDir::new(dir));
        }
        Some(dir) => warn!(path = %dir.display(), "static_dir not found; /static disabled"),
        None => {}
    }

    router
        .layer(DefaultBodyLimit::max(basic.body_limit_bytes()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
