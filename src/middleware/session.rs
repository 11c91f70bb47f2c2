use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use std::convert::Infallible;
use std::time::Duration;

use crate::router::TxirimiriState;
use crate::session::SessionId;

/// Name of the encrypted cookie carrying the session id.
pub const SESSION_COOKIE: &str = "txirimiri_sessionid";

#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub ttl: Duration,
    pub secure: bool,
}

/// The browser's session, as read from the private cookie jar.
/// A missing, undecryptable or malformed cookie means no session yet.
pub struct BrowserSession {
    jar: PrivateCookieJar,
    id: Option<SessionId>,
    policy: CookiePolicy,
}

impl BrowserSession {
    pub fn id(&self) -> Option<&SessionId> {
        self.id.as_ref()
    }

    pub fn into_jar(self) -> PrivateCookieJar {
        self.jar
    }

    /// Return the session id, minting one if needed, with the cookie (re)issued
    /// so its max-age tracks the server-side TTL.
    pub fn establish(self) -> (PrivateCookieJar, SessionId) {
        let id = self.id.unwrap_or_else(SessionId::generate);
        let jar = self.jar.add(build_cookie(&id, self.policy));
        (jar, id)
    }
}

impl FromRequestParts<TxirimiriState> for BrowserSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &TxirimiriState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_request_parts(parts, state).await?;
        let id = jar
            .get(SESSION_COOKIE)
            .and_then(|c| SessionId::parse(c.value()));
        Ok(Self {
            jar,
            id,
            policy: state.cookie_policy,
        })
    }
}

fn build_cookie(id: &SessionId, policy: CookiePolicy) -> Cookie<'static> {
    let max_age = i64::try_from(policy.ttl.as_secs()).unwrap_or(i64::MAX);
    Cookie::build(Cookie::new(SESSION_COOKIE, id.as_str().to_owned()))
        .path("/")
        .http_only(true)
        .secure(policy.secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age))
        .build()
}
