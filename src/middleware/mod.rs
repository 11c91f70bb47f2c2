pub mod session;

pub use session::{BrowserSession, CookiePolicy, SESSION_COOKIE};
