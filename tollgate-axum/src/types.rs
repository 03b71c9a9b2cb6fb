use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tollgate::{AccountProfile, ClientInfo};

pub const DEFAULT_COOKIE_NAME: &str = "auth-token";

/// Payload of a successful `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginPayload {
    pub user: AccountProfile,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl From<ConnectionInfo> for ClientInfo {
    fn from(info: ConnectionInfo) -> Self {
        ClientInfo::new(info.ip, info.user_agent)
    }
}

/// How the client address is derived from a request.
///
/// `X-Forwarded-For` can be set by anyone, so it is only honoured when the
/// service runs behind a proxy that overwrites it.
#[derive(Debug, Clone, Default)]
pub struct ConnectionConfig {
    pub trust_proxy_headers: bool,
}

/// Settings for the auth cookie. The cookie is always `HttpOnly`.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub same_site: CookieSameSite,
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIE_NAME)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CookieSameSite {
    #[default]
    Strict,
    Lax,
    None,
}

impl From<CookieSameSite> for SameSite {
    fn from(value: CookieSameSite) -> Self {
        match value {
            CookieSameSite::Strict => SameSite::Strict,
            CookieSameSite::Lax => SameSite::Lax,
            CookieSameSite::None => SameSite::None,
        }
    }
}

impl CookieConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secure: true,
            same_site: CookieSameSite::Strict,
            path: "/".to_string(),
        }
    }

    /// Same as the default but without `Secure`, for plain-HTTP local setups.
    pub fn development() -> Self {
        Self {
            secure: false,
            ..Self::default()
        }
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_same_site(mut self, same_site: CookieSameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// `Set-Cookie` value carrying `token` for `max_age_secs` seconds.
    pub fn session_cookie(&self, token: &str, max_age_secs: i64) -> String {
        let cookie = Cookie::build((self.name.clone(), token.to_string()))
            .path(self.path.clone())
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site.into());

        format!("{cookie}; Max-Age={}", max_age_secs.max(0))
    }

    /// `Set-Cookie` value that makes the browser drop the cookie.
    pub fn removal_cookie(&self) -> String {
        self.session_cookie("", 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_flags() {
        let cookie = CookieConfig::default().session_cookie("abc", 10800);
        assert!(cookie.starts_with("auth-token=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.ends_with("Max-Age=10800"));
    }

    #[test]
    fn test_development_cookie_is_not_secure() {
        let cookie = CookieConfig::development().session_cookie("abc", 60);
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = CookieConfig::new("sid")
            .with_same_site(CookieSameSite::Lax)
            .removal_cookie();
        assert!(cookie.starts_with("sid=;"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.ends_with("Max-Age=0"));
    }
}
