use actix_web::cookie::{
    time::{Duration, OffsetDateTime},
    Cookie, SameSite,
};

/// Name of the cookie carrying the session token.
pub const AUTH_COOKIE: &str = "auth_token";

/// Name of the cookie carrying the CSRF token.
pub const CSRF_COOKIE: &str = "_csrf";

/// Lifetime of the CSRF cookie.
pub const CSRF_TTL_HOURS: i64 = 24;

/// Attributes shared by the session, CSRF and removal cookies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSettings {
    /// `Domain` attribute; omitted when `None`.
    pub domain: Option<String>,
    /// Adds the `Secure` attribute.
    pub secure: bool,
}

impl CookieSettings {
    /// Cookie holding `token`, valid for `ttl_seconds` from now.
    pub fn session(&self, token: String, ttl_seconds: i64) -> Cookie<'static> {
        self.build(
            AUTH_COOKIE,
            token,
            OffsetDateTime::now_utc() + Duration::seconds(ttl_seconds),
        )
    }

    /// Empty cookie that expired an hour ago, so the browser drops the session.
    pub fn cleared(&self) -> Cookie<'static> {
        self.build(
            AUTH_COOKIE,
            String::new(),
            OffsetDateTime::now_utc() - Duration::hours(1),
        )
    }

    /// Cookie half of the double-submit CSRF pair.
    pub fn csrf(&self, token: String) -> Cookie<'static> {
        self.build(
            CSRF_COOKIE,
            token,
            OffsetDateTime::now_utc() + Duration::hours(CSRF_TTL_HOURS),
        )
    }

    fn build(&self, name: &'static str, value: String, expires: OffsetDateTime) -> Cookie<'static> {
        let mut builder = Cookie::build(name, value)
            .path("/")
            .http_only(true)
            .same_site(SameSite::None)
            .secure(self.secure)
            .expires(expires);
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        builder.finish()
    }
}
