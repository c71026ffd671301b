//! The auth cookie contract.
//!
//! Both cookies are http-only and scoped to `/`. Their lifetimes match the
//! token expiries. Clearing sends an empty value with `Max-Age=0`.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use folio_auth::TokenPair;
use folio_core::config::{AppConfig, SameSitePolicy};

/// Builds and reads the access and refresh cookies.
#[derive(Debug, Clone)]
pub struct AuthCookies {
    access_name: String,
    refresh_name: String,
    access_max_age: Duration,
    refresh_max_age: Duration,
    secure: bool,
    same_site: SameSite,
}

impl AuthCookies {
    /// Cookie settings from configuration. Production always sets `Secure`.
    pub fn from_config(config: &AppConfig) -> Self {
        let cookies = &config.auth.cookies;
        Self {
            access_name: cookies.access_name.clone(),
            refresh_name: cookies.refresh_name.clone(),
            access_max_age: Duration::seconds(config.auth.access_ttl_seconds as i64),
            refresh_max_age: Duration::seconds(config.auth.refresh_ttl_seconds as i64),
            secure: cookies.secure || config.is_production(),
            same_site: match cookies.same_site {
                SameSitePolicy::Strict => SameSite::Strict,
                SameSitePolicy::Lax => SameSite::Lax,
            },
        }
    }

    fn build(&self, name: &str, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((name.to_string(), value))
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .path("/")
            .max_age(max_age)
            .build()
    }

    /// Adds both token cookies to `jar`.
    pub fn issue(&self, jar: CookieJar, tokens: &TokenPair) -> CookieJar {
        jar.add(self.build(
            &self.access_name,
            tokens.access.token.clone(),
            self.access_max_age,
        ))
        .add(self.build(
            &self.refresh_name,
            tokens.refresh.token.clone(),
            self.refresh_max_age,
        ))
    }

    /// Expires both token cookies.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.build(&self.access_name, String::new(), Duration::ZERO))
            .add(self.build(&self.refresh_name, String::new(), Duration::ZERO))
    }

    /// Access token from the request cookies.
    pub fn access_token<'a>(&self, jar: &'a CookieJar) -> Option<&'a str> {
        jar.get(&self.access_name)
            .map(|c| c.value())
            .filter(|v| !v.is_empty())
    }

    /// Refresh token from the request cookies.
    pub fn refresh_token<'a>(&self, jar: &'a CookieJar) -> Option<&'a str> {
        jar.get(&self.refresh_name)
            .map(|c| c.value())
            .filter(|v| !v.is_empty())
    }
}
