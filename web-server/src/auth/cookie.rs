// web-server/src/auth/cookie.rs
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use chrono::Utc;

use common::Config;

// Cookie name for the verified provider token
pub const SESSION_COOKIE_NAME: &str = "wallet_session";
// Fallback lifetime in seconds (24 hours) when the token has no exp
const FALLBACK_MAX_AGE: i64 = 86400;

/// Cookie lifetime: the token's remaining validity, never negative.
pub fn session_max_age(exp: Option<i64>, now: i64) -> i64 {
    match exp {
        Some(exp) => (exp - now).max(0),
        None => FALLBACK_MAX_AGE,
    }
}

/// Build the session cookie carrying a verified token.
///
/// Attributes harden only in production: HttpOnly + Secure +
/// SameSite=Strict, scoped to the parent domain so subdomains share
/// the session. Development keeps the cookie inspectable.
pub fn session_cookie(token: &str, exp: Option<i64>, config: &Config) -> Cookie<'static> {
    let max_age = session_max_age(exp, Utc::now().timestamp());
    let production = config.is_production();

    let mut builder = Cookie::build(SESSION_COOKIE_NAME, token.to_owned())
        .path("/")
        .http_only(production)
        .secure(production)
        .same_site(if production {
            SameSite::Strict
        } else {
            SameSite::Lax
        })
        .max_age(CookieDuration::seconds(max_age));

    if production {
        if let Some(domain) = &config.auth.cookie_domain {
            builder = builder.domain(domain.clone());
        }
    }

    builder.finish()
}

/// Expired empty cookie: deletes the session unconditionally. No
/// verification happens on this path, so logout always succeeds.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME, "")
        .path("/")
        .max_age(CookieDuration::seconds(0))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production_config() -> Config {
        let mut config = Config::default();
        config.run_mode = "production".to_string();
        config.auth.cookie_domain = Some("example.com".to_string());
        config
    }

    #[test]
    fn max_age_is_remaining_token_validity() {
        assert_eq!(session_max_age(Some(1_000_060), 1_000_000), 60);
    }

    #[test]
    fn max_age_clamps_to_zero_for_past_expiry() {
        assert_eq!(session_max_age(Some(999_000), 1_000_000), 0);
    }

    #[test]
    fn max_age_falls_back_without_exp() {
        assert_eq!(session_max_age(None, 1_000_000), FALLBACK_MAX_AGE);
    }

    #[test]
    fn production_cookie_is_hardened() {
        let exp = Utc::now().timestamp() + 3600;
        let cookie = session_cookie("tok", Some(exp), &production_config());

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn development_cookie_stays_inspectable() {
        let exp = Utc::now().timestamp() + 3600;
        let cookie = session_cookie("tok", Some(exp), &Config::default());

        assert_eq!(cookie.http_only(), Some(false));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.domain(), None);
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(0)));
    }
}
