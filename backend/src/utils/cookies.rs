//! Auth cookie construction and parsing.
//!
//! Both tokens travel as HttpOnly SameSite=Lax cookies; the refresh cookie
//! is scoped to the auth endpoints so it is only sent where it is needed.

pub const ACCESS_COOKIE_NAME: &str = "access_token";
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";
pub const ACCESS_COOKIE_PATH: &str = "/";
pub const REFRESH_COOKIE_PATH: &str = "/api/auth";

pub fn build_auth_cookie(
    name: &str,
    value: &str,
    path: &str,
    max_age_secs: u64,
    secure: bool,
) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite=Lax",
        name, value, path, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// A cookie with Max-Age=0 that instructs the browser to drop the token.
pub fn build_clear_cookie(name: &str, path: &str, secure: bool) -> String {
    build_auth_cookie(name, "", path, 0, secure)
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key.trim() == name {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_auth_cookie_includes_security_attributes() {
        let cookie = build_auth_cookie(ACCESS_COOKIE_NAME, "abc", "/", 900, true);
        assert!(cookie.contains("access_token=abc"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=900"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
    }

    #[test]
    fn build_clear_cookie_sets_max_age_zero() {
        let cookie = build_clear_cookie(REFRESH_COOKIE_NAME, REFRESH_COOKIE_PATH, false);
        assert!(cookie.starts_with("refresh_token="));
        assert!(cookie.contains("Path=/api/auth"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn extract_cookie_value_finds_matching_name() {
        let header = "a=1; access_token=token-value; b=2";
        assert_eq!(
            extract_cookie_value(header, "access_token").as_deref(),
            Some("token-value")
        );
        assert!(extract_cookie_value(header, "missing").is_none());
    }
}
