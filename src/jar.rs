//! Origin-scoped cookie jar plus the HTTP cookie codec.
//! The jar is shared by every tab of the origin; expired entries are purged
//! on read. A jar can be constructed disabled to model blocked cookie
//! access, in which case every operation reports `StorageError::Unavailable`
//! and callers pick their own fallback.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

const EXPIRED_STAMP: &str = "Thu, 01 Jan 1970 00:00:00 GMT";
const HTTP_DATE_FMT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
        }
    }
}

/// Attributes applied when writing a cookie.
#[derive(Debug, Clone)]
pub struct CookieAttributes {
    pub days: i64,
    pub path: String,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self {
            days: crate::config::DEFAULT_COOKIE_DAYS,
            path: crate::config::DEFAULT_COOKIE_PATH.to_string(),
            secure: true,
            same_site: SameSite::Strict,
        }
    }
}

impl CookieAttributes {
    pub fn for_config(cfg: &crate::config::SessionConfig) -> Self {
        Self {
            days: cfg.cookie_days,
            path: cfg.cookie_path.clone(),
            secure: cfg.secure_cookies,
            same_site: SameSite::Strict,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredCookie {
    /// URL-encoded value, as it would sit in the jar on the wire.
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

/// In-memory cookie jar. Clone-able handle over shared state.
#[derive(Clone)]
pub struct CookieJar {
    inner: Arc<RwLock<HashMap<String, StoredCookie>>>,
    enabled: bool,
}

impl Default for CookieJar {
    fn default() -> Self { Self::new() }
}

impl CookieJar {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())), enabled: true }
    }

    /// Jar that refuses every operation, modelling blocked cookie access.
    pub fn disabled() -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())), enabled: false }
    }

    fn check_access(&self) -> StorageResult<()> {
        if self.enabled { Ok(()) } else { Err(StorageError::unavailable("cookie access is blocked")) }
    }

    pub fn set(&self, name: &str, value: &str, attrs: &CookieAttributes) -> StorageResult<()> {
        self.check_access()?;
        let entry = StoredCookie {
            value: urlencoding::encode(value).into_owned(),
            expires_at: Some(Utc::now() + Duration::days(attrs.days)),
        };
        self.inner.write().insert(name.to_string(), entry);
        Ok(())
    }

    /// Read a cookie. Expired entries are removed and read as absent.
    pub fn get(&self, name: &str) -> StorageResult<Option<String>> {
        self.check_access()?;
        let expired = {
            let map = self.inner.read();
            match map.get(name) {
                None => return Ok(None),
                Some(c) => matches!(c.expires_at, Some(exp) if Utc::now() >= exp),
            }
        };
        if expired {
            self.inner.write().remove(name);
            return Ok(None);
        }
        let map = self.inner.read();
        let Some(c) = map.get(name) else { return Ok(None) };
        let decoded = urlencoding::decode(&c.value)
            .map_err(|e| StorageError::codec(format!("cookie '{}': {}", name, e)))?;
        Ok(Some(decoded.into_owned()))
    }

    /// Overwrite the cookie with an already-expired date. The jar is
    /// origin-scoped, so `path` only matters for the rendered form.
    pub fn remove(&self, name: &str, path: &str) -> StorageResult<()> {
        self.check_access()?;
        debug!(target: "jar", "cookie '{}' expired out (path {})", name, path);
        let entry = StoredCookie {
            value: "deleted".to_string(),
            expires_at: Some(Utc::now() - Duration::days(1)),
        };
        self.inner.write().insert(name.to_string(), entry);
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        matches!(self.get(name), Ok(Some(_)))
    }
}

/// Render a `Set-Cookie` header value for the gateway's login responses.
pub fn render_set_cookie(name: &str, value: &str, attrs: &CookieAttributes) -> String {
    let expires = (Utc::now() + Duration::days(attrs.days)).format(HTTP_DATE_FMT);
    let mut cookie = format!(
        "{}={}; Expires={}; Path={}; SameSite={}",
        name,
        urlencoding::encode(value),
        expires,
        attrs.path,
        attrs.same_site.as_str()
    );
    if attrs.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Render a `Set-Cookie` header value that deletes the cookie.
pub fn render_expired_cookie(name: &str, path: &str) -> String {
    format!("{}=deleted; Expires={}; Path={}; SameSite=Strict", name, EXPIRED_STAMP, path)
}

/// Extract a named cookie from a raw `Cookie` request header line.
pub fn parse_cookie_header(raw: &str, name: &str) -> Option<String> {
    for part in raw.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name {
                let v = &v[1..];
                return match urlencoding::decode(v) {
                    Ok(s) => Some(s.into_owned()),
                    Err(_) => Some(v.to_string()),
                };
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_round_trips_reserved_characters() {
        let jar = CookieJar::new();
        let attrs = CookieAttributes::default();
        jar.set("userEmail", "nurse+oncall@example.com", &attrs).unwrap();
        assert_eq!(jar.get("userEmail").unwrap().as_deref(), Some("nurse+oncall@example.com"));
        assert!(jar.has("userEmail"));
    }

    #[test]
    fn remove_expires_the_cookie() {
        let jar = CookieJar::new();
        jar.set("authToken", "tok", &CookieAttributes::default()).unwrap();
        jar.remove("authToken", "/").unwrap();
        assert_eq!(jar.get("authToken").unwrap(), None);
        assert!(!jar.has("authToken"));
        // removing again is a no-op
        jar.remove("authToken", "/").unwrap();
        assert_eq!(jar.get("authToken").unwrap(), None);
    }

    #[test]
    fn expired_entries_read_as_absent() {
        let jar = CookieJar::new();
        let attrs = CookieAttributes { days: -1, ..CookieAttributes::default() };
        jar.set("authToken", "tok", &attrs).unwrap();
        assert_eq!(jar.get("authToken").unwrap(), None);
    }

    #[test]
    fn disabled_jar_refuses_everything() {
        let jar = CookieJar::disabled();
        let err = jar.set("authToken", "tok", &CookieAttributes::default()).unwrap_err();
        assert!(matches!(err, StorageError::Unavailable { .. }));
        assert!(jar.get("authToken").is_err());
        assert!(!jar.has("authToken"));
    }

    #[test]
    fn set_cookie_rendering_carries_attributes() {
        let attrs = CookieAttributes::default();
        let rendered = render_set_cookie("userRole", "Nurse", &attrs);
        assert!(rendered.starts_with("userRole=Nurse; Expires="));
        assert!(rendered.contains("; Path=/; SameSite=Strict"));
        assert!(rendered.ends_with("; Secure"));

        let insecure = CookieAttributes { secure: false, ..CookieAttributes::default() };
        assert!(!render_set_cookie("userRole", "Nurse", &insecure).contains("Secure"));
    }

    #[test]
    fn expired_rendering_uses_epoch_date() {
        let rendered = render_expired_cookie("authToken", "/");
        assert_eq!(
            rendered,
            "authToken=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/; SameSite=Strict"
        );
    }

    #[test]
    fn cookie_header_parsing_matches_by_name() {
        let raw = "authToken=tok123; userRole=Nurse; userEmail=n%40example.com";
        assert_eq!(parse_cookie_header(raw, "authToken").as_deref(), Some("tok123"));
        assert_eq!(parse_cookie_header(raw, "userRole").as_deref(), Some("Nurse"));
        assert_eq!(parse_cookie_header(raw, "userEmail").as_deref(), Some("n@example.com"));
        assert_eq!(parse_cookie_header(raw, "missing"), None);
        assert_eq!(parse_cookie_header("", "authToken"), None);
    }
}
