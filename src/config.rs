use std::borrow::Cow;

use time::Duration;
use tower_cookies::Cookie;

use crate::SameSite;

/// Store-level session defaults.
///
/// Every session receives its own clone of this configuration at construction
/// time, so a handler mutating one session's options (for example requesting
/// deletion) never leaks into the store defaults or into other sessions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub(crate) name: Cow<'static, str>,
    /// Cookie max age in seconds. `0` issues a session cookie (no `Max-Age`
    /// attribute); a negative value marks the session for deletion on save.
    pub(crate) max_age: i64,
    pub(crate) path: Cow<'static, str>,
    pub(crate) domain: Option<Cow<'static, str>>,
    pub(crate) secure: bool,
    pub(crate) http_only: bool,
    pub(crate) same_site: SameSite,
    /// Server-side record lifetime hint passed to the backend on every write.
    /// `None` matches the historical behavior: records persist until
    /// explicitly deleted.
    pub(crate) ttl: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "id".into(),
            max_age: 0,
            path: "/".into(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: SameSite::Strict,
            ttl: None,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_name<N: Into<Cow<'static, str>>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = seconds;
        self
    }

    #[must_use]
    pub fn with_path<P: Into<Cow<'static, str>>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_domain<D: Into<Cow<'static, str>>>(mut self, domain: D) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn without_domain(mut self) -> Self {
        self.domain = None;
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// The cookie name sessions are correlated under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie max age in seconds. Negative means the session is marked for
    /// deletion.
    pub fn max_age(&self) -> i64 {
        self.max_age
    }

    pub(crate) fn build_cookie(&self, value: String) -> Cookie<'static> {
        let mut cookie_builder = Cookie::build((self.name.clone(), value))
            .http_only(self.http_only)
            .same_site(self.same_site)
            .secure(self.secure)
            .path(self.path.clone());

        if self.max_age > 0 {
            cookie_builder = cookie_builder.max_age(Duration::seconds(self.max_age));
        }

        if let Some(domain) = self.domain.clone() {
            cookie_builder = cookie_builder.domain(domain);
        }

        cookie_builder.build()
    }

    /// A cookie carrying the name/path/domain needed for the browser to
    /// discard the session cookie.
    pub(crate) fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.name.clone(), "");
        cookie.set_path(self.path.clone());
        if let Some(domain) = self.domain.clone() {
            cookie.set_domain(domain);
        }
        cookie
    }
}
