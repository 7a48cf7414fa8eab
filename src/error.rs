use thiserror::Error;

/// Errors surfaced by the session store and its collaborators.
///
/// The first two variants are recoverable: the request proceeds with a fresh,
/// empty session. The remaining variants fail the operation that raised them.
/// The store itself never logs or retries; errors propagate once to the
/// immediate caller.
#[derive(Debug, Error)]
pub enum Error {
    /// The session cookie was present but its signature did not verify, or
    /// the value was malformed.
    #[error("session cookie failed verification: {0}")]
    CookieDecode(String),

    /// No backend record exists for the presented session id.
    #[error("no session record for id: {0}")]
    NotFound(String),

    /// The session value mapping could not be serialized, or a stored
    /// payload could not be deserialized.
    #[error("session payload could not be (de)serialized: {0}")]
    Serialization(String),

    /// The key-value backend failed (network, storage, etc).
    #[error("session backend error: {0}")]
    Backend(String),

    /// Signing the session id into a cookie value failed.
    #[error("session cookie could not be signed: {0}")]
    Encoding(String),
}

impl Error {
    /// Whether this error degrades to a fresh session rather than failing
    /// the request: an absent/corrupt cookie or a missing backend record.
    pub fn is_fresh_session(&self) -> bool {
        matches!(self, Error::CookieDecode(_) | Error::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn fresh_session_classification() {
        assert!(Error::CookieDecode("bad signature".into()).is_fresh_session());
        assert!(Error::NotFound("abc".into()).is_fresh_session());
        assert!(!Error::Serialization("bad payload".into()).is_fresh_session());
        assert!(!Error::Backend("connection reset".into()).is_fresh_session());
        assert!(!Error::Encoding("signing failed".into()).is_fresh_session());
    }
}
