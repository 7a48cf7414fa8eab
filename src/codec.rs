//! Tamper-proofing of session ids for cookie transport.
//!
//! The cryptography itself is delegated to the `cookie` crate's signed jars;
//! this module only defines the string-level contract and key rotation.

use std::fmt;

use tower_cookies::{
    Key,
    cookie::{Cookie, CookieJar},
};

use crate::error::Error;

/// Signs a session id for cookie transport and verifies it on the way back.
///
/// Implementations must be safe for concurrent use from multiple requests.
pub trait Codec: fmt::Debug + Send + Sync + 'static {
    /// Sign `value` for transport in a cookie named `name`.
    fn encode(&self, name: &str, value: &str) -> Result<String, Error>;

    /// Verify a signed cookie value and recover the session id. Fails with
    /// [`Error::CookieDecode`] if the value is malformed or the signature
    /// does not verify under any key.
    fn decode(&self, name: &str, value: &str) -> Result<String, Error>;
}

/// An ordered set of signing keys.
///
/// The newest key signs all new cookies; verification tries every key in
/// order. Rotate by constructing a ring with the new key and retaining the
/// old keys for verification only:
///
/// ```
/// use tower_kv_sessions::{Key, KeyRing};
///
/// let old = Key::generate();
/// let new = Key::generate();
/// let ring = KeyRing::new(new).with_retired(old);
/// ```
#[derive(Clone)]
pub struct KeyRing {
    keys: Vec<Key>,
}

impl KeyRing {
    /// A ring with a single signing key.
    pub fn new(key: Key) -> Self {
        Self { keys: vec![key] }
    }

    /// Append a retired key, kept for verification of cookies signed before
    /// a rotation.
    #[must_use]
    pub fn with_retired(mut self, key: Key) -> Self {
        self.keys.push(key);
        self
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material stays out of logs.
        f.debug_struct("KeyRing")
            .field("keys", &self.keys.len())
            .finish()
    }
}

impl Codec for KeyRing {
    fn encode(&self, name: &str, value: &str) -> Result<String, Error> {
        let key = self
            .keys
            .first()
            .ok_or_else(|| Error::Encoding("key ring is empty".to_string()))?;

        let mut jar = CookieJar::new();
        jar.signed_mut(key)
            .add(Cookie::new(name.to_owned(), value.to_owned()));

        let signed = jar
            .get(name)
            .ok_or_else(|| Error::Encoding(format!("signing produced no cookie named {name}")))?;
        Ok(signed.value().to_string())
    }

    fn decode(&self, name: &str, value: &str) -> Result<String, Error> {
        let mut jar = CookieJar::new();
        jar.add_original(Cookie::new(name.to_owned(), value.to_owned()));

        for key in &self.keys {
            if let Some(verified) = jar.signed(key).get(name) {
                return Ok(verified.value().to_string());
            }
        }

        Err(Error::CookieDecode(
            "signature did not verify under any key".to_string(),
        ))
    }
}
