use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore as _, rngs::OsRng};
use tower_cookies::Cookies;

use crate::{
    backend::{KeyValueBackend, StoredRecord},
    codec::Codec,
    config::SessionConfig,
    error::Error,
    serializer::{JsonSerializer, Serializer, Values},
    session::Session,
};

/// The single authority for turning a request's cookie into a hydrated
/// [`Session`] and a mutated session back into a backend write plus response
/// cookie.
///
/// One store is shared process-wide; it holds no per-request state. Two
/// concurrent requests for the same session id may interleave their
/// load/mutate/save sequences and the later write silently wins.
#[derive(Debug, Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueBackend>,
    codec: Arc<dyn Codec>,
    serializer: Arc<dyn Serializer>,
    config: SessionConfig,
}

impl SessionStore {
    /// A store over `backend` with ids signed by `codec`, JSON payloads, and
    /// default session options.
    pub fn new(backend: Arc<dyn KeyValueBackend>, codec: Arc<dyn Codec>) -> Self {
        Self {
            backend,
            codec,
            serializer: Arc::new(JsonSerializer),
            config: SessionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Build the session for a request.
    ///
    /// Always returns a usable session. The accompanying error, when
    /// present, records why the request's cookie could not be turned into a
    /// hydrated session (tampered cookie, missing or unreadable backend
    /// record); the session is then fresh and safe to use as such.
    ///
    /// A successfully verified id stays on the session even when the backend
    /// load fails, so a subsequent save writes under the presented id.
    pub async fn new_session(&self, cookies: &Cookies) -> (Session, Option<Error>) {
        let session = Session::new(self.config.clone());

        let Some(cookie) = cookies.get(self.config.name()) else {
            return (session, None);
        };

        let id = match self.codec.decode(self.config.name(), cookie.value()) {
            Ok(id) => id,
            Err(err) => return (session, Some(err)),
        };
        session.assign_id(id.clone());

        match self.load(&id).await {
            Ok(values) => {
                session.hydrate(values);
                (session, None)
            }
            Err(err) => (session, Some(err)),
        }
    }

    /// Persist `session` and issue its cookie on `cookies`.
    ///
    /// A session whose max age is negative is deleted instead: the backend
    /// record is removed and the browser is instructed to discard the
    /// cookie.
    ///
    /// The backend write strictly precedes cookie issuance. If the write
    /// fails, no cookie is added and the client never learns an id for a
    /// session that was not persisted.
    pub async fn save(&self, cookies: &Cookies, session: &Session) -> Result<(), Error> {
        let options = session.options();

        if options.max_age() < 0 {
            let id = session.id();
            // An id is only assigned at save time, so a never-saved session
            // has no backend record to remove.
            if !id.is_empty() {
                self.backend.delete(&id).await?;
            }
            cookies.remove(options.removal_cookie());
            return Ok(());
        }

        if session.id().is_empty() {
            session.assign_id(generate_id());
        }
        let id = session.id();

        let data = self.serializer.encode(&session.values())?;
        self.backend
            .put(&StoredRecord { id: id.clone(), data }, options.ttl)
            .await?;

        let signed = self.codec.encode(options.name(), &id)?;
        cookies.add(options.build_cookie(signed));
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Values, Error> {
        let record = self.backend.get(id).await?;
        self.serializer.decode(&record.data)
    }
}

/// A fresh session id: 32 bytes of OS entropy in the URL-safe base64
/// alphabet, unpadded, so it is safe in both cookies and backend keys.
pub(crate) fn generate_id() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
