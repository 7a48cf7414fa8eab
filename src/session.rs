use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Serialize, de::DeserializeOwned};

use crate::{config::SessionConfig, error::Error, serializer::Values};

/// A request-scoped session.
///
/// `Session` is a cheap-clone handle: the layer inserts one into the request
/// extensions and every clone taken during that request observes and mutates
/// the same state. State is never shared across requests.
///
/// The id is empty until the first save assigns one; all session data lives
/// in the [`values`](Session::insert) mapping, which is the only payload
/// persisted to the backend.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    id: String,
    values: Values,
    options: SessionConfig,
    is_new: bool,
    modified: bool,
}

impl Session {
    /// A fresh session carrying its own copy of the store defaults.
    pub(crate) fn new(options: SessionConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    id: String::new(),
                    values: Values::new(),
                    options,
                    is_new: true,
                    modified: false,
                }),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The session id, empty until the first save.
    pub fn id(&self) -> String {
        self.state().id.clone()
    }

    /// Whether no valid backend record was found for this request.
    pub fn is_new(&self) -> bool {
        self.state().is_new
    }

    /// Whether the handler changed the session since it was hydrated.
    pub fn is_modified(&self) -> bool {
        self.state().modified
    }

    pub fn is_empty(&self) -> bool {
        self.state().values.is_empty()
    }

    /// Insert a serializable value under `key`.
    ///
    /// Re-inserting an identical value leaves the session unmodified, so an
    /// untouched session does not trigger a backend write.
    pub fn insert(&self, key: impl Into<String>, value: impl Serialize) -> Result<(), Error> {
        let key = key.into();
        let value =
            serde_json::to_value(value).map_err(|err| Error::Serialization(err.to_string()))?;

        let mut state = self.state();
        if state.values.get(&key) != Some(&value) {
            state.values.insert(key, value);
            state.modified = true;
        }
        Ok(())
    }

    /// Read and deserialize the value under `key`, if present.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        self.state()
            .values
            .get(key)
            .cloned()
            .map(|value| {
                serde_json::from_value(value).map_err(|err| Error::Serialization(err.to_string()))
            })
            .transpose()
    }

    /// Read the raw value under `key`, if present.
    pub fn get_value(&self, key: &str) -> Option<serde_json::Value> {
        self.state().values.get(key).cloned()
    }

    /// Remove the value under `key`, returning it if present.
    pub fn remove(&self, key: &str) -> Option<serde_json::Value> {
        let mut state = self.state();
        let removed = state.values.remove(key);
        if removed.is_some() {
            state.modified = true;
        }
        removed
    }

    /// Drop every value from the session.
    pub fn clear(&self) {
        let mut state = self.state();
        if !state.values.is_empty() {
            state.values.clear();
            state.modified = true;
        }
    }

    /// Mark the session for deletion: the next save removes the backend
    /// record and instructs the browser to discard the cookie.
    pub fn delete(&self) {
        let mut state = self.state();
        state.options.max_age = -1;
        state.modified = true;
    }

    /// Override the cookie max age for this session only.
    pub fn set_max_age(&self, seconds: i64) {
        let mut state = self.state();
        state.options.max_age = seconds;
        state.modified = true;
    }

    pub(crate) fn assign_id(&self, id: String) {
        self.state().id = id;
    }

    pub(crate) fn hydrate(&self, values: Values) {
        let mut state = self.state();
        state.values = values;
        state.is_new = false;
    }

    pub(crate) fn values(&self) -> Values {
        self.state().values.clone()
    }

    pub(crate) fn options(&self) -> SessionConfig {
        self.state().options.clone()
    }
}

#[cfg(feature = "axum")]
impl<S: Send + Sync> axum_core::extract::FromRequestParts<S> for Session {
    type Rejection = (http::StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Session>().cloned().ok_or((
            http::StatusCode::INTERNAL_SERVER_ERROR,
            "request is missing the session extension: is SessionManagerLayer installed?",
        ))
    }
}
