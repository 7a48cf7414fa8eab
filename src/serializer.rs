//! Conversion of the session value mapping to and from the stored byte blob.

use std::{collections::HashMap, fmt};

use crate::error::Error;

/// The session payload: a mapping from string keys to tagged values (strings,
/// numbers, bools, arrays, nested maps).
pub type Values = HashMap<String, serde_json::Value>;

/// Converts the in-memory value mapping to and from the byte payload stored
/// in the backend. The payload must round-trip exactly.
pub trait Serializer: fmt::Debug + Send + Sync + 'static {
    fn encode(&self, values: &Values) -> Result<Vec<u8>, Error>;
    fn decode(&self, bytes: &[u8]) -> Result<Values, Error>;
}

/// The default serializer: JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn encode(&self, values: &Values) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(values).map_err(|err| Error::Serialization(err.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Values, Error> {
        serde_json::from_slice(bytes).map_err(|err| Error::Serialization(err.to_string()))
    }
}
