//! Last.fm web service access shared by the similarity and top-tracks lookups

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::lookup_client::{LookupClient, LookupRequest};
use crate::error::{LookupError, PipelineError};
use crate::models::ArtistName;

/// List field that Last.fm serializes as a bare object when it has one entry
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

/// Entry carrying an optional `name` (artists and tracks alike)
#[derive(Debug, Deserialize)]
pub(crate) struct NamedEntry {
    #[serde(default)]
    pub name: Option<String>,
}

/// Last.fm API access bound to one key
#[derive(Clone)]
pub struct LastfmApi {
    client: LookupClient,
    base_url: String,
    api_key: String,
}

impl LastfmApi {
    pub fn new(client: LookupClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Call an `artist.*` method and return the JSON document
    pub async fn artist_method(
        &self,
        method: &str,
        artist: &ArtistName,
        limit: usize,
    ) -> Result<Value, PipelineError> {
        let request = LookupRequest::get(&self.base_url)
            .query("method", method)
            .query("artist", artist.as_str())
            .query("api_key", &self.api_key)
            .query("limit", limit)
            .query("format", "json");

        let response = self.client.request(request).await?;
        let value = response.body.into_json(method)?;

        // Last.fm reports some failures as HTTP 200 with an error document
        if let Some(code) = value.get("error").and_then(Value::as_i64) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(LookupError::Remote {
                status: response.status,
                body: format!("Last.fm error {}: {}", code, message),
            }
            .into());
        }

        Ok(value)
    }
}

/// Deserialize `value[outer][inner]` as a list, `MalformedResponse` when absent
pub(crate) fn nested_list<T: DeserializeOwned>(
    value: &Value,
    outer: &str,
    inner: &str,
) -> Result<Vec<T>, PipelineError> {
    let container = value.get(outer).ok_or_else(|| {
        PipelineError::MalformedResponse(format!("missing '{}' in response", outer))
    })?;

    let list = match container.get(inner) {
        Some(list) => OneOrMany::<T>::deserialize(list).map_err(|e| {
            PipelineError::MalformedResponse(format!("bad '{}.{}': {}", outer, inner, e))
        })?,
        // An artist without results comes back with an empty container
        None => OneOrMany::default(),
    };

    Ok(list.into_vec())
}

/// Non-empty names from a list of entries
pub(crate) fn names(entries: Vec<NamedEntry>) -> Vec<String> {
    entries
        .into_iter()
        .filter_map(|entry| entry.name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
