//! Remote JSON store over HTTP.
//!
//! Speaks the realtime-database REST convention: each namespace is a JSON
//! document at `{base_url}/{namespace}.json`, read with `GET` and replaced
//! with `PUT`. A `null` body means the namespace was never written.

use crate::repo::kv_store::{KvStore, Namespace, StoreError, StoreResult};
use serde_json::Value;

/// Remote namespace store reached with blocking HTTP calls.
pub struct HttpKvStore {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpKvStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self {
            base_url,
            agent: ureq::Agent::new_with_defaults(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Document URL for `namespace`.
    pub fn url_for(&self, namespace: Namespace) -> String {
        format!("{}/{}.json", self.base_url, namespace.as_str())
    }
}

impl KvStore for HttpKvStore {
    fn load(&self, namespace: Namespace) -> StoreResult<Option<Value>> {
        let url = self.url_for(namespace);
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|err| unavailable("GET", &url, err))?;
        let value = response
            .into_body()
            .read_json::<Value>()
            .map_err(|err| unavailable("GET", &url, err))?;

        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }

    fn save(&self, namespace: Namespace, value: &Value) -> StoreResult<()> {
        let url = self.url_for(namespace);
        self.agent
            .put(&url)
            .send_json(value)
            .map_err(|err| unavailable("PUT", &url, err))?;
        Ok(())
    }
}

fn unavailable(method: &str, url: &str, err: ureq::Error) -> StoreError {
    StoreError::Unavailable(format!("{method} {url} failed: {err}"))
}
