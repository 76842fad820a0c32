//! HTTP implementation of the tree service contract
//!
//! | call     | request                                    |
//! |----------|--------------------------------------------|
//! | insert   | `POST /insertar {value, tree_kind}`        |
//! | remove   | `POST /eliminar {value, tree_kind}`        |
//! | traverse | `GET /recorrido/{order}?tree_kind=...`     |
//! | clear    | `POST /limpiar {tree_kind}`                |
//! | snapshot | `GET /estructura?tree_kind=...`            |

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::infrastructure::traits::{MessageReply, SnapshotReply, TraversalReply, TreeService};
use crate::infrastructure::TransportError;

#[derive(Debug, Serialize)]
struct ValueRequest<'a> {
    value: i64,
    tree_kind: &'a str,
}

#[derive(Debug, Serialize)]
struct ClearRequest<'a> {
    tree_kind: &'a str,
}

/// Blocking JSON client for a tree service rooted at `base_url`.
#[derive(Debug, Clone)]
pub struct HttpTreeService {
    base_url: Url,
    client: Client,
}

impl HttpTreeService {
    /// Create a client; every request gives up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url).map_err(|e| TransportError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl {
                url: base_url.to_string(),
                reason: "expected an http(s) base url".to_string(),
            });
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self { base_url, client })
    }

    /// Base url with `segments` appended to its path.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn endpoint_for_kind(&self, segments: &[&str], tree_kind: &str) -> Url {
        let mut url = self.endpoint(segments);
        url.query_pairs_mut().append_pair("tree_kind", tree_kind);
        url
    }

    fn get<O: DeserializeOwned>(&self, url: Url) -> Result<O, TransportError> {
        debug!("GET {}", url);
        self.send(self.client.get(url.clone()), &url)
    }

    fn post<I: Serialize, O: DeserializeOwned>(&self, url: Url, body: &I) -> Result<O, TransportError> {
        debug!("POST {}", url);
        self.send(self.client.post(url.clone()).json(body), &url)
    }

    fn send<O: DeserializeOwned>(&self, request: RequestBuilder, url: &Url) -> Result<O, TransportError> {
        let response = request.send().map_err(|e| TransportError::Request {
            url: url.to_string(),
            source: e,
        })?;
        let status = response.status();
        debug!("{} -> {}", url, status);
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().map_err(|e| TransportError::Request {
            url: url.to_string(),
            source: e,
        })?;
        decode(&body).map_err(|e| TransportError::Malformed {
            url: url.to_string(),
            source: e,
        })
    }
}

/// JSON decode without serde_json's nesting limit; a degenerate tree nests one
/// object per node. The stack grows on demand instead.
fn decode<O: DeserializeOwned>(body: &str) -> Result<O, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(body);
    de.disable_recursion_limit();
    let value = O::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

impl TreeService for HttpTreeService {
    #[instrument(level = "debug", skip(self))]
    fn insert(&self, value: i64, tree_kind: &str) -> Result<MessageReply, TransportError> {
        self.post(self.endpoint(&["insertar"]), &ValueRequest { value, tree_kind })
    }

    #[instrument(level = "debug", skip(self))]
    fn remove(&self, value: i64, tree_kind: &str) -> Result<MessageReply, TransportError> {
        self.post(self.endpoint(&["eliminar"]), &ValueRequest { value, tree_kind })
    }

    #[instrument(level = "debug", skip(self))]
    fn traverse(&self, order: &str, tree_kind: &str) -> Result<TraversalReply, TransportError> {
        self.get(self.endpoint_for_kind(&["recorrido", order], tree_kind))
    }

    #[instrument(level = "debug", skip(self))]
    fn clear(&self, tree_kind: &str) -> Result<MessageReply, TransportError> {
        self.post(self.endpoint(&["limpiar"]), &ClearRequest { tree_kind })
    }

    #[instrument(level = "debug", skip(self))]
    fn snapshot(&self, tree_kind: &str) -> Result<SnapshotReply, TransportError> {
        self.get(self.endpoint_for_kind(&["estructura"], tree_kind))
    }
}
