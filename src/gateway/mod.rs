//! Request gateway for the marketplace backend
//!
//! Every backend call goes through `Gateway`. It attaches auth and JSON
//! headers, bounds each call with a timeout, collapses concurrent calls that
//! share a method and endpoint into one network request, serves list reads
//! from a TTL cache, and classifies failures into `ApiError`.

mod error;
mod transport;

pub use error::{
    ApiError, ApiErrorKind, RATE_LIMIT_MESSAGE, STATUS_CONFIGURATION, STATUS_INVALID_RESPONSE,
    STATUS_NETWORK, STATUS_TIMEOUT,
};
pub use transport::{OutboundRequest, RawResponse, ReqwestTransport, Transport, TransportError};

use futures::future::{self, BoxFuture, FutureExt, Shared};
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::cache::ResponseCache;
use crate::config::GatewayConfig;
use crate::session::TokenSource;

/// Identifies duplicate in-flight calls: method plus endpoint, body excluded
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: Method,
    pub endpoint: String,
}

impl RequestKey {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
        }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.method, self.endpoint)
    }
}

/// Method, body and extra headers for a single call
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            headers: Vec::new(),
        }
    }

    pub fn put(body: Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(body),
            headers: Vec::new(),
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            body: None,
            headers: Vec::new(),
        }
    }

    /// Adds a header; it replaces any default header of the same name
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Where a list resource sits inside a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{field: ...}` or `{data: {field: ...}}`, defaulting to `[]`
    Collection(&'static str),
    /// The whole body is the resource
    Whole,
}

/// Pulls the resource out of a response body according to `envelope`
///
/// A `null` field counts as absent.
pub fn unwrap_envelope(body: Value, envelope: Envelope) -> Value {
    let field = match envelope {
        Envelope::Whole => return body,
        Envelope::Collection(field) => field,
    };

    let present = |value: &&Value| !value.is_null();
    body.get(field)
        .filter(present)
        .or_else(|| body.get("data").and_then(|data| data.get(field)).filter(present))
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

type PendingRequest = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

/// An in-flight call and the cache generation it was issued for
struct PendingEntry {
    /// Distinguishes this call from a later one registered under the same key
    id: u64,
    /// Generation of the cached resource, for calls made by `cached_read`
    generation: Option<u64>,
    future: PendingRequest,
}

type PendingMap = HashMap<RequestKey, PendingEntry>;
type PendingTable = Mutex<PendingMap>;

fn lock_table(table: &PendingTable) -> MutexGuard<'_, PendingMap> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Single choke point for backend calls
///
/// Construct once per process and share it (`Arc<Gateway>`) with every
/// resource client. Must be used from within a tokio runtime: each network
/// call runs on its own spawned task.
pub struct Gateway {
    config: GatewayConfig,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenSource>,
    cache: ResponseCache,
    pending: Arc<PendingTable>,
    next_call_id: AtomicU64,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("cached_keys", &self.cache.keys())
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

impl Gateway {
    pub fn new(
        config: GatewayConfig,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        let cache = ResponseCache::new(config.cache_ttl);
        Self {
            config,
            transport,
            tokens,
            cache,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_call_id: AtomicU64::new(0),
        }
    }

    /// Creates a gateway that sends requests with `reqwest`
    pub fn with_reqwest(config: GatewayConfig, tokens: Arc<dyn TokenSource>) -> Self {
        Self::new(config, Arc::new(ReqwestTransport::new()), tokens)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Issues a call, or joins the identical call already in flight
    ///
    /// The in-flight entry is registered before this returns, so a second
    /// call made before the returned future is polled still shares it. The
    /// entry is removed when the call settles, success or failure.
    pub fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> BoxFuture<'static, Result<Value, ApiError>> {
        self.dispatch(endpoint, options, None)
    }

    /// Reads a resource through the cache
    ///
    /// A fresh entry under `resource_key` is returned without a network call.
    /// Otherwise `endpoint` is fetched with GET, unwrapped per `envelope`,
    /// stored and returned. Failures are not cached. A fetch that started
    /// before the key was invalidated is neither joined nor stored.
    pub async fn cached_read(
        &self,
        resource_key: &str,
        endpoint: &str,
        envelope: Envelope,
    ) -> Result<Value, ApiError> {
        if let Some(hit) = self.cache.read(resource_key) {
            return Ok(hit.data);
        }

        let generation = self.cache.generation(resource_key);
        let body = self
            .dispatch(endpoint, RequestOptions::get(), Some(generation))
            .await?;
        let data = unwrap_envelope(body, envelope);
        self.cache.write_if_current(resource_key, data.clone(), generation);
        Ok(data)
    }

    /// Shared path of `request` and `cached_read`
    ///
    /// With a `generation`, an in-flight call is joined only if it was issued
    /// for the same generation; otherwise a new call replaces it in the table.
    fn dispatch(
        &self,
        endpoint: &str,
        options: RequestOptions,
        generation: Option<u64>,
    ) -> BoxFuture<'static, Result<Value, ApiError>> {
        let Some(url) = self.config.url_for(endpoint) else {
            return future::ready(Err(ApiError::not_configured())).boxed();
        };
        if endpoint.is_empty() {
            return future::ready(Err(ApiError::empty_endpoint())).boxed();
        }

        let key = RequestKey::new(options.method.clone(), endpoint);
        // Built before locking the table: the token source may read from disk
        let outbound = match self.build_request(url, &options) {
            Ok(outbound) => outbound,
            Err(e) => return future::ready(Err(e)).boxed(),
        };

        let mut pending = lock_table(&self.pending);
        if let Some(existing) = pending.get(&key) {
            if generation.is_none() || existing.generation == generation {
                debug!("Reusing pending request for: {key}");
                return existing.future.clone().boxed();
            }
            debug!("Pending request for {key} predates an invalidation, sending a new one");
        }

        let id = self.next_call_id.fetch_add(1, Ordering::Relaxed);
        let transport = Arc::clone(&self.transport);
        let table = Arc::clone(&self.pending);
        let timeout = self.config.timeout;
        let task_key = key.clone();
        let endpoint = endpoint.to_string();

        // The table lock is held until the entry is inserted, so the task
        // cannot look for it before it exists.
        let task = tokio::spawn(async move {
            let result = execute(transport.as_ref(), outbound, timeout, &endpoint).await;
            let mut entries = lock_table(&table);
            if entries.get(&task_key).is_some_and(|entry| entry.id == id) {
                entries.remove(&task_key);
            }
            result
        });

        let shared = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(ApiError::network(format!("request task failed: {e}"))),
            }
        }
        .boxed()
        .shared();

        let entry = PendingEntry {
            id,
            generation,
            future: shared.clone(),
        };
        pending.insert(key, entry);
        shared.boxed()
    }

    /// Drops the cache entry for `resource_key`, or everything when `None`
    pub fn invalidate(&self, resource_key: Option<&str>) {
        self.cache.invalidate(resource_key);
    }

    /// Refresh/logout entry point; same as `invalidate`
    pub fn clear_cache(&self, resource_key: Option<&str>) {
        self.invalidate(resource_key);
    }

    /// Number of calls currently in flight
    pub fn pending_count(&self) -> usize {
        lock_table(&self.pending).len()
    }

    /// Resource keys currently cached, fresh or stale
    pub fn cached_keys(&self) -> Vec<String> {
        self.cache.keys()
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }

    fn build_request(
        &self,
        url: String,
        options: &RequestOptions,
    ) -> Result<OutboundRequest, ApiError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = self.tokens.token() {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        for (name, value) in &options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        let body = options
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| {
                ApiError::new(
                    ApiErrorKind::Configuration,
                    STATUS_CONFIGURATION,
                    format!("Failed to encode request body: {e}"),
                )
            })?;

        Ok(OutboundRequest {
            method: options.method.clone(),
            url,
            headers,
            body,
        })
    }
}

/// Sends one request and classifies the outcome
async fn execute(
    transport: &dyn Transport,
    request: OutboundRequest,
    timeout: Duration,
    endpoint: &str,
) -> Result<Value, ApiError> {
    debug!("API Request: {} {}", request.method, request.url);

    let response = match tokio::time::timeout(timeout, transport.send(request)).await {
        Err(_) => {
            warn!("Request to {endpoint} timed out after {}s", timeout.as_secs());
            return Err(ApiError::timeout());
        }
        Ok(Err(e)) => {
            error!("Request to {endpoint} failed: {e}");
            return Err(ApiError::network(e));
        }
        Ok(Ok(response)) => response,
    };

    if !response.is_success() {
        let err = ApiError::from_status(response.status, endpoint, &response.body);
        match err.kind {
            ApiErrorKind::RateLimited => {
                warn!("Rate limit exceeded. Please wait a few minutes before making more requests.")
            }
            ApiErrorKind::NotFound => warn!("Endpoint not found: {endpoint}"),
            _ => error!("API Error [{}]: {}", err.status, err.message),
        }
        return Err(err);
    }

    decode_body(&response.body)
}

/// Parses a success body; an empty body decodes to `null`
fn decode_body(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(ApiError::invalid_response)
}
