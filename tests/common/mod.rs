//! Scripted in-process backend shared by the integration tests

#![allow(dead_code)]

use futures::future::BoxFuture;
use reqwest::Method;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use salonadmin::api::Api;
use salonadmin::config::GatewayConfig;
use salonadmin::gateway::{Gateway, OutboundRequest, RawResponse, Transport, TransportError};
use salonadmin::session::{Anonymous, TokenSource};

pub const BASE_URL: &str = "https://backend.test";
pub const URL_PREFIX: &str = "https://backend.test/api";

/// What the scripted backend does with a request
pub enum Reply {
    Json(u16, Value),
    Raw(u16, &'static str),
    /// Connection-level failure
    Fail(&'static str),
    /// Never answers
    Hang,
    /// Answers with the inner reply after an extra delay
    After(Duration, Box<Reply>),
}

type Responder = Box<dyn Fn(&OutboundRequest) -> Reply + Send + Sync>;

/// Records every request and answers via a responder closure
pub struct MockBackend {
    requests: Mutex<Vec<OutboundRequest>>,
    latency: Duration,
    responder: Responder,
}

impl MockBackend {
    pub fn new(
        responder: impl Fn(&OutboundRequest) -> Reply + Send + Sync + 'static,
    ) -> Arc<Self> {
        Self::with_latency(Duration::ZERO, responder)
    }

    pub fn with_latency(
        latency: Duration,
        responder: impl Fn(&OutboundRequest) -> Reply + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            latency,
            responder: Box::new(responder),
        })
    }

    /// Total number of requests sent
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests sent with `method` to `endpoint`
    pub fn calls_to(&self, method: Method, endpoint: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.method == method && endpoint_of(request) == endpoint)
            .count()
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> OutboundRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for MockBackend {
    fn send(
        &self,
        request: OutboundRequest,
    ) -> BoxFuture<'static, Result<RawResponse, TransportError>> {
        let mut reply = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        let mut latency = self.latency;
        while let Reply::After(extra, inner) = reply {
            latency += extra;
            reply = *inner;
        }

        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            match reply {
                Reply::Json(status, body) => Ok(RawResponse::new(
                    status,
                    serde_json::to_vec(&body).expect("test body should encode"),
                )),
                Reply::Raw(status, body) => Ok(RawResponse::new(status, body)),
                Reply::Fail(message) => Err(TransportError(message.to_string())),
                Reply::Hang => std::future::pending().await,
                Reply::After(..) => unreachable!("delays are unwrapped before sending"),
            }
        })
    }
}

/// Endpoint path of a request, without base URL and prefix
pub fn endpoint_of(request: &OutboundRequest) -> &str {
    request.url.strip_prefix(URL_PREFIX).unwrap_or(&request.url)
}

/// Decoded JSON body of a request
pub fn body_of(request: &OutboundRequest) -> Value {
    request
        .body
        .as_deref()
        .map(|body| serde_json::from_slice(body).expect("request body should be JSON"))
        .unwrap_or(Value::Null)
}

pub fn gateway(backend: Arc<MockBackend>) -> Arc<Gateway> {
    gateway_with_tokens(backend, Arc::new(Anonymous))
}

pub fn gateway_with_tokens(
    backend: Arc<MockBackend>,
    tokens: Arc<dyn TokenSource>,
) -> Arc<Gateway> {
    Arc::new(Gateway::new(GatewayConfig::new(BASE_URL), backend, tokens))
}

pub fn api(backend: Arc<MockBackend>) -> Api {
    Api::new(gateway(backend))
}
