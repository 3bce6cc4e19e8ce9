#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use cachebench::{
    Config, Dispatcher, FetchEvent, GenerationId, MemoryStore, Network, NetworkError,
    NetworkResult, Request, RequestKey, Response, ResponseOutcome, Store, StoreError,
    StoredResponse,
};
use cachebench_store::{DeleteStatus, StoreResult};
use http::{HeaderMap, Method, StatusCode};
use tokio::sync::watch;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn get(url: &str) -> Request {
    http::Request::builder()
        .method(Method::GET)
        .uri(url)
        .body(Bytes::new())
        .expect("valid request")
}

pub fn key(url: &str) -> RequestKey {
    RequestKey::from_request(&get(url))
}

pub fn body(response: &Response) -> &str {
    std::str::from_utf8(response.body()).expect("utf-8 body")
}

pub fn snapshot(body: &'static str) -> StoredResponse {
    StoredResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::from_static(body.as_bytes()))
}

pub async fn stored_body(
    store: &MemoryStore,
    generation: &GenerationId,
    url: &str,
) -> Option<String> {
    store
        .get(generation, &key(url))
        .await
        .expect("memory store read")
        .map(|stored| String::from_utf8_lossy(stored.body()).into_owned())
}

pub async fn seed(dispatcher: &Dispatcher, url: &str, body: &'static str) {
    dispatcher
        .store()
        .put(dispatcher.generation(), &key(url), snapshot(body))
        .await
        .expect("seed store");
}

pub async fn respond(dispatcher: &Dispatcher, url: &str) -> ResponseOutcome {
    dispatcher
        .respond(FetchEvent::new(get(url), dispatcher.offload().clone()))
        .await
}

/// Builds an activated dispatcher over `store` and `network`.
pub async fn activated(
    store: &MemoryStore,
    network: &ScriptedNetwork,
    strategy: &str,
) -> Dispatcher {
    let config = Config::builder()
        .strategy(strategy)
        .build()
        .expect("valid config");
    let dispatcher = Dispatcher::new(store.clone(), network.clone(), config);
    dispatcher.install();
    dispatcher.activate().await.expect("activation");
    dispatcher
}

#[derive(Debug)]
struct ScriptedInner {
    calls: AtomicUsize,
    failing: AtomicBool,
    body: std::sync::Mutex<Option<&'static str>>,
    gate: watch::Sender<bool>,
}

/// Network double that counts calls and answers `200` with a scripted body.
///
/// Without a scripted body it answers `network:<path>#<call>`. It can be
/// switched to fail every fetch, and held so fetches stay pending until
/// released.
#[derive(Debug, Clone)]
pub struct ScriptedNetwork {
    inner: Arc<ScriptedInner>,
}

impl Default for ScriptedNetwork {
    fn default() -> Self {
        let (gate, _) = watch::channel(true);
        ScriptedNetwork {
            inner: Arc::new(ScriptedInner {
                calls: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
                body: std::sync::Mutex::new(None),
                gate,
            }),
        }
    }
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(body: &'static str) -> Self {
        let network = Self::default();
        network.answer(body);
        network
    }

    pub fn failing() -> Self {
        let network = Self::default();
        network.fail(true);
        network
    }

    pub fn answer(&self, body: &'static str) {
        *self.inner.body.lock().unwrap() = Some(body);
    }

    pub fn fail(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    pub fn hold(&self) {
        self.inner.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.inner.gate.send_replace(true);
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: Request) -> NetworkResult {
        let call = self.inner.calls.fetch_add(1, Ordering::SeqCst) + 1;

        let mut gate = self.inner.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(NetworkError::transport(std::io::Error::other(
                "connection reset",
            )));
        }

        let body = match *self.inner.body.lock().unwrap() {
            Some(body) => Bytes::from_static(body.as_bytes()),
            None => Bytes::from(format!("network:{}#{call}", request.uri().path())),
        };
        Ok(http::Response::builder()
            .status(StatusCode::OK)
            .header(http::header::CONTENT_TYPE, "text/plain")
            .body(body)
            .expect("valid response"))
    }
}

/// Store double whose reads and writes fail. It holds no generations, so
/// activation and reset succeed.
#[derive(Debug, Clone, Default)]
pub struct FailingStore;

fn failure() -> StoreError {
    StoreError::InternalError(Box::new(std::io::Error::other("disk on fire")))
}

#[async_trait]
impl Store for FailingStore {
    async fn get(
        &self,
        _generation: &GenerationId,
        _key: &RequestKey,
    ) -> StoreResult<Option<StoredResponse>> {
        Err(failure())
    }

    async fn put(
        &self,
        _generation: &GenerationId,
        _key: &RequestKey,
        _value: StoredResponse,
    ) -> StoreResult<()> {
        Err(failure())
    }

    async fn generations(&self) -> StoreResult<Vec<GenerationId>> {
        Ok(Vec::new())
    }

    async fn delete_generation(&self, _generation: &GenerationId) -> StoreResult<DeleteStatus> {
        Ok(DeleteStatus::Missing)
    }

    async fn lookup(&self, _key: &RequestKey) -> StoreResult<Option<StoredResponse>> {
        Err(failure())
    }

    async fn usage(&self) -> StoreResult<u64> {
        Err(failure())
    }
}
