use std::time::Duration;

use bytes::Bytes;
use cachebench::{
    Config, Dispatcher, FetchEvent, GenerationId, MemoryStore, ResponseSource, Store, Strategy,
};
use http::{Method, StatusCode};

mod common;
use common::{
    FailingStore, ScriptedNetwork, activated, body, get, init_tracing, key, respond, seed,
    stored_body,
};

const URL: &str = "https://app.test/x";

#[tokio::test]
async fn write_through_is_idempotent() {
    for strategy in ["network-first", "cache-first"] {
        let store = MemoryStore::new();
        let network = ScriptedNetwork::answering("hello");
        let dispatcher = activated(&store, &network, strategy).await;

        dispatcher.fetch(get(URL)).await;
        dispatcher.settle().await;
        let first = store
            .get(dispatcher.generation(), &key(URL))
            .await
            .unwrap()
            .expect("stored after first call");

        dispatcher.fetch(get(URL)).await;
        dispatcher.settle().await;
        let second = store
            .get(dispatcher.generation(), &key(URL))
            .await
            .unwrap()
            .expect("stored after second call");

        assert_eq!(first.status(), second.status(), "{strategy}");
        assert_eq!(first.headers(), second.headers(), "{strategy}");
        assert_eq!(first.body(), second.body(), "{strategy}");
        assert_eq!(store.len(), 1, "{strategy}");
    }
}

#[tokio::test]
async fn cache_first_does_not_touch_network_on_hit() {
    let store = MemoryStore::new();
    let network = ScriptedNetwork::new();
    let dispatcher = activated(&store, &network, "cache-first").await;
    seed(&dispatcher, URL, "stored").await;

    let outcome = respond(&dispatcher, URL).await;
    dispatcher.settle().await;

    assert_eq!(outcome.source(), ResponseSource::Store);
    assert_eq!(body(&outcome.into_response()), "stored");
    assert_eq!(network.calls(), 0);
}

#[tokio::test]
async fn network_first_falls_back_to_store() {
    let store = MemoryStore::new();
    let network = ScriptedNetwork::failing();
    let dispatcher = activated(&store, &network, "network-first").await;
    seed(&dispatcher, URL, "stored").await;

    let outcome = respond(&dispatcher, URL).await;

    assert!(outcome.is_cached());
    assert_eq!(body(&outcome.into_response()), "stored");
    assert_eq!(network.calls(), 1);
}

#[tokio::test]
async fn network_first_prefers_network_when_it_answers() {
    let store = MemoryStore::new();
    let network = ScriptedNetwork::answering("fresh");
    let dispatcher = activated(&store, &network, "network-first").await;
    seed(&dispatcher, URL, "stored").await;

    let outcome = respond(&dispatcher, URL).await;
    dispatcher.settle().await;

    assert_eq!(outcome.source(), ResponseSource::Network);
    assert_eq!(body(&outcome.into_response()), "fresh");
    assert_eq!(
        stored_body(&store, dispatcher.generation(), URL).await.as_deref(),
        Some("fresh")
    );
}

#[tokio::test]
async fn double_miss_yields_synthetic_timeout() {
    for (strategy, expected) in [
        ("network-first", "Network error happened"),
        ("cache-first", "Network error happened"),
        ("stale-while-revalidate", "Network error happened"),
        ("cache-then-network", "Both network and cache failed"),
    ] {
        let store = MemoryStore::new();
        let network = ScriptedNetwork::failing();
        let dispatcher = activated(&store, &network, strategy).await;

        let response = dispatcher.fetch(get(URL)).await;
        dispatcher.settle().await;

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT, "{strategy}");
        assert_eq!(
            response.headers()[http::header::CONTENT_TYPE],
            "text/plain",
            "{strategy}"
        );
        assert_eq!(body(&response), expected, "{strategy}");
        assert!(store.is_empty(), "{strategy}");
    }
}

#[tokio::test]
async fn stale_while_revalidate_does_not_wait_for_network() {
    init_tracing();
    let store = MemoryStore::new();
    let network = ScriptedNetwork::answering("new");
    let dispatcher = activated(&store, &network, "stale-while-revalidate").await;
    seed(&dispatcher, URL, "old").await;

    network.hold();
    let outcome = tokio::time::timeout(Duration::from_secs(1), respond(&dispatcher, URL))
        .await
        .expect("stored entry served while the network is pending");
    assert!(outcome.is_cached());
    assert_eq!(body(&outcome.into_response()), "old");
    assert_eq!(
        stored_body(&store, dispatcher.generation(), URL).await.as_deref(),
        Some("old")
    );

    network.release();
    dispatcher.settle().await;

    assert_eq!(network.calls(), 1);
    assert_eq!(
        stored_body(&store, dispatcher.generation(), URL).await.as_deref(),
        Some("new")
    );
}

#[tokio::test]
async fn stale_while_revalidate_waits_for_network_on_miss() {
    let store = MemoryStore::new();
    let network = ScriptedNetwork::answering("fresh");
    let dispatcher = activated(&store, &network, "stale-while-revalidate").await;

    let outcome = respond(&dispatcher, URL).await;
    dispatcher.settle().await;

    assert_eq!(outcome.source(), ResponseSource::Network);
    assert_eq!(body(&outcome.into_response()), "fresh");
    assert_eq!(
        stored_body(&store, dispatcher.generation(), URL).await.as_deref(),
        Some("fresh")
    );
}

#[tokio::test]
async fn stale_while_revalidate_refreshes_on_every_request() {
    let store = MemoryStore::new();
    let network = ScriptedNetwork::new();
    let dispatcher = activated(&store, &network, "stale-while-revalidate").await;
    seed(&dispatcher, URL, "old").await;

    for _ in 0..3 {
        dispatcher.fetch(get(URL)).await;
    }
    dispatcher.settle().await;

    assert_eq!(network.calls(), 3);
}

#[tokio::test]
async fn stale_while_revalidate_absorbs_background_failure() {
    let store = MemoryStore::new();
    let network = ScriptedNetwork::failing();
    let dispatcher = activated(&store, &network, "stale-while-revalidate").await;
    seed(&dispatcher, URL, "old").await;

    let response = dispatcher.fetch(get(URL)).await;
    dispatcher.settle().await;

    assert_eq!(body(&response), "old");
    assert_eq!(
        stored_body(&store, dispatcher.generation(), URL).await.as_deref(),
        Some("old")
    );
}

#[tokio::test]
async fn cache_then_network_prefers_store_and_refreshes() {
    let store = MemoryStore::new();
    let network = ScriptedNetwork::answering("new");
    let dispatcher = activated(&store, &network, "cache-then-network").await;
    seed(&dispatcher, URL, "old").await;

    network.hold();
    let outcome = tokio::time::timeout(Duration::from_secs(1), respond(&dispatcher, URL))
        .await
        .expect("store answers without waiting on the network");
    assert!(outcome.is_cached());
    assert_eq!(body(&outcome.into_response()), "old");

    network.release();
    dispatcher.settle().await;
    assert_eq!(network.calls(), 1);
    assert_eq!(
        stored_body(&store, dispatcher.generation(), URL).await.as_deref(),
        Some("new")
    );
}

#[tokio::test]
async fn cache_then_network_uses_network_on_miss() {
    let store = MemoryStore::new();
    let network = ScriptedNetwork::answering("fresh");
    let dispatcher = activated(&store, &network, "cache-then-network").await;

    let outcome = respond(&dispatcher, URL).await;
    dispatcher.settle().await;

    assert_eq!(outcome.source(), ResponseSource::Network);
    assert_eq!(body(&outcome.into_response()), "fresh");
    assert_eq!(
        stored_body(&store, dispatcher.generation(), URL).await.as_deref(),
        Some("fresh")
    );
}

#[tokio::test]
async fn cache_first_fills_store_on_miss() {
    // Store empty, network answers "hello": the caller gets "hello" and the
    // store holds it afterwards.
    let store = MemoryStore::new();
    let network = ScriptedNetwork::answering("hello");
    let dispatcher = activated(&store, &network, "cache-first").await;

    let response = dispatcher.fetch(get(URL)).await;
    dispatcher.settle().await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response), "hello");
    assert_eq!(
        stored_body(&store, dispatcher.generation(), URL).await.as_deref(),
        Some("hello")
    );
}

#[tokio::test]
async fn cache_then_network_reports_both_failed() {
    let store = MemoryStore::new();
    let network = ScriptedNetwork::failing();
    let dispatcher = activated(&store, &network, "cache-then-network").await;

    let response = dispatcher.fetch(get(URL)).await;
    dispatcher.settle().await;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body(&response), "Both network and cache failed");
}

#[tokio::test]
async fn error_statuses_are_successful_fetches() {
    struct Unavailable;

    #[async_trait::async_trait]
    impl cachebench::Network for Unavailable {
        async fn fetch(&self, _request: cachebench::Request) -> cachebench::NetworkResult {
            Ok(http::Response::builder()
                .status(StatusCode::SERVICE_UNAVAILABLE)
                .body(Bytes::from_static(b"down"))
                .unwrap())
        }
    }

    let store = MemoryStore::new();
    let dispatcher = Dispatcher::new(store.clone(), Unavailable, Config::default());
    dispatcher.activate().await.unwrap();
    seed(&dispatcher, URL, "stored").await;

    let response = dispatcher.fetch(get(URL)).await;
    dispatcher.settle().await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        stored_body(&store, dispatcher.generation(), URL).await.as_deref(),
        Some("down")
    );
}

#[tokio::test]
async fn store_failures_never_reach_the_caller() {
    for strategy in Strategy::ALL {
        let network = ScriptedNetwork::answering("fresh");
        let config = Config::builder().strategy(strategy.as_str()).build().unwrap();
        let dispatcher = Dispatcher::new(FailingStore, network.clone(), config);
        dispatcher.activate().await.unwrap();

        let response = dispatcher.fetch(get(URL)).await;
        dispatcher.settle().await;

        assert_eq!(response.status(), StatusCode::OK, "{strategy}");
        assert_eq!(body(&response), "fresh", "{strategy}");
    }
}

#[tokio::test]
async fn store_read_failure_counts_as_miss() {
    let network = ScriptedNetwork::failing();
    let config = Config::builder().strategy("network-first").build().unwrap();
    let dispatcher = Dispatcher::new(FailingStore, network, config);
    dispatcher.activate().await.unwrap();

    let response = dispatcher.fetch(get(URL)).await;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body(&response), "Network error happened");
}

#[tokio::test]
async fn reads_search_every_generation() {
    let store = MemoryStore::new();
    let network = ScriptedNetwork::new();
    let dispatcher = activated(&store, &network, "cache-first").await;
    store
        .put(&GenerationId::new("side-loaded"), &key(URL), common::snapshot("legacy"))
        .await
        .unwrap();

    let response = dispatcher.fetch(get(URL)).await;

    assert_eq!(body(&response), "legacy");
    assert_eq!(network.calls(), 0);
}

#[tokio::test]
async fn non_get_requests_are_answered_but_not_stored() {
    let store = MemoryStore::new();
    let network = ScriptedNetwork::answering("created");
    let dispatcher = activated(&store, &network, "network-first").await;

    let request = http::Request::builder()
        .method(Method::POST)
        .uri(URL)
        .body(Bytes::from_static(b"payload"))
        .unwrap();
    let outcome = dispatcher
        .respond(FetchEvent::new(request, dispatcher.offload().clone()))
        .await;
    dispatcher.settle().await;

    assert_eq!(outcome.source(), ResponseSource::Network);
    assert_eq!(body(&outcome.into_response()), "created");
    assert!(store.is_empty());
}
