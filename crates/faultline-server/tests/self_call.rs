//! End-to-end: a real listener calling itself through reqwest.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use faultline_server::app_state::AppState;
use faultline_server::config;
use faultline_server::router::build_router;

async fn spawn_server() -> (SocketAddr, AppState) {
    spawn_server_with("dependency:\n  timeout_ms: 5000\n").await
}

async fn spawn_server_with(yaml: &str) -> (SocketAddr, AppState) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut cfg = config::load_from_str(yaml).unwrap();
    cfg.server.port = addr.port();
    let state = AppState::new(cfg).unwrap();
    let app = build_router(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

fn dep(path: &str) -> String {
    // `+` and `/` must survive the query string
    STANDARD
        .encode(path)
        .replace('+', "%2B")
        .replace('/', "%2F")
        .replace('=', "%3D")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn recursive_chain_succeeds() {
    let (addr, state) = spawn_server().await;

    let leaf = "/?name=leaf&sleep=10";
    let mid = format!("/?name=mid&dep={}", dep(leaf));
    let url = format!("http://{addr}/?name=top&dep={}", dep(&mid));

    let res = reqwest::get(&url).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let body = res.text().await.unwrap();
    assert!(body.starts_with("Name: top,"));

    let metrics = state.metrics();
    assert_eq!(metrics.requests.get(&[("code", "200"), ("method", "get")]), 3);
    assert_eq!(metrics.in_flight.get(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failing_hop_fails_the_chain() {
    let (addr, state) = spawn_server().await;

    let url = format!("http://{addr}/?dep={}", dep("/?code=503"));
    let res = reqwest::get(&url).await.unwrap();
    assert_eq!(res.status().as_u16(), 503);

    let metrics = state.metrics();
    assert_eq!(metrics.requests.get(&[("code", "503"), ("method", "get")]), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bad_dependency_path_does_not_stop_the_server() {
    let (addr, _state) = spawn_server().await;

    // no leading slash: http://127.0.0.1:PORTnope is not a valid URL
    let url = format!("http://{addr}/?dep={}", dep("nope"));
    let res = reqwest::get(&url).await.unwrap();
    assert_eq!(res.status().as_u16(), 502);

    let res = reqwest::get(format!("http://{addr}/?name=still-here")).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn saturated_chain_is_shed_not_stuck() {
    // no dependency timeout: only shedding can end the self-call
    let (addr, state) = spawn_server_with("server:\n  max_in_flight: 1\n").await;

    let url = format!("http://{addr}/?dep={}", dep("/?name=leaf"));
    let res = tokio::time::timeout(Duration::from_secs(3), reqwest::get(&url))
        .await
        .expect("one-hop chain must finish")
        .unwrap();
    assert_eq!(res.status().as_u16(), 503);

    let metrics = state.metrics();
    // the shed hop and the outer request both carry 503
    assert_eq!(metrics.requests.get(&[("code", "503"), ("method", "get")]), 2);
    assert_eq!(metrics.in_flight.get(), 0);

    // the permit is released once the chain has finished
    let res = reqwest::get(format!("http://{addr}/?name=after")).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
}
