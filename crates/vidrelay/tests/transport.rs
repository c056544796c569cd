//! End-to-end checks of the reqwest transport and the stream probe against a
//! local axum server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::net::TcpListener;
use url::Url;
use vidrelay::{
    Category, Instance, PoolDefinition, Provider, Relay, RelayConfig, ReqwestTransport,
    SelectionMode, StreamProbe, Transport,
};

async fn video(Path(id): Path<String>, headers: HeaderMap) -> impl IntoResponse {
    let agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    axum::Json(serde_json::json!({
        "videoId": id,
        "title": "Served locally",
        "description": agent,
        "lengthSeconds": 61,
        "formatStreams": [
            {"url": "http://127.0.0.1/media/ok.mp4", "container": "mp4", "qualityLabel": "360p"}
        ]
    }))
}

async fn media(Path(name): Path<String>, headers: HeaderMap) -> impl IntoResponse {
    let ranged = headers.contains_key(header::RANGE);
    match name.as_str() {
        "ok.mp4" if ranged => (
            StatusCode::PARTIAL_CONTENT,
            [(header::CONTENT_TYPE, "video/mp4")],
            vec![0u8; 1024],
        ),
        "ok.mp4" => (StatusCode::OK, [(header::CONTENT_TYPE, "video/mp4")], vec![0u8; 4096]),
        _ => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            b"<html>removed</html>".to_vec(),
        ),
    }
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/api/v1/videos/{id}", get(video))
        .route("/api/v1/search", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route("/media/{name}", get(media));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn transport() -> ReqwestTransport {
    ReqwestTransport::new(reqwest::Client::new(), vec!["vidrelay-test/1.0".to_string()])
}

#[tokio::test]
async fn get_returns_status_and_body() {
    let base = spawn_server().await;
    let transport = transport();

    let ok = transport
        .get(
            &Url::parse(&format!("{base}/api/v1/videos/abc")).unwrap(),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert!(ok.is_success());
    assert!(ok.body.contains("Served locally"));
    assert!(ok.body.contains("vidrelay-test/1.0"));

    let unavailable = transport
        .get(
            &Url::parse(&format!("{base}/api/v1/search?q=x")).unwrap(),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert_eq!(unavailable.status, 503);
}

#[tokio::test]
async fn unreachable_host_is_a_transport_rejection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = transport()
        .get(
            &Url::parse(&format!("http://{addr}/")).unwrap(),
            Duration::from_secs(2),
        )
        .await
        .unwrap_err();
    assert_eq!(err.reason(), vidrelay::RejectReason::TransportError);
}

#[tokio::test]
async fn probe_distinguishes_video_from_error_pages() {
    let base = spawn_server().await;
    let transport = transport();
    let probe = StreamProbe::new(&transport, Duration::from_secs(2));

    assert!(probe.check(&format!("{base}/media/ok.mp4")).await.is_ok());
    let err = probe
        .check(&format!("{base}/media/gone.mp4"))
        .await
        .unwrap_err();
    assert_eq!(err.reason(), vidrelay::RejectReason::StreamUnplayable);
}

#[tokio::test]
async fn relay_fetches_through_a_live_instance() {
    let base = spawn_server().await;
    let pool = PoolDefinition::builder()
        .primary(Category::Video, vec![Instance::parse(&base).unwrap()])
        .build();
    let config = RelayConfig {
        pool: Some(pool),
        ..RelayConfig::default()
    };
    let transport: Arc<dyn Transport> = Arc::new(transport());
    let relay = Relay::with_transport(config, transport).unwrap();

    let video = relay.fetch_video("xyz", SelectionMode::Combined).await.unwrap();

    assert_eq!(video.provider, Provider::Primary);
    assert_eq!(video.record.video.id, "xyz");
    assert_eq!(video.record.video.length_text, "0:01:01");
}
