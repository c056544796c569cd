mod common;

use serde_json::json;
use vidrelay::{Category, Provider, RelayConfig, RelayError};

use common::{Script, ScriptedTransport, live, relay_with};

const SOURCE: &str = "https://config.example/instances.json";
const A: &str = "https://a.example";
const B: &str = "https://b.example";

#[tokio::test]
async fn reload_replaces_ordering_wholesale() {
    let transport = ScriptedTransport::new();
    let relay = relay_with(&transport, Category::Video, &[A, B], &[], RelayConfig::default());
    relay.rotate(Category::Video);
    assert_eq!(live(&relay, Provider::Primary, Category::Video), vec![B, A]);

    transport.route(
        SOURCE,
        Script::json(json!({
            "version": 3,
            "video": ["https://a.example/", "https://b.example", "https://a.example"],
            "search": ["https://s.example"],
            "channel": [],
            "comments": [],
            "playlist": [],
            "secondary": {"video": ["https://piped.example"]}
        })),
    );

    let snapshot = relay.reload_pool(SOURCE).await.unwrap();

    assert_eq!(snapshot.version, Some(3));
    assert_eq!(live(&relay, Provider::Primary, Category::Video), vec![A, B]);
    assert_eq!(
        live(&relay, Provider::Secondary, Category::Video),
        vec!["https://piped.example"]
    );
    assert!(live(&relay, Provider::Secondary, Category::Search).is_empty());
    assert_eq!(snapshot, relay.describe_pool());
}

#[tokio::test]
async fn failed_reloads_leave_the_pool_untouched() {
    let transport = ScriptedTransport::new();
    let relay = relay_with(&transport, Category::Search, &[A, B], &[], RelayConfig::default());
    relay.rotate(Category::Search);
    let before = relay.describe_pool();

    let failures = [
        ("https://config.example/down", Script::Refuse),
        ("https://config.example/missing", Script::status(404)),
        ("https://config.example/garbage", Script::raw("{\"video\": [")),
        (
            "https://config.example/partial",
            Script::json(json!({"video": ["https://x.example"]})),
        ),
        (
            "https://config.example/bad-url",
            Script::json(json!({
                "video": ["ftp://x.example"], "search": [], "channel": [], "comments": [], "playlist": []
            })),
        ),
        (
            "https://config.example/empty",
            Script::json(json!({
                "video": [], "search": [], "channel": [], "comments": [], "playlist": []
            })),
        ),
    ];

    for (source, script) in failures {
        transport.route(source, script);
        let err = relay.reload_pool(source).await.unwrap_err();
        assert!(matches!(err, RelayError::PoolReload { .. }), "{source}: {err}");
        assert!(err.is_temporarily_unavailable());
        assert_eq!(relay.describe_pool(), before, "{source} changed the pool");
    }
}

#[tokio::test]
async fn reload_without_configured_source_is_a_configuration_error() {
    let transport = ScriptedTransport::new();
    let relay = relay_with(&transport, Category::Video, &[A], &[], RelayConfig::default());

    let err = relay.reload_configured_pool().await.unwrap_err();

    assert!(matches!(err, RelayError::Configuration { .. }));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn stream_validation_flag_survives_reload() {
    let transport = ScriptedTransport::new();
    let config = RelayConfig {
        stream_validation: true,
        ..RelayConfig::default()
    };
    let relay = relay_with(&transport, Category::Video, &[A], &[], config);
    transport.route(
        SOURCE,
        Script::json(json!({
            "video": [B], "search": [], "channel": [], "comments": [], "playlist": []
        })),
    );

    let snapshot = relay.reload_pool(SOURCE).await.unwrap();

    assert!(snapshot.stream_validation);
    assert!(!relay.toggle_stream_validation());
    assert!(!relay.describe_pool().stream_validation);
}
