mod common;

use std::time::Duration;

use vidrelay::{Category, Provider, RelayConfig, RelayError, SelectionMode};

use common::{Script, ScriptedTransport, comments_payload, live, relay_with, video_payload};

const A: &str = "https://a.example";
const B: &str = "https://b.example";
const C: &str = "https://c.example";

#[tokio::test]
async fn fan_out_keeps_every_accepted_source_in_priority_order() {
    let transport = ScriptedTransport::new();
    transport.route(A, Script::json(comments_payload(&["first", "second"])));
    transport.route(B, Script::status(500));
    transport.route(C, Script::json(comments_payload(&["third"])));
    let relay = relay_with(&transport, Category::Comments, &[A, B, C], &[], RelayConfig::default());

    let all = relay
        .fetch_comments_from_all("abc", SelectionMode::Combined)
        .await
        .unwrap();

    let sources: Vec<_> = all.iter().map(|s| s.source.as_str()).collect();
    assert_eq!(sources, vec![A, C]);
    assert_eq!(all[0].record.len(), 2);
    assert_eq!(all[1].record[0].content, "third");
    assert_eq!(live(&relay, Provider::Primary, Category::Comments), vec![A, C, B]);
}

#[tokio::test(start_paused = true)]
async fn order_follows_the_snapshot_not_completion_time() {
    let transport = ScriptedTransport::new();
    transport.route(
        A,
        Script::json(comments_payload(&["slow"])).after(Duration::from_secs(3)),
    );
    transport.route(B, Script::json(comments_payload(&["fast"])));
    let relay = relay_with(&transport, Category::Comments, &[A, B], &[], RelayConfig::default());

    let all = relay
        .fetch_comments_from_all("abc", SelectionMode::Combined)
        .await
        .unwrap();

    assert_eq!(all[0].record[0].content, "slow");
    assert_eq!(all[1].record[0].content, "fast");
}

#[tokio::test]
async fn fan_out_fails_only_when_nothing_was_accepted() {
    let transport = ScriptedTransport::new();
    transport.route(A, Script::Refuse);
    transport.route(B, Script::raw("not json"));
    let relay = relay_with(&transport, Category::Comments, &[A, B], &[], RelayConfig::default());

    let err = relay
        .fetch_comments_from_all("abc", SelectionMode::Combined)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RelayError::AllInstancesExhausted {
            category: Category::Comments,
            attempted: 2,
            ..
        }
    ));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn fan_out_spans_both_providers() {
    const PIPED: &str = "https://piped.example";
    let transport = ScriptedTransport::new();
    transport.route(A, Script::json(video_payload("Primary", "https://m.a/v")));
    transport.route(
        PIPED,
        Script::json(serde_json::json!({"title": "Secondary", "videoStreams": []})),
    );
    let relay = relay_with(&transport, Category::Video, &[A], &[PIPED], RelayConfig::default());

    let all = relay
        .fetch_video_from_all("abc", SelectionMode::Combined)
        .await
        .unwrap();

    let titles: Vec<_> = all.iter().map(|s| s.record.video.title.as_str()).collect();
    assert_eq!(titles, vec!["Primary", "Secondary"]);
    assert_eq!(all[1].provider, Provider::Secondary);
}

#[tokio::test(start_paused = true)]
async fn cancelled_fan_out_skips_candidates_not_yet_started() {
    let transport = ScriptedTransport::new();
    transport.route(A, Script::status(503).after(Duration::from_secs(1)));
    transport.route(B, Script::json(comments_payload(&["x"])));
    let config = RelayConfig {
        fanout_concurrency: 1,
        ..RelayConfig::default()
    };
    let relay = relay_with(&transport, Category::Comments, &[A, B], &[], config);

    let (cancelled, ()) = tokio::join!(
        relay.fetch_comments_from_all("abc", SelectionMode::Combined),
        async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            relay.cancel_in_flight();
        }
    );

    assert!(matches!(cancelled, Err(RelayError::Cancelled)));
    assert_eq!(transport.requests_to(B), 0);

    let all = relay
        .fetch_comments_from_all("abc", SelectionMode::Combined)
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].source.as_str(), B);
}
