mod common;

use common::{anonymous, authed, client, MockTransport};
use reqwest::{Method, StatusCode};
use serde_json::json;
use znap::client::ClientError;
use znap::model::{Id, Period, Post};

fn post_fixture() -> serde_json::Value {
    json!([
        {
            "id": "p1",
            "title": "First",
            "content": "<p>one</p>",
            "author_username": "alpha",
            "created_at": "2026-01-01T00:00:00Z",
            "comment_count": 3
        },
        {
            "id": "p2",
            "title": "Second",
            "content": "<p>two</p>",
            "author_username": "beta",
            "created_at": "2026-01-02T00:00:00Z",
            "comment_count": 0
        }
    ])
}

#[tokio::test]
async fn test_list_posts_round_trips_fixture() {
    let transport = MockTransport::ok(post_fixture());
    let posts = client(anonymous(), &transport).list_posts(10).await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title.as_deref(), Some("First"));
    assert_eq!(posts[1].author_username.as_deref(), Some("beta"));
    assert_eq!(serde_json::to_value(&posts).unwrap(), post_fixture());

    let request = transport.last_request();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path(), "/posts");
    assert_eq!(request.query_value("limit"), Some("10"));
    assert_eq!(request.api_key, None);
}

#[tokio::test]
async fn test_list_posts_accepts_items_envelope() {
    let transport = MockTransport::ok(json!({ "items": post_fixture(), "total": 2 }));
    let posts = client(anonymous(), &transport).list_posts(2).await.unwrap();

    assert_eq!(serde_json::to_value(&posts).unwrap(), post_fixture());
}

#[tokio::test]
async fn test_get_comments_round_trips_fixture() {
    let fixture = json!([
        {"id": "c1", "content": "<p>nice</p>", "author_username": "gamma", "created_at": "2026-01-03T00:00:00Z"}
    ]);
    let transport = MockTransport::ok(fixture.clone());
    let comments = client(anonymous(), &transport).get_comments("p1").await.unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(serde_json::to_value(&comments).unwrap(), fixture);
    assert_eq!(transport.last_request().path(), "/posts/p1/comments");
}

#[tokio::test]
async fn test_get_user_posts_sends_limit() {
    let transport = MockTransport::ok(post_fixture());
    let posts = client(anonymous(), &transport)
        .get_user_posts("alpha", 3)
        .await
        .unwrap();

    assert_eq!(posts.len(), 2);
    let request = transport.last_request();
    assert_eq!(request.path(), "/users/alpha/posts");
    assert_eq!(request.query_value("limit"), Some("3"));
}

#[tokio::test]
async fn test_get_post_tolerates_missing_fields() {
    let transport = MockTransport::ok(json!({"id": "p9"}));
    let post = client(anonymous(), &transport).get_post("p9").await.unwrap();

    assert_eq!(
        post,
        Post {
            id: Some(Id::from("p9")),
            ..Default::default()
        }
    );
}

#[tokio::test]
async fn test_mutating_operations_require_api_key() {
    let transport = MockTransport::ok(json!({}));
    let client = client(anonymous(), &transport);

    let results = vec![
        client.create_post("t", "c").await.map(|_| ()),
        client.add_comment("p1", "c").await.map(|_| ()),
        client.update_wallet(Some("0xabc")).await.map(|_| ()),
        client.vote_post("p1", 1).await.map(|_| ()),
        client.vote_comment("c1", -1).await.map(|_| ()),
    ];

    for result in results {
        assert!(matches!(result, Err(ClientError::Config(_))));
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_create_post_wraps_plain_content() {
    let transport = MockTransport::ok(json!({"id": "p1", "title": "Hi", "content": "<p>hello</p>"}));
    let post = client(authed(), &transport)
        .create_post("Hi", "hello")
        .await
        .unwrap();

    assert_eq!(post.id, Some(Id::from("p1")));
    let request = transport.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path(), "/posts");
    assert_eq!(request.api_key.as_deref(), Some("test-key"));
    assert_eq!(
        request.body,
        Some(json!({"title": "Hi", "content": "<p>hello</p>"}))
    );
}

#[tokio::test]
async fn test_add_comment_keeps_existing_paragraph() {
    let transport = MockTransport::ok(json!({"id": "c1", "content": "<p>hi</p>"}));
    client(authed(), &transport)
        .add_comment("p1", "<p>hi</p>")
        .await
        .unwrap();

    let request = transport.last_request();
    assert_eq!(request.path(), "/posts/p1/comments");
    assert_eq!(request.body, Some(json!({"content": "<p>hi</p>"})));
}

#[tokio::test]
async fn test_remote_error_echoes_body_for_writes() {
    let transport = MockTransport::status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let err = client(authed(), &transport)
        .create_post("t", "c")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to create post: boom");
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn test_remote_error_uses_status_text_for_reads() {
    let transport = MockTransport::status(StatusCode::NOT_FOUND, "{\"error\":\"nope\"}");
    let err = client(anonymous(), &transport).get_post("x").await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to fetch post: Not Found");
}

#[tokio::test]
async fn test_remote_error_empty_body_falls_back_to_status_text() {
    let transport = MockTransport::status(StatusCode::BAD_GATEWAY, "  ");
    let err = client(authed(), &transport)
        .vote_post("p1", 1)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to vote on post: Bad Gateway");
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
    let transport = MockTransport::status(StatusCode::OK, "<html>");
    let err = client(anonymous(), &transport).get_stats().await.unwrap_err();

    assert!(matches!(err, ClientError::Parse(_)));
}

#[tokio::test]
async fn test_register_reads_nested_envelope() {
    let transport = MockTransport::ok(json!({"user": {"api_key": "abc", "username": "bot"}}));
    let registration = client(anonymous(), &transport)
        .register("bot", None)
        .await
        .unwrap();

    assert_eq!(registration.api_key.as_deref(), Some("abc"));
    assert_eq!(registration.username, "bot");

    let request = transport.last_request();
    assert_eq!(request.path(), "/users");
    assert_eq!(request.api_key, None);
    assert_eq!(request.body, Some(json!({"username": "bot"})));
}

#[tokio::test]
async fn test_register_reads_flat_envelope() {
    let transport = MockTransport::ok(json!({"api_key": "abc", "wallet_address": "0x1"}));
    let registration = client(anonymous(), &transport)
        .register("bot", Some("0x1"))
        .await
        .unwrap();

    assert_eq!(registration.api_key.as_deref(), Some("abc"));
    assert_eq!(registration.wallet_address.as_deref(), Some("0x1"));
    assert_eq!(
        transport.last_request().body,
        Some(json!({"username": "bot", "wallet_address": "0x1"}))
    );
}

#[tokio::test]
async fn test_update_wallet_sends_null_to_remove() {
    let transport = MockTransport::ok(json!({"user": {"wallet_address": null}}));
    let update = client(authed(), &transport).update_wallet(None).await.unwrap();

    assert_eq!(update.wallet_address, None);
    let request = transport.last_request();
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.path(), "/users/me/wallet");
    assert_eq!(request.body, Some(json!({"wallet_address": null})));
}

#[tokio::test]
async fn test_vote_comment_decodes_tally() {
    let transport = MockTransport::ok(json!({"score": -2, "upvotes": 1, "downvotes": 3}));
    let vote = client(authed(), &transport)
        .vote_comment("c7", -1)
        .await
        .unwrap();

    assert_eq!(vote.score, -2);
    assert_eq!(vote.upvotes, 1);
    assert_eq!(vote.downvotes, 3);
    let request = transport.last_request();
    assert_eq!(request.path(), "/comments/c7/vote");
    assert_eq!(request.body, Some(json!({"value": -1})));
}

#[tokio::test]
async fn test_leaderboard_query() {
    let transport = MockTransport::ok(json!({"period": "week", "entries": []}));
    let board = client(anonymous(), &transport)
        .get_leaderboard(Period::Week, 5)
        .await
        .unwrap();

    assert_eq!(board.get("period"), Some(&json!("week")));
    let request = transport.last_request();
    assert_eq!(request.path(), "/leaderboard");
    assert_eq!(request.query_value("period"), Some("week"));
    assert_eq!(request.query_value("limit"), Some("5"));
}

#[tokio::test]
async fn test_update_wallet_without_echo_reports_requested_address() {
    let transport = MockTransport::ok(json!({"ok": true}));
    let update = client(authed(), &transport)
        .update_wallet(Some("0xabc"))
        .await
        .unwrap();

    assert_eq!(update.wallet_address.as_deref(), Some("0xabc"));

    let transport = MockTransport::ok(json!({"ok": true}));
    let update = client(authed(), &transport).update_wallet(None).await.unwrap();
    assert_eq!(update.wallet_address, None);
}

#[tokio::test]
async fn test_list_posts_numeric_ids_and_null_counters() {
    let fixture = json!([
        {"id": 101, "title": "n", "comment_count": null},
        {"id": "p2", "title": "s", "comment_count": 4}
    ]);
    let transport = MockTransport::ok(fixture);
    let posts = client(anonymous(), &transport).list_posts(2).await.unwrap();

    assert_eq!(posts[0].id, Some(Id::from(101u64)));
    assert_eq!(posts[0].comment_count, None);
    assert_eq!(posts[1].comment_count, Some(4));
    assert_eq!(
        serde_json::to_value(&posts).unwrap(),
        json!([
            {"id": 101, "title": "n"},
            {"id": "p2", "title": "s", "comment_count": 4}
        ])
    );
}

#[tokio::test]
async fn test_negative_limit_is_sent_unchanged() {
    let transport = MockTransport::ok(json!([]));
    client(anonymous(), &transport).list_posts(-1).await.unwrap();

    assert_eq!(transport.last_request().query_value("limit"), Some("-1"));
}
