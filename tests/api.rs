mod common;

use common::TestServer;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

struct Account {
    token: String,
    user_id: String,
}

async fn register(client: &Client, server: &TestServer, email: &str, name: &str) -> Account {
    let resp: Value = client
        .post(server.url("/api/v1/auth/register"))
        .json(&json!({"email": email, "password": "correct-horse", "name": name}))
        .send()
        .await
        .expect("register")
        .json()
        .await
        .expect("parse register response");

    Account {
        token: resp["data"]["token"].as_str().expect("token").to_string(),
        user_id: resp["data"]["user"]["id"]
            .as_str()
            .expect("user id")
            .to_string(),
    }
}

async fn register_creator(
    client: &Client,
    server: &TestServer,
    email: &str,
    name: &str,
) -> Account {
    let account = register(client, server, email, name).await;

    let resp = client
        .post(server.url("/api/v1/auth/become-creator"))
        .bearer_auth(&account.token)
        .send()
        .await
        .expect("become creator");
    assert_eq!(resp.status(), StatusCode::OK);

    account
}

async fn create_video(
    client: &Client,
    server: &TestServer,
    token: &str,
    title: &str,
    price_cents: i64,
) -> String {
    let resp = client
        .post(server.url("/api/v1/videos"))
        .bearer_auth(token)
        .json(&json!({
            "media_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "title": title,
            "price_cents": price_cents
        }))
        .send()
        .await
        .expect("create video");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("parse video response");
    body["data"]["id"].as_str().expect("video id").to_string()
}

async fn check_access(client: &Client, server: &TestServer, token: &str, video_id: &str) -> Value {
    let resp: Value = client
        .get(server.url(&format!("/api/v1/videos/{video_id}/access")))
        .bearer_auth(token)
        .send()
        .await
        .expect("check access")
        .json()
        .await
        .expect("parse access response");
    resp["data"].clone()
}

#[tokio::test]
async fn paid_video_purchase_flow() {
    let server = TestServer::start().await;
    let client = Client::new();

    let creator = register_creator(&client, &server, "creator@example.com", "Creator").await;
    let viewer = register(&client, &server, "viewer@example.com", "Viewer").await;

    let video_id = create_video(&client, &server, &creator.token, "Paid video", 500).await;

    let verdict = check_access(&client, &server, &viewer.token, &video_id).await;
    assert_eq!(verdict["has_access"], json!(false));
    assert_eq!(verdict["reason"], json!("not_purchased"));

    // The creator sees their own video without any purchase.
    let verdict = check_access(&client, &server, &creator.token, &video_id).await;
    assert_eq!(verdict["has_access"], json!(true));
    assert_eq!(verdict["reason"], json!("creator"));

    let resp = client
        .post(server.url(&format!("/api/v1/videos/{video_id}/purchase")))
        .bearer_auth(&viewer.token)
        .send()
        .await
        .expect("purchase video");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("parse purchase response");
    assert_eq!(body["data"]["amount_cents"], json!(500));

    let verdict = check_access(&client, &server, &viewer.token, &video_id).await;
    assert_eq!(verdict["has_access"], json!(true));
    assert_eq!(verdict["reason"], json!("purchased"));

    // Purchasing twice is rejected.
    let resp = client
        .post(server.url(&format!("/api/v1/videos/{video_id}/purchase")))
        .bearer_auth(&viewer.token)
        .send()
        .await
        .expect("purchase again");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Creators cannot purchase their own videos.
    let resp = client
        .post(server.url(&format!("/api/v1/videos/{video_id}/purchase")))
        .bearer_auth(&creator.token)
        .send()
        .await
        .expect("self purchase");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // The purchase shows up in the viewer's library.
    let resp: Value = client
        .get(server.url("/api/v1/purchases"))
        .bearer_auth(&viewer.token)
        .send()
        .await
        .expect("list purchases")
        .json()
        .await
        .expect("parse purchases");
    let purchases = resp["data"].as_array().expect("purchases array");
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0]["video_id"], json!(video_id));
}

#[tokio::test]
async fn free_video_needs_no_purchase() {
    let server = TestServer::start().await;
    let client = Client::new();

    let creator = register_creator(&client, &server, "creator@example.com", "Creator").await;
    let viewer = register(&client, &server, "viewer@example.com", "Viewer").await;

    let video_id = create_video(&client, &server, &creator.token, "Free video", 0).await;

    let verdict = check_access(&client, &server, &viewer.token, &video_id).await;
    assert_eq!(verdict["has_access"], json!(true));
    assert_eq!(verdict["reason"], json!("free"));

    let resp = client
        .post(server.url(&format!("/api/v1/videos/{video_id}/purchase")))
        .bearer_auth(&viewer.token)
        .send()
        .await
        .expect("purchase free video");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bundle_purchase_unlocks_selection() {
    let server = TestServer::start().await;
    let client = Client::new();

    let creator = register_creator(&client, &server, "creator@example.com", "Creator").await;
    let viewer = register(&client, &server, "viewer@example.com", "Viewer").await;

    let mut video_ids = Vec::new();
    for i in 0..4 {
        video_ids
            .push(create_video(&client, &server, &creator.token, &format!("Video {i}"), 1000).await);
    }

    let resp = client
        .post(server.url("/api/v1/bundles"))
        .bearer_auth(&creator.token)
        .json(&json!({"name": "Starter pack", "video_count": 3, "price_cents": 1000}))
        .send()
        .await
        .expect("create bundle");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("parse bundle response");
    let bundle_id = body["data"]["id"].as_str().expect("bundle id").to_string();

    // The bundle is listed on the creator's public page.
    let resp: Value = client
        .get(server.url(&format!("/api/v1/creators/{}/bundles", creator.user_id)))
        .send()
        .await
        .expect("list bundles")
        .json()
        .await
        .expect("parse bundles");
    assert_eq!(resp["data"].as_array().expect("bundles").len(), 1);

    // Wrong selection count is rejected before anything is written.
    let resp = client
        .post(server.url(&format!("/api/v1/bundles/{bundle_id}/purchase")))
        .bearer_auth(&viewer.token)
        .json(&json!({"selected_video_ids": [video_ids[0], video_ids[1]]}))
        .send()
        .await
        .expect("short selection");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(server.url(&format!("/api/v1/bundles/{bundle_id}/purchase")))
        .bearer_auth(&viewer.token)
        .json(&json!({"selected_video_ids": [video_ids[0], video_ids[1], video_ids[2]]}))
        .send()
        .await
        .expect("purchase bundle");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("parse bundle purchase");
    assert_eq!(body["data"]["videos_unlocked"], json!(3));

    for video_id in &video_ids[0..3] {
        let verdict = check_access(&client, &server, &viewer.token, video_id).await;
        assert_eq!(verdict["has_access"], json!(true));
        assert_eq!(verdict["reason"], json!("bundle"));
    }

    // The fourth video was not part of the selection.
    let verdict = check_access(&client, &server, &viewer.token, &video_ids[3]).await;
    assert_eq!(verdict["has_access"], json!(false));
    assert_eq!(verdict["reason"], json!("not_purchased"));
}

#[tokio::test]
async fn subscription_lifecycle() {
    let server = TestServer::start().await;
    let client = Client::new();

    let creator = register_creator(&client, &server, "creator@example.com", "Creator").await;
    let viewer = register(&client, &server, "viewer@example.com", "Viewer").await;

    let video_id = create_video(&client, &server, &creator.token, "Members only", 500).await;

    let resp = client
        .post(server.url("/api/v1/plans"))
        .bearer_auth(&creator.token)
        .json(&json!({"monthly_price_cents": 999}))
        .send()
        .await
        .expect("create plan");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("parse plan response");
    let plan_id = body["data"]["id"].as_str().expect("plan id").to_string();

    // One plan per creator.
    let resp = client
        .post(server.url("/api/v1/plans"))
        .bearer_auth(&creator.token)
        .json(&json!({"monthly_price_cents": 1999}))
        .send()
        .await
        .expect("create second plan");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // The plan is visible on the creator's public page.
    let resp: Value = client
        .get(server.url(&format!("/api/v1/creators/{}/plan", creator.user_id)))
        .send()
        .await
        .expect("public plan")
        .json()
        .await
        .expect("parse public plan");
    assert_eq!(resp["data"]["id"], json!(plan_id));

    let resp = client
        .post(server.url(&format!("/api/v1/plans/{plan_id}/subscribe")))
        .bearer_auth(&viewer.token)
        .send()
        .await
        .expect("subscribe");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("parse subscribe response");
    let subscription_id = body["data"]["subscription_id"]
        .as_str()
        .expect("subscription id")
        .to_string();

    let verdict = check_access(&client, &server, &viewer.token, &video_id).await;
    assert_eq!(verdict["has_access"], json!(true));
    assert_eq!(verdict["reason"], json!("subscription"));

    // Subscribing twice while active is rejected.
    let resp = client
        .post(server.url(&format!("/api/v1/plans/{plan_id}/subscribe")))
        .bearer_auth(&viewer.token)
        .send()
        .await
        .expect("subscribe again");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // The subscription shows in the viewer's list while active.
    let resp: Value = client
        .get(server.url("/api/v1/subscriptions"))
        .bearer_auth(&viewer.token)
        .send()
        .await
        .expect("list subscriptions")
        .json()
        .await
        .expect("parse subscriptions");
    assert_eq!(resp["data"].as_array().expect("subscriptions").len(), 1);

    // Cancel: access is revoked immediately.
    let resp = client
        .delete(server.url(&format!("/api/v1/subscriptions/{subscription_id}")))
        .bearer_auth(&viewer.token)
        .send()
        .await
        .expect("unsubscribe");
    assert_eq!(resp.status(), StatusCode::OK);

    let verdict = check_access(&client, &server, &viewer.token, &video_id).await;
    assert_eq!(verdict["has_access"], json!(false));

    // Re-subscribing reuses the same row.
    let resp = client
        .post(server.url(&format!("/api/v1/plans/{plan_id}/subscribe")))
        .bearer_auth(&viewer.token)
        .send()
        .await
        .expect("resubscribe");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("parse resubscribe response");
    assert_eq!(body["data"]["subscription_id"], json!(subscription_id));
}

#[tokio::test]
async fn ownership_and_auth_rules() {
    let server = TestServer::start().await;
    let client = Client::new();

    let creator = register_creator(&client, &server, "creator@example.com", "Creator").await;
    let other = register_creator(&client, &server, "other@example.com", "Other").await;
    let viewer = register(&client, &server, "viewer@example.com", "Viewer").await;

    let video_id = create_video(&client, &server, &creator.token, "Mine", 500).await;

    // Non-creators cannot publish.
    let resp = client
        .post(server.url("/api/v1/videos"))
        .bearer_auth(&viewer.token)
        .json(&json!({
            "media_url": "https://youtu.be/abc123",
            "title": "Nope",
            "price_cents": 100
        }))
        .send()
        .await
        .expect("viewer create video");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Another creator cannot touch the video.
    let resp = client
        .put(server.url(&format!("/api/v1/videos/{video_id}")))
        .bearer_auth(&other.token)
        .json(&json!({"title": "Hijacked"}))
        .send()
        .await
        .expect("foreign update");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Missing resources report 404 before ownership.
    let resp = client
        .put(server.url("/api/v1/videos/does-not-exist"))
        .bearer_auth(&other.token)
        .json(&json!({"title": "Hijacked"}))
        .send()
        .await
        .expect("missing update");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // No token, no access check.
    let resp = client
        .get(server.url(&format!("/api/v1/videos/{video_id}/access")))
        .send()
        .await
        .expect("anonymous access check");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Public catalog endpoints work unauthenticated.
    let resp = client
        .get(server.url(&format!("/api/v1/creators/{}/videos", creator.user_id)))
        .send()
        .await
        .expect("public list");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("parse list");
    assert_eq!(body["data"].as_array().expect("videos").len(), 1);

    // Duplicate registration is a conflict.
    let resp = client
        .post(server.url("/api/v1/auth/register"))
        .json(&json!({
            "email": "viewer@example.com",
            "password": "correct-horse",
            "name": "Viewer again"
        }))
        .send()
        .await
        .expect("duplicate register");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Wrong password and unknown email look identical.
    let resp = client
        .post(server.url("/api/v1/auth/login"))
        .json(&json!({"email": "viewer@example.com", "password": "wrong-horse"}))
        .send()
        .await
        .expect("bad login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Becoming a creator twice is rejected.
    let resp = client
        .post(server.url("/api/v1/auth/become-creator"))
        .bearer_auth(&other.token)
        .send()
        .await
        .expect("become creator twice");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
