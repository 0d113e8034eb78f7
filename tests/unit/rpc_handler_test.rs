//! Unit tests for the RPC handler: all JSON-RPC methods dispatched by `handle_method`.
//!
//! These tests exercise every RPC method through the same code path used by the
//! real `smartmarks-rpc` binary, using a temporary on-disk SQLite database.

use serde_json::json;
use tempfile::TempDir;

use smartmarks::app::App;
use smartmarks::rpc_handler::handle_method;
use smartmarks::services::settings_engine::SettingsEngine;
use smartmarks::types::settings::AppSettings;

/// Create a fresh, started App backed by a temp directory DB.
async fn setup() -> (App, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let mut settings = AppSettings::default();
    settings.store.database_path = tmp.path().join("test.db").to_string_lossy().to_string();
    let engine = SettingsEngine::with_settings(
        tmp.path().join("settings.json").to_string_lossy().to_string(),
        settings,
    );
    let mut app = App::from_settings(engine).expect("Failed to init App");
    app.start().await;
    (app, tmp)
}

async fn signed_in() -> (App, TempDir) {
    let (mut app, tmp) = setup().await;
    handle_method(&mut app, "auth.sign_in", &json!({})).await.unwrap();
    (app, tmp)
}

// ─── Ping ───

#[tokio::test]
async fn test_ping() {
    let (mut app, _tmp) = setup().await;
    let res = handle_method(&mut app, "ping", &json!({})).await.unwrap();
    assert_eq!(res, json!({"pong": true}));
}

// ─── Unknown method ───

#[tokio::test]
async fn test_unknown_method_returns_error() {
    let (mut app, _tmp) = setup().await;
    let res = handle_method(&mut app, "nonexistent.method", &json!({})).await;
    assert_eq!(res.unwrap_err(), "unknown method: nonexistent.method");
}

// ─── Auth ───

#[tokio::test]
async fn test_auth_status_round_trip() {
    let (mut app, _tmp) = setup().await;
    let res = handle_method(&mut app, "auth.status", &json!({})).await.unwrap();
    assert_eq!(res["state"], "anonymous");

    let res = handle_method(&mut app, "auth.sign_in", &json!({})).await.unwrap();
    assert_eq!(res["state"], "authenticated");
    assert_eq!(res["user_id"], "local-user");

    let res = handle_method(&mut app, "auth.sign_out", &json!({})).await.unwrap();
    assert_eq!(res["state"], "anonymous");
}

// ─── Bookmarks ───

#[tokio::test]
async fn test_bookmark_list_requires_sign_in() {
    let (mut app, _tmp) = setup().await;
    let res = handle_method(&mut app, "bookmark.list", &json!({})).await;
    assert_eq!(res.unwrap_err(), "not signed in");
}

#[tokio::test]
async fn test_bookmark_add_and_list() {
    let (mut app, _tmp) = signed_in().await;

    let res = handle_method(
        &mut app,
        "bookmark.add",
        &json!({"title": "Example", "url": "example.com"}),
    )
    .await
    .unwrap();
    assert_eq!(res["ok"], true);
    assert_eq!(res["message"], "Bookmark added!");

    let list = handle_method(&mut app, "bookmark.list", &json!({})).await.unwrap();
    let arr = list["items"].as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["title"], "Example");
    assert_eq!(arr[0]["url"], "https://example.com/");
    assert_eq!(arr[0]["display_url"], "example.com/");
    assert!(arr[0].get("user_id").is_none());
    assert_eq!(list["total"], 1);
    assert_eq!(list["loading"], false);
    assert!(list["error"].is_null());
}

#[tokio::test]
async fn test_bookmark_add_reports_user_messages() {
    let (mut app, _tmp) = signed_in().await;

    let err = handle_method(&mut app, "bookmark.add", &json!({"title": "", "url": "x.com"}))
        .await
        .unwrap_err();
    assert_eq!(err["kind"], "validation");
    assert_eq!(err["message"], "Please fill all fields");

    let err = handle_method(&mut app, "bookmark.add", &json!({"title": "T", "url": "nope"}))
        .await
        .unwrap_err();
    assert_eq!(err["kind"], "validation");
    assert_eq!(err["message"], "Please enter a valid URL (example: google.com)");

    handle_method(&mut app, "bookmark.add", &json!({"title": "T", "url": "x.com"}))
        .await
        .unwrap();
    let err = handle_method(&mut app, "bookmark.add", &json!({"title": "T2", "url": "X.COM/"}))
        .await
        .unwrap_err();
    assert_eq!(err["kind"], "conflict");
    assert_eq!(err["message"], "This bookmark already exists");
}

#[tokio::test]
async fn test_bookmark_add_signed_out_leaves_form_empty() {
    let (mut app, _tmp) = setup().await;
    let err = handle_method(&mut app, "bookmark.add", &json!({"title": "T", "url": "x.com"}))
        .await
        .unwrap_err();
    assert_eq!(err["kind"], "auth");
    assert_eq!(err["message"], "Please sign in first");
    assert!(app.form().title.is_empty());
    assert!(app.form().url.is_empty());
}

#[tokio::test]
async fn test_bookmark_list_with_query_filters_by_title() {
    let (mut app, _tmp) = signed_in().await;
    for (title, url) in [("Rust", "rust-lang.org"), ("Go", "go.dev"), ("Trust me", "trust.example.com")] {
        handle_method(&mut app, "bookmark.add", &json!({"title": title, "url": url}))
            .await
            .unwrap();
    }

    let list = handle_method(&mut app, "bookmark.list", &json!({"query": "RUST"}))
        .await
        .unwrap();
    let titles: Vec<&str> = list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Trust me", "Rust"]);
    assert_eq!(list["total"], 3);
    assert_eq!(list["query"], "RUST");

    let res = handle_method(&mut app, "search.set", &json!({"query": ""})).await.unwrap();
    assert_eq!(res["matches"], 3);
}

#[tokio::test]
async fn test_bookmark_delete() {
    let (mut app, _tmp) = signed_in().await;
    handle_method(&mut app, "bookmark.add", &json!({"title": "Gone", "url": "gone.example.com"}))
        .await
        .unwrap();
    let list = handle_method(&mut app, "bookmark.list", &json!({})).await.unwrap();
    let id = list["items"][0]["id"].as_str().unwrap().to_string();

    handle_method(&mut app, "bookmark.delete", &json!({"id": id})).await.unwrap();
    let list = handle_method(&mut app, "bookmark.list", &json!({})).await.unwrap();
    assert_eq!(list["total"], 0);

    let res = handle_method(&mut app, "bookmark.delete", &json!({})).await;
    assert_eq!(res.unwrap_err(), "missing id");

    handle_method(&mut app, "auth.sign_out", &json!({})).await.unwrap();
    let err = handle_method(&mut app, "bookmark.delete", &json!({"id": "anything"}))
        .await
        .unwrap_err();
    assert_eq!(err["kind"], "auth");
}

#[tokio::test]
async fn test_bookmark_refresh() {
    let (mut app, _tmp) = setup().await;
    let res = handle_method(&mut app, "bookmark.refresh", &json!({})).await;
    assert_eq!(res.unwrap_err(), "not signed in");

    handle_method(&mut app, "auth.sign_in", &json!({})).await.unwrap();
    let res = handle_method(&mut app, "bookmark.refresh", &json!({})).await.unwrap();
    assert_eq!(res["ok"], true);
    assert_eq!(res["count"], 0);
}

// ─── Settings ───

#[tokio::test]
async fn test_settings_get() {
    let (mut app, _tmp) = setup().await;
    let res = handle_method(&mut app, "settings.get", &json!({})).await.unwrap();
    assert_eq!(res["store"]["backend"], "local");
    assert_eq!(res["sync"]["change_debounce_ms"], 50);
}
