//! RPC method handler for the Smartmarks JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches one call to the [`App`] and settles any auth
//! events or change notifications the call produced before answering, so a
//! response always reflects the state after the call.

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::bookmark_store::FetchOutcome;
use crate::managers::session_manager::SessionState;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::{display_url, Bookmark};
use crate::types::errors::BookmarkError;

fn plain_error(message: impl Into<String>) -> Value {
    Value::String(message.into())
}

/// Bookmark failures carry their kind so a client can tell bad input from a
/// conflict or a transport failure.
fn bookmark_error(e: &BookmarkError) -> Value {
    json!({"kind": e.kind(), "message": e.user_message(), "detail": e.to_string()})
}

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, Value> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| plain_error(format!("missing {}", name)))
}

fn bookmark_json(b: &Bookmark) -> Value {
    json!({
        "id": b.id,
        "title": b.title,
        "url": b.url,
        "display_url": display_url(&b.url),
        "created_at": b.created_at.to_rfc3339(),
    })
}

/// Session summary as reported by `auth.status`.
pub fn session_json(state: &SessionState) -> Value {
    match state {
        SessionState::Unknown => json!({"state": "unknown"}),
        SessionState::Anonymous => json!({"state": "anonymous"}),
        SessionState::Authenticated(identity) => json!({
            "state": "authenticated",
            "user_id": identity.id,
            "email": identity.email,
        }),
    }
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success. Errors are a plain message string, except
/// for `bookmark.add` and `bookmark.delete`, which answer with
/// `{"kind", "message", "detail"}`.
pub async fn handle_method(app: &mut App, method: &str, params: &Value) -> Result<Value, Value> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Auth ───
        "auth.status" => Ok(session_json(app.session_state())),
        "auth.sign_in" => {
            app.sign_in().await.map_err(|e| plain_error(e.to_string()))?;
            app.process_pending().await;
            Ok(session_json(app.session_state()))
        }
        "auth.sign_out" => {
            app.sign_out().await.map_err(|e| plain_error(e.to_string()))?;
            app.process_pending().await;
            Ok(session_json(app.session_state()))
        }

        // ─── Bookmarks ───
        "bookmark.list" => {
            if !app.session_state().is_authenticated() {
                return Err(plain_error("not signed in"));
            }
            if let Some(query) = params.get("query").and_then(|v| v.as_str()) {
                app.set_search_query(query);
            }
            app.process_pending().await;
            let items: Vec<Value> = app.visible_bookmarks().iter().map(bookmark_json).collect();
            Ok(json!({
                "items": items,
                "total": app.bookmarks().len(),
                "query": app.search_query(),
                "loading": app.is_loading(),
                "error": app.last_fetch_error().map(|e| e.to_string()),
            }))
        }
        "bookmark.add" => {
            let title = params.get("title").and_then(|v| v.as_str()).unwrap_or("");
            let url = params.get("url").and_then(|v| v.as_str()).unwrap_or("");
            match app.submit(title, url).await {
                Ok(()) => Ok(json!({
                    "ok": true,
                    "message": app.status().map(|s| s.message().to_string()),
                })),
                Err(e) => Err(bookmark_error(&e)),
            }
        }
        "bookmark.delete" => {
            let id = str_param(params, "id")?;
            app.delete_bookmark(id).await.map_err(|e| bookmark_error(&e))?;
            Ok(json!({"ok": true}))
        }
        "bookmark.refresh" => match app.refresh().await {
            Some(FetchOutcome::Applied(count)) => Ok(json!({"ok": true, "count": count})),
            Some(FetchOutcome::Superseded) => Ok(json!({"ok": true, "superseded": true})),
            Some(FetchOutcome::Failed(e)) => Err(plain_error(e.to_string())),
            None => Err(plain_error("not signed in")),
        },
        "search.set" => {
            let query = str_param(params, "query")?;
            app.set_search_query(query);
            Ok(json!({"ok": true, "matches": app.visible_bookmarks().len()}))
        }

        // ─── Settings ───
        "settings.get" => {
            serde_json::to_value(app.settings().get_settings()).map_err(|e| plain_error(e.to_string()))
        }

        _ => Err(plain_error(format!("unknown method: {}", method))),
    }
}
