//! Smartmarks: a personal bookmark list kept in sync with a remote store.
//!
//! Entry point: runs an interactive console demo of the sync engine against
//! an in-memory store and the local identity provider.

use std::sync::Arc;

use env_logger::Env;

use smartmarks::app::App;
use smartmarks::database::LocalStore;
use smartmarks::managers::session_manager::SessionState;
use smartmarks::providers::persistence::PersistenceProvider;
use smartmarks::services::local_auth::LocalAuthProvider;
use smartmarks::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use smartmarks::types::bookmark::{display_url, NewBookmarkRow};
use smartmarks::types::identity::Identity;
use smartmarks::types::settings::AppSettings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Smartmarks v{} — Demo Mode                   ║", env!("CARGO_PKG_VERSION"));
    println!("║        Your bookmarks, synced across every session          ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    // Defaults only; the demo never touches the user's settings file or database.
    let settings = SettingsEngine::with_settings(String::new(), AppSettings::default());
    let config = settings.get_settings().clone();
    let account = Identity::new(config.auth.local_user_id.clone(), config.auth.local_email.clone());

    let auth = Arc::new(LocalAuthProvider::new(account.clone()));
    let store = Arc::new(LocalStore::open_in_memory()?);
    let mut app = App::new(settings, auth.clone(), store.clone(), store.clone());

    section("Session");
    let state = app.start().await;
    println!("  Startup probe: {}", describe(&state));
    app.sign_in().await?;
    app.process_pending().await;
    println!("  Signed in via {}: {}", config.auth.provider, describe(app.session_state()));
    println!("  Live updates: {}", if app.is_syncing() { "on" } else { "off" });
    println!("  ✓ Session OK");
    println!();

    section("Add Bookmarks");
    for (title, url) in [
        ("The Rust Book", "doc.rust-lang.org/book"),
        ("crates.io", "https://crates.io"),
        ("Tokio", "tokio.rs"),
    ] {
        app.submit(title, url).await?;
        println!("  + {:<14} → {}", title, app.status().map(|s| s.message()).unwrap_or(""));
    }
    for (title, url) in [("", "example.com"), ("Broken", "not a url"), ("Again", "TOKIO.RS/")] {
        if let Err(e) = app.submit(title, url).await {
            println!("  ✗ {:<14} → {}", format!("{:?}", url), e.user_message());
        }
    }
    print_list(&app);
    println!("  ✓ Add gates OK");
    println!();

    section("Remote Changes");
    store
        .insert(
            &config.store.collection,
            NewBookmarkRow {
                title: "Added on phone".to_string(),
                url: "https://example.com/".to_string(),
                user_id: account.id.clone(),
            },
        )
        .await?;
    if let Some(event) = app.next_event().await {
        app.handle_event(event).await;
    }
    println!("  Another session added a bookmark; mirror now holds {}", app.bookmarks().len());
    println!("  ✓ Change notification OK");
    println!();

    section("Search");
    app.set_search_query("RUST");
    for bookmark in app.visible_bookmarks() {
        println!("  • {} ({})", bookmark.title, display_url(&bookmark.url));
    }
    app.set_search_query("");
    println!("  ✓ Search OK");
    println!();

    section("Delete");
    if let Some(oldest) = app.bookmarks().last().cloned() {
        app.delete_bookmark(&oldest.id).await?;
        println!("  Deleted \"{}\"", oldest.title);
    }
    print_list(&app);
    println!("  ✓ Delete OK");
    println!();

    section("Sign Out");
    app.sign_out().await?;
    app.process_pending().await;
    println!("  Session: {}", describe(app.session_state()));
    println!("  Mirror: {} bookmark(s), live updates {}", app.bookmarks().len(),
        if app.is_syncing() { "on" } else { "off" });
    app.shutdown().await;
    println!("  Listeners left: {}, subscriptions left: {}", auth.listener_count(), store.subscriber_count());

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("  ✅ Sync engine demonstrated successfully!");
    println!("  Run `smartmarks-rpc` to drive it from a UI over stdin/stdout.");
    println!("═══════════════════════════════════════════════════════════════");
    Ok(())
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📦 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn describe(state: &SessionState) -> String {
    match state {
        SessionState::Unknown => "resolving…".to_string(),
        SessionState::Anonymous => "signed out".to_string(),
        SessionState::Authenticated(identity) => format!("signed in as {}", identity.email),
    }
}

fn print_list(app: &App) {
    println!("  Mirror ({} bookmark(s), newest first):", app.bookmarks().len());
    for bookmark in app.bookmarks() {
        println!("    - {:<16} {}", bookmark.title, display_url(&bookmark.url));
    }
}
