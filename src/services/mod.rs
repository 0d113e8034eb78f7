// Smartmarks services
// Pure helpers (URL normalisation, dedup, search) plus the bundled
// collaborator backends and the settings engine.

pub mod dedup;
pub mod local_auth;
pub mod poll_notifier;
#[cfg(feature = "rest")]
pub mod rest_store;
pub mod search_filter;
pub mod settings_engine;
pub mod url_normalizer;
