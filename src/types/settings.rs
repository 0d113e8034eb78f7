use serde::{Deserialize, Serialize};

/// Top-level application settings, persisted as `settings.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            store: StoreSettings::default(),
            auth: AuthSettings::default(),
            sync: SyncSettings::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which persistence backend holds the bookmarks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// SQLite file in the data directory.
    Local,
    /// PostgREST-compatible HTTP endpoint.
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    /// SQLite file path; relative paths resolve against the data directory.
    pub database_path: String,
    pub rest_url: Option<String>,
    pub api_key: Option<String>,
    pub collection: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Local,
            database_path: "smartmarks.db".to_string(),
            rest_url: None,
            api_key: None,
            collection: super::bookmark::BOOKMARKS_COLLECTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthSettings {
    /// OAuth provider name passed to `sign_in`.
    pub provider: String,
    /// Where the provider sends the user after signing in.
    pub redirect_target: String,
    /// Account used by the local auth provider.
    pub local_user_id: String,
    pub local_email: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            provider: "google".to_string(),
            redirect_target: "http://localhost:3000".to_string(),
            local_user_id: "local-user".to_string(),
            local_email: "me@localhost.localdomain".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncSettings {
    /// Quiet period after a change notification before refetching.
    pub change_debounce_ms: u64,
    /// Refetch period when the backend has no realtime channel.
    pub poll_interval_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            change_debounce_ms: 50,
            poll_interval_secs: 15,
        }
    }
}
