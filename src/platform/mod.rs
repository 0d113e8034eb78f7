// Smartmarks platform paths
// Resolves where settings and the local bookmark database live on each OS.
// `SMARTMARKS_CONFIG` and `SMARTMARKS_DATA_DIR` take precedence everywhere.

use std::env;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Environment variable overriding the full path of `settings.json`.
pub const CONFIG_ENV: &str = "SMARTMARKS_CONFIG";
/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SMARTMARKS_DATA_DIR";

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `$XDG_CONFIG_HOME/smartmarks` or `~/.config/smartmarks`
/// - **macOS**: `~/Library/Application Support/Smartmarks`
/// - **Windows**: `%APPDATA%/Smartmarks`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the settings file path, honouring [`CONFIG_ENV`].
pub fn get_settings_path() -> PathBuf {
    match env::var(CONFIG_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => get_config_dir().join("settings.json"),
    }
}

/// Returns the data directory holding the local SQLite store, honouring [`DATA_DIR_ENV`].
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
