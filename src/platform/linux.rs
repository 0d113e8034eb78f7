// Linux: XDG base directories.

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// `$XDG_CONFIG_HOME/smartmarks`, falling back to `~/.config/smartmarks`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg).join("smartmarks"),
        Err(_) => home_dir().join(".config").join("smartmarks"),
    }
}

/// `$XDG_DATA_HOME/smartmarks`, falling back to `~/.local/share/smartmarks`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) => PathBuf::from(xdg).join("smartmarks"),
        Err(_) => home_dir().join(".local").join("share").join("smartmarks"),
    }
}
