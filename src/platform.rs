// Platform-specific locations for the bars' config file and synced store.
//
// Linux:   $XDG_CONFIG_HOME/extra-bars, $XDG_DATA_HOME/extra-bars
// macOS:   ~/Library/Application Support/ExtraBars (both)
// Windows: %APPDATA%/ExtraBars (both)

use std::env;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join("extra-bars"),
        _ => {
            let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
            fallback
                .iter()
                .fold(PathBuf::from(home), |path, part| path.join(part))
                .join("extra-bars")
        }
    }
}

/// Directory holding `config.json`.
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        xdg_dir("XDG_CONFIG_HOME", &[".config"])
    }
    #[cfg(target_os = "macos")]
    {
        let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
        PathBuf::from(home)
            .join("Library")
            .join("Application Support")
            .join("ExtraBars")
    }
    #[cfg(target_os = "windows")]
    {
        let appdata = env::var("APPDATA")
            .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
        PathBuf::from(appdata).join("ExtraBars")
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        env::temp_dir().join("extra-bars")
    }
}

/// Directory holding the SQLite store.
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        xdg_dir("XDG_DATA_HOME", &[".local", "share"])
    }
    #[cfg(not(target_os = "linux"))]
    {
        get_config_dir()
    }
}

/// Default path of the synced store database.
pub fn default_database_path() -> PathBuf {
    get_data_dir().join("bars.db")
}
