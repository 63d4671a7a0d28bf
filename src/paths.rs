use std::path::PathBuf;
use std::sync::OnceLock;

/// XDG-compliant directory layout for papi-timer.
///
/// On Linux:
///   Config:  $XDG_CONFIG_HOME/papi-timer  (~/.config/papi-timer)
///   Data:    $XDG_DATA_HOME/papi-timer    (~/.local/share/papi-timer)
///
/// The `dirs` crate handles platform detection. Resolved base paths are
/// cached in static OnceLock cells.

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();
static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

const APP_DIR: &str = "papi-timer";

/// Root data directory: $XDG_DATA_HOME/papi-timer
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    })
}

/// Root config directory: $XDG_CONFIG_HOME/papi-timer
pub fn config_dir() -> &'static PathBuf {
    CONFIG_DIR.get_or_init(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    })
}

/// Config file path: <config_dir>/config.toml
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Log file used while the terminal display owns the screen.
pub fn log_file() -> PathBuf {
    data_dir().join("papi-timer.log")
}
