use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "CarePilot";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable that overrides the database location.
pub const DB_PATH_ENV: &str = "CAREPILOT_DB";

/// Get the application data directory
/// ~/CarePilot/ on all platforms, falling back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the SQLite database path (env override first)
pub fn database_path() -> PathBuf {
    match std::env::var_os(DB_PATH_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => app_data_dir().join("carepilot.db"),
    }
}

/// Get the directory for exported doctor-visit reports
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Tracing filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,carepilot_lib=debug"
}
