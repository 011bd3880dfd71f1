use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Medisene";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base URL of the Gemini generative-language API.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Completion model used for symptom analysis.
pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable holding the Google Places API key.
pub const PLACES_API_KEY_ENV: &str = "PLACES_API_KEY";

/// Base URL of the Google Maps Platform APIs.
pub const PLACES_BASE_URL: &str = "https://maps.googleapis.com";

/// Request timeout for completion calls, in seconds.
pub const COMPLETION_TIMEOUT_SECS: u64 = 60;

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "medisene=info"
}

/// Get the application data directory
/// ~/Medisene/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Medisene")
}

/// Default path of the analysis database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("medisene.db")
}

/// Read the Gemini API key from the environment, treating blank as unset.
pub fn gemini_api_key() -> Option<String> {
    std::env::var(GEMINI_API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty())
}

/// Read the Google Places API key from the environment.
pub fn places_api_key() -> Option<String> {
    std::env::var(PLACES_API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty())
}
