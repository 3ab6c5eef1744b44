use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Followup";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable carrying the completion-service credential.
/// Absence of this variable puts extraction on the fallback path.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Optional override for the completion-service base URL.
pub const BASE_URL_ENV: &str = "GROQ_BASE_URL";

/// Optional override for the extraction model.
pub const MODEL_ENV: &str = "GROQ_MODEL";

/// OpenAI-compatible chat completions endpoint of the Groq API.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default extraction model.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,followup=debug".to_string()
}

/// Get the application data directory
/// ~/Followup/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Followup")
}

/// Path of the workspace database file.
pub fn database_path() -> PathBuf {
    app_data_dir().join("followup.db")
}

/// Completion-service credential, if configured.
pub fn api_key() -> Option<String> {
    std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty())
}

/// Completion-service base URL (env override or default).
pub fn base_url() -> String {
    std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Extraction model name (env override or default).
pub fn model() -> String {
    std::env::var(MODEL_ENV)
        .ok()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}
