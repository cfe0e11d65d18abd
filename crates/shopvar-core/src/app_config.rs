use std::path::PathBuf;

/// Process-level configuration read from the environment.
///
/// Processing behaviour (quantities, surcharges, AI mode) lives in
/// [`crate::ProcessingSettings`], loaded from `settings_path`.
#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub settings_path: PathBuf,
    pub ai_api_key: Option<String>,
    pub ai_base_url: String,
    pub ai_model: String,
    pub ai_request_timeout_secs: u64,
    pub ai_max_concurrent: usize,
    pub ai_max_retries: u32,
    pub ai_retry_backoff_ms: u64,
    pub ai_inter_request_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("settings_path", &self.settings_path)
            .field("ai_api_key", &self.ai_api_key.as_ref().map(|_| "[redacted]"))
            .field("ai_base_url", &self.ai_base_url)
            .field("ai_model", &self.ai_model)
            .field("ai_request_timeout_secs", &self.ai_request_timeout_secs)
            .field("ai_max_concurrent", &self.ai_max_concurrent)
            .field("ai_max_retries", &self.ai_max_retries)
            .field("ai_retry_backoff_ms", &self.ai_retry_backoff_ms)
            .field(
                "ai_inter_request_delay_ms",
                &self.ai_inter_request_delay_ms,
            )
            .finish()
    }
}
