use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Tracing filter directive; `None` defers to `RUST_LOG`, then `info`.
    pub log_level: Option<String>,
    /// Directory for debug snapshots; `None` disables them.
    pub debug_dir: Option<PathBuf>,
    pub page_load_timeout_secs: u64,
    pub ready_timeout_secs: u64,
    pub http_connect_timeout_secs: u64,
    pub http_read_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    /// Postal code used for checkout simulations.
    pub postal_code: String,
    pub limit_rows: Option<usize>,
    pub only_ids: Option<HashSet<String>>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("input_path", &self.input_path)
            .field("output_path", &self.output_path)
            .field("log_level", &self.log_level)
            .field("debug_dir", &self.debug_dir)
            .field("page_load_timeout_secs", &self.page_load_timeout_secs)
            .field("ready_timeout_secs", &self.ready_timeout_secs)
            .field("http_connect_timeout_secs", &self.http_connect_timeout_secs)
            .field("http_read_timeout_secs", &self.http_read_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("postal_code", &self.postal_code)
            .field("limit_rows", &self.limit_rows)
            .field("only_ids", &self.only_ids.as_ref().map(HashSet::len))
            .finish()
    }
}
