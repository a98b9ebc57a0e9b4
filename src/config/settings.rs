use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DigestConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub hacker_news: HackerNewsConfig,

    #[serde(default)]
    pub notification: NotificationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Summarization backend: "openai" or "ollama"
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    pub openai_api_key: Option<String>,
    /// Base URL of an OpenAI-compatible chat completion API
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,
    /// Full URL of the local chat endpoint
    #[serde(default = "default_ollama_api_url")]
    pub ollama_api_url: String,
    /// Write the request to `dry_run_path` instead of calling the backend
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_dry_run_path")]
    pub dry_run_path: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn effective_model(&self) -> &str {
        match self.backend.to_lowercase().as_str() {
            "ollama" => &self.ollama_model,
            _ => &self.openai_model,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            openai_model: default_openai_model(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            ollama_model: default_ollama_model(),
            ollama_api_url: default_ollama_api_url(),
            dry_run: false,
            dry_run_path: default_dry_run_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report types whose prompt templates are loaded at startup
    #[serde(default = "default_report_types")]
    pub report_types: Vec<String>,
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: PathBuf,
    /// Character budget per chunk in multi-part generation
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
    /// Output root for daily aggregate reports
    #[serde(default = "default_trends_dir")]
    pub trends_dir: PathBuf,
    /// Sort aggregation inputs by file name instead of directory order
    #[serde(default = "default_true")]
    pub sort_aggregate_inputs: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_types: default_report_types(),
            prompts_dir: default_prompts_dir(),
            max_chunk_chars: default_max_chunk_chars(),
            trends_dir: default_trends_dir(),
            sort_aggregate_inputs: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub token: Option<String>,
    /// Repositories in `owner/repo` form
    #[serde(default)]
    pub subscriptions: Vec<String>,
    #[serde(default = "default_freq_days")]
    pub freq_days: u32,
    /// Local time of day (HH:MM) for the progress job
    #[serde(default = "default_exec_time")]
    pub exec_time: String,
    #[serde(default = "default_github_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            subscriptions: Vec::new(),
            freq_days: default_freq_days(),
            exec_time: default_exec_time(),
            output_dir: default_github_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackerNewsConfig {
    #[serde(default = "default_topic_interval_hours")]
    pub topic_interval_hours: u32,
    /// Local time of day (HH:MM) for the daily trends job
    #[serde(default = "default_daily_time")]
    pub daily_time: String,
    #[serde(default = "default_story_limit")]
    pub story_limit: usize,
    #[serde(default = "default_hn_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            topic_interval_hours: default_topic_interval_hours(),
            daily_time: default_daily_time(),
            story_limit: default_story_limit(),
            output_dir: default_hn_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_notification_timeout")]
    pub timeout_ms: u32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: default_notification_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_backend() -> String {
    "openai".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ollama_model() -> String {
    "llama3".to_string()
}

fn default_ollama_api_url() -> String {
    "http://localhost:11434/api/chat".to_string()
}

fn default_dry_run_path() -> PathBuf {
    PathBuf::from("daily_progress/prompt.txt")
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_report_types() -> Vec<String> {
    ["github", "hacker_news_hours_topic", "hacker_news_daily_report", "x"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_prompts_dir() -> PathBuf {
    PathBuf::from("prompts")
}

fn default_max_chunk_chars() -> usize {
    1000
}

fn default_trends_dir() -> PathBuf {
    PathBuf::from("hacker_news/tech_trends")
}

fn default_freq_days() -> u32 {
    1
}

fn default_exec_time() -> String {
    "08:00".to_string()
}

fn default_github_output_dir() -> PathBuf {
    PathBuf::from("daily_progress")
}

fn default_topic_interval_hours() -> u32 {
    4
}

fn default_daily_time() -> String {
    "10:00".to_string()
}

fn default_story_limit() -> usize {
    30
}

fn default_hn_output_dir() -> PathBuf {
    PathBuf::from("hacker_news")
}

fn default_notification_timeout() -> u32 {
    10000
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creates() {
        let config = DigestConfig::default();
        assert_eq!(config.llm.backend, "openai");
        assert_eq!(config.report.max_chunk_chars, 1000);
        assert!(config.github.subscriptions.is_empty());
    }

    #[test]
    fn test_llm_config_defaults() {
        let llm = LlmConfig::default();
        assert!(!llm.dry_run);
        assert_eq!(llm.dry_run_path, PathBuf::from("daily_progress/prompt.txt"));
        assert_eq!(llm.effective_model(), "gpt-4o-mini");
    }

    #[test]
    fn test_effective_model_follows_backend() {
        let llm = LlmConfig {
            backend: "Ollama".to_string(),
            ..LlmConfig::default()
        };
        assert_eq!(llm.effective_model(), "llama3");
    }

    #[test]
    fn test_report_config_defaults() {
        let report = ReportConfig::default();
        assert!(report.report_types.contains(&"x".to_string()));
        assert_eq!(report.trends_dir, PathBuf::from("hacker_news/tech_trends"));
        assert!(report.sort_aggregate_inputs);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: DigestConfig = toml::from_str(
            r#"
            [llm]
            backend = "ollama"

            [github]
            subscriptions = ["rust-lang/rust"]
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.backend, "ollama");
        assert_eq!(config.llm.ollama_model, "llama3");
        assert_eq!(config.github.subscriptions, vec!["rust-lang/rust"]);
        assert_eq!(config.hacker_news.topic_interval_hours, 4);
    }
}
