pub mod chunking;
pub mod ollama;
pub mod openai_compat;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::settings::LlmConfig;
use crate::error::{DigestError, Result};
use ollama::OllamaClient;
use openai_compat::OpenAiClient;

/// Returned instead of generated text when dry-run mode is on.
pub const DRY_RUN_SENTINEL: &str = "DRY RUN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

pub fn build_messages(system_prompt: &str, content: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(system_prompt), ChatMessage::user(content)]
}

/// Anything that can turn a system prompt plus content into a summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn generate(&self, system_prompt: &str, content: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    Ollama,
}

impl LlmBackend {
    pub fn from_backend(backend: &str) -> Option<Self> {
        match backend.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Name used in prompt file paths
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
        }
    }
}

#[derive(Debug, Clone)]
enum Backend {
    OpenAI(OpenAiClient),
    Ollama(OllamaClient),
}

/// Production summarizer, backed by either the hosted API or a local service.
#[derive(Debug, Clone)]
pub struct Llm {
    kind: LlmBackend,
    backend: Backend,
    dry_run: bool,
    dry_run_path: PathBuf,
}

impl Llm {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let kind = LlmBackend::from_backend(&config.backend)
            .ok_or_else(|| DigestError::UnsupportedBackend(config.backend.clone()))?;
        let timeout = Duration::from_secs(config.timeout_secs);

        let backend = match kind {
            LlmBackend::OpenAI => {
                let api_key = match (&config.openai_api_key, config.dry_run) {
                    (Some(key), _) => key.as_str(),
                    (None, true) => "",
                    (None, false) => {
                        return Err(DigestError::Config(
                            "OpenAI API key not configured".to_string(),
                        ))
                    }
                };
                Backend::OpenAI(OpenAiClient::new(
                    &config.openai_base_url,
                    api_key,
                    &config.openai_model,
                    timeout,
                )?)
            }
            LlmBackend::Ollama => Backend::Ollama(OllamaClient::new(
                &config.ollama_api_url,
                &config.ollama_model,
                timeout,
            )?),
        };

        tracing::info!(
            "LLM backend {} with model {}{}",
            kind.name(),
            config.effective_model(),
            if config.dry_run { " (dry run)" } else { "" }
        );

        Ok(Self {
            kind,
            backend,
            dry_run: config.dry_run,
            dry_run_path: config.dry_run_path.clone(),
        })
    }

    pub fn backend(&self) -> LlmBackend {
        self.kind
    }

    fn write_dry_run(&self, messages: &[ChatMessage]) -> Result<()> {
        if let Some(parent) = self.dry_run_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.dry_run_path, serde_json::to_string_pretty(messages)?)?;
        tracing::info!("Dry run: request written to {}", self.dry_run_path.display());
        Ok(())
    }
}

#[async_trait]
impl Summarizer for Llm {
    async fn generate(&self, system_prompt: &str, content: &str) -> Result<String> {
        let messages = build_messages(system_prompt, content);

        if self.dry_run {
            self.write_dry_run(&messages)?;
            return Ok(DRY_RUN_SENTINEL.to_string());
        }

        tracing::info!(
            "Calling {} model {} ({} chars of content)",
            self.kind.name(),
            self.model_name(),
            content.chars().count()
        );

        let text = match &self.backend {
            Backend::OpenAI(client) => client.chat(&messages).await?,
            Backend::Ollama(client) => client.chat(&messages).await?,
        };

        tracing::debug!("{} returned {} chars", self.kind.name(), text.chars().count());
        Ok(text)
    }

    fn model_name(&self) -> &str {
        match &self.backend {
            Backend::OpenAI(client) => client.model(),
            Backend::Ollama(client) => client.model(),
        }
    }
}
