use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DigestError, Result};

/// System prompt templates, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PromptStore {
    templates: HashMap<String, String>,
    short_templates: HashMap<String, String>,
}

impl PromptStore {
    /// Load the template for every report type.
    ///
    /// Looks for `{report_type}_{backend}_prompt.txt` first and falls back to
    /// `{report_type}_prompt.txt`. Short-form variants (`{report_type}_short_...`)
    /// are picked up when present but are not required.
    pub fn load(prompts_dir: &Path, report_types: &[String], backend: &str) -> Result<Self> {
        let mut store = Self::default();

        for report_type in report_types {
            let path = resolve_prompt_path(prompts_dir, report_type, backend).ok_or_else(|| {
                let expected = backend_prompt_path(prompts_dir, report_type, backend);
                tracing::error!("Prompt file not found: {}", expected.display());
                DigestError::PromptNotFound(expected)
            })?;

            let template = fs::read_to_string(&path)?;
            tracing::debug!("Loaded {} prompt from {}", report_type, path.display());
            store.templates.insert(report_type.clone(), template);

            let short_type = format!("{}_short", report_type);
            if let Some(short_path) = resolve_prompt_path(prompts_dir, &short_type, backend) {
                let template = fs::read_to_string(&short_path)?;
                tracing::debug!(
                    "Loaded short {} prompt from {}",
                    report_type,
                    short_path.display()
                );
                store.short_templates.insert(report_type.clone(), template);
            }
        }

        tracing::info!(
            "Loaded {} prompt templates ({} short) for backend {}",
            store.templates.len(),
            store.short_templates.len(),
            backend
        );

        Ok(store)
    }

    pub fn get(&self, report_type: &str) -> Option<&str> {
        self.templates.get(report_type).map(String::as_str)
    }

    /// Terser template used when a document is summarized in several parts
    pub fn get_short(&self, report_type: &str) -> Option<&str> {
        self.short_templates.get(report_type).map(String::as_str)
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }
}

fn backend_prompt_path(prompts_dir: &Path, report_type: &str, backend: &str) -> PathBuf {
    prompts_dir.join(format!("{}_{}_prompt.txt", report_type, backend))
}

fn resolve_prompt_path(prompts_dir: &Path, report_type: &str, backend: &str) -> Option<PathBuf> {
    let specific = backend_prompt_path(prompts_dir, report_type, backend);
    if specific.exists() {
        return Some(specific);
    }

    let generic = prompts_dir.join(format!("{}_prompt.txt", report_type));
    generic.exists().then_some(generic)
}
