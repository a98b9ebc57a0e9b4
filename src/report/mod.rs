pub mod aggregate;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::settings::ReportConfig;
use crate::error::{DigestError, Result};
use crate::llm::chunking::{split_entries, SourceDocument};
use crate::llm::prompts::PromptStore;
use crate::llm::Summarizer;
use aggregate::{aggregate_reports, TOPIC_SUFFIX};

pub const REPORT_SUFFIX: &str = "_report.md";
pub const TRENDS_SUFFIX: &str = "_trends.md";

pub const GITHUB_REPORT: &str = "github";
pub const HN_TOPIC_REPORT: &str = "hacker_news_hours_topic";
pub const HN_DAILY_REPORT: &str = "hacker_news_daily_report";
pub const X_REPORT: &str = "x";

/// A summary written to disk
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub text: String,
    pub path: PathBuf,
}

/// Turns source documents into persisted summaries.
///
/// Each call reads its input, talks to the summarizer and writes one output
/// file. Two calls on the same source path write the same file and are not
/// serialized against each other.
pub struct ReportGenerator<S> {
    llm: S,
    prompts: PromptStore,
    max_chunk_chars: usize,
    trends_dir: PathBuf,
    sort_aggregate_inputs: bool,
}

impl<S: Summarizer> ReportGenerator<S> {
    pub fn new(llm: S, prompts: PromptStore, config: &ReportConfig) -> Self {
        Self {
            llm,
            prompts,
            max_chunk_chars: config.max_chunk_chars,
            trends_dir: config.trends_dir.clone(),
            sort_aggregate_inputs: config.sort_aggregate_inputs,
        }
    }

    /// Summarize a whole document in one call.
    pub async fn generate(
        &self,
        report_type: &str,
        source_path: &Path,
        output_suffix: &str,
    ) -> Result<GeneratedReport> {
        let content = read_source(source_path)?;
        let system_prompt = self.template(report_type)?;

        let text = self.llm.generate(system_prompt, &content).await?;

        let path = report_path_for(source_path, output_suffix);
        write_report(&path, &text)?;
        tracing::info!("{} report saved to {}", report_type, path.display());

        Ok(GeneratedReport { text, path })
    }

    /// Summarize a timestamped document part by part.
    ///
    /// The document is split into chunks of at most `max_chunk_chars`, each
    /// carrying the title block. A single chunk uses the normal template;
    /// several chunks use the short-form template so the concatenated parts
    /// stay compact.
    pub async fn generate_chunked(
        &self,
        report_type: &str,
        source_path: &Path,
    ) -> Result<GeneratedReport> {
        let content = read_source(source_path)?;
        let document = SourceDocument::parse(&content);
        let chunks = split_entries(&document.entries, &document.title, self.max_chunk_chars);

        tracing::info!(
            "Split {} entries from {} into {} chunks",
            document.entries.len(),
            source_path.display(),
            chunks.len()
        );

        let system_prompt = if chunks.len() == 1 {
            self.template(report_type)?
        } else {
            match self.prompts.get_short(report_type) {
                Some(short) => short,
                None => {
                    tracing::warn!(
                        "No short {} prompt, using the full prompt for {} chunks",
                        report_type,
                        chunks.len()
                    );
                    self.template(report_type)?
                }
            }
        };

        let mut summaries = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            tracing::info!(
                "Summarizing chunk {}/{} ({} entries, {} chars)",
                i + 1,
                chunks.len(),
                chunk.entries.len(),
                chunk.char_count()
            );
            summaries.push(self.llm.generate(system_prompt, &chunk.to_text()).await?);
        }

        let text = format!("{}\n{}", document.title, summaries.join("\n"));

        let path = report_path_for(source_path, REPORT_SUFFIX);
        write_report(&path, &text)?;
        tracing::info!("{} report saved to {}", report_type, path.display());

        Ok(GeneratedReport { text, path })
    }

    /// Summarize all topic reports of one period directory into a trends report.
    pub async fn aggregate_and_generate(
        &self,
        report_type: &str,
        directory: &Path,
    ) -> Result<GeneratedReport> {
        let content = aggregate_reports(directory, TOPIC_SUFFIX, self.sort_aggregate_inputs)?;
        let system_prompt = self.template(report_type)?;

        let base_name = directory
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| DigestError::DirectoryNotFound(directory.to_path_buf()))?;
        let path = self.trends_dir.join(format!("{}{}", base_name, TRENDS_SUFFIX));

        let text = self.llm.generate(system_prompt, &content).await?;

        write_report(&path, &text)?;
        tracing::info!("{} report saved to {}", report_type, path.display());

        Ok(GeneratedReport { text, path })
    }

    pub async fn generate_github_report(&self, source_path: &Path) -> Result<GeneratedReport> {
        self.generate(GITHUB_REPORT, source_path, REPORT_SUFFIX).await
    }

    pub async fn generate_hn_topic_report(&self, source_path: &Path) -> Result<GeneratedReport> {
        self.generate(HN_TOPIC_REPORT, source_path, TOPIC_SUFFIX).await
    }

    pub async fn generate_hn_daily_report(&self, directory: &Path) -> Result<GeneratedReport> {
        self.aggregate_and_generate(HN_DAILY_REPORT, directory).await
    }

    pub async fn generate_x_report(&self, source_path: &Path) -> Result<GeneratedReport> {
        self.generate_chunked(X_REPORT, source_path).await
    }

    fn template(&self, report_type: &str) -> Result<&str> {
        self.prompts
            .get(report_type)
            .ok_or_else(|| DigestError::MissingTemplate(report_type.to_string()))
    }
}

/// Replace the extension of `source` with `suffix`: `a/b.md` + `_report.md` -> `a/b_report.md`
pub fn report_path_for(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{}{}", stem, suffix))
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            tracing::error!("Source document not found: {}", path.display());
            DigestError::SourceNotFound(path.to_path_buf())
        } else {
            DigestError::Io(e)
        }
    })
}

fn write_report(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, text)?;
    Ok(())
}
