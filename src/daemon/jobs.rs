use chrono::NaiveDate;
use std::fs;

use crate::collectors::{GitHubClient, HackerNewsClient};
use crate::config::DigestConfig;
use crate::error::{DigestError, Result};
use crate::llm::Summarizer;
use crate::notification::Notifier;
use crate::report::{GeneratedReport, ReportGenerator};

/// Collect, summarize and notify, once per job.
pub struct Pipeline<S> {
    generator: ReportGenerator<S>,
    github: GitHubClient,
    hacker_news: HackerNewsClient,
    notifier: Notifier,
    subscriptions: Vec<String>,
    freq_days: u32,
}

impl<S: Summarizer> Pipeline<S> {
    pub fn new(generator: ReportGenerator<S>, config: &DigestConfig) -> Result<Self> {
        let github = GitHubClient::new(&config.github).map_err(collector_error)?;
        let hacker_news = HackerNewsClient::new(&config.hacker_news).map_err(collector_error)?;
        Ok(Self::with_clients(generator, github, hacker_news, config))
    }

    pub fn with_clients(
        generator: ReportGenerator<S>,
        github: GitHubClient,
        hacker_news: HackerNewsClient,
        config: &DigestConfig,
    ) -> Self {
        Self {
            generator,
            github,
            hacker_news,
            notifier: Notifier::new(&config.notification),
            subscriptions: config.github.subscriptions.clone(),
            freq_days: config.github.freq_days,
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Progress report for one repository over the last `days` days
    pub async fn run_github(&self, repo: &str, days: u32) -> Result<GeneratedReport> {
        let source = self
            .github
            .export_progress_by_date_range(repo, days)
            .await
            .map_err(collector_error)?;
        let report = self.generator.generate_github_report(&source).await?;

        if let Err(e) = self.notifier.notify_github_report(repo, &report.text) {
            tracing::warn!("Failed to send notification for {}: {}", repo, e);
        }
        Ok(report)
    }

    /// Run the progress report for every subscription. A failing repository
    /// does not stop the others.
    pub async fn github_job(&self) -> Result<()> {
        if self.subscriptions.is_empty() {
            tracing::warn!("No GitHub subscriptions configured");
            return Ok(());
        }

        let mut failed = 0;
        for repo in &self.subscriptions {
            if let Err(e) = self.run_github(repo, self.freq_days).await {
                tracing::error!("[{}] progress report failed: {}", repo, e);
                failed += 1;
            }
        }

        if failed == self.subscriptions.len() {
            return Err(DigestError::Collector(format!(
                "all {} GitHub subscriptions failed",
                failed
            )));
        }
        Ok(())
    }

    /// Snapshot the front page and summarize it into an hourly topic report.
    pub async fn hn_topic_job(&self) -> Result<Option<GeneratedReport>> {
        let Some(source) = self
            .hacker_news
            .export_top_stories()
            .await
            .map_err(collector_error)?
        else {
            tracing::error!("Hacker News collection produced no stories, skipping topic report");
            return Ok(None);
        };

        self.generator.generate_hn_topic_report(&source).await.map(Some)
    }

    /// Aggregate the topic reports of `date` into that day's trends report.
    pub async fn hn_daily_job(&self, date: NaiveDate) -> Result<GeneratedReport> {
        let label = date.format("%Y-%m-%d").to_string();
        let day_dir = self.hacker_news.output_dir().join(&label);
        fs::create_dir_all(&day_dir)?;

        let report = self.generator.generate_hn_daily_report(&day_dir).await?;

        if let Err(e) = self.notifier.notify_hn_report(&label, &report.text) {
            tracing::warn!("Failed to send notification for {}: {}", label, e);
        }
        Ok(report)
    }
}

fn collector_error(e: anyhow::Error) -> DigestError {
    DigestError::Collector(format!("{:#}", e))
}
