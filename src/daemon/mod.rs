pub mod jobs;
pub mod schedule;

use chrono::{Local, NaiveDateTime};
use std::fmt;

use crate::config::DigestConfig;
use crate::error::Result;
use crate::llm::prompts::PromptStore;
use crate::llm::{Llm, Summarizer};
use crate::report::ReportGenerator;
pub use jobs::Pipeline;
use schedule::{parse_time, Schedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    GitHubProgress,
    HackerNewsTopic,
    HackerNewsDaily,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::GitHubProgress => write!(f, "github-progress"),
            Job::HackerNewsTopic => write!(f, "hn-topic"),
            Job::HackerNewsDaily => write!(f, "hn-daily"),
        }
    }
}

struct ScheduledJob {
    job: Job,
    schedule: Schedule,
    next_run: NaiveDateTime,
}

/// Build the job table from config, each with its first run after `now`.
fn build_jobs(config: &DigestConfig, now: NaiveDateTime) -> Result<Vec<ScheduledJob>> {
    let schedules = [
        (
            Job::GitHubProgress,
            Schedule::daily(config.github.freq_days, parse_time(&config.github.exec_time)?),
        ),
        (
            Job::HackerNewsTopic,
            Schedule::hourly(config.hacker_news.topic_interval_hours),
        ),
        (
            Job::HackerNewsDaily,
            Schedule::daily(1, parse_time(&config.hacker_news.daily_time)?),
        ),
    ];

    Ok(schedules
        .into_iter()
        .map(|(job, schedule)| ScheduledJob {
            job,
            schedule,
            next_run: schedule.first_run(now),
        })
        .collect())
}

/// Index of the job due soonest
fn next_due(jobs: &[ScheduledJob]) -> Option<usize> {
    jobs.iter()
        .enumerate()
        .min_by_key(|(_, j)| j.next_run)
        .map(|(i, _)| i)
}

async fn run_job<S: Summarizer>(pipeline: &Pipeline<S>, job: Job) -> Result<()> {
    match job {
        Job::GitHubProgress => pipeline.github_job().await,
        Job::HackerNewsTopic => pipeline.hn_topic_job().await.map(|_| ()),
        Job::HackerNewsDaily => pipeline
            .hn_daily_job(Local::now().date_naive())
            .await
            .map(|_| ()),
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Run the periodic collection jobs until interrupted.
pub async fn run_daemon(config: DigestConfig) -> Result<()> {
    let llm = Llm::from_config(&config.llm)?;
    let prompts = PromptStore::load(
        &config.report.prompts_dir,
        &config.report.report_types,
        llm.backend().name(),
    )?;
    let generator = ReportGenerator::new(llm, prompts, &config.report);
    let pipeline = Pipeline::new(generator, &config)?;

    let mut jobs = build_jobs(&config, Local::now().naive_local())?;
    for job in &jobs {
        tracing::info!("Scheduled {} for {}", job.job, job.next_run);
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    while let Some(index) = next_due(&jobs) {
        let due = jobs[index].next_run;
        let wait = (due - Local::now().naive_local())
            .to_std()
            .unwrap_or_default();

        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
            _ = tokio::time::sleep(wait) => {
                let job = jobs[index].job;
                tracing::info!("Running {}", job);
                match run_job(&pipeline, job).await {
                    Ok(()) => tracing::info!("{} finished", job),
                    Err(e) => {
                        tracing::error!("{} failed: {}", job, e);
                        if let Err(e) = pipeline
                            .notifier()
                            .notify_error(&format!("newsdigest: {} failed", job), &e.to_string())
                        {
                            tracing::warn!("Failed to send failure notification: {}", e);
                        }
                    }
                }

                let now = Local::now().naive_local();
                let mut next = jobs[index].schedule.following(due);
                while next <= now {
                    next = jobs[index].schedule.following(next);
                }
                jobs[index].next_run = next;
                tracing::info!("Next {} at {}", job, next);
            }
        }
    }

    tracing::info!("Daemon shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_build_jobs_from_config() {
        let config = DigestConfig::default();
        let jobs = build_jobs(&config, at("2024-09-01 09:30:00")).unwrap();

        let runs: Vec<(Job, NaiveDateTime)> = jobs.iter().map(|j| (j.job, j.next_run)).collect();
        assert_eq!(
            runs,
            vec![
                (Job::GitHubProgress, at("2024-09-02 08:00:00")),
                (Job::HackerNewsTopic, at("2024-09-01 12:00:00")),
                (Job::HackerNewsDaily, at("2024-09-01 10:00:00")),
            ]
        );
        assert_eq!(next_due(&jobs), Some(2));
    }

    #[test]
    fn test_build_jobs_rejects_bad_time() {
        let mut config = DigestConfig::default();
        config.github.exec_time = "8am".to_string();
        assert!(build_jobs(&config, at("2024-09-01 09:30:00")).is_err());
    }

    #[test]
    fn test_job_display() {
        assert_eq!(Job::HackerNewsDaily.to_string(), "hn-daily");
    }
}
