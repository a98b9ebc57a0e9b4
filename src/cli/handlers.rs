use chrono::{Local, NaiveDate};
use std::path::Path;

use crate::cli::commands::*;
use crate::config::{self, DigestConfig};
use crate::daemon::{self, Pipeline};
use crate::error::{DigestError, Result};
use crate::llm::prompts::PromptStore;
use crate::llm::{Llm, DRY_RUN_SENTINEL};
use crate::notification::Notifier;
use crate::report::{GeneratedReport, ReportGenerator, X_REPORT};

pub async fn handle_command(cli: Cli, mut config: DigestConfig) -> Result<()> {
    if cli.dry_run {
        config.llm.dry_run = true;
    }

    match cli.command {
        Commands::Github { repo, days } => handle_github(&config, &repo, days).await,
        Commands::HnTopic => handle_hn_topic(&config).await,
        Commands::HnDaily { date } => handle_hn_daily(&config, date.as_deref()).await,
        Commands::Report {
            path,
            report_type,
            suffix,
        } => handle_report(&config, &path, &report_type, &suffix).await,
        Commands::Chunked { path, report_type } => {
            handle_chunked(&config, &path, &report_type).await
        }
        Commands::Aggregate { dir, report_type } => {
            handle_aggregate(&config, &dir, &report_type).await
        }
        Commands::Daemon => daemon::run_daemon(config).await,
        Commands::Config { action } => handle_config(action, &config),
    }
}

fn build_generator(config: &DigestConfig) -> Result<ReportGenerator<Llm>> {
    let llm = Llm::from_config(&config.llm)?;
    let prompts = PromptStore::load(
        &config.report.prompts_dir,
        &config.report.report_types,
        llm.backend().name(),
    )?;
    tracing::debug!("{} report templates ready", prompts.template_count());
    Ok(ReportGenerator::new(llm, prompts, &config.report))
}

fn print_report(report: &GeneratedReport) {
    if report.text == DRY_RUN_SENTINEL {
        println!("Dry run: no model call made, report placeholder written to {}", report.path.display());
        return;
    }
    println!("{}", report.text);
    println!("\nSaved to: {}", report.path.display());
}

async fn handle_github(config: &DigestConfig, repo: &str, days: Option<u32>) -> Result<()> {
    let pipeline = Pipeline::new(build_generator(config)?, config)?;
    let days = days.unwrap_or(config.github.freq_days);

    println!("Collecting {} activity for the last {} day(s)...", repo, days);
    let report = pipeline.run_github(repo, days).await?;
    print_report(&report);
    Ok(())
}

async fn handle_hn_topic(config: &DigestConfig) -> Result<()> {
    let pipeline = Pipeline::new(build_generator(config)?, config)?;

    match pipeline.hn_topic_job().await? {
        Some(report) => print_report(&report),
        None => eprintln!("No Hacker News stories collected, nothing to summarize."),
    }
    Ok(())
}

async fn handle_hn_daily(config: &DigestConfig, date: Option<&str>) -> Result<()> {
    let date = match date {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|e| DigestError::Config(format!("Invalid date '{}': {}", value, e)))?,
        None => Local::now().date_naive(),
    };

    let pipeline = Pipeline::new(build_generator(config)?, config)?;
    let report = pipeline.hn_daily_job(date).await?;
    print_report(&report);
    Ok(())
}

async fn handle_report(
    config: &DigestConfig,
    path: &Path,
    report_type: &str,
    suffix: &str,
) -> Result<()> {
    let generator = build_generator(config)?;
    let report = generator.generate(report_type, path, suffix).await?;
    print_report(&report);
    Ok(())
}

async fn handle_chunked(config: &DigestConfig, path: &Path, report_type: &str) -> Result<()> {
    let generator = build_generator(config)?;
    let report = generator.generate_chunked(report_type, path).await?;
    print_report(&report);

    if report_type == X_REPORT {
        let subject = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Err(e) = Notifier::new(&config.notification).notify_x_report(&subject, &report.text) {
            tracing::warn!("Failed to send notification for {}: {}", subject, e);
        }
    }
    Ok(())
}

async fn handle_aggregate(config: &DigestConfig, dir: &Path, report_type: &str) -> Result<()> {
    let generator = build_generator(config)?;
    let report = generator.aggregate_and_generate(report_type, dir).await?;
    print_report(&report);
    Ok(())
}

fn handle_config(action: ConfigCommands, config: &DigestConfig) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", toml::to_string_pretty(&redacted(config))?);
        }
        ConfigCommands::Path => {
            println!("{}", config::loader::config_path()?.display());
        }
        ConfigCommands::Init => {
            let cfg = config::loader::load_config()?;
            config::save_config(&cfg)?;
            println!(
                "Configuration initialized at: {}",
                config::loader::config_path()?.display()
            );
            println!("\nCurrent settings:");
            println!("  LLM backend: {} ({})", cfg.llm.backend, cfg.llm.effective_model());
            println!("  Prompts: {}", cfg.report.prompts_dir.display());
            println!("  GitHub subscriptions: {}", cfg.github.subscriptions.len());
            println!(
                "  Hacker News: every {}h, daily report at {}",
                cfg.hacker_news.topic_interval_hours, cfg.hacker_news.daily_time
            );
        }
    }
    Ok(())
}

/// Copy of `config` with secrets masked for display
fn redacted(config: &DigestConfig) -> DigestConfig {
    let mut shown = config.clone();
    if shown.llm.openai_api_key.is_some() {
        shown.llm.openai_api_key = Some("********".to_string());
    }
    if shown.github.token.is_some() {
        shown.github.token = Some("********".to_string());
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_masks_secrets() {
        let mut config = DigestConfig::default();
        config.llm.openai_api_key = Some("sk-live".to_string());
        config.github.token = Some("ghp-live".to_string());

        let shown = toml::to_string_pretty(&redacted(&config)).unwrap();
        assert!(!shown.contains("sk-live"));
        assert!(!shown.contains("ghp-live"));
        assert!(shown.contains("********"));
    }

    #[test]
    fn test_redacted_leaves_missing_secrets_unset() {
        let shown = redacted(&DigestConfig::default());
        assert!(shown.llm.openai_api_key.is_none());
        assert!(shown.github.token.is_none());
    }

    #[tokio::test]
    async fn test_invalid_hn_daily_date() {
        let err = handle_hn_daily(&DigestConfig::default(), Some("yesterday"))
            .await
            .unwrap_err();
        assert!(matches!(err, DigestError::Config(msg) if msg.contains("yesterday")));
    }
}
