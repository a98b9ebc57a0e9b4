use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::report::{GITHUB_REPORT, REPORT_SUFFIX, X_REPORT};

#[derive(Parser)]
#[command(name = "newsdigest")]
#[command(
    author,
    version,
    about = "LLM-generated digests of GitHub activity, Hacker News and social feeds"
)]
#[command(
    long_about = "Collect project activity and news, summarize it with a hosted or local language model, and deliver the reports as files and desktop notifications"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Write the request to the dry-run file instead of calling the model
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect a repository's recent activity and summarize it
    Github {
        /// Repository as owner/repo
        repo: String,
        /// Days of history to collect (defaults to github.freq_days)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Snapshot the Hacker News front page and write a topic report
    HnTopic,

    /// Aggregate a day's Hacker News topic reports into a trends report
    HnDaily {
        /// Day to aggregate as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Summarize one source document in a single call
    Report {
        /// Source markdown document
        path: PathBuf,
        #[arg(short = 't', long, default_value = GITHUB_REPORT)]
        report_type: String,
        /// Output suffix replacing the source extension
        #[arg(short, long, default_value = REPORT_SUFFIX)]
        suffix: String,
    },

    /// Summarize a timestamped document chunk by chunk
    Chunked {
        /// Source markdown document with timestamped entries
        path: PathBuf,
        #[arg(short = 't', long, default_value = X_REPORT)]
        report_type: String,
    },

    /// Concatenate a directory's topic reports and summarize them
    Aggregate {
        /// Directory holding *_topic.md files
        dir: PathBuf,
        #[arg(short = 't', long, default_value = crate::report::HN_DAILY_REPORT)]
        report_type: String,
    },

    /// Run the scheduler (GitHub, hourly and daily Hacker News jobs)
    Daemon,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print config file path
    Path,
    /// Initialize default configuration
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_report_defaults() {
        let cli = Cli::parse_from(["newsdigest", "report", "daily_progress/o_r/today.md"]);
        match cli.command {
            Commands::Report {
                path,
                report_type,
                suffix,
            } => {
                assert_eq!(path, PathBuf::from("daily_progress/o_r/today.md"));
                assert_eq!(report_type, "github");
                assert_eq!(suffix, "_report.md");
            }
            _ => panic!("Expected report command"),
        }
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["newsdigest", "chunked", "tweets.md", "--dry-run", "-vv"]);
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Chunked { ref report_type, .. } if report_type == "x"));
    }

    #[test]
    fn test_parse_hn_daily_date() {
        let cli = Cli::parse_from(["newsdigest", "hn-daily", "--date", "2024-09-01"]);
        assert!(matches!(cli.command, Commands::HnDaily { date: Some(ref d) } if d == "2024-09-01"));
    }
}
