use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::config::settings::GitHubConfig;

const GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
}

/// Issue or pull request as returned by the list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub updated_at: String,
    /// Present when an issue-list item is actually a pull request
    pub pull_request: Option<serde_json::Value>,
    pub merged_at: Option<String>,
}

pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
    output_dir: PathBuf,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        Self::with_api_base(config, GITHUB_API_URL)
    }

    pub fn with_api_base(config: &GitHubConfig, api_base: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("newsdigest/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build GitHub HTTP client")?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            output_dir: config.output_dir.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.api_base, path);
        let mut request = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API error {} from {}: {}", status, url, error_text);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse GitHub response from {}", url))
    }

    pub async fn fetch_commits(&self, repo: &str, since: NaiveDate, until: NaiveDate) -> Result<Vec<Commit>> {
        self.get_json(
            &format!("/repos/{}/commits", repo),
            &[("since", start_of_day(since)), ("until", start_of_day(until))],
        )
        .await
    }

    pub async fn fetch_closed_issues(&self, repo: &str, since: NaiveDate) -> Result<Vec<Issue>> {
        let items: Vec<Issue> = self
            .get_json(
                &format!("/repos/{}/issues", repo),
                &[("state", "closed".to_string()), ("since", start_of_day(since))],
            )
            .await?;
        Ok(items.into_iter().filter(|i| i.pull_request.is_none()).collect())
    }

    pub async fn fetch_closed_pull_requests(&self, repo: &str, since: NaiveDate) -> Result<Vec<Issue>> {
        let pulls: Vec<Issue> = self
            .get_json(
                &format!("/repos/{}/pulls", repo),
                &[
                    ("state", "closed".to_string()),
                    ("sort", "updated".to_string()),
                    ("direction", "desc".to_string()),
                ],
            )
            .await?;
        let cutoff = start_of_day(since);
        Ok(pulls.into_iter().filter(|p| p.updated_at >= cutoff).collect())
    }

    /// Collect the last `days` days of activity and write it as a markdown digest.
    pub async fn export_progress_by_date_range(&self, repo: &str, days: u32) -> Result<PathBuf> {
        let today = Local::now().date_naive();
        let since = today - Duration::days(i64::from(days));

        tracing::info!("Collecting {} activity from {} to {}", repo, since, today);

        let commits = self.fetch_commits(repo, since, today).await?;
        let issues = self.fetch_closed_issues(repo, since).await?;
        let pulls = self.fetch_closed_pull_requests(repo, since).await?;

        let repo_dir = self.output_dir.join(repo.replace('/', "_"));
        fs::create_dir_all(&repo_dir)
            .with_context(|| format!("Failed to create {}", repo_dir.display()))?;

        let path = repo_dir.join(format!("{}_to_{}.md", since, today));
        fs::write(&path, render_progress(repo, since, today, &commits, &issues, &pulls))
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!(
            "[{}] {} commits, {} issues, {} pull requests written to {}",
            repo,
            commits.len(),
            issues.len(),
            pulls.len(),
            path.display()
        );
        Ok(path)
    }
}

fn start_of_day(date: NaiveDate) -> String {
    format!("{}T00:00:00Z", date)
}

pub fn render_progress(
    repo: &str,
    since: NaiveDate,
    until: NaiveDate,
    commits: &[Commit],
    issues: &[Issue],
    pulls: &[Issue],
) -> String {
    let mut out = format!("# Progress for {} ({} to {})\n\n", repo, since, until);

    out.push_str("## Commits\n");
    for commit in commits {
        let summary = commit.commit.message.lines().next().unwrap_or_default();
        let short_sha: String = commit.sha.chars().take(7).collect();
        match &commit.commit.author {
            Some(author) => out.push_str(&format!("- {} ({}, {})\n", summary, short_sha, author.name)),
            None => out.push_str(&format!("- {} ({})\n", summary, short_sha)),
        }
    }

    out.push_str("\n## Issues Closed\n");
    for issue in issues {
        out.push_str(&format!("- #{} {} ({})\n", issue.number, issue.title, issue.html_url));
    }

    out.push_str("\n## Pull Requests\n");
    for pull in pulls {
        let state = if pull.merged_at.is_some() { "merged" } else { "closed" };
        out.push_str(&format!("- #{} {} [{}] ({})\n", pull.number, pull.title, state, pull.html_url));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use tempfile::tempdir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn issue(number: u64, title: &str, updated_at: &str, is_pr: bool, merged: bool) -> serde_json::Value {
        let merged_at = if merged {
            json!("2024-09-01T10:00:00Z")
        } else {
            json!(null)
        };
        let mut value = json!({
            "number": number,
            "title": title,
            "html_url": format!("https://github.com/o/r/issues/{}", number),
            "updated_at": updated_at,
            "merged_at": merged_at,
        });
        if is_pr {
            value["pull_request"] = json!({"url": "https://api.github.com/repos/o/r/pulls/1"});
        }
        value
    }

    #[test]
    fn test_render_progress() {
        let commits: Vec<Commit> = serde_json::from_value(json!([
            {"sha": "abcdef1234567", "commit": {"message": "Fix parser\n\nLong body", "author": {"name": "ferris"}}}
        ]))
        .unwrap();
        let pulls: Vec<Issue> =
            serde_json::from_value(json!([issue(7, "Add chunking", "2024-09-01T09:00:00Z", true, true)]))
                .unwrap();

        let text = render_progress("o/r", date("2024-08-31"), date("2024-09-01"), &commits, &[], &pulls);

        assert!(text.starts_with("# Progress for o/r (2024-08-31 to 2024-09-01)\n\n"));
        assert!(text.contains("- Fix parser (abcdef1, ferris)\n"));
        assert!(!text.contains("Long body"));
        assert!(text.contains("- #7 Add chunking [merged]"));
    }

    #[tokio::test]
    async fn test_fetch_closed_issues_skips_pull_requests() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/o/r/issues")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("state".into(), "closed".into()),
                Matcher::UrlEncoded("since".into(), "2024-08-31T00:00:00Z".into()),
            ]))
            .match_header("authorization", "Bearer ghp-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    issue(1, "Crash on empty input", "2024-09-01T08:00:00Z", false, false),
                    issue(2, "A pull request", "2024-09-01T08:00:00Z", true, false),
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let config = GitHubConfig {
            token: Some("ghp-test".to_string()),
            ..GitHubConfig::default()
        };
        let client = GitHubClient::with_api_base(&config, &server.url()).unwrap();
        let issues = client.fetch_closed_issues("o/r", date("2024-08-31")).await.unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].number, 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_export_writes_digest_file() {
        let mut server = mockito::Server::new_async().await;
        let _commits = server
            .mock("GET", "/repos/o/r/commits")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([{"sha": "1234567890", "commit": {"message": "Initial", "author": null}}]).to_string())
            .create_async()
            .await;
        let _issues = server
            .mock("GET", "/repos/o/r/issues")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;
        let _pulls = server
            .mock("GET", "/repos/o/r/pulls")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    issue(3, "Recent", "2999-01-01T00:00:00Z", true, false),
                    issue(4, "Ancient", "2000-01-01T00:00:00Z", true, true),
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let config = GitHubConfig {
            output_dir: dir.path().to_path_buf(),
            ..GitHubConfig::default()
        };
        let client = GitHubClient::with_api_base(&config, &server.url()).unwrap();
        let path = client.export_progress_by_date_range("o/r", 1).await.unwrap();

        assert!(path.starts_with(dir.path().join("o_r")));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("- Initial (1234567)"));
        assert!(text.contains("#3 Recent"));
        assert!(!text.contains("#4 Ancient"));
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("GET", "/repos/o/missing/commits")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let client = GitHubClient::with_api_base(&GitHubConfig::default(), &server.url()).unwrap();
        let err = client
            .fetch_commits("o/missing", date("2024-08-31"), date("2024-09-01"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
