use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::settings::HackerNewsConfig;

const HN_API_URL: &str = "https://hacker-news.firebaseio.com/v0";

#[derive(Debug, Clone, Deserialize)]
struct Item {
    id: u64,
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    dead: bool,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub title: String,
    pub link: String,
}

pub struct HackerNewsClient {
    http: reqwest::Client,
    api_base: String,
    story_limit: usize,
    output_dir: PathBuf,
}

impl HackerNewsClient {
    pub fn new(config: &HackerNewsConfig) -> Result<Self> {
        Self::with_api_base(config, HN_API_URL)
    }

    pub fn with_api_base(config: &HackerNewsConfig, api_base: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build Hacker News HTTP client")?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            story_limit: config.story_limit,
            output_dir: config.output_dir.clone(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.api_base, path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Hacker News API error {} from {}", response.status(), url);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }

    /// Current front-page stories, in ranking order
    pub async fn fetch_top_stories(&self) -> Result<Vec<Story>> {
        let ids: Vec<u64> = self.get_json("/topstories.json").await?;

        let mut stories = Vec::new();
        for id in ids.into_iter().take(self.story_limit) {
            let item: Option<Item> = self.get_json(&format!("/item/{}.json", id)).await?;
            let Some(item) = item else { continue };
            if item.dead || item.deleted {
                continue;
            }
            if let Some(title) = item.title {
                let link = item
                    .url
                    .unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", item.id));
                stories.push(Story { title, link });
            }
        }

        Ok(stories)
    }

    /// Write the current top stories to `{output_dir}/{date}/{hour}.md`.
    ///
    /// Returns `None` when no stories could be collected.
    pub async fn export_top_stories(&self) -> Result<Option<PathBuf>> {
        let stories = self.fetch_top_stories().await?;
        if stories.is_empty() {
            tracing::warn!("No Hacker News stories collected");
            return Ok(None);
        }

        let now = Local::now().naive_local();
        let day_dir = self.output_dir.join(now.format("%Y-%m-%d").to_string());
        fs::create_dir_all(&day_dir)
            .with_context(|| format!("Failed to create {}", day_dir.display()))?;

        let path = day_dir.join(format!("{}.md", now.format("%H")));
        fs::write(&path, render_stories(&stories, now))
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!("{} Hacker News stories written to {}", stories.len(), path.display());
        Ok(Some(path))
    }
}

pub fn render_stories(stories: &[Story], at: NaiveDateTime) -> String {
    let mut out = format!("# Hacker News Top Stories ({})\n\n", at.format("%Y-%m-%d %H:00"));
    for (i, story) in stories.iter().enumerate() {
        out.push_str(&format!("{}. [{}]({})\n", i + 1, story.title, story.link));
    }
    out
}
