//! Upstream producers of the digest documents that reports are generated from.

pub mod github;
pub mod hacker_news;

pub use github::GitHubClient;
pub use hacker_news::HackerNewsClient;
