// GitHub API endpoint functions.
// Typed accessors for the three read endpoints the portfolio uses.

use async_trait::async_trait;

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{Commit, Event, Repository};

/// Repositories shown in the projects section.
pub const REPOS_PER_PAGE: u32 = 12;
/// Events pulled for the activity feed.
pub const EVENTS_PER_PAGE: u32 = 10;
/// Commits pulled per repository.
pub const COMMITS_PER_PAGE: u32 = 5;

/// Read-only GitHub operations the fetcher depends on.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Most recently updated public repositories of `account`.
    async fn user_repos(&self, account: &str) -> Result<Vec<Repository>>;

    /// Recent public events of `account`.
    async fn user_events(&self, account: &str) -> Result<Vec<Event>>;

    /// Latest commits of `account/repo`.
    async fn repo_commits(&self, account: &str, repo: &str) -> Result<Vec<Commit>>;
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn user_repos(&self, account: &str) -> Result<Vec<Repository>> {
        let params = [
            ("sort", "updated".to_string()),
            ("per_page", REPOS_PER_PAGE.to_string()),
        ];
        let response = self
            .get_with_params(&format!("/users/{}/repos", account), &params)
            .await?;
        let repos: Vec<Repository> = response.json().await?;
        Ok(repos)
    }

    async fn user_events(&self, account: &str) -> Result<Vec<Event>> {
        let params = [("per_page", EVENTS_PER_PAGE.to_string())];
        let response = self
            .get_with_params(&format!("/users/{}/events/public", account), &params)
            .await?;
        let events: Vec<Event> = response.json().await?;
        Ok(events)
    }

    async fn repo_commits(&self, account: &str, repo: &str) -> Result<Vec<Commit>> {
        let params = [("per_page", COMMITS_PER_PAGE.to_string())];
        let response = self
            .get_with_params(&format!("/repos/{}/{}/commits", account, repo), &params)
            .await?;
        let commits: Vec<Commit> = response.json().await?;
        Ok(commits)
    }
}
