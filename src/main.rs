// folio binary: loads the portfolio data and prints the projects and activity sections.
// An optional repository name argument also prints that repository's latest commits.

use std::process::ExitCode;

use chrono::Utc;

use folio::feed::{FEED_LENGTH, feed, relative_time};
use folio::github::{Commit, Event, Repository};
use folio::showcase::{self, ProjectFilter};
use folio::{Config, Fetcher, ResourceState, logging};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_logging("info");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let fetcher = match Fetcher::from_config(&config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Failed to create GitHub client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let repo = std::env::args().nth(1);
    let (repos, activity, commits) = tokio::join!(
        fetcher.repos(),
        fetcher.activity(),
        fetcher.commits(repo.as_deref())
    );

    print_projects(&repos);
    println!();
    print_activity(&activity);
    if let Some(repo) = &repo {
        println!();
        print_commits(repo, &commits);
    }

    ExitCode::SUCCESS
}

fn print_projects(state: &ResourceState<Repository>) {
    println!("Projects");
    if let Some(error) = state.error() {
        println!("  {error}");
        return;
    }

    let repos = state.items();
    let languages = showcase::languages(repos);
    if !languages.is_empty() {
        let counts: Vec<String> = languages
            .iter()
            .map(|lang| format!("{lang} ({})", showcase::language_count(repos, lang)))
            .collect();
        println!("  Languages: {}", counts.join(", "));
    }

    let filter = ProjectFilter::new();
    let now = Utc::now();
    for repo in filter.visible(repos) {
        let badge = repo
            .language
            .as_deref()
            .and_then(showcase::language_badge)
            .unwrap_or("--");
        let pushed = repo
            .pushed_at
            .map(|at| relative_time(at, now))
            .unwrap_or_default();
        println!(
            "  [{badge}] {}  *{} forks:{}  {pushed}",
            showcase::display_name(repo),
            repo.stargazers_count,
            repo.forks_count
        );
        println!("       {}", showcase::description_or_default(repo));
        if let Some(homepage) = showcase::homepage(repo) {
            println!("       {homepage}");
        }
    }
    if filter.has_more(repos) {
        let hidden = filter.matching(repos).len() - filter.visible(repos).len();
        println!("  ... and {hidden} more");
    }
}

fn print_activity(state: &ResourceState<Event>) {
    println!("Recent activity");
    let items = feed(state.items(), FEED_LENGTH, Utc::now());
    if items.is_empty() {
        println!("  No recent activity");
        return;
    }
    for item in items {
        println!("  {}  ({})", item.description, item.when);
    }
}

fn print_commits(repo: &str, state: &ResourceState<Commit>) {
    println!("Latest commits in {repo}");
    if let Some(error) = state.error() {
        println!("  {error}");
        return;
    }
    for commit in state.items() {
        println!(
            "  {} {} ({})",
            commit.short_sha(),
            commit.summary(),
            commit.author_name()
        );
    }
}
