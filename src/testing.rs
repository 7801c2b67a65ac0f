// Test doubles and fixtures shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use crate::cache::{CacheService, DEFAULT_TTL, ManualClock, MemoryStorage};
use crate::config::ACCOUNT;
use crate::error::{FolioError, Result};
use crate::fetcher::Fetcher;
use crate::github::{
    Commit, CommitAuthor, CommitDetail, Event, EventKind, EventRepo, GitHubApi, Repository,
};

/// In-memory GitHub API.
///
/// Unset resources answer with `NotFound`. A gated fake holds every call
/// until `release` is called.
#[derive(Default)]
pub struct FakeApi {
    repos: Mutex<Option<Vec<Repository>>>,
    events: Mutex<Option<Vec<Event>>>,
    commits: Mutex<Option<Vec<Commit>>>,
    calls: Mutex<Vec<String>>,
    active: Arc<AtomicUsize>,
    gate: Option<Semaphore>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn with_repos(self, repos: Vec<Repository>) -> Self {
        self.set_repos(Some(repos));
        self
    }

    pub fn with_commits(self, commits: Vec<Commit>) -> Self {
        *lock(&self.commits) = Some(commits);
        self
    }

    pub fn set_repos(&self, repos: Option<Vec<Repository>>) {
        *lock(&self.repos) = repos;
    }

    pub fn set_events(&self, events: Option<Vec<Event>>) {
        *lock(&self.events) = events;
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1024);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Calls started and not yet finished or dropped.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    async fn enter(&self, call: String) -> ActiveGuard {
        lock(&self.calls).push(call);
        self.active.fetch_add(1, Ordering::SeqCst);
        let guard = ActiveGuard(self.active.clone());
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await;
        }
        guard
    }
}

struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl GitHubApi for FakeApi {
    async fn user_repos(&self, account: &str) -> Result<Vec<Repository>> {
        let _guard = self.enter(format!("repos:{account}")).await;
        lock(&self.repos)
            .clone()
            .ok_or_else(|| FolioError::NotFound(format!("/users/{account}/repos")))
    }

    async fn user_events(&self, account: &str) -> Result<Vec<Event>> {
        let _guard = self.enter(format!("events:{account}")).await;
        lock(&self.events)
            .clone()
            .ok_or_else(|| FolioError::NotFound(format!("/users/{account}/events/public")))
    }

    async fn repo_commits(&self, account: &str, repo: &str) -> Result<Vec<Commit>> {
        let _guard = self.enter(format!("commits:{account}/{repo}")).await;
        lock(&self.commits)
            .clone()
            .ok_or_else(|| FolioError::NotFound(format!("/repos/{account}/{repo}/commits")))
    }
}

/// Fetcher over `api` with in-memory storage and a manual clock.
pub fn fixture(api: Arc<FakeApi>) -> (Fetcher, Arc<MemoryStorage>, Arc<ManualClock>) {
    let storage = Arc::new(MemoryStorage::new());
    let clock = Arc::new(ManualClock::new(at(2024, 5, 1, 12)));
    let cache = CacheService::new(storage.clone(), clock.clone(), DEFAULT_TTL);
    (Fetcher::new(api, cache, ACCOUNT), storage, clock)
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub fn repo(id: u64, name: &str, language: Option<&str>) -> Repository {
    Repository {
        id,
        name: name.to_string(),
        description: None,
        html_url: format!("https://github.com/{ACCOUNT}/{name}"),
        homepage: None,
        stargazers_count: 0,
        forks_count: 0,
        language: language.map(str::to_string),
        topics: Vec::new(),
        updated_at: at(2024, 4, 30, 10),
        pushed_at: Some(at(2024, 4, 30, 10)),
    }
}

pub fn event(id: &str, kind: EventKind) -> Event {
    Event {
        id: id.to_string(),
        repo: EventRepo {
            name: format!("{ACCOUNT}/portfolio"),
        },
        created_at: at(2024, 5, 1, 9),
        kind,
    }
}

pub fn commit(sha: &str, message: &str) -> Commit {
    Commit {
        sha: sha.to_string(),
        commit: CommitDetail {
            message: message.to_string(),
            author: CommitAuthor {
                name: "Samia".to_string(),
                date: at(2024, 5, 1, 8),
            },
        },
        html_url: format!("https://github.com/{ACCOUNT}/portfolio/commit/{sha}"),
    }
}

/// Raw HTTP/1.1 response with a JSON body and extra headers.
pub fn http_response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for (name, value) in headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str("\r\n");
    response.push_str(body);
    response
}

/// Loopback server answering one connection per canned response, in order.
///
/// Returns the base URL and the request lines received so far.
pub async fn serve(responses: Vec<String>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    tokio::spawn(async move {
        for response in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..n]);
            }
            let request_line = String::from_utf8_lossy(&head)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string();
            lock(&seen).push(request_line);
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        }
    });

    (base, requests)
}

pub fn requests(seen: &Mutex<Vec<String>>) -> Vec<String> {
    lock(seen).clone()
}
