// Cache-aside fetcher for the portfolio's GitHub resources.
// Serves fresh cache entries directly, otherwise coalesces concurrent requests per cache key.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cache::{
    CacheService, CacheStorage, FileStorage, MemoryStorage, SystemClock, commits_key, events_key,
    repos_key,
};
use crate::config::Config;
use crate::error::Result;
use crate::github::{Commit, Event, GitHubApi, GitHubClient, Repository};
use crate::state::{LoadingState, ResourceState};

/// The remote resources the portfolio reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Repositories,
    Activity,
    Commits,
}

impl Resource {
    /// Message shown to the user when a fetch fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Resource::Repositories => "Failed to fetch repositories",
            Resource::Activity => "Failed to fetch activity",
            Resource::Commits => "Failed to fetch commits",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::Repositories => "repositories",
            Resource::Activity => "activity",
            Resource::Commits => "commits",
        })
    }
}

/// Bounds shared by every cached record type.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Record for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

type FlightOutcome<T> = std::result::Result<Arc<Vec<T>>, String>;
type FlightFuture<T> = BoxFuture<'static, FlightOutcome<T>>;
type Flight<T> = Shared<FlightFuture<T>>;
type ApiCall<T> = Box<dyn FnOnce(Arc<dyn GitHubApi>) -> BoxFuture<'static, Result<Vec<T>>> + Send>;

/// Requests currently on the wire, by cache key.
///
/// Only weak handles are kept here: a request is dropped, and its HTTP call
/// cancelled, once every consumer awaiting it has gone away.
struct InFlight<T> {
    flights: Mutex<HashMap<String, WeakShared<FlightFuture<T>>>>,
}

impl<T> Default for InFlight<T> {
    fn default() -> Self {
        Self {
            flights: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Send + Sync + 'static> InFlight<T> {
    /// Attach to the live request for `key`, or start one with `start`.
    fn join<F>(&self, key: &str, start: F) -> Flight<T>
    where
        F: FnOnce() -> FlightFuture<T>,
    {
        let mut flights = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = flights.get(key).and_then(WeakShared::upgrade) {
            tracing::debug!(key, "joining in-flight request");
            return existing;
        }

        flights.retain(|_, weak| weak.upgrade().is_some());
        let flight = start().shared();
        if let Some(weak) = flight.downgrade() {
            flights.insert(key.to_string(), weak);
        }
        flight
    }

    fn finish(&self, key: &str) {
        self.flights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.flights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|weak| weak.upgrade().is_some())
            .count()
    }
}

struct Inner {
    api: Arc<dyn GitHubApi>,
    cache: CacheService,
    account: String,
    repos: InFlight<Repository>,
    events: InFlight<Event>,
    commits: InFlight<Commit>,
}

impl Inner {
    fn repo_flights(&self) -> &InFlight<Repository> {
        &self.repos
    }

    fn event_flights(&self) -> &InFlight<Event> {
        &self.events
    }

    fn commit_flights(&self) -> &InFlight<Commit> {
        &self.commits
    }

    /// Write a fetched payload to the cache off the async workers; storage may touch disk.
    async fn store<T: Record>(&self, key: &str, data: Arc<Vec<T>>) {
        let cache = self.cache.clone();
        let key = key.to_string();
        if let Err(e) = tokio::task::spawn_blocking(move || cache.put(&key, data.as_ref())).await {
            tracing::warn!(error = %e, "cache write task failed");
        }
    }
}

/// One accessor invocation: where to cache, how to call, which flights to share.
struct Fetch<T> {
    resource: Resource,
    key: String,
    flights: fn(&Inner) -> &InFlight<T>,
    call: ApiCall<T>,
}

/// Read accessors for repositories, activity and commits of one account.
#[derive(Clone)]
pub struct Fetcher {
    inner: Arc<Inner>,
}

impl Fetcher {
    pub fn new(api: Arc<dyn GitHubApi>, cache: CacheService, account: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                cache,
                account: account.into(),
                repos: InFlight::default(),
                events: InFlight::default(),
                commits: InFlight::default(),
            }),
        }
    }

    /// Fetcher over the real GitHub client with the cache described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = GitHubClient::new(config)?;
        let storage: Arc<dyn CacheStorage> = match &config.cache_dir {
            Some(dir) => Arc::new(FileStorage::new(dir)),
            None => Arc::new(MemoryStorage::new()),
        };
        let cache = CacheService::new(storage, Arc::new(SystemClock), config.cache_ttl);
        Ok(Self::new(Arc::new(client), cache, config.account.clone()))
    }

    /// Repositories of the account, most recently updated first.
    pub async fn repos(&self) -> ResourceState<Repository> {
        self.load(self.repos_fetch()).await
    }

    /// Recent public activity of the account.
    pub async fn activity(&self) -> ResourceState<Event> {
        self.load(self.activity_fetch()).await
    }

    /// Latest commits of `repo`. Missing or empty names resolve to `Idle` without a request.
    pub async fn commits(&self, repo: Option<&str>) -> ResourceState<Commit> {
        match non_empty(repo) {
            Some(repo) => self.load(self.commits_fetch(repo)).await,
            None => LoadingState::Idle,
        }
    }

    /// Subscribe to the repository list.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn watch_repos(&self) -> Subscription<Repository> {
        self.subscribe(self.repos_fetch())
    }

    /// Subscribe to the activity feed.
    pub fn watch_activity(&self) -> Subscription<Event> {
        self.subscribe(self.activity_fetch())
    }

    /// Subscribe to the commits of `repo`; idle when no name is given.
    pub fn watch_commits(&self, repo: Option<&str>) -> Subscription<Commit> {
        match non_empty(repo) {
            Some(repo) => self.subscribe(self.commits_fetch(repo)),
            None => Subscription::settled_with(LoadingState::Idle),
        }
    }

    fn repos_fetch(&self) -> Fetch<Repository> {
        let account = self.inner.account.clone();
        Fetch {
            resource: Resource::Repositories,
            key: repos_key(&account),
            flights: Inner::repo_flights,
            call: Box::new(move |api: Arc<dyn GitHubApi>| {
                async move { api.user_repos(&account).await }.boxed()
            }),
        }
    }

    fn activity_fetch(&self) -> Fetch<Event> {
        let account = self.inner.account.clone();
        Fetch {
            resource: Resource::Activity,
            key: events_key(&account),
            flights: Inner::event_flights,
            call: Box::new(move |api: Arc<dyn GitHubApi>| {
                async move { api.user_events(&account).await }.boxed()
            }),
        }
    }

    fn commits_fetch(&self, repo: &str) -> Fetch<Commit> {
        let account = self.inner.account.clone();
        let repo = repo.to_string();
        Fetch {
            resource: Resource::Commits,
            key: commits_key(&account, &repo),
            flights: Inner::commit_flights,
            call: Box::new(move |api: Arc<dyn GitHubApi>| {
                async move { api.repo_commits(&account, &repo).await }.boxed()
            }),
        }
    }

    fn cached<T: Record>(&self, fetch: &Fetch<T>) -> Option<Vec<T>> {
        let data = self.inner.cache.get::<Vec<T>>(&fetch.key)?;
        tracing::debug!(resource = %fetch.resource, key = %fetch.key, "cache hit");
        Some(data)
    }

    async fn load<T: Record>(&self, fetch: Fetch<T>) -> ResourceState<T> {
        if let Some(data) = self.cached(&fetch) {
            return LoadingState::Loaded(data);
        }
        settle(self.flight(fetch)).await
    }

    fn subscribe<T: Record>(&self, fetch: Fetch<T>) -> Subscription<T> {
        if let Some(data) = self.cached(&fetch) {
            return Subscription::settled_with(LoadingState::Loaded(data));
        }

        let flight = self.flight(fetch);
        let (tx, rx) = watch::channel(LoadingState::Loading);
        let task = tokio::spawn(async move {
            let _ = tx.send(settle(flight).await);
        });
        Subscription {
            rx,
            task: Some(task),
        }
    }

    fn flight<T: Record>(&self, fetch: Fetch<T>) -> Flight<T> {
        let Fetch {
            resource,
            key,
            flights,
            call,
        } = fetch;
        let inner = self.inner.clone();
        let flight_key = key.clone();

        flights(&self.inner).join(&key, move || {
            async move {
                // A request for this key may have landed between the lookup and the join.
                let outcome = match inner.cache.get::<Vec<T>>(&flight_key) {
                    Some(data) => Ok(Arc::new(data)),
                    None => match call(inner.api.clone()).await {
                        Ok(data) => {
                            tracing::debug!(%resource, key = %flight_key, count = data.len(), "fetched");
                            let data = Arc::new(data);
                            inner.store(&flight_key, data.clone()).await;
                            Ok(data)
                        }
                        Err(e) => {
                            tracing::warn!(%resource, key = %flight_key, error = %e, "fetch failed");
                            Err(resource.failure_message().to_string())
                        }
                    },
                };
                flights(&inner).finish(&flight_key);
                outcome
            }
            .boxed()
        })
    }
}

async fn settle<T: Clone>(flight: Flight<T>) -> ResourceState<T> {
    match flight.await {
        Ok(data) => LoadingState::Loaded(Vec::clone(&data)),
        Err(message) => LoadingState::Error(message),
    }
}

fn non_empty(repo: Option<&str>) -> Option<&str> {
    repo.filter(|name| !name.is_empty())
}

/// A consumer's view of one resource.
///
/// Dropping the subscription detaches it from the underlying request;
/// the request keeps running for any other consumer still attached.
pub struct Subscription<T> {
    rx: watch::Receiver<ResourceState<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T: Clone> Subscription<T> {
    fn settled_with(state: ResourceState<T>) -> Self {
        let (_tx, rx) = watch::channel(state);
        Self { rx, task: None }
    }

    /// Current state.
    pub fn state(&self) -> ResourceState<T> {
        self.rx.borrow().clone()
    }

    /// Wait until the resource is no longer loading and return that state.
    pub async fn settled(&mut self) -> ResourceState<T> {
        if let Ok(state) = self.rx.wait_for(|state| !state.is_loading()).await {
            return state.clone();
        }
        // Sender gone without a final state: the task was torn down.
        self.rx.borrow().clone()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
