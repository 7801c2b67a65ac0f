// folio: data layer for a GitHub-backed portfolio page.
// Fetches repositories, public activity and commits with a short-lived local cache.

pub mod cache;
pub mod config;
pub mod contact;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod github;
pub mod logging;
pub mod showcase;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{FolioError, Result};
pub use fetcher::{Fetcher, Resource, Subscription};
pub use state::{LoadingState, ResourceState};
