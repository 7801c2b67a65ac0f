// GitHub API module.
// Provides the client, the endpoint trait, and response types.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::GitHubClient;
pub use endpoints::GitHubApi;
pub use types::*;
