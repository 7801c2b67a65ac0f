// Activity feed formatting.
// Turns public events into one-line descriptions with relative timestamps.

use chrono::{DateTime, Utc};

use crate::github::{Event, EventKind};

/// Events shown in the sidebar.
pub const FEED_LENGTH: usize = 5;

/// A rendered feed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub id: String,
    pub description: String,
    pub url: String,
    pub when: String,
}

impl Event {
    /// Repository name without the owner prefix.
    pub fn repo_short_name(&self) -> &str {
        self.repo
            .name
            .split_once('/')
            .map_or(self.repo.name.as_str(), |(_, name)| name)
    }

    pub fn repo_url(&self) -> String {
        format!("https://github.com/{}", self.repo.name)
    }

    /// One-line, human readable summary.
    pub fn describe(&self) -> String {
        let repo = self.repo_short_name();
        match &self.kind {
            EventKind::Push { commit_count, .. } => {
                let plural = if *commit_count == 1 { "" } else { "s" };
                format!("Pushed {commit_count} commit{plural} to {repo}")
            }
            EventKind::Create { ref_type, .. } => format!("Created {ref_type} in {repo}"),
            EventKind::Watch => format!("Starred {}", self.repo.name),
            EventKind::Fork { .. } => format!("Forked {}", self.repo.name),
            EventKind::Issues { action, .. } => format!("{action} issue in {repo}"),
            EventKind::PullRequest { action, .. } => format!("{action} PR in {repo}"),
            EventKind::Other { .. } => format!("Activity in {repo}"),
        }
    }
}

/// First `limit` events as feed lines, timed relative to `now`.
pub fn feed(events: &[Event], limit: usize, now: DateTime<Utc>) -> Vec<FeedItem> {
    events
        .iter()
        .take(limit)
        .map(|event| FeedItem {
            id: event.id.clone(),
            description: event.describe(),
            url: event.repo_url(),
            when: relative_time(event.created_at, now),
        })
        .collect()
}

/// Coarse "time ago" phrase.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }

    let hours = elapsed.num_hours();
    let days = elapsed.num_days();
    let (count, unit) = if hours < 1 {
        (minutes, "minute")
    } else if days < 1 {
        (hours, "hour")
    } else if days < 30 {
        (days, "day")
    } else if days < 365 {
        (days / 30, "month")
    } else {
        (days / 365, "year")
    };

    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
