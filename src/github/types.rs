// GitHub API response types.
// Defines structs for deserializing the repository, event and commit endpoints.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Public repository summary as listed by `/users/{account}/repos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub homepage: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub updated_at: DateTime<Utc>,
    /// Null for repositories that never received a push.
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Commit as listed by `/repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub commit: CommitDetail,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: CommitAuthor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub date: DateTime<Utc>,
}

impl Commit {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.commit.message.lines().next().unwrap_or_default()
    }

    pub fn author_name(&self) -> &str {
        &self.commit.author.name
    }

    /// Abbreviated SHA as shown by git.
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }
}

/// Repository reference carried by an event (`owner/name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRepo {
    pub name: String,
}

/// Public activity event from `/users/{account}/events/public`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEvent", into = "RawEvent")]
pub struct Event {
    pub id: String,
    pub repo: EventRepo,
    pub created_at: DateTime<Utc>,
    pub kind: EventKind,
}

/// Event kind with the payload fields relevant to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Push {
        ref_name: Option<String>,
        commit_count: u64,
    },
    Create {
        ref_type: String,
        ref_name: Option<String>,
    },
    Watch,
    Fork {
        forkee: Option<String>,
    },
    Issues {
        action: String,
        number: Option<u64>,
    },
    PullRequest {
        action: String,
        number: Option<u64>,
    },
    /// Any event type not modelled above, keeping its upstream name.
    Other {
        kind: String,
    },
}

impl EventKind {
    /// Upstream `type` string.
    pub fn type_name(&self) -> &str {
        match self {
            EventKind::Push { .. } => "PushEvent",
            EventKind::Create { .. } => "CreateEvent",
            EventKind::Watch => "WatchEvent",
            EventKind::Fork { .. } => "ForkEvent",
            EventKind::Issues { .. } => "IssuesEvent",
            EventKind::PullRequest { .. } => "PullRequestEvent",
            EventKind::Other { kind } => kind,
        }
    }
}

/// Wire shape of an event: a type tag with a loosely structured payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    repo: EventRepo,
    #[serde(default)]
    payload: Value,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    ref_name: Option<String>,
    commits: Option<Vec<Value>>,
    size: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CreatePayload {
    #[serde(rename = "ref")]
    ref_name: Option<String>,
    ref_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ForkPayload {
    forkee: Option<Forkee>,
}

#[derive(Debug, Deserialize)]
struct Forkee {
    full_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ActionPayload {
    action: Option<String>,
    number: Option<u64>,
    issue: Option<Numbered>,
    pull_request: Option<Numbered>,
}

#[derive(Debug, Deserialize)]
struct Numbered {
    number: u64,
}

/// Decode a payload leniently; missing or oddly shaped payloads yield defaults.
fn payload<T: DeserializeOwned + Default>(value: Value) -> T {
    serde_json::from_value(value).unwrap_or_default()
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        let kind = match raw.kind.as_str() {
            "PushEvent" => {
                let p: PushPayload = payload(raw.payload);
                let commit_count = p
                    .commits
                    .map(|c| c.len() as u64)
                    .or(p.size)
                    .unwrap_or(0);
                EventKind::Push {
                    ref_name: p.ref_name,
                    commit_count,
                }
            }
            "CreateEvent" => {
                let p: CreatePayload = payload(raw.payload);
                EventKind::Create {
                    ref_type: p.ref_type.unwrap_or_default(),
                    ref_name: p.ref_name,
                }
            }
            "WatchEvent" => EventKind::Watch,
            "ForkEvent" => {
                let p: ForkPayload = payload(raw.payload);
                EventKind::Fork {
                    forkee: p.forkee.map(|f| f.full_name),
                }
            }
            "IssuesEvent" => {
                let p: ActionPayload = payload(raw.payload);
                EventKind::Issues {
                    number: p.issue.map(|i| i.number).or(p.number),
                    action: p.action.unwrap_or_default(),
                }
            }
            "PullRequestEvent" => {
                let p: ActionPayload = payload(raw.payload);
                EventKind::PullRequest {
                    number: p.number.or(p.pull_request.map(|pr| pr.number)),
                    action: p.action.unwrap_or_default(),
                }
            }
            _ => EventKind::Other { kind: raw.kind },
        };

        Self {
            id: raw.id,
            repo: raw.repo,
            created_at: raw.created_at,
            kind,
        }
    }
}

impl From<Event> for RawEvent {
    fn from(event: Event) -> Self {
        let kind = event.kind.type_name().to_string();
        let payload = match event.kind {
            EventKind::Push {
                ref_name,
                commit_count,
            } => json!({ "ref": ref_name, "size": commit_count }),
            EventKind::Create { ref_type, ref_name } => {
                json!({ "ref": ref_name, "ref_type": ref_type })
            }
            EventKind::Watch => json!({ "action": "started" }),
            EventKind::Fork { forkee } => match forkee {
                Some(full_name) => json!({ "forkee": { "full_name": full_name } }),
                None => json!({}),
            },
            EventKind::Issues { action, number } | EventKind::PullRequest { action, number } => {
                json!({ "action": action, "number": number })
            }
            EventKind::Other { .. } => json!({}),
        };

        Self {
            id: event.id,
            kind,
            repo: event.repo,
            payload,
            created_at: event.created_at,
        }
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_json(kind: &str, payload: Value) -> Value {
        json!({
            "id": "42",
            "type": kind,
            "actor": { "login": "SamiaLuvanice" },
            "repo": { "id": 1, "name": "SamiaLuvanice/portfolio", "url": "https://api.github.com/repos/SamiaLuvanice/portfolio" },
            "payload": payload,
            "public": true,
            "created_at": "2024-05-01T12:00:00Z"
        })
    }

    fn parse(kind: &str, payload: Value) -> Event {
        serde_json::from_value(event_json(kind, payload)).unwrap()
    }

    #[test]
    fn test_push_counts_commits() {
        let event = parse(
            "PushEvent",
            json!({ "ref": "refs/heads/main", "size": 9, "commits": [{ "sha": "a" }, { "sha": "b" }] }),
        );
        assert_eq!(
            event.kind,
            EventKind::Push {
                ref_name: Some("refs/heads/main".to_string()),
                commit_count: 2
            }
        );
        assert_eq!(event.repo.name, "SamiaLuvanice/portfolio");
    }

    #[test]
    fn test_push_falls_back_to_size() {
        let event = parse("PushEvent", json!({ "size": 4 }));
        assert!(matches!(event.kind, EventKind::Push { commit_count: 4, .. }));
    }

    #[test]
    fn test_create_and_fork() {
        let create = parse("CreateEvent", json!({ "ref": "dev", "ref_type": "branch" }));
        assert_eq!(
            create.kind,
            EventKind::Create {
                ref_type: "branch".to_string(),
                ref_name: Some("dev".to_string())
            }
        );

        let fork = parse("ForkEvent", json!({ "forkee": { "full_name": "someone/portfolio" } }));
        assert_eq!(
            fork.kind,
            EventKind::Fork {
                forkee: Some("someone/portfolio".to_string())
            }
        );
    }

    #[test]
    fn test_issue_and_pull_request_numbers() {
        let issue = parse("IssuesEvent", json!({ "action": "opened", "issue": { "number": 7 } }));
        assert_eq!(
            issue.kind,
            EventKind::Issues {
                action: "opened".to_string(),
                number: Some(7)
            }
        );

        let pr = parse(
            "PullRequestEvent",
            json!({ "action": "closed", "number": 12, "pull_request": { "number": 12 } }),
        );
        assert_eq!(
            pr.kind,
            EventKind::PullRequest {
                action: "closed".to_string(),
                number: Some(12)
            }
        );
    }

    #[test]
    fn test_unknown_kind_and_missing_payload() {
        let mut value = event_json("GollumEvent", Value::Null);
        value.as_object_mut().unwrap().remove("payload");
        let event: Event = serde_json::from_value(value).unwrap();
        assert_eq!(
            event.kind,
            EventKind::Other {
                kind: "GollumEvent".to_string()
            }
        );
        assert_eq!(event.kind.type_name(), "GollumEvent");
    }

    #[test]
    fn test_malformed_payload_is_lenient() {
        let event = parse("PushEvent", json!({ "commits": "not a list" }));
        assert!(matches!(event.kind, EventKind::Push { commit_count: 0, .. }));
    }

    #[test]
    fn test_event_survives_cache_encoding() {
        let events = vec![
            parse("PushEvent", json!({ "commits": [{}, {}, {}] })),
            parse("CreateEvent", json!({ "ref_type": "repository" })),
            parse("WatchEvent", json!({ "action": "started" })),
            parse("IssuesEvent", json!({ "action": "reopened", "issue": { "number": 3 } })),
            parse("ReleaseEvent", json!({ "action": "published" })),
        ];

        let encoded = serde_json::to_string(&events).unwrap();
        let decoded: Vec<Event> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, events);
    }

    #[test]
    fn test_repository_from_api() {
        let repo: Repository = serde_json::from_value(json!({
            "id": 101,
            "name": "task-board",
            "full_name": "SamiaLuvanice/task-board",
            "description": null,
            "html_url": "https://github.com/SamiaLuvanice/task-board",
            "homepage": "",
            "stargazers_count": 3,
            "forks_count": 1,
            "language": "TypeScript",
            "topics": ["react", "vite"],
            "updated_at": "2024-04-30T10:00:00Z",
            "pushed_at": "2024-04-29T09:00:00Z"
        }))
        .unwrap();

        assert_eq!(repo.id, 101);
        assert!(repo.description.is_none());
        assert_eq!(repo.language.as_deref(), Some("TypeScript"));
        assert_eq!(repo.topics, vec!["react", "vite"]);
    }

    #[test]
    fn test_commit_accessors() {
        let commit: Commit = serde_json::from_value(json!({
            "sha": "0123456789abcdef",
            "commit": {
                "message": "Add projects filter\n\nLonger body",
                "author": { "name": "Samia", "email": "s@example.com", "date": "2024-05-01T08:00:00Z" }
            },
            "html_url": "https://github.com/SamiaLuvanice/portfolio/commit/0123456789abcdef"
        }))
        .unwrap();

        assert_eq!(commit.summary(), "Add projects filter");
        assert_eq!(commit.author_name(), "Samia");
        assert_eq!(commit.short_sha(), "0123456");
    }
}
