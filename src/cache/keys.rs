// Cache key construction.
// Keys are `{kind}_{account}` or `{kind}_{account}_{repo}`, shared by every consumer.

/// Key for an account's repository list.
pub fn repos_key(account: &str) -> String {
    format!("github_repos_{}", account)
}

/// Key for an account's public activity.
pub fn events_key(account: &str) -> String {
    format!("github_events_{}", account)
}

/// Key for a repository's latest commits.
pub fn commits_key(account: &str, repo: &str) -> String {
    format!("github_commits_{}_{}", account, repo)
}

/// Sanitize a key for use as a file name.
/// Replaces problematic characters with underscores.
pub fn file_name(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();
    format!("{}.json", stem)
}
