// Projects section logic.
// Language filter with paging, plus display helpers for repository cards.

use std::collections::BTreeSet;

use crate::github::Repository;

/// Cards revealed per "show more" step.
pub const PAGE_SIZE: usize = 4;

/// Topics shown per card.
pub const MAX_TOPICS: usize = 2;

/// Distinct primary languages, sorted.
pub fn languages(repos: &[Repository]) -> Vec<String> {
    repos
        .iter()
        .filter_map(|r| r.language.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Number of repositories whose primary language is `language`.
pub fn language_count(repos: &[Repository], language: &str) -> usize {
    repos
        .iter()
        .filter(|r| r.language.as_deref() == Some(language))
        .count()
}

/// Language filter and paging state for the projects grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFilter {
    language: Option<String>,
    visible: usize,
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self {
            language: None,
            visible: PAGE_SIZE,
        }
    }
}

impl ProjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Switch the language filter (`None` shows all) and go back to the first page.
    pub fn select_language(&mut self, language: Option<&str>) {
        self.language = language.map(str::to_string);
        self.visible = PAGE_SIZE;
    }

    pub fn show_more(&mut self) {
        self.visible += PAGE_SIZE;
    }

    /// Repositories matching the filter, all pages.
    pub fn matching<'a>(&self, repos: &'a [Repository]) -> Vec<&'a Repository> {
        repos
            .iter()
            .filter(|r| match &self.language {
                Some(language) => r.language.as_ref() == Some(language),
                None => true,
            })
            .collect()
    }

    /// Repositories on the revealed pages.
    pub fn visible<'a>(&self, repos: &'a [Repository]) -> Vec<&'a Repository> {
        let mut matching = self.matching(repos);
        matching.truncate(self.visible);
        matching
    }

    pub fn has_more(&self, repos: &[Repository]) -> bool {
        self.visible < self.matching(repos).len()
    }
}

/// Repository name with `-` and `_` turned into spaces.
pub fn display_name(repo: &Repository) -> String {
    repo.name.replace(['-', '_'], " ")
}

pub fn description_or_default(repo: &Repository) -> &str {
    match repo.description.as_deref() {
        Some(description) if !description.trim().is_empty() => description,
        _ => "No description available",
    }
}

/// Homepage link, skipping the empty strings GitHub returns for unset homepages.
pub fn homepage(repo: &Repository) -> Option<&str> {
    repo.homepage.as_deref().filter(|h| !h.trim().is_empty())
}

pub fn top_topics(repo: &Repository) -> &[String] {
    &repo.topics[..repo.topics.len().min(MAX_TOPICS)]
}

/// Two-letter badge for well-known languages.
pub fn language_badge(language: &str) -> Option<&'static str> {
    let badge = match language {
        "TypeScript" => "TS",
        "JavaScript" => "JS",
        "Python" => "PY",
        "Java" => "JV",
        "HTML" => "H5",
        "CSS" => "CS",
        "C#" => "C#",
        "Go" => "GO",
        "Rust" => "RS",
        "Ruby" => "RB",
        "PHP" => "PH",
        "Shell" => "SH",
        _ => return None,
    };
    Some(badge)
}
