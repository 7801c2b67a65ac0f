// Observable state of a remote resource.

/// Loading state for async data.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadingState<T> {
    /// Nothing to fetch (no input given).
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Error(String),
}

/// State of a list resource as consumers see it.
pub type ResourceState<T> = LoadingState<Vec<T>>;

impl<T> LoadingState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadingState::Loaded(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadingState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Human-readable failure message, if the fetch failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            LoadingState::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> LoadingState<Vec<T>> {
    /// Loaded items; empty while idle, loading, or after an error.
    pub fn items(&self) -> &[T] {
        self.data().map(Vec::as_slice).unwrap_or_default()
    }
}
