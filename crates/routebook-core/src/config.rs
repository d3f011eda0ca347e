use std::path::PathBuf;

pub const LIBRARY_ENV: &str = "ROUTEBOOK_LIBRARY";
pub const LOG_ENV: &str = "ROUTEBOOK_LOG";

pub const DEFAULT_LIBRARY_DIR: &str = "library";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    pub library_path: PathBuf,
    pub log_filter: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            library_path: PathBuf::from(DEFAULT_LIBRARY_DIR),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl LibraryConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Blank values count as unset.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();
        Self {
            library_path: read(LIBRARY_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.library_path),
            log_filter: read(LOG_ENV).unwrap_or(defaults.log_filter),
        }
    }

    #[must_use]
    pub fn with_library_path(mut self, library_path: Option<PathBuf>) -> Self {
        if let Some(library_path) = library_path {
            self.library_path = library_path;
        }
        self
    }
}
