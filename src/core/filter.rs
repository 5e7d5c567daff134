//! Job name exclusion.

/// Patterns excluded when the caller supplies none.
pub const DEFAULT_EXCLUSIONS: [&str; 3] = ["test", "temp", "old"];

/// Case-insensitive substring patterns matched against job names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    patterns: Vec<String>,
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUSIONS)
    }
}

impl ExclusionSet {
    /// Build a set from `patterns` only. Empty patterns are dropped, they
    /// would match every name.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { patterns }
    }

    /// Resolve the set for a run: no user patterns means the defaults,
    /// otherwise the user patterns, optionally on top of the defaults.
    pub fn from_user(patterns: &[String], keep_defaults: bool) -> Self {
        if patterns.is_empty() {
            return Self::default();
        }

        let mut set = if keep_defaults {
            Self::default()
        } else {
            Self::new(std::iter::empty::<&str>())
        };
        set.extend(patterns);
        set
    }

    pub fn extend<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in Self::new(patterns).patterns {
            if !self.patterns.contains(&pattern) {
                self.patterns.push(pattern);
            }
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.patterns.iter().any(|p| name.contains(p.as_str()))
    }
}
