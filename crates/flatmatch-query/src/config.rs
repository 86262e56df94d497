use serde::{Deserialize, Serialize};

/// Default ceiling on nested-field expansion.
pub const DEFAULT_MAX_DEPTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Nesting levels expanded before the compiler stops descending.
    pub max_depth: usize,
    /// Reject unknown fields and uncastable values instead of dropping or
    /// passing them through.
    pub strict: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
        }
    }
}

impl MatcherConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
