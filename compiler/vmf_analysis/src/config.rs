//! Analysis configuration.

/// Knobs for one analysis or remediation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Worker threads for the collection phase; `0` lets rayon decide.
    pub num_threads: usize,
    /// Keep a View's registration and its companion factory registration
    /// next to each other when remediating, moving an existing companion
    /// registration if needed.
    pub keep_pairs_adjacent: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            num_threads: 0,
            keep_pairs_adjacent: true,
        }
    }
}

impl AnalysisConfig {
    /// Run collection on the calling thread only.
    pub fn single_threaded() -> Self {
        AnalysisConfig {
            num_threads: 1,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    #[must_use]
    pub fn with_keep_pairs_adjacent(mut self, keep: bool) -> Self {
        self.keep_pairs_adjacent = keep;
        self
    }

    pub fn is_sequential(&self) -> bool {
        self.num_threads == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert!(config.keep_pairs_adjacent);
        assert_eq!(config.num_threads, 0);
        assert!(!config.is_sequential());
        assert!(AnalysisConfig::single_threaded().is_sequential());
    }
}
