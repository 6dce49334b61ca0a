use derive_builder::Builder;

pub const DEFAULT_MAX_ITERATIONS: usize = 8;

/// Analyzer settings fixed at construction time.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Worker count for parallel subtrees. 0 and 1 disable parallelization.
    #[builder(default = "0")]
    pub parallelism: usize,
    /// Sweep cap of fix point batches.
    #[builder(default = "DEFAULT_MAX_ITERATIONS")]
    pub max_iterations: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            parallelism: 0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}
