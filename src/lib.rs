pub mod analyzer;
pub mod catalog;
pub mod expression;
pub mod plan;
pub mod transform;
pub mod types;
pub mod util;

#[cfg(test)]
mod test_util;

pub use self::analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, AnalyzerResult};
