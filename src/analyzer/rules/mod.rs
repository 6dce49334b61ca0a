//! The rules run by the default analyzer batches.

mod eval_filter;
mod join;
mod parallelize;
mod process;
mod resolve_columns;
mod resolve_subqueries;
mod resolve_tables;
mod select_limit;
mod simplification;
mod validation;

pub use eval_filter::*;
pub use join::*;
pub use parallelize::*;
pub use process::*;
pub use resolve_columns::*;
pub use resolve_subqueries::*;
pub use resolve_tables::*;
pub use select_limit::*;
pub use simplification::*;
pub use validation::*;
