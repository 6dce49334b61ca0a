mod expr_rewriter;
mod plan_rewriter;
mod visitor;

pub use expr_rewriter::*;
pub use plan_rewriter::*;
pub use visitor::*;

/// The result of a rewrite. When `changed` is false, `data` is the input reference itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed<T> {
    pub data: T,
    pub changed: bool,
}

impl<T> Transformed<T> {
    pub fn new(data: T, changed: bool) -> Self {
        Self { data, changed }
    }

    /// The data was rewritten.
    pub fn yes(data: T) -> Self {
        Self::new(data, true)
    }

    /// The data is returned untouched.
    pub fn no(data: T) -> Self {
        Self::new(data, false)
    }
}
