/// Failures raised by individual rules. They are surfaced to the caller verbatim.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("column {0} could not be found in any table in scope")]
    ColumnNotFound(String),
    #[error("ambiguous column name {0}")]
    AmbiguousColumn(String),
    #[error("invalid value for LIMIT: {0}")]
    InvalidLimitValue(String),
    #[error("invalid value for OFFSET: {0}")]
    InvalidOffsetValue(String),
    #[error("plan is not resolved because of node: {0}")]
    UnresolvedPlan(String),
    #[error("unknown column {column} in index {index}")]
    UnknownIndexColumn { index: String, column: String },
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("rule error: {0}")]
    RuleError(
        #[from]
        #[source]
        RuleError,
    ),
    #[error("invalid children number for {node}: expected {expected}, got {got}")]
    InvalidChildrenNumber {
        node: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid expression number for {node}: expected {expected}, got {got}")]
    InvalidExpressionNumber {
        node: String,
        expected: usize,
        got: usize,
    },
    #[error("batch {batch} exceeded max analysis iterations ({iterations})")]
    NonConvergence { batch: String, iterations: usize },
    #[error("unknown analyzer batch: {0}")]
    UnknownBatch(String),
    #[error("analysis cancelled")]
    Cancelled,
    #[error("analysis deadline exceeded")]
    DeadlineExceeded,
}

impl AnalyzerError {
    /// A node or expression was rebuilt with the wrong number of inputs.
    pub fn is_arity_error(&self) -> bool {
        matches!(
            self,
            AnalyzerError::InvalidChildrenNumber { .. }
                | AnalyzerError::InvalidExpressionNumber { .. }
        )
    }

    pub fn is_non_convergence(&self) -> bool {
        matches!(self, AnalyzerError::NonConvergence { .. })
    }

    pub fn is_rule_error(&self) -> bool {
        matches!(self, AnalyzerError::RuleError(_))
    }
}

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

pub(crate) fn check_children_number<T>(
    node: &str,
    children: &[T],
    expected: usize,
) -> AnalyzerResult<()> {
    if children.len() != expected {
        return Err(AnalyzerError::InvalidChildrenNumber {
            node: node.to_string(),
            expected,
            got: children.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_expression_number<T>(
    node: &str,
    exprs: &[T],
    expected: usize,
) -> AnalyzerResult<()> {
    if exprs.len() != expected {
        return Err(AnalyzerError::InvalidExpressionNumber {
            node: node.to_string(),
            expected,
            got: exprs.len(),
        });
    }
    Ok(())
}
