use arrow::datatypes::DataType;
use derive_new::new;

use crate::plan::{PlanRef, PlanTreeNode};

/// A nested query used as an expression. The plan is analyzed separately from the enclosing
/// query, with the enclosing nodes pushed onto the scope.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Subquery {
    pub query: PlanRef,
    pub query_string: String,
}

impl Subquery {
    pub fn with_query(&self, query: PlanRef) -> Self {
        Self {
            query,
            query_string: self.query_string.clone(),
        }
    }

    pub fn resolved(&self) -> bool {
        self.query.resolved()
    }

    /// The type of the first projected column, which is what a scalar subquery yields.
    pub fn data_type(&self) -> DataType {
        self.query
            .output_columns()
            .first()
            .map(|c| c.data_type.clone())
            .unwrap_or(DataType::Null)
    }
}
