use std::fmt;

use derive_new::new;

use super::{single_child, PlanNode, PlanRef, PlanTreeNode};
use crate::analyzer::AnalyzerResult;
use crate::catalog::Column;

/// `CREATE INDEX name ON table (columns)`. The child is the indexed table.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct CreateIndex {
    pub name: String,
    pub columns: Vec<String>,
    pub table: PlanRef,
}

impl PlanTreeNode for CreateIndex {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.table.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        let table = single_child("CreateIndex", children)?;
        Ok(Self::new(self.name.clone(), self.columns.clone(), table).into())
    }

    no_expressions!("CreateIndex");

    fn output_columns(&self) -> Vec<Column> {
        vec![]
    }
}

impl fmt::Display for CreateIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "CreateIndex: {} ({})",
            self.name,
            self.columns.join(", ")
        )
    }
}
