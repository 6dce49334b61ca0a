use std::fmt;

use derive_new::new;

use super::{single_child, PlanNode, PlanRef, PlanTreeNode};
use crate::analyzer::AnalyzerResult;
use crate::catalog::Column;

/// Registers the running statement with the session's process list.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct QueryProcess {
    pub child: PlanRef,
}

impl PlanTreeNode for QueryProcess {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        Ok(Self::new(single_child("QueryProcess", children)?).into())
    }

    no_expressions!("QueryProcess");

    fn output_columns(&self) -> Vec<Column> {
        self.child.output_columns()
    }
}

impl fmt::Display for QueryProcess {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "QueryProcess")
    }
}

/// Commits the session's transaction once the child statement finishes, when autocommit is on.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct TransactionCommitting {
    pub child: PlanRef,
}

impl PlanTreeNode for TransactionCommitting {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        Ok(Self::new(single_child("TransactionCommitting", children)?).into())
    }

    no_expressions!("TransactionCommitting");

    fn output_columns(&self) -> Vec<Column> {
        self.child.output_columns()
    }
}

impl fmt::Display for TransactionCommitting {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TransactionCommitting")
    }
}
