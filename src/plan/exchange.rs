use std::fmt;

use super::{single_child, PlanNode, PlanRef, PlanTreeNode};
use crate::analyzer::AnalyzerResult;
use crate::catalog::Column;

/// Marks a subtree whose rows may be produced by `parallelism` concurrent workers. The node is
/// transparent to the row shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    parallelism: usize,
    pub child: PlanRef,
}

impl Exchange {
    pub fn new(parallelism: usize, child: PlanRef) -> Self {
        Self {
            parallelism: parallelism.max(1),
            child,
        }
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }
}

impl PlanTreeNode for Exchange {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        let child = single_child("Exchange", children)?;
        Ok(Self::new(self.parallelism, child).into())
    }

    no_expressions!("Exchange");

    fn output_columns(&self) -> Vec<Column> {
        self.child.output_columns()
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Exchange: parallelism={}", self.parallelism)
    }
}
