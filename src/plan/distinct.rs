use std::fmt;

use derive_new::new;

use super::{single_child, PlanNode, PlanRef, PlanTreeNode};
use crate::analyzer::AnalyzerResult;
use crate::catalog::Column;

/// Removes duplicate rows, buffering every row seen.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Distinct {
    pub child: PlanRef,
}

impl PlanTreeNode for Distinct {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        Ok(Self::new(single_child("Distinct", children)?).into())
    }

    no_expressions!("Distinct");

    fn output_columns(&self) -> Vec<Column> {
        self.child.output_columns()
    }
}

impl fmt::Display for Distinct {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Distinct")
    }
}

/// Removes duplicate rows from an input that is already sorted, comparing each row with the
/// previous one only.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct OrderedDistinct {
    pub child: PlanRef,
}

impl PlanTreeNode for OrderedDistinct {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        Ok(Self::new(single_child("OrderedDistinct", children)?).into())
    }

    no_expressions!("OrderedDistinct");

    fn output_columns(&self) -> Vec<Column> {
        self.child.output_columns()
    }
}

impl fmt::Display for OrderedDistinct {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "OrderedDistinct")
    }
}
