use std::fmt;

use derive_new::new;

use super::{single_child, PlanNode, PlanRef, PlanTreeNode};
use crate::analyzer::{check_expression_number, AnalyzerResult};
use crate::catalog::Column;
use crate::expression::ExprRef;

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// filtered expression on child
    pub predicate: ExprRef,
    pub child: PlanRef,
}

impl PlanTreeNode for Filter {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        let child = single_child("Filter", children)?;
        Ok(Self::new(self.predicate.clone(), child).into())
    }

    fn expressions(&self) -> Vec<ExprRef> {
        vec![self.predicate.clone()]
    }

    fn with_expressions(&self, exprs: Vec<ExprRef>) -> AnalyzerResult<PlanNode> {
        check_expression_number("Filter", &exprs, 1)?;
        Ok(Self::new(exprs[0].clone(), self.child.clone()).into())
    }

    fn output_columns(&self) -> Vec<Column> {
        self.child.output_columns()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Filter: {}", self.predicate)
    }
}
