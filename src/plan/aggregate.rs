use std::fmt;

use derive_new::new;

use super::project::projected_columns;
use super::{format_exprs, single_child, PlanNode, PlanRef, PlanTreeNode};
use crate::analyzer::{check_expression_number, AnalyzerResult};
use crate::catalog::Column;
use crate::expression::ExprRef;

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct GroupBy {
    pub select_exprs: Vec<ExprRef>,
    pub grouping_exprs: Vec<ExprRef>,
    pub child: PlanRef,
}

impl PlanTreeNode for GroupBy {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        let child = single_child("GroupBy", children)?;
        Ok(Self::new(
            self.select_exprs.clone(),
            self.grouping_exprs.clone(),
            child,
        )
        .into())
    }

    /// Select expressions followed by grouping expressions.
    fn expressions(&self) -> Vec<ExprRef> {
        self.select_exprs
            .iter()
            .chain(self.grouping_exprs.iter())
            .cloned()
            .collect()
    }

    fn with_expressions(&self, mut exprs: Vec<ExprRef>) -> AnalyzerResult<PlanNode> {
        check_expression_number(
            "GroupBy",
            &exprs,
            self.select_exprs.len() + self.grouping_exprs.len(),
        )?;
        let grouping_exprs = exprs.split_off(self.select_exprs.len());
        Ok(Self::new(exprs, grouping_exprs, self.child.clone()).into())
    }

    fn output_columns(&self) -> Vec<Column> {
        projected_columns(&self.select_exprs)
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GroupBy: select [{}], group by [{}]",
            format_exprs(&self.select_exprs),
            format_exprs(&self.grouping_exprs)
        )
    }
}

/// Evaluates window functions over its whole input.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub select_exprs: Vec<ExprRef>,
    pub child: PlanRef,
}

impl PlanTreeNode for Window {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        let child = single_child("Window", children)?;
        Ok(Self::new(self.select_exprs.clone(), child).into())
    }

    fn expressions(&self) -> Vec<ExprRef> {
        self.select_exprs.clone()
    }

    fn with_expressions(&self, exprs: Vec<ExprRef>) -> AnalyzerResult<PlanNode> {
        check_expression_number("Window", &exprs, self.select_exprs.len())?;
        Ok(Self::new(exprs, self.child.clone()).into())
    }

    fn output_columns(&self) -> Vec<Column> {
        projected_columns(&self.select_exprs)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Window: [{}]", format_exprs(&self.select_exprs))
    }
}
