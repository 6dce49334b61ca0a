use std::fmt;

use derive_new::new;

use super::sort::{format_sort_fields, rebuild_sort_fields};
use super::{single_child, PlanNode, PlanRef, PlanTreeNode, SortField};
use crate::analyzer::{check_expression_number, AnalyzerResult};
use crate::catalog::Column;
use crate::expression::ExprRef;

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Limit {
    pub limit: ExprRef,
    pub child: PlanRef,
}

impl PlanTreeNode for Limit {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        let child = single_child("Limit", children)?;
        Ok(Self::new(self.limit.clone(), child).into())
    }

    fn expressions(&self) -> Vec<ExprRef> {
        vec![self.limit.clone()]
    }

    fn with_expressions(&self, exprs: Vec<ExprRef>) -> AnalyzerResult<PlanNode> {
        check_expression_number("Limit", &exprs, 1)?;
        Ok(Self::new(exprs[0].clone(), self.child.clone()).into())
    }

    fn output_columns(&self) -> Vec<Column> {
        self.child.output_columns()
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Limit: {}", self.limit)
    }
}

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Offset {
    pub offset: ExprRef,
    pub child: PlanRef,
}

impl PlanTreeNode for Offset {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        let child = single_child("Offset", children)?;
        Ok(Self::new(self.offset.clone(), child).into())
    }

    fn expressions(&self) -> Vec<ExprRef> {
        vec![self.offset.clone()]
    }

    fn with_expressions(&self, exprs: Vec<ExprRef>) -> AnalyzerResult<PlanNode> {
        check_expression_number("Offset", &exprs, 1)?;
        Ok(Self::new(exprs[0].clone(), self.child.clone()).into())
    }

    fn output_columns(&self) -> Vec<Column> {
        self.child.output_columns()
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Offset: {}", self.offset)
    }
}

/// A sort that only keeps the first `limit` rows.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct TopN {
    pub limit: ExprRef,
    pub sort_fields: Vec<SortField>,
    pub child: PlanRef,
}

impl PlanTreeNode for TopN {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        let child = single_child("TopN", children)?;
        Ok(Self::new(self.limit.clone(), self.sort_fields.clone(), child).into())
    }

    /// The limit followed by the sort expressions.
    fn expressions(&self) -> Vec<ExprRef> {
        std::iter::once(self.limit.clone())
            .chain(self.sort_fields.iter().map(|s| s.expr.clone()))
            .collect()
    }

    fn with_expressions(&self, exprs: Vec<ExprRef>) -> AnalyzerResult<PlanNode> {
        check_expression_number("TopN", &exprs, self.sort_fields.len() + 1)?;
        let sort_fields = rebuild_sort_fields(&self.sort_fields, &exprs[1..]);
        Ok(Self::new(exprs[0].clone(), sort_fields, self.child.clone()).into())
    }

    fn output_columns(&self) -> Vec<Column> {
        self.child.output_columns()
    }
}

impl fmt::Display for TopN {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "TopN: limit {}, [{}]",
            self.limit,
            format_sort_fields(&self.sort_fields)
        )
    }
}
