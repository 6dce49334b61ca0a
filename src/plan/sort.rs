use std::fmt;

use derive_new::new;

use super::{single_child, PlanNode, PlanRef, PlanTreeNode};
use crate::analyzer::{check_expression_number, AnalyzerResult};
use crate::catalog::Column;
use crate::expression::ExprRef;

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub expr: ExprRef,
    pub asc: bool,
}

impl SortField {
    pub fn with_expr(&self, expr: ExprRef) -> Self {
        Self::new(expr, self.asc)
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let order = if self.asc { "ASC" } else { "DESC" };
        write!(f, "{} {}", self.expr, order)
    }
}

pub(crate) fn format_sort_fields(fields: &[SortField]) -> String {
    fields
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn rebuild_sort_fields(fields: &[SortField], exprs: &[ExprRef]) -> Vec<SortField> {
    fields
        .iter()
        .zip(exprs.iter())
        .map(|(field, expr)| field.with_expr(expr.clone()))
        .collect()
}

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub sort_fields: Vec<SortField>,
    pub child: PlanRef,
}

impl PlanTreeNode for Sort {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        let child = single_child("Sort", children)?;
        Ok(Self::new(self.sort_fields.clone(), child).into())
    }

    fn expressions(&self) -> Vec<ExprRef> {
        self.sort_fields.iter().map(|s| s.expr.clone()).collect()
    }

    fn with_expressions(&self, exprs: Vec<ExprRef>) -> AnalyzerResult<PlanNode> {
        check_expression_number("Sort", &exprs, self.sort_fields.len())?;
        let sort_fields = rebuild_sort_fields(&self.sort_fields, &exprs);
        Ok(Self::new(sort_fields, self.child.clone()).into())
    }

    fn output_columns(&self) -> Vec<Column> {
        self.child.output_columns()
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Sort: [{}]", format_sort_fields(&self.sort_fields))
    }
}
