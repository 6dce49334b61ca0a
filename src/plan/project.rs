use std::fmt;

use derive_new::new;

use super::{format_exprs, single_child, PlanNode, PlanRef, PlanTreeNode};
use crate::analyzer::{check_expression_number, AnalyzerResult};
use crate::catalog::Column;
use crate::expression::{ExprRef, Expression};

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub exprs: Vec<ExprRef>,
    pub child: PlanRef,
}

impl PlanTreeNode for Project {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        let child = single_child("Project", children)?;
        Ok(Self::new(self.exprs.clone(), child).into())
    }

    fn expressions(&self) -> Vec<ExprRef> {
        self.exprs.clone()
    }

    fn with_expressions(&self, exprs: Vec<ExprRef>) -> AnalyzerResult<PlanNode> {
        check_expression_number("Project", &exprs, self.exprs.len())?;
        Ok(Self::new(exprs, self.child.clone()).into())
    }

    fn output_columns(&self) -> Vec<Column> {
        projected_columns(&self.exprs)
    }
}

/// The row shape of a list of select expressions. Bare fields keep their source table.
pub(crate) fn projected_columns(exprs: &[ExprRef]) -> Vec<Column> {
    exprs
        .iter()
        .map(|e| {
            let table = match e.as_ref() {
                Expression::GetField(field) => field.table.clone(),
                Expression::UnresolvedColumn(col) => col.table.clone().unwrap_or_default(),
                _ => String::new(),
            };
            Column::new(table, e.name(), e.data_type(), e.nullable())
        })
        .collect()
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Project: [{}]", format_exprs(&self.exprs))
    }
}
