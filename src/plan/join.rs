use std::fmt;

use derive_new::new;
use strum_macros::{AsRefStr, Display};

use super::{PlanNode, PlanRef, PlanTreeNode};
use crate::analyzer::{check_children_number, check_expression_number, AnalyzerResult};
use crate::catalog::Column;
use crate::expression::ExprRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Cross,
    Semi,
    Anti,
}

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub join_type: JoinType,
    pub condition: Option<ExprRef>,
    pub left: PlanRef,
    pub right: PlanRef,
}

impl PlanTreeNode for Join {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.left.clone(), self.right.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        check_children_number("Join", &children, 2)?;
        Ok(Self::new(
            self.join_type,
            self.condition.clone(),
            children[0].clone(),
            children[1].clone(),
        )
        .into())
    }

    fn expressions(&self) -> Vec<ExprRef> {
        self.condition.iter().cloned().collect()
    }

    fn with_expressions(&self, exprs: Vec<ExprRef>) -> AnalyzerResult<PlanNode> {
        check_expression_number("Join", &exprs, self.condition.iter().count())?;
        Ok(Self::new(
            self.join_type,
            exprs.into_iter().next(),
            self.left.clone(),
            self.right.clone(),
        )
        .into())
    }

    /// Semi and anti joins only produce rows of the left input.
    fn output_columns(&self) -> Vec<Column> {
        let mut columns = self.left.output_columns();
        if !matches!(self.join_type, JoinType::Semi | JoinType::Anti) {
            columns.extend(self.right.output_columns());
        }
        columns
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}Join", self.join_type)?;
        if let Some(condition) = &self.condition {
            write!(f, ": on {}", condition)?;
        }
        Ok(())
    }
}
