use std::sync::Arc;

use itertools::Itertools;

use crate::analyzer::{
    Analyzer, AnalyzerResult, Context, Rule, RuleError, RuleId, RuleSelector, Scope,
};
use crate::catalog::Column;
use crate::expression::{Expression, GetField, UnresolvedColumn};
use crate::plan::{PlanRef, PlanTreeNode};
use crate::transform::{transform_node_exprs, transform_up, Transformed};

/// Binds column references to positions of the node's input row. A node is only bound once all
/// of its children are resolved; the input row of a node with several children is their output
/// columns concatenated.
#[derive(Clone)]
pub struct ResolveColumns;

impl ResolveColumns {
    fn bind(input: &[Column], column: &UnresolvedColumn) -> Result<GetField, RuleError> {
        let display = Expression::UnresolvedColumn(column.clone()).to_string();
        let matched = input
            .iter()
            .enumerate()
            .filter(|(_, c)| c.matches(column.table.as_deref(), &column.name))
            .collect_vec();
        match matched.as_slice() {
            [] => Err(RuleError::ColumnNotFound(display)),
            [(index, c)] => Ok(GetField::from_column(*index, c)),
            _ => Err(RuleError::AmbiguousColumn(display)),
        }
    }
}

impl Rule for ResolveColumns {
    fn id(&self) -> RuleId {
        RuleId::ResolveColumns
    }

    fn apply(
        &self,
        _ctx: &Context,
        _analyzer: &Analyzer,
        plan: &PlanRef,
        _scope: &Scope,
        _selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        transform_up(plan, &mut |node| {
            let children = node.children();
            if node.expressions().is_empty() || !children.iter().all(|c| c.resolved()) {
                return Ok(Transformed::no(node.clone()));
            }
            let input = children
                .iter()
                .flat_map(|c| c.output_columns())
                .collect_vec();
            transform_node_exprs(node, &mut |expr| match expr.as_ref() {
                Expression::UnresolvedColumn(column) => {
                    let field = Self::bind(&input, column)?;
                    Ok(Transformed::yes(Arc::new(Expression::GetField(field))))
                }
                _ => Ok(Transformed::no(expr.clone())),
            })
        })
    }
}
