use std::sync::Arc;

use sqlparser::ast::BinaryOperator;

use crate::analyzer::{Analyzer, AnalyzerResult, Context, Rule, RuleId, RuleSelector, Scope};
use crate::expression::{conjunction, split_conjunction, ExprRef, Expression};
use crate::plan::{Filter, Join, JoinType, PlanNode, PlanRef, PlanTreeNode};
use crate::transform::{transform_up, Transformed};

/// Turns `Filter(CrossJoin)` into an inner join when the filter holds equalities between the
/// two sides. Other conjuncts stay in a filter above the join.
#[derive(Clone)]
pub struct ReplaceCrossJoins;

impl ReplaceCrossJoins {
    /// `left.a = right.b` in either order, with `left_width` the number of columns of the left
    /// input.
    fn is_cross_side_equality(expr: &ExprRef, left_width: usize) -> bool {
        let binary = match expr.as_ref() {
            Expression::BinaryExpr(b) if b.op == BinaryOperator::Eq => b,
            _ => return false,
        };
        match (binary.left.as_ref(), binary.right.as_ref()) {
            (Expression::GetField(l), Expression::GetField(r)) => {
                (l.index < left_width) != (r.index < left_width)
            }
            _ => false,
        }
    }
}

impl Rule for ReplaceCrossJoins {
    fn id(&self) -> RuleId {
        RuleId::ReplaceCrossJoins
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
            let (filter, join) = match node.as_ref() {
                PlanNode::Filter(filter) => match filter.child.as_ref() {
                    PlanNode::Join(join) if join.join_type == JoinType::Cross => (filter, join),
                    _ => return Ok(Transformed::no(node.clone())),
                },
                _ => return Ok(Transformed::no(node.clone())),
            };

            let left_width = join.left.output_columns().len();
            let (join_conds, remaining): (Vec<_>, Vec<_>) = split_conjunction(&filter.predicate)
                .into_iter()
                .partition(|e| Self::is_cross_side_equality(e, left_width));
            if join_conds.is_empty() {
                return Ok(Transformed::no(node.clone()));
            }

            let inner: PlanRef = Arc::new(
                Join::new(
                    JoinType::Inner,
                    conjunction(join_conds),
                    join.left.clone(),
                    join.right.clone(),
                )
                .into(),
            );
            let replaced = match conjunction(remaining) {
                Some(predicate) => Arc::new(Filter::new(predicate, inner).into()),
                None => inner,
            };
            Ok(Transformed::yes(replaced))
        })
    }
}
