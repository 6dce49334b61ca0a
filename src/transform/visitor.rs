use crate::expression::ExprRef;
use crate::plan::{PlanRef, PlanTreeNode};

/// Walks the plan pre-order. Children of a node are skipped when `f` returns false for it.
pub fn inspect<F>(plan: &PlanRef, f: &mut F)
where
    F: FnMut(&PlanRef) -> bool,
{
    if !f(plan) {
        return;
    }
    for child in plan.children().iter() {
        inspect(child, f);
    }
}

/// Walks the expression pre-order. Children of an expression are skipped when `f` returns
/// false for it.
pub fn inspect_expr<F>(expr: &ExprRef, f: &mut F)
where
    F: FnMut(&ExprRef) -> bool,
{
    if !f(expr) {
        return;
    }
    for child in expr.children().iter() {
        inspect_expr(child, f);
    }
}

/// Walks every expression of every node of the plan.
pub fn inspect_exprs<F>(plan: &PlanRef, f: &mut F)
where
    F: FnMut(&PlanRef, &ExprRef) -> bool,
{
    inspect(plan, &mut |node| {
        for expr in node.expressions().iter() {
            inspect_expr(expr, &mut |e| f(node, e));
        }
        true
    });
}

#[cfg(test)]
mod tests {
    use sqlparser::ast::BinaryOperator;

    use super::*;
    use crate::expression::Expression;
    use crate::plan::PlanNode;
    use crate::test_util::*;

    #[test]
    fn test_inspect_stops_descending() {
        let plan = project(
            vec![Expression::column("i")],
            filter(Expression::literal(true), mytable()),
        );
        let mut visited = vec![];
        inspect(&plan, &mut |node| {
            visited.push(node.name());
            !matches!(node.as_ref(), PlanNode::Filter(_))
        });
        assert_eq!(visited, vec!["Project", "Filter"]);
    }

    #[test]
    fn test_inspect_exprs_visits_all_nodes() {
        let plan = project(
            vec![Expression::column("i")],
            filter(
                Expression::binary(
                    BinaryOperator::Gt,
                    Expression::column("i"),
                    Expression::literal(1_i64),
                ),
                mytable(),
            ),
        );
        let mut seen = vec![];
        inspect_exprs(&plan, &mut |node, e| {
            seen.push(format!("{}:{}", node.name(), e));
            true
        });
        assert_eq!(
            seen,
            vec!["Project:i", "Filter:(i > 1)", "Filter:i", "Filter:1"]
        );
    }
}
