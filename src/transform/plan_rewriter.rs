use std::sync::Arc;

use super::{transform_expr_up, Transformed};
use crate::analyzer::AnalyzerResult;
use crate::expression::ExprRef;
use crate::plan::{PlanRef, PlanTreeNode};

/// Rewrites every node of the plan bottom-up. A node is rebuilt only when one of its children
/// changed, then `f` is applied to it.
pub fn transform_up<F>(plan: &PlanRef, f: &mut F) -> AnalyzerResult<Transformed<PlanRef>>
where
    F: FnMut(&PlanRef) -> AnalyzerResult<Transformed<PlanRef>>,
{
    transform_up_with_prune(plan, &mut |_| true, f)
}

/// Like [`transform_up`], but the children of a node for which `should_descend` returns false
/// are left alone. `f` is still applied to that node.
pub fn transform_up_with_prune<P, F>(
    plan: &PlanRef,
    should_descend: &mut P,
    f: &mut F,
) -> AnalyzerResult<Transformed<PlanRef>>
where
    P: FnMut(&PlanRef) -> bool,
    F: FnMut(&PlanRef) -> AnalyzerResult<Transformed<PlanRef>>,
{
    let node = if should_descend(plan) {
        transform_children(plan, |child| {
            transform_up_with_prune(child, &mut *should_descend, &mut *f)
        })?
    } else {
        Transformed::no(plan.clone())
    };

    let result = f(&node.data)?;
    Ok(Transformed::new(result.data, node.changed || result.changed))
}

/// Applies `f` to each direct child and rebuilds the node if any child came back different.
pub fn transform_children<F>(plan: &PlanRef, mut f: F) -> AnalyzerResult<Transformed<PlanRef>>
where
    F: FnMut(&PlanRef) -> AnalyzerResult<Transformed<PlanRef>>,
{
    let children = plan.children();
    let mut changed = false;
    let mut new_children = Vec::with_capacity(children.len());
    for child in children.iter() {
        let result = f(child)?;
        changed |= result.changed || !Arc::ptr_eq(child, &result.data);
        new_children.push(result.data);
    }

    if !changed {
        return Ok(Transformed::no(plan.clone()));
    }
    Ok(Transformed::yes(Arc::new(plan.with_children(new_children)?)))
}

/// Rewrites the expressions of every node, bottom-up in both the plan and the expressions.
pub fn transform_up_exprs<F>(plan: &PlanRef, f: &mut F) -> AnalyzerResult<Transformed<PlanRef>>
where
    F: FnMut(&ExprRef) -> AnalyzerResult<Transformed<ExprRef>>,
{
    transform_up(plan, &mut |node| transform_node_exprs(node, &mut *f))
}

/// Like [`transform_up_exprs`], but `f` also receives the node owning the expression.
pub fn transform_up_exprs_with_node<F>(
    plan: &PlanRef,
    f: &mut F,
) -> AnalyzerResult<Transformed<PlanRef>>
where
    F: FnMut(&PlanRef, &ExprRef) -> AnalyzerResult<Transformed<ExprRef>>,
{
    transform_up(plan, &mut |node| {
        let node_ref = node.clone();
        transform_node_exprs(node, &mut |e| f(&node_ref, e))
    })
}

/// Rewrites the expressions of a single node, leaving its children alone.
pub fn transform_node_exprs<F>(node: &PlanRef, f: &mut F) -> AnalyzerResult<Transformed<PlanRef>>
where
    F: FnMut(&ExprRef) -> AnalyzerResult<Transformed<ExprRef>>,
{
    let exprs = node.expressions();
    if exprs.is_empty() {
        return Ok(Transformed::no(node.clone()));
    }

    let mut changed = false;
    let mut new_exprs = Vec::with_capacity(exprs.len());
    for expr in exprs.iter() {
        let result = transform_expr_up(expr, f)?;
        changed |= result.changed || !Arc::ptr_eq(expr, &result.data);
        new_exprs.push(result.data);
    }

    if !changed {
        return Ok(Transformed::no(node.clone()));
    }
    Ok(Transformed::yes(Arc::new(node.with_expressions(new_exprs)?)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use sqlparser::ast::BinaryOperator;

    use super::*;
    use crate::analyzer::AnalyzerError;
    use crate::expression::Expression;
    use crate::plan::{Distinct, PlanNode};
    use crate::test_util::*;
    use crate::util::pretty_plan_tree_string;

    fn drop_distinct(node: &PlanRef) -> AnalyzerResult<Transformed<PlanRef>> {
        match node.as_ref() {
            PlanNode::Distinct(d) => Ok(Transformed::yes(d.child.clone())),
            _ => Ok(Transformed::no(node.clone())),
        }
    }

    #[test]
    fn test_transform_up_unchanged_returns_same_reference() {
        let plan = project(
            vec![Expression::column("i")],
            filter(Expression::literal(true), mytable()),
        );
        let result = transform_up(&plan, &mut drop_distinct).unwrap();
        assert!(!result.changed);
        assert!(Arc::ptr_eq(&result.data, &plan));
    }

    #[test]
    fn test_transform_up_shares_untouched_siblings() {
        let left = filter(Expression::literal(true), mytable());
        let right = Arc::new(PlanNode::from(Distinct::new(othertable())));
        let plan = inner_join(left.clone(), right, None);

        let result = transform_up(&plan, &mut drop_distinct).unwrap();
        assert!(result.changed);
        let children = result.data.children();
        assert!(Arc::ptr_eq(&children[0], &left));
        assert_eq!(
            pretty_plan_tree_string(&result.data),
            "\
InnerJoin
  Filter: true
    ResolvedTable: mydb.mytable
  ResolvedTable: mydb.othertable
"
        );
    }

    #[test]
    fn test_transform_up_is_post_order() {
        let plan = project(
            vec![Expression::column("i")],
            filter(Expression::literal(true), mytable()),
        );
        let mut visited = vec![];
        transform_up(&plan, &mut |node| {
            visited.push(node.name());
            Ok(Transformed::no(node.clone()))
        })
        .unwrap();
        assert_eq!(visited, vec!["ResolvedTable", "Filter", "Project"]);
    }

    #[test]
    fn test_transform_up_with_prune_skips_children_but_visits_node() {
        let plan = project(
            vec![Expression::column("i")],
            filter(Expression::literal(true), mytable()),
        );
        let mut visited = vec![];
        transform_up_with_prune(
            &plan,
            &mut |node| !matches!(node.as_ref(), PlanNode::Filter(_)),
            &mut |node| {
                visited.push(node.name());
                Ok(Transformed::no(node.clone()))
            },
        )
        .unwrap();
        assert_eq!(visited, vec!["Filter", "Project"]);
    }

    #[test]
    fn test_transform_error_aborts_rewrite() {
        let plan = filter(Expression::literal(true), mytable());
        let err = transform_up(&plan, &mut |_| Err(AnalyzerError::Cancelled)).unwrap_err();
        assert_eq!(err, AnalyzerError::Cancelled);
    }

    #[test]
    fn test_transform_up_exprs_rewrites_only_changed_nodes() {
        let table = mytable();
        let plan = filter(
            Expression::binary(
                BinaryOperator::Eq,
                Expression::column("i"),
                Expression::literal(1_i64),
            ),
            table.clone(),
        );
        let result = transform_up_exprs(&plan, &mut |e| match e.as_ref() {
            Expression::UnresolvedColumn(c) if c.name == "i" => {
                Ok(Transformed::yes(Expression::column("j")))
            }
            _ => Ok(Transformed::no(e.clone())),
        })
        .unwrap();
        assert!(result.changed);
        assert_eq!(result.data.to_string(), "Filter: (j = 1)");
        assert!(Arc::ptr_eq(&result.data.children()[0], &table));
    }

    #[test]
    fn test_transform_up_exprs_with_node_sees_owner() {
        let plan = project(
            vec![Expression::column("i")],
            filter(Expression::column("b"), mytable()),
        );
        let mut owners = vec![];
        transform_up_exprs_with_node(&plan, &mut |node, e| {
            owners.push(format!("{}:{}", node.name(), e));
            Ok(Transformed::no(e.clone()))
        })
        .unwrap();
        assert_eq!(owners, vec!["Filter:b", "Project:i"]);
    }
}
