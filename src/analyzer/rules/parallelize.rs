use std::sync::Arc;

use log::debug;

use crate::analyzer::{
    Analyzer, AnalyzerResult, Context, Rule, RuleId, RuleSelector, Scope, LOGGING_TARGET,
};
use crate::expression::Expression;
use crate::plan::{Exchange, PlanNode, PlanRef, PlanTreeNode};
use crate::transform::{inspect_expr, transform_up, transform_up_with_prune, Transformed};
use crate::util::pretty_plan_tree_string;

/// Wraps the largest parallelizable subtrees of a top-level query in `Exchange` nodes.
#[derive(Clone)]
pub struct Parallelize;

impl Parallelize {
    /// Statements whose execution must not be split across workers, looking through the
    /// wrappers added after analysis.
    fn is_exempt(plan: &PlanRef) -> bool {
        match plan.as_ref() {
            PlanNode::QueryProcess(p) => Self::is_exempt(&p.child),
            PlanNode::TransactionCommitting(p) => Self::is_exempt(&p.child),
            PlanNode::CreateIndex(_) | PlanNode::DeclareHandler(_) => true,
            node => node.is_transaction_statement(),
        }
    }
}

impl Rule for Parallelize {
    fn id(&self) -> RuleId {
        RuleId::Parallelize
    }

    fn apply(
        &self,
        _ctx: &Context,
        analyzer: &Analyzer,
        plan: &PlanRef,
        scope: &Scope,
        _selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        let parallelism = analyzer.parallelism();
        if parallelism <= 1 || !plan.resolved() || !scope.is_empty() || Self::is_exempt(plan) {
            return Ok(Transformed::no(plan.clone()));
        }

        let result = transform_up_with_prune(
            plan,
            &mut |node| !is_parallelizable(node) && !matches!(node.as_ref(), PlanNode::Exchange(_)),
            &mut |node| {
                if matches!(node.as_ref(), PlanNode::Exchange(_)) || !is_parallelizable(node) {
                    return Ok(Transformed::no(node.clone()));
                }
                Ok(Transformed::yes(Arc::new(
                    Exchange::new(parallelism, node.clone()).into(),
                )))
            },
        )?;
        if !result.changed {
            return Ok(result);
        }

        let cleaned = remove_redundant_exchanges(&result.data)?;
        debug!(
            target: LOGGING_TARGET,
            "parallelized plan with {} workers:\n{}",
            parallelism,
            pretty_plan_tree_string(&cleaned.data)
        );
        Ok(Transformed::yes(cleaned.data))
    }
}

/// Whether every row of the subtree can be produced by independent workers and merged in any
/// order.
pub fn is_parallelizable(plan: &PlanRef) -> bool {
    let children_parallelizable = || plan.children().iter().all(is_parallelizable);
    match plan.as_ref() {
        PlanNode::ResolvedTable(_) => true,
        PlanNode::TableAlias(_) | PlanNode::Exchange(_) => children_parallelizable(),
        PlanNode::Filter(_) | PlanNode::Project(_) => {
            children_parallelizable() && subqueries_parallelizable(plan)
        }
        PlanNode::UnresolvedTable(_)
        | PlanNode::EmptyTable(_)
        | PlanNode::Join(_)
        | PlanNode::GroupBy(_)
        | PlanNode::Window(_)
        | PlanNode::Limit(_)
        | PlanNode::Offset(_)
        | PlanNode::Sort(_)
        | PlanNode::TopN(_)
        | PlanNode::Distinct(_)
        | PlanNode::OrderedDistinct(_)
        | PlanNode::CreateIndex(_)
        | PlanNode::QueryProcess(_)
        | PlanNode::TransactionCommitting(_)
        | PlanNode::StartTransaction(_)
        | PlanNode::Commit(_)
        | PlanNode::Rollback(_)
        | PlanNode::CreateSavepoint(_)
        | PlanNode::RollbackSavepoint(_)
        | PlanNode::ReleaseSavepoint(_)
        | PlanNode::DeclareHandler(_) => false,
    }
}

fn subqueries_parallelizable(node: &PlanRef) -> bool {
    let mut parallelizable = true;
    for expr in node.expressions().iter() {
        inspect_expr(expr, &mut |e| {
            if let Expression::Subquery(sq) = e.as_ref() {
                parallelizable &= is_parallelizable(&sq.query);
            }
            parallelizable
        });
    }
    parallelizable
}

/// Drops every `Exchange` nested below another one. The outermost exchange already spreads
/// the work of its whole subtree.
pub fn remove_redundant_exchanges(plan: &PlanRef) -> AnalyzerResult<Transformed<PlanRef>> {
    transform_up_with_prune(
        plan,
        &mut |node| !matches!(node.as_ref(), PlanNode::Exchange(_)),
        &mut |node| {
            let exchange = match node.as_ref() {
                PlanNode::Exchange(exchange) => exchange,
                _ => return Ok(Transformed::no(node.clone())),
            };
            let child = transform_up(&exchange.child, &mut |n| match n.as_ref() {
                PlanNode::Exchange(nested) => Ok(Transformed::yes(nested.child.clone())),
                _ => Ok(Transformed::no(n.clone())),
            })?;
            if !child.changed {
                return Ok(Transformed::no(node.clone()));
            }
            Ok(Transformed::yes(Arc::new(node.with_children(vec![child.data])?)))
        },
    )
}

#[cfg(test)]
mod tests {
    use arrow::datatypes::DataType;
    use pretty_assertions::assert_eq;
    use sqlparser::ast::BinaryOperator;
    use test_case::test_case;

    use super::*;
    use crate::expression::{ExprRef, GetField, Subquery, WindowFunction};
    use crate::plan::{CreateIndex, Distinct, GroupBy, OrderedDistinct, Window};
    use crate::test_util::*;

    fn lit() -> ExprRef {
        Expression::literal(1_i64)
    }

    fn exchange(parallelism: usize, child: PlanRef) -> PlanRef {
        Arc::new(Exchange::new(parallelism, child).into())
    }

    fn subquery(query: PlanRef) -> ExprRef {
        Arc::new(Expression::Subquery(Subquery::new(
            query,
            "select 1 from mytable".to_string(),
        )))
    }

    fn compatible_subquery() -> ExprRef {
        subquery(project(vec![lit()], mytable()))
    }

    fn incompatible_subquery() -> ExprRef {
        let row_number = Arc::new(Expression::WindowFunction(WindowFunction::new(
            "row_number".to_string(),
            vec![],
        )));
        let window: PlanRef = Arc::new(Window::new(vec![row_number], mytable()).into());
        let field = Arc::new(Expression::GetField(GetField::new(
            0,
            String::new(),
            "row_number()".to_string(),
            DataType::UInt64,
            false,
        )));
        subquery(project(vec![field], window))
    }

    fn eq_subquery(sq: ExprRef) -> ExprRef {
        Expression::binary(BinaryOperator::Eq, lit(), sq)
    }

    #[test_case(mytable(), true ; "just table")]
    #[test_case(filter(lit(), mytable()), true ; "filter over table")]
    #[test_case(filter(eq_subquery(compatible_subquery()), mytable()), true ; "filter with a subquery")]
    #[test_case(filter(eq_subquery(incompatible_subquery()), mytable()), false ; "filter with an incompatible subquery")]
    #[test_case(project(vec![], filter(lit(), mytable())), true ; "project over filter")]
    #[test_case(project(vec![compatible_subquery()], filter(lit(), mytable())), true ; "project with a subquery")]
    #[test_case(project(vec![incompatible_subquery()], filter(lit(), mytable())), false ; "project with an incompatible subquery")]
    #[test_case(inner_join(mytable(), mytable(), Some(lit())), false ; "inner join node")]
    #[test_case(Arc::new(GroupBy::new(vec![], vec![], mytable()).into()), false ; "group by node")]
    #[test_case(limit(Expression::literal(5_i8), mytable()), false ; "limit node")]
    #[test_case(offset(Expression::literal(5_i8), mytable()), false ; "offset node")]
    #[test_case(sort(vec![], mytable()), false ; "sort node")]
    #[test_case(Arc::new(Distinct::new(mytable()).into()), false ; "distinct node")]
    #[test_case(Arc::new(OrderedDistinct::new(mytable()).into()), false ; "ordered distinct node")]
    fn test_is_parallelizable(plan: PlanRef, expected: bool) {
        assert_eq!(is_parallelizable(&plan), expected);
    }

    fn filtered_join(wrap: impl Fn(PlanRef) -> PlanRef) -> PlanRef {
        project(
            vec![],
            inner_join(
                wrap(filter(lit(), mytable())),
                wrap(filter(lit(), mytable())),
                Some(lit()),
            ),
        )
    }

    #[test]
    fn test_parallelize() {
        let plan = filtered_join(|p| p);
        let result =
            apply_rule_with_parallelism(&Parallelize, &test_context(), &plan, 2).unwrap();
        assert!(result.changed);
        assert_eq!(result.data, filtered_join(|p| exchange(2, p)));

        let again =
            apply_rule_with_parallelism(&Parallelize, &test_context(), &result.data, 2).unwrap();
        assert!(!again.changed);
        assert!(Arc::ptr_eq(&again.data, &result.data));
    }

    #[test]
    fn test_parallelize_wraps_whole_parallelizable_plan() {
        let plan = project(vec![], filter(lit(), mytable()));
        let result =
            apply_rule_with_parallelism(&Parallelize, &test_context(), &plan, 4).unwrap();
        assert_eq!(result.data, exchange(4, plan));
    }

    #[test]
    fn test_parallelize_skips() {
        let plan = filtered_join(|p| p);
        let result =
            apply_rule_with_parallelism(&Parallelize, &test_context(), &plan, 1).unwrap();
        assert!(!result.changed);
        assert!(Arc::ptr_eq(&result.data, &plan));

        let create_index: PlanRef = Arc::new(
            CreateIndex::new("idx".to_string(), vec!["i".to_string()], mytable()).into(),
        );
        let result =
            apply_rule_with_parallelism(&Parallelize, &test_context(), &create_index, 2).unwrap();
        assert!(!result.changed);
        assert_eq!(result.data, create_index);

        let unresolved = filter(Expression::column("i"), mytable());
        let result =
            apply_rule_with_parallelism(&Parallelize, &test_context(), &unresolved, 2).unwrap();
        assert!(!result.changed);
    }

    #[test]
    fn test_remove_redundant_exchanges() {
        let plan = filtered_join(|p| match p.as_ref() {
            PlanNode::Filter(f) => exchange(1, filter(f.predicate.clone(), exchange(1, f.child.clone()))),
            _ => p.clone(),
        });
        let result = remove_redundant_exchanges(&plan).unwrap();
        assert!(result.changed);
        assert_eq!(result.data, filtered_join(|p| exchange(1, p)));

        let again = remove_redundant_exchanges(&result.data).unwrap();
        assert!(!again.changed);
        assert!(Arc::ptr_eq(&again.data, &result.data));
    }
}
