use std::sync::Arc;

use crate::analyzer::{
    Analyzer, AnalyzerResult, Context, Rule, RuleId, RuleSelector, Scope, DEFAULT_RULES,
};
use crate::expression::Expression;
use crate::plan::PlanRef;
use crate::transform::{transform_up_exprs_with_node, Transformed};

/// Analyzes the plan of every unresolved subquery through the default rules, with the node
/// owning the subquery pushed onto the scope.
#[derive(Clone)]
pub struct ResolveSubqueries;

impl Rule for ResolveSubqueries {
    fn id(&self) -> RuleId {
        RuleId::ResolveSubqueries
    }

    fn apply(
        &self,
        ctx: &Context,
        analyzer: &Analyzer,
        plan: &PlanRef,
        scope: &Scope,
        selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        transform_up_exprs_with_node(plan, &mut |node, expr| {
            let subquery = match expr.as_ref() {
                Expression::Subquery(sq) if !sq.resolved() => sq,
                _ => return Ok(Transformed::no(expr.clone())),
            };
            let query = analyzer.analyze_through_batch(
                ctx,
                &subquery.query,
                &scope.new_scope(node.clone()),
                DEFAULT_RULES,
                selector,
            )?;
            Ok(Transformed::yes(Arc::new(Expression::Subquery(
                subquery.with_query(query),
            ))))
        })
    }
}
