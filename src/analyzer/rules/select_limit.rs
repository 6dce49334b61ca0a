use std::sync::Arc;

use crate::analyzer::{
    Analyzer, AnalyzerResult, Context, Rule, RuleError, RuleId, RuleSelector, Scope,
};
use crate::expression::{ExprRef, Expression};
use crate::plan::{Limit, PlanNode, PlanRef};
use crate::transform::{inspect, Transformed};

/// Wraps a top-level query in the session's `sql_select_limit` when it has no LIMIT of its own.
#[derive(Clone)]
pub struct ApplyDefaultSelectLimit;

impl ApplyDefaultSelectLimit {
    fn is_limited_query(plan: &PlanRef) -> bool {
        match plan.as_ref() {
            PlanNode::UnresolvedTable(_)
            | PlanNode::ResolvedTable(_)
            | PlanNode::TableAlias(_)
            | PlanNode::Filter(_)
            | PlanNode::Project(_)
            | PlanNode::GroupBy(_)
            | PlanNode::Window(_)
            | PlanNode::Offset(_)
            | PlanNode::Sort(_)
            | PlanNode::Distinct(_)
            | PlanNode::OrderedDistinct(_)
            | PlanNode::Join(_) => true,
            PlanNode::EmptyTable(_)
            | PlanNode::Limit(_)
            | PlanNode::TopN(_)
            | PlanNode::Exchange(_)
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
}

impl Rule for ApplyDefaultSelectLimit {
    fn id(&self) -> RuleId {
        RuleId::ApplyDefaultSelectLimit
    }

    fn apply(
        &self,
        ctx: &Context,
        _analyzer: &Analyzer,
        plan: &PlanRef,
        scope: &Scope,
        _selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        let limit = match ctx.session().sql_select_limit {
            Some(limit) if scope.is_empty() && Self::is_limited_query(plan) => limit,
            _ => return Ok(Transformed::no(plan.clone())),
        };
        let limited = Limit::new(Expression::literal(limit), plan.clone());
        Ok(Transformed::yes(Arc::new(limited.into())))
    }
}

/// Rejects literal LIMIT and OFFSET values that are not non-negative integers.
#[derive(Clone)]
pub struct ValidateOffsetAndLimit;

impl ValidateOffsetAndLimit {
    fn is_valid_count(expr: &ExprRef) -> bool {
        match expr.as_literal() {
            Some(value) => matches!(value.as_i128(), Some(v) if v >= 0),
            None => true,
        }
    }
}

impl Rule for ValidateOffsetAndLimit {
    fn id(&self) -> RuleId {
        RuleId::ValidateOffsetAndLimit
    }

    fn apply(
        &self,
        _ctx: &Context,
        _analyzer: &Analyzer,
        plan: &PlanRef,
        _scope: &Scope,
        _selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        let mut err = None;
        inspect(plan, &mut |node| {
            let invalid = match node.as_ref() {
                PlanNode::Limit(limit) if !Self::is_valid_count(&limit.limit) => {
                    Some(RuleError::InvalidLimitValue(limit.limit.to_string()))
                }
                PlanNode::TopN(top_n) if !Self::is_valid_count(&top_n.limit) => {
                    Some(RuleError::InvalidLimitValue(top_n.limit.to_string()))
                }
                PlanNode::Offset(offset) if !Self::is_valid_count(&offset.offset) => {
                    Some(RuleError::InvalidOffsetValue(offset.offset.to_string()))
                }
                _ => None,
            };
            match invalid {
                Some(e) => {
                    err = Some(e);
                    false
                }
                None => err.is_none(),
            }
        });
        match err {
            Some(e) => Err(e.into()),
            None => Ok(Transformed::no(plan.clone())),
        }
    }
}
