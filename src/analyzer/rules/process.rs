use std::sync::Arc;

use crate::analyzer::{Analyzer, AnalyzerResult, Context, Rule, RuleId, RuleSelector, Scope};
use crate::plan::{PlanNode, PlanRef, QueryProcess, TransactionCommitting};
use crate::transform::Transformed;

/// Wraps a top-level statement so the session's transaction is committed once it finishes.
/// Transaction statements manage the transaction themselves and are left alone.
#[derive(Clone)]
pub struct AddAutocommitNode;

impl Rule for AddAutocommitNode {
    fn id(&self) -> RuleId {
        RuleId::Autocommit
    }

    fn apply(
        &self,
        ctx: &Context,
        _analyzer: &Analyzer,
        plan: &PlanRef,
        scope: &Scope,
        _selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        if !ctx.session().autocommit
            || !scope.is_empty()
            || plan.is_transaction_statement()
            || matches!(plan.as_ref(), PlanNode::TransactionCommitting(_))
        {
            return Ok(Transformed::no(plan.clone()));
        }
        Ok(Transformed::yes(Arc::new(
            TransactionCommitting::new(plan.clone()).into(),
        )))
    }
}

/// Registers a top-level statement in the process list.
#[derive(Clone)]
pub struct TrackProcess;

impl Rule for TrackProcess {
    fn id(&self) -> RuleId {
        RuleId::TrackProcess
    }

    fn apply(
        &self,
        _ctx: &Context,
        _analyzer: &Analyzer,
        plan: &PlanRef,
        scope: &Scope,
        _selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        if !scope.is_empty() || matches!(plan.as_ref(), PlanNode::QueryProcess(_)) {
            return Ok(Transformed::no(plan.clone()));
        }
        Ok(Transformed::yes(Arc::new(QueryProcess::new(plan.clone()).into())))
    }
}
