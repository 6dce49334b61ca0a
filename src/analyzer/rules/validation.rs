use crate::analyzer::{
    Analyzer, AnalyzerResult, Context, Rule, RuleError, RuleId, RuleSelector, Scope,
};
use crate::plan::{PlanNode, PlanRef, PlanTreeNode};
use crate::transform::{inspect, Transformed};

/// Fails analysis when any node or expression is still unresolved. The error names the
/// outermost node at fault.
#[derive(Clone)]
pub struct ValidateResolved;

impl ValidateResolved {
    fn first_unresolved(plan: &PlanRef) -> Option<PlanRef> {
        let mut found = None;
        inspect(plan, &mut |node| {
            if found.is_some() {
                return false;
            }
            if !node.node_resolved() || node.expressions().iter().any(|e| !e.resolved()) {
                found = Some(node.clone());
                return false;
            }
            true
        });
        found
    }
}

impl Rule for ValidateResolved {
    fn id(&self) -> RuleId {
        RuleId::ValidateResolved
    }

    fn apply(
        &self,
        _ctx: &Context,
        _analyzer: &Analyzer,
        plan: &PlanRef,
        _scope: &Scope,
        _selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        match Self::first_unresolved(plan) {
            Some(node) => Err(RuleError::UnresolvedPlan(node.to_string()).into()),
            None => Ok(Transformed::no(plan.clone())),
        }
    }
}

/// Checks that every column of a `CREATE INDEX` exists in the indexed table.
#[derive(Clone)]
pub struct ValidateIndexCreation;

impl Rule for ValidateIndexCreation {
    fn id(&self) -> RuleId {
        RuleId::ValidateIndexCreation
    }

    fn apply(
        &self,
        _ctx: &Context,
        _analyzer: &Analyzer,
        plan: &PlanRef,
        _scope: &Scope,
        _selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        let mut error = None;
        inspect(plan, &mut |node| {
            if error.is_some() {
                return false;
            }
            if let PlanNode::CreateIndex(create) = node.as_ref() {
                let table_columns = create.table.output_columns();
                if let Some(missing) = create
                    .columns
                    .iter()
                    .find(|c| !table_columns.iter().any(|tc| tc.matches(None, c)))
                {
                    error = Some(RuleError::UnknownIndexColumn {
                        index: create.name.clone(),
                        column: missing.clone(),
                    });
                }
                return false;
            }
            true
        });
        match error {
            Some(e) => Err(e.into()),
            None => Ok(Transformed::no(plan.clone())),
        }
    }
}
