use std::sync::Arc;

use log::{debug, trace};

use super::{
    Analyzer, AnalyzerError, AnalyzerResult, Context, Rule, RuleId, RuleImpl, RuleSelector, Scope,
    LOGGING_TARGET,
};
use crate::plan::PlanRef;
use crate::transform::Transformed;
use crate::util::pretty_plan_tree_string;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStrategy {
    /// Run each rule once, in order.
    Once,
    /// Sweep the rules repeatedly until a sweep changes nothing. A sweep that still changes the
    /// plan at `max_iterations` is reported as non-convergence.
    FixPoint { max_iterations: usize },
}

/// A named, ordered list of rules sharing one convergence strategy.
#[derive(Debug, Clone)]
pub struct Batch {
    pub name: String,
    pub strategy: BatchStrategy,
    pub rules: Vec<RuleImpl>,
}

impl Batch {
    pub fn once(name: impl Into<String>, rules: Vec<RuleImpl>) -> Self {
        Self {
            name: name.into(),
            strategy: BatchStrategy::Once,
            rules,
        }
    }

    pub fn fix_point(name: impl Into<String>, max_iterations: usize, rules: Vec<RuleImpl>) -> Self {
        Self {
            name: name.into(),
            strategy: BatchStrategy::FixPoint { max_iterations },
            rules,
        }
    }

    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub(crate) fn apply(
        &self,
        ctx: &Context,
        analyzer: &Analyzer,
        plan: &PlanRef,
        scope: &Scope,
        selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        match self.strategy {
            BatchStrategy::Once => self.sweep(ctx, analyzer, plan, scope, selector),
            BatchStrategy::FixPoint { max_iterations } => {
                let max_iterations = max_iterations.max(1);
                let mut current = plan.clone();
                let mut changed = false;
                for iteration in 1..=max_iterations {
                    let result = self.sweep(ctx, analyzer, &current, scope, selector)?;
                    current = result.data;
                    if !result.changed {
                        debug!(
                            target: LOGGING_TARGET,
                            "batch {} reached fix point after {} iterations", self.name, iteration
                        );
                        return Ok(Transformed::new(current, changed));
                    }
                    changed = true;
                }
                Err(AnalyzerError::NonConvergence {
                    batch: self.name.clone(),
                    iterations: max_iterations,
                })
            }
        }
    }

    /// Runs every selected rule once, in declaration order.
    fn sweep(
        &self,
        ctx: &Context,
        analyzer: &Analyzer,
        plan: &PlanRef,
        scope: &Scope,
        selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        let mut current = plan.clone();
        let mut changed = false;
        for rule in self.rules.iter() {
            if !selector.select(rule.id(), &self.name) {
                continue;
            }
            ctx.check()?;

            let result = rule.apply(ctx, analyzer, &current, scope, selector)?;
            let rule_changed = result.changed || !Arc::ptr_eq(&current, &result.data);
            if rule_changed {
                debug!(
                    target: LOGGING_TARGET,
                    "rule {} changed plan in batch {}",
                    rule.id(),
                    self.name
                );
                trace!(
                    target: LOGGING_TARGET,
                    "plan after {}:\n{}",
                    rule.id(),
                    pretty_plan_tree_string(&result.data)
                );
            }
            changed |= rule_changed;
            current = result.data;
        }
        Ok(Transformed::new(current, changed))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::analyzer::{AnalyzerBuilder, FnRule, Session};
    use crate::catalog::MemoryCatalog;
    use crate::expression::Expression;
    use crate::plan::{Distinct, PlanNode};
    use crate::test_util::*;

    fn ctx() -> Context {
        Context::new(Session::new("mydb"))
    }

    fn analyzer() -> Analyzer {
        AnalyzerBuilder::new(Arc::new(MemoryCatalog::default())).build()
    }

    /// Appends `marker` to `trace` and wraps the plan in `Distinct`, so every application
    /// reports a change.
    fn tracing_rule(id: RuleId, marker: &'static str, trace: Arc<Mutex<Vec<&'static str>>>) -> RuleImpl {
        FnRule::new(id, move |_, _, plan, _, _| {
            trace.lock().unwrap().push(marker);
            Ok(Transformed::yes(Arc::new(PlanNode::from(Distinct::new(
                plan.clone(),
            )))))
        })
        .into()
    }

    fn noop_rule(id: RuleId, trace: Arc<Mutex<Vec<&'static str>>>) -> RuleImpl {
        FnRule::new(id, move |_, _, plan, _, _| {
            trace.lock().unwrap().push("noop");
            Ok(Transformed::no(plan.clone()))
        })
        .into()
    }

    #[test]
    fn test_once_batch_keeps_declared_order() {
        let trace = Arc::new(Mutex::new(vec![]));
        let batch = Batch::once(
            "test",
            vec![
                tracing_rule(RuleId::ResolveTables, "first", trace.clone()),
                noop_rule(RuleId::ResolveColumns, trace.clone()),
                tracing_rule(RuleId::EvalFilter, "second", trace.clone()),
            ],
        );
        let plan = mytable();
        let result = batch
            .apply(&ctx(), &analyzer(), &plan, &Scope::new(), &RuleSelector::all())
            .unwrap();
        assert!(result.changed);
        assert_eq!(*trace.lock().unwrap(), vec!["first", "noop", "second"]);
    }

    #[test]
    fn test_once_batch_skips_unselected_rules() {
        let trace = Arc::new(Mutex::new(vec![]));
        let batch = Batch::once(
            "test",
            vec![
                tracing_rule(RuleId::ResolveTables, "first", trace.clone()),
                tracing_rule(RuleId::EvalFilter, "second", trace.clone()),
            ],
        );
        let plan = mytable();
        let selector = RuleSelector::except([RuleId::ResolveTables]);
        batch
            .apply(&ctx(), &analyzer(), &plan, &Scope::new(), &selector)
            .unwrap();
        assert_eq!(*trace.lock().unwrap(), vec!["second"]);
    }

    #[test]
    fn test_fix_point_batch_never_converging() {
        let trace = Arc::new(Mutex::new(vec![]));
        let batch = Batch::fix_point(
            "default-rules",
            8,
            vec![tracing_rule(RuleId::ResolveColumns, "always", trace.clone())],
        );
        let err = batch
            .apply(&ctx(), &analyzer(), &mytable(), &Scope::new(), &RuleSelector::all())
            .unwrap_err();
        assert!(err.is_non_convergence());
        assert_eq!(
            err,
            AnalyzerError::NonConvergence {
                batch: "default-rules".to_string(),
                iterations: 8
            }
        );
        assert_eq!(trace.lock().unwrap().len(), 8);
    }

    #[test]
    fn test_fix_point_batch_stops_when_nothing_changes() {
        let counter = Arc::new(Mutex::new(0));
        let calls = counter.clone();
        // Changes the plan on the first two sweeps only.
        let rule = FnRule::new(RuleId::EvalFilter, move |_, _, plan, _, _| {
            let mut calls = calls.lock().unwrap();
            *calls += 1;
            if *calls <= 2 {
                Ok(Transformed::yes(Arc::new(PlanNode::from(Distinct::new(
                    plan.clone(),
                )))))
            } else {
                Ok(Transformed::no(plan.clone()))
            }
        });
        let batch = Batch::fix_point("default-rules", 8, vec![rule.into()]);
        let result = batch
            .apply(&ctx(), &analyzer(), &mytable(), &Scope::new(), &RuleSelector::all())
            .unwrap();
        assert!(result.changed);
        assert_eq!(*counter.lock().unwrap(), 3);
    }

    #[test]
    fn test_batch_rule_error_aborts() {
        let trace = Arc::new(Mutex::new(vec![]));
        let failing = FnRule::new(RuleId::ResolveTables, |_, _, _, _, _| {
            Err(crate::analyzer::RuleError::TableNotFound("t".to_string()).into())
        });
        let batch = Batch::once(
            "test",
            vec![
                failing.into(),
                tracing_rule(RuleId::EvalFilter, "after", trace.clone()),
            ],
        );
        let err = batch
            .apply(&ctx(), &analyzer(), &mytable(), &Scope::new(), &RuleSelector::all())
            .unwrap_err();
        assert!(err.is_rule_error());
        assert!(trace.lock().unwrap().is_empty());
    }

    #[test]
    fn test_batch_checks_cancellation() {
        let ctx = ctx();
        ctx.cancel();
        let batch = Batch::once(
            "test",
            vec![noop_rule(RuleId::EvalFilter, Arc::new(Mutex::new(vec![])))],
        );
        let plan = filter(Expression::literal(true), mytable());
        let err = batch
            .apply(&ctx, &analyzer(), &plan, &Scope::new(), &RuleSelector::all())
            .unwrap_err();
        assert_eq!(err, AnalyzerError::Cancelled);
    }
}
