use std::collections::HashSet;
use std::fmt::{self, Debug};
use std::sync::Arc;

use ahash::RandomState;
use enum_dispatch::enum_dispatch;
use strum_macros::AsRefStr;

use super::rules::*;
use super::{Analyzer, AnalyzerResult, Context, RuleId, Scope};
use crate::plan::PlanRef;
use crate::transform::Transformed;

/// A rule rewrites a plan into an equivalent one. Rules must be idempotent: applying a rule to
/// its own output reports no change.
#[enum_dispatch]
pub trait Rule {
    fn id(&self) -> RuleId;

    /// Apply the rule. An unchanged plan must be returned as the same reference with
    /// `changed == false`.
    fn apply(
        &self,
        ctx: &Context,
        analyzer: &Analyzer,
        plan: &PlanRef,
        scope: &Scope,
        selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>>;
}

#[enum_dispatch(Rule)]
#[derive(Clone, AsRefStr)]
pub enum RuleImpl {
    ApplyDefaultSelectLimit,
    ValidateOffsetAndLimit,
    ResolveTables,
    ResolveSubqueries,
    ResolveColumns,
    EvalFilter,
    ReplaceCrossJoins,
    OptimizeDistinct,
    EraseProjection,
    InsertTopN,
    ValidateResolved,
    ValidateIndexCreation,
    AddAutocommitNode,
    TrackProcess,
    Parallelize,
    FnRule,
}

impl Debug for RuleImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.as_ref(), self.id())
    }
}

type RuleFn = dyn Fn(&Context, &Analyzer, &PlanRef, &Scope, &RuleSelector) -> AnalyzerResult<Transformed<PlanRef>>
    + Send
    + Sync;

/// A rule given as a closure, bound to an existing rule identity.
#[derive(Clone)]
pub struct FnRule {
    id: RuleId,
    f: Arc<RuleFn>,
}

impl FnRule {
    pub fn new<F>(id: RuleId, f: F) -> Self
    where
        F: Fn(&Context, &Analyzer, &PlanRef, &Scope, &RuleSelector) -> AnalyzerResult<Transformed<PlanRef>>
            + Send
            + Sync
            + 'static,
    {
        Self { id, f: Arc::new(f) }
    }
}

impl Rule for FnRule {
    fn id(&self) -> RuleId {
        self.id
    }

    fn apply(
        &self,
        ctx: &Context,
        analyzer: &Analyzer,
        plan: &PlanRef,
        scope: &Scope,
        selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        (self.f)(ctx, analyzer, plan, scope, selector)
    }
}

type SelectorFn = dyn Fn(RuleId, &str) -> bool + Send + Sync;

/// Decides, per rule and batch name, whether a rule runs.
#[derive(Clone)]
pub struct RuleSelector {
    f: Arc<SelectorFn>,
}

impl RuleSelector {
    pub fn all() -> Self {
        Self::from_fn(|_, _| true)
    }

    pub fn only(ids: impl IntoIterator<Item = RuleId>) -> Self {
        let ids: HashSet<RuleId, RandomState> = ids.into_iter().collect();
        Self::from_fn(move |id, _| ids.contains(&id))
    }

    pub fn except(ids: impl IntoIterator<Item = RuleId>) -> Self {
        let ids: HashSet<RuleId, RandomState> = ids.into_iter().collect();
        Self::from_fn(move |id, _| !ids.contains(&id))
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(RuleId, &str) -> bool + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    pub fn select(&self, id: RuleId, batch: &str) -> bool {
        (self.f)(id, batch)
    }
}

impl Default for RuleSelector {
    fn default() -> Self {
        Self::all()
    }
}

impl Debug for RuleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleSelector")
    }
}
