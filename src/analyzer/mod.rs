mod batch;
mod config;
mod context;
mod errors;
mod rule;
mod rule_id;
pub mod rules;
mod scope;

pub use batch::*;
pub use config::*;
pub use context::*;
pub(crate) use errors::{check_children_number, check_expression_number};
pub use errors::{AnalyzerError, AnalyzerResult, RuleError};
use log::{debug, trace};
pub use rule::*;
pub use rule_id::*;
use rules::*;
pub use scope::*;

use crate::catalog::CatalogRef;
use crate::plan::PlanRef;
use crate::util::pretty_plan_tree_string;

pub static LOGGING_TARGET: &str = "sqlanalyzer::analyzer";

pub const ONCE_BEFORE: &str = "once-before";
pub const DEFAULT_RULES: &str = "default-rules";
pub const ONCE_AFTER: &str = "once-after";
pub const VALIDATION: &str = "validation";
pub const AFTER_ALL: &str = "after-all";
pub const PRE_ANALYZER: &str = "pre-analyzer";
pub const POST_ANALYZER: &str = "post-analyzer";
pub const PRE_VALIDATION: &str = "pre-validation";
pub const POST_VALIDATION: &str = "post-validation";

/// Rules run once before the default rules: limits, tables and subqueries.
pub fn once_before_default() -> Vec<RuleImpl> {
    vec![
        ApplyDefaultSelectLimit.into(),
        ValidateOffsetAndLimit.into(),
        ResolveTables.into(),
        ResolveSubqueries.into(),
    ]
}

/// Rules run to a fix point.
pub fn default_rules() -> Vec<RuleImpl> {
    vec![ResolveColumns.into(), EvalFilter.into()]
}

/// Rules run once after the default rules, on a resolved plan.
pub fn once_after_default() -> Vec<RuleImpl> {
    vec![
        ReplaceCrossJoins.into(),
        OptimizeDistinct.into(),
        EraseProjection.into(),
        InsertTopN.into(),
    ]
}

pub fn default_validation_rules() -> Vec<RuleImpl> {
    vec![ValidateResolved.into(), ValidateIndexCreation.into()]
}

/// Rules run last, once the plan shape is final.
pub fn once_after_all() -> Vec<RuleImpl> {
    vec![AddAutocommitNode.into(), TrackProcess.into(), Parallelize.into()]
}

/// Runs ordered batches of rules over a plan. One analyzer is built at startup and shared by
/// every analysis; a run keeps no state in it.
#[derive(Debug)]
pub struct Analyzer {
    batches: Vec<Batch>,
    config: AnalyzerConfig,
    catalog: CatalogRef,
    registry: RuleRegistry,
    selector: RuleSelector,
}

impl Analyzer {
    /// An analyzer with the default batches and configuration.
    pub fn new(catalog: CatalogRef) -> Self {
        AnalyzerBuilder::new(catalog).build()
    }

    pub fn builder(catalog: CatalogRef) -> AnalyzerBuilder {
        AnalyzerBuilder::new(catalog)
    }

    pub fn analyze(&self, ctx: &Context, plan: &PlanRef, scope: &Scope) -> AnalyzerResult<PlanRef> {
        self.analyze_with_selector(ctx, plan, scope, &self.selector)
    }

    /// Analyzes the plan with `selector` in place of the analyzer's own.
    pub fn analyze_with_selector(
        &self,
        ctx: &Context,
        plan: &PlanRef,
        scope: &Scope,
        selector: &RuleSelector,
    ) -> AnalyzerResult<PlanRef> {
        self.run_batches(ctx, plan, scope, selector, None)
    }

    /// Runs the batches up to and including `last_batch`.
    pub fn analyze_through_batch(
        &self,
        ctx: &Context,
        plan: &PlanRef,
        scope: &Scope,
        last_batch: &str,
        selector: &RuleSelector,
    ) -> AnalyzerResult<PlanRef> {
        if !self.batches.iter().any(|b| b.name == last_batch) {
            return Err(AnalyzerError::UnknownBatch(last_batch.to_string()));
        }
        self.run_batches(ctx, plan, scope, selector, Some(last_batch))
    }

    fn run_batches(
        &self,
        ctx: &Context,
        plan: &PlanRef,
        scope: &Scope,
        selector: &RuleSelector,
        last_batch: Option<&str>,
    ) -> AnalyzerResult<PlanRef> {
        trace!(
            target: LOGGING_TARGET,
            "analyzing plan:\n{}",
            pretty_plan_tree_string(plan)
        );

        let mut current = plan.clone();
        for batch in self.batches.iter() {
            debug!(target: LOGGING_TARGET, "running batch {}", batch.name);
            let result = batch.apply(ctx, self, &current, scope, selector)?;
            debug!(
                target: LOGGING_TARGET,
                "finished batch {}, changed: {}", batch.name, result.changed
            );
            current = result.data;
            if last_batch == Some(batch.name.as_str()) {
                break;
            }
        }

        trace!(
            target: LOGGING_TARGET,
            "analyzed plan:\n{}",
            pretty_plan_tree_string(&current)
        );
        Ok(current)
    }

    pub fn parallelism(&self) -> usize {
        self.config.parallelism
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogRef {
        &self.catalog
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }
}

/// Assembles the batch list of an [`Analyzer`].
pub struct AnalyzerBuilder {
    catalog: CatalogRef,
    config: AnalyzerConfig,
    pre_analyze_rules: Vec<RuleImpl>,
    post_analyze_rules: Vec<RuleImpl>,
    pre_validation_rules: Vec<RuleImpl>,
    post_validation_rules: Vec<RuleImpl>,
    removed_rules: Vec<RuleId>,
    batches: Option<Vec<Batch>>,
    selector: RuleSelector,
}

impl AnalyzerBuilder {
    pub fn new(catalog: CatalogRef) -> Self {
        Self {
            catalog,
            config: AnalyzerConfig::default(),
            pre_analyze_rules: vec![],
            post_analyze_rules: vec![],
            pre_validation_rules: vec![],
            post_validation_rules: vec![],
            removed_rules: vec![],
            batches: None,
            selector: RuleSelector::all(),
        }
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.config.parallelism = parallelism;
        self
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_selector(mut self, selector: RuleSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Adds a rule to the fix point batch run before everything else.
    pub fn add_pre_analyze_rule(mut self, rule: impl Into<RuleImpl>) -> Self {
        self.pre_analyze_rules.push(rule.into());
        self
    }

    /// Adds a rule to the fix point batch run after the default rules.
    pub fn add_post_analyze_rule(mut self, rule: impl Into<RuleImpl>) -> Self {
        self.post_analyze_rules.push(rule.into());
        self
    }

    pub fn add_pre_validation_rule(mut self, rule: impl Into<RuleImpl>) -> Self {
        self.pre_validation_rules.push(rule.into());
        self
    }

    pub fn add_post_validation_rule(mut self, rule: impl Into<RuleImpl>) -> Self {
        self.post_validation_rules.push(rule.into());
        self
    }

    /// Removes the rule from every batch.
    pub fn remove_rule(mut self, id: RuleId) -> Self {
        self.removed_rules.push(id);
        self
    }

    /// Replaces the whole batch list.
    pub fn with_batches(mut self, batches: Vec<Batch>) -> Self {
        self.batches = Some(batches);
        self
    }

    pub fn build(self) -> Analyzer {
        let max_iterations = self.config.max_iterations;
        let mut batches = match self.batches {
            Some(batches) => batches,
            None => {
                let candidates = vec![
                    Batch::fix_point(PRE_ANALYZER, max_iterations, self.pre_analyze_rules),
                    Batch::once(ONCE_BEFORE, once_before_default()),
                    Batch::fix_point(DEFAULT_RULES, max_iterations, default_rules()),
                    Batch::once(ONCE_AFTER, once_after_default()),
                    Batch::fix_point(POST_ANALYZER, max_iterations, self.post_analyze_rules),
                    Batch::once(PRE_VALIDATION, self.pre_validation_rules),
                    Batch::once(VALIDATION, default_validation_rules()),
                    Batch::once(POST_VALIDATION, self.post_validation_rules),
                    Batch::once(AFTER_ALL, once_after_all()),
                ];
                candidates
                    .into_iter()
                    .filter(|b| !b.rules.is_empty())
                    .collect()
            }
        };

        if !self.removed_rules.is_empty() {
            for batch in batches.iter_mut() {
                batch
                    .rules
                    .retain(|r| !self.removed_rules.contains(&r.id()));
            }
        }

        Analyzer {
            batches,
            config: self.config,
            catalog: self.catalog,
            registry: RuleRegistry::new(),
            selector: self.selector,
        }
    }
}
