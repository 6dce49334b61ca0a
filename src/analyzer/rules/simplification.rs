use std::sync::Arc;

use crate::analyzer::{Analyzer, AnalyzerResult, Context, Rule, RuleId, RuleSelector, Scope};
use crate::expression::Expression;
use crate::plan::{OrderedDistinct, PlanNode, PlanRef, PlanTreeNode, Project, TopN};
use crate::transform::{transform_up, Transformed};

/// A distinct over sorted input only has to compare adjacent rows.
#[derive(Clone)]
pub struct OptimizeDistinct;

impl Rule for OptimizeDistinct {
    fn id(&self) -> RuleId {
        RuleId::OptimizeDistinct
    }

    fn apply(
        &self,
        _ctx: &Context,
        _analyzer: &Analyzer,
        plan: &PlanRef,
        _scope: &Scope,
        _selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        transform_up(plan, &mut |node| match node.as_ref() {
            PlanNode::Distinct(distinct) if matches!(distinct.child.as_ref(), PlanNode::Sort(_)) => {
                Ok(Transformed::yes(Arc::new(
                    OrderedDistinct::new(distinct.child.clone()).into(),
                )))
            }
            _ => Ok(Transformed::no(node.clone())),
        })
    }
}

/// Removes projections that hand their input row through unchanged.
#[derive(Clone)]
pub struct EraseProjection;

impl EraseProjection {
    fn is_identity(project: &Project) -> bool {
        let input = project.child.output_columns();
        project.exprs.len() == input.len()
            && project
                .exprs
                .iter()
                .zip(input.iter())
                .enumerate()
                .all(|(position, (expr, column))| match expr.as_ref() {
                    Expression::GetField(field) => {
                        field.index == position && field.name == column.name
                    }
                    _ => false,
                })
    }
}

impl Rule for EraseProjection {
    fn id(&self) -> RuleId {
        RuleId::EraseProjection
    }

    fn apply(
        &self,
        _ctx: &Context,
        _analyzer: &Analyzer,
        plan: &PlanRef,
        _scope: &Scope,
        _selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        transform_up(plan, &mut |node| match node.as_ref() {
            PlanNode::Project(project) if Self::is_identity(project) => {
                Ok(Transformed::yes(project.child.clone()))
            }
            _ => Ok(Transformed::no(node.clone())),
        })
    }
}

/// `Limit(Sort(x))` becomes a single `TopN`.
#[derive(Clone)]
pub struct InsertTopN;

impl Rule for InsertTopN {
    fn id(&self) -> RuleId {
        RuleId::InsertTopN
    }

    fn apply(
        &self,
        _ctx: &Context,
        _analyzer: &Analyzer,
        plan: &PlanRef,
        _scope: &Scope,
        _selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        transform_up(plan, &mut |node| {
            if let PlanNode::Limit(limit) = node.as_ref() {
                if let PlanNode::Sort(sort) = limit.child.as_ref() {
                    let top_n = TopN::new(
                        limit.limit.clone(),
                        sort.sort_fields.clone(),
                        sort.child.clone(),
                    );
                    return Ok(Transformed::yes(Arc::new(top_n.into())));
                }
            }
            Ok(Transformed::no(node.clone()))
        })
    }
}
