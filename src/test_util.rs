//! Plan builders and fixtures shared by the unit tests.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field};

use crate::analyzer::{Analyzer, AnalyzerResult, Context, Rule, RuleSelector, Scope, Session};
use crate::catalog::{CatalogRef, MemoryCatalog, Table};
use crate::expression::{ExprRef, Expression, GetField};
use crate::plan::{
    Filter, Join, JoinType, Limit, Offset, PlanNode, PlanRef, Project, ResolvedTable, Sort,
    SortField, UnresolvedTable,
};
use crate::transform::Transformed;

fn mytable_def() -> Table {
    Table::new(
        "mydb",
        "mytable",
        vec![
            Field::new("i", DataType::Int64, false),
            Field::new("s", DataType::Utf8, true),
        ],
    )
}

fn othertable_def() -> Table {
    Table::new(
        "mydb",
        "othertable",
        vec![
            Field::new("i2", DataType::Int64, false),
            Field::new("s2", DataType::Utf8, true),
        ],
    )
}

pub fn test_catalog() -> CatalogRef {
    Arc::new(
        MemoryCatalog::new("mydb")
            .with_table(mytable_def())
            .with_table(othertable_def()),
    )
}

pub fn mytable() -> PlanRef {
    Arc::new(ResolvedTable::new(Arc::new(mytable_def())).into())
}

pub fn othertable() -> PlanRef {
    Arc::new(ResolvedTable::new(Arc::new(othertable_def())).into())
}

pub fn unresolved_table(name: &str) -> PlanRef {
    Arc::new(UnresolvedTable::new(None, name.to_string(), None).into())
}

/// A bound column. The type is looked up from the test tables by name.
pub fn field(index: usize, table: &str, name: &str) -> ExprRef {
    let (data_type, nullable) = match name {
        "i" | "i2" => (DataType::Int64, false),
        _ => (DataType::Utf8, true),
    };
    Arc::new(Expression::GetField(GetField::new(
        index,
        table.to_string(),
        name.to_string(),
        data_type,
        nullable,
    )))
}

pub fn filter(predicate: ExprRef, child: PlanRef) -> PlanRef {
    Arc::new(Filter::new(predicate, child).into())
}

pub fn project(exprs: Vec<ExprRef>, child: PlanRef) -> PlanRef {
    Arc::new(Project::new(exprs, child).into())
}

pub fn limit(limit: ExprRef, child: PlanRef) -> PlanRef {
    Arc::new(Limit::new(limit, child).into())
}

pub fn offset(offset: ExprRef, child: PlanRef) -> PlanRef {
    Arc::new(Offset::new(offset, child).into())
}

/// Ascending sort on every given expression.
pub fn sort(exprs: Vec<ExprRef>, child: PlanRef) -> PlanRef {
    let fields = exprs.into_iter().map(|e| SortField::new(e, true)).collect();
    Arc::new(Sort::new(fields, child).into())
}

pub fn inner_join(left: PlanRef, right: PlanRef, condition: Option<ExprRef>) -> PlanRef {
    Arc::new(Join::new(JoinType::Inner, condition, left, right).into())
}

pub fn cross_join(left: PlanRef, right: PlanRef) -> PlanRef {
    Arc::new(PlanNode::from(Join::new(JoinType::Cross, None, left, right)))
}

pub fn test_context() -> Context {
    Context::new(Session::new("mydb"))
}

pub fn test_analyzer() -> Analyzer {
    Analyzer::new(test_catalog())
}

/// Applies a single rule at the top level with the default analyzer.
pub fn apply_rule(
    rule: &impl Rule,
    ctx: &Context,
    plan: &PlanRef,
) -> AnalyzerResult<Transformed<PlanRef>> {
    rule.apply(ctx, &test_analyzer(), plan, &Scope::new(), &RuleSelector::all())
}

pub fn apply_rule_with_parallelism(
    rule: &impl Rule,
    ctx: &Context,
    plan: &PlanRef,
    parallelism: usize,
) -> AnalyzerResult<Transformed<PlanRef>> {
    let analyzer = Analyzer::builder(test_catalog())
        .with_parallelism(parallelism)
        .build();
    rule.apply(ctx, &analyzer, plan, &Scope::new(), &RuleSelector::all())
}
