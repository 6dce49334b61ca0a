use std::sync::Arc;

use arrow::datatypes::{DataType, Field};
use pretty_assertions::assert_eq;
use sqlanalyzer::analyzer::{
    Analyzer, AnalyzerError, Context, FnRule, RuleError, RuleId, RuleSelector, Scope, Session,
};
use sqlanalyzer::catalog::{CatalogRef, MemoryCatalog, Table};
use sqlanalyzer::expression::{Expression, Subquery};
use sqlanalyzer::plan::{
    Filter, Join, JoinType, Limit, PlanNode, PlanRef, Project, Sort, SortField, UnresolvedTable,
};
use sqlanalyzer::transform::Transformed;
use sqlanalyzer::util::pretty_plan_tree_string;
use sqlparser::ast::BinaryOperator;

fn catalog() -> CatalogRef {
    Arc::new(
        MemoryCatalog::new("mydb")
            .with_table(Table::new(
                "mydb",
                "mytable",
                vec![
                    Field::new("i", DataType::Int64, false),
                    Field::new("s", DataType::Utf8, true),
                ],
            ))
            .with_table(Table::new(
                "mydb",
                "othertable",
                vec![
                    Field::new("i2", DataType::Int64, false),
                    Field::new("s2", DataType::Utf8, true),
                ],
            )),
    )
}

fn table(name: &str) -> PlanRef {
    Arc::new(UnresolvedTable::new(None, name.to_string(), None).into())
}

fn ctx() -> Context {
    Context::new(Session::new("mydb"))
}

fn analyze(analyzer: &Analyzer, ctx: &Context, plan: &PlanRef) -> Result<String, AnalyzerError> {
    analyzer
        .analyze(ctx, plan, &Scope::new())
        .map(|p| pretty_plan_tree_string(&p))
}

#[test]
fn test_analyze_cross_join_query() {
    let predicate = Expression::binary(
        BinaryOperator::And,
        Expression::binary(
            BinaryOperator::Eq,
            Expression::qualified_column("mytable", "i"),
            Expression::qualified_column("othertable", "i2"),
        ),
        Expression::binary(
            BinaryOperator::Gt,
            Expression::column("i"),
            Expression::literal(1_i64),
        ),
    );
    let join: PlanRef = Arc::new(PlanNode::from(Join::new(
        JoinType::Cross,
        None,
        table("mytable"),
        table("othertable"),
    )));
    let plan: PlanRef = Arc::new(
        Project::new(
            vec![Expression::column("i"), Expression::column("s2")],
            Arc::new(Filter::new(predicate, join).into()),
        )
        .into(),
    );

    let analyzer = Analyzer::builder(catalog()).with_parallelism(2).build();
    assert_eq!(
        analyze(&analyzer, &ctx(), &plan).unwrap(),
        "\
QueryProcess
  TransactionCommitting
    Project: [mytable.i, othertable.s2]
      Filter: (mytable.i > 1)
        InnerJoin: on (mytable.i = othertable.i2)
          Exchange: parallelism=2
            ResolvedTable: mydb.mytable
          Exchange: parallelism=2
            ResolvedTable: mydb.othertable
"
    );
}

#[test]
fn test_analyze_applies_select_limit() {
    let plan: PlanRef = Arc::new(
        Sort::new(
            vec![SortField::new(Expression::column("i"), true)],
            table("mytable"),
        )
        .into(),
    );
    let ctx = Context::new(Session::new("mydb").with_sql_select_limit(10));
    let analyzer = Analyzer::new(catalog());
    assert_eq!(
        analyze(&analyzer, &ctx, &plan).unwrap(),
        "\
QueryProcess
  TransactionCommitting
    TopN: limit 10, [mytable.i ASC]
      ResolvedTable: mydb.mytable
"
    );
}

#[test]
fn test_analyze_subquery_is_parallelized_with_outer_query() {
    let subquery = Subquery::new(
        Arc::new(Project::new(vec![Expression::column("i2")], table("othertable")).into()),
        "select i2 from othertable".to_string(),
    );
    let plan: PlanRef = Arc::new(
        Filter::new(
            Expression::binary(
                BinaryOperator::Eq,
                Expression::column("i"),
                Arc::new(Expression::Subquery(subquery)),
            ),
            table("mytable"),
        )
        .into(),
    );

    let analyzer = Analyzer::builder(catalog()).with_parallelism(4).build();
    let analyzed = analyzer.analyze(&ctx(), &plan, &Scope::new()).unwrap();
    assert!(analyzed.resolved());
    assert_eq!(
        pretty_plan_tree_string(&analyzed),
        "\
QueryProcess
  TransactionCommitting
    Exchange: parallelism=4
      Filter: (mytable.i = (subquery: select i2 from othertable))
        ResolvedTable: mydb.mytable
"
    );
}

#[test]
fn test_analyze_reports_rule_errors() {
    let analyzer = Analyzer::new(catalog());

    let plan = table("missing");
    assert_eq!(
        analyze(&analyzer, &ctx(), &plan).unwrap_err(),
        AnalyzerError::RuleError(RuleError::TableNotFound("missing".to_string()))
    );

    let plan: PlanRef = Arc::new(
        Limit::new(Expression::literal(-1_i64), table("mytable")).into(),
    );
    assert_eq!(
        analyze(&analyzer, &ctx(), &plan).unwrap_err(),
        AnalyzerError::RuleError(RuleError::InvalidLimitValue("-1".to_string()))
    );
}

#[test]
fn test_analyze_fix_point_non_convergence() {
    let always_changes = FnRule::new(RuleId::ResolveViews, |_, _, plan: &PlanRef, _, _| {
        Ok(Transformed::yes(plan.clone()))
    });
    let analyzer = Analyzer::builder(catalog())
        .add_pre_analyze_rule(always_changes)
        .build();
    let err = analyzer
        .analyze(&ctx(), &table("mytable"), &Scope::new())
        .unwrap_err();
    assert!(err.is_non_convergence());
    assert_eq!(
        err,
        AnalyzerError::NonConvergence {
            batch: "pre-analyzer".to_string(),
            iterations: 8,
        }
    );
}

#[test]
fn test_analyze_with_selector_skips_rules() {
    let analyzer = Analyzer::new(catalog());
    let selector = RuleSelector::except(vec![RuleId::Autocommit, RuleId::TrackProcess]);
    let analyzed = analyzer
        .analyze_with_selector(&ctx(), &table("mytable"), &Scope::new(), &selector)
        .unwrap();
    assert_eq!(
        pretty_plan_tree_string(&analyzed),
        "ResolvedTable: mydb.mytable\n"
    );
}

#[test]
fn test_cancelled_analysis() {
    let analyzer = Analyzer::new(catalog());
    let ctx = ctx();
    ctx.cancel();
    assert_eq!(
        analyze(&analyzer, &ctx, &table("mytable")).unwrap_err(),
        AnalyzerError::Cancelled
    );
}

#[test]
fn test_shared_analyzer_across_threads() {
    let analyzer = Arc::new(Analyzer::builder(catalog()).with_parallelism(2).build());
    let handles = (0..8)
        .map(|_| {
            let analyzer = analyzer.clone();
            std::thread::spawn(move || {
                let plan: PlanRef = Arc::new(
                    Filter::new(Expression::literal(1_i64), table("mytable")).into(),
                );
                analyze(&analyzer, &ctx(), &plan)
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        assert_eq!(
            handle.join().unwrap().unwrap(),
            "\
QueryProcess
  TransactionCommitting
    Exchange: parallelism=2
      Filter: 1
        ResolvedTable: mydb.mytable
"
        );
    }
}
