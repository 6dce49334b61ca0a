use std::sync::Arc;

use anyhow::{Context as _, Result};
use arrow::datatypes::{DataType, Field};
use sqlanalyzer::analyzer::{Analyzer, AnalyzerConfigBuilder, Context, Scope, Session};
use sqlanalyzer::catalog::{MemoryCatalog, Table};
use sqlanalyzer::expression::Expression;
use sqlanalyzer::plan::{Filter, Join, JoinType, PlanNode, PlanRef, Project, UnresolvedTable};
use sqlanalyzer::util::pretty_plan_tree;
use sqlparser::ast::BinaryOperator;

fn table(name: &str) -> PlanRef {
    Arc::new(UnresolvedTable::new(None, name.to_string(), None).into())
}

/// select first_name, dept_name from employee, department
/// where employee.dept_id = department.id and state = 'CA'
fn demo_plan() -> PlanRef {
    let predicate = Expression::binary(
        BinaryOperator::And,
        Expression::binary(
            BinaryOperator::Eq,
            Expression::qualified_column("employee", "dept_id"),
            Expression::qualified_column("department", "id"),
        ),
        Expression::binary(
            BinaryOperator::Eq,
            Expression::column("state"),
            Expression::literal("CA"),
        ),
    );
    let join: PlanRef = Arc::new(PlanNode::from(Join::new(
        JoinType::Cross,
        None,
        table("employee"),
        table("department"),
    )));
    let filter: PlanRef = Arc::new(Filter::new(predicate, join).into());
    Arc::new(
        Project::new(
            vec![Expression::column("first_name"), Expression::column("dept_name")],
            filter,
        )
        .into(),
    )
}

fn main() -> Result<()> {
    env_logger::init();

    let parallelism = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<usize>().context("parallelism must be a number")?,
        None => 2,
    };

    let catalog = MemoryCatalog::new("hr")
        .with_table(Table::new(
            "hr",
            "employee",
            vec![
                Field::new("id", DataType::Int64, false),
                Field::new("first_name", DataType::Utf8, false),
                Field::new("state", DataType::Utf8, true),
                Field::new("dept_id", DataType::Int64, true),
            ],
        ))
        .with_table(Table::new(
            "hr",
            "department",
            vec![
                Field::new("id", DataType::Int64, false),
                Field::new("dept_name", DataType::Utf8, false),
            ],
        ));
    let config = AnalyzerConfigBuilder::default()
        .parallelism(parallelism)
        .build()?;
    let analyzer = Analyzer::builder(Arc::new(catalog))
        .with_config(config)
        .build();

    let plan = demo_plan();
    println!("unresolved plan:");
    pretty_plan_tree(&plan);

    let ctx = Context::new(Session::new("hr"));
    let analyzed = analyzer.analyze(&ctx, &plan, &Scope::new())?;
    println!("analyzed plan:");
    pretty_plan_tree(&analyzed);
    Ok(())
}
