use std::sync::Arc;

use log::debug;

use crate::analyzer::{
    Analyzer, AnalyzerResult, Context, Rule, RuleError, RuleId, RuleSelector, Scope,
    LOGGING_TARGET,
};
use crate::plan::{PlanNode, PlanRef, ResolvedTable, TableAlias};
use crate::transform::{transform_up, Transformed};

/// Looks up every `UnresolvedTable` in the catalog.
#[derive(Clone)]
pub struct ResolveTables;

impl Rule for ResolveTables {
    fn id(&self) -> RuleId {
        RuleId::ResolveTables
    }

    fn apply(
        &self,
        ctx: &Context,
        analyzer: &Analyzer,
        plan: &PlanRef,
        _scope: &Scope,
        _selector: &RuleSelector,
    ) -> AnalyzerResult<Transformed<PlanRef>> {
        transform_up(plan, &mut |node| {
            let unresolved = match node.as_ref() {
                PlanNode::UnresolvedTable(t) => t,
                _ => return Ok(Transformed::no(node.clone())),
            };
            let catalog = analyzer.catalog();
            // no database selected in the session means the catalog default
            let database = match unresolved.database.as_deref() {
                Some(database) => database,
                None if ctx.session().current_database.is_empty() => catalog.default_database(),
                None => &ctx.session().current_database,
            };
            let table = catalog
                .table(database, &unresolved.name)
                .ok_or_else(|| RuleError::TableNotFound(unresolved.name.clone()))?;
            debug!(
                target: LOGGING_TARGET,
                "resolved table {}.{}", table.database, table.name
            );

            let resolved: PlanRef = Arc::new(ResolvedTable::new(table).into());
            let resolved = match &unresolved.alias {
                Some(alias) => Arc::new(TableAlias::new(alias.clone(), resolved).into()),
                None => resolved,
            };
            Ok(Transformed::yes(resolved))
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::analyzer::{AnalyzerError, Session};
    use crate::plan::{PlanTreeNode, UnresolvedTable};
    use crate::test_util::*;
    use crate::util::pretty_plan_tree_string;

    #[test]
    fn test_resolve_tables_with_alias_and_database() {
        let aliased = Arc::new(PlanNode::from(UnresolvedTable::new(
            Some("MYDB".to_string()),
            "othertable".to_string(),
            Some("o".to_string()),
        )));
        let plan = inner_join(unresolved_table("mytable"), aliased, None);
        let result = apply_rule(&ResolveTables, &test_context(), &plan).unwrap();
        assert!(result.changed);
        assert_eq!(
            pretty_plan_tree_string(&result.data),
            "\
InnerJoin
  ResolvedTable: mydb.mytable
  TableAlias: o
    ResolvedTable: mydb.othertable
"
        );
        assert_eq!(result.data.output_columns()[2].table, "o");
    }

    #[test]
    fn test_resolve_tables_uses_session_database() {
        let ctx = Context::new(Session::new("otherdb"));
        let err = apply_rule(&ResolveTables, &ctx, &unresolved_table("mytable")).unwrap_err();
        assert_eq!(
            err,
            AnalyzerError::RuleError(RuleError::TableNotFound("mytable".to_string()))
        );
    }

    #[test]
    fn test_resolve_tables_without_session_database_uses_catalog_default() {
        let ctx = Context::new(Session::new(""));
        let result = apply_rule(&ResolveTables, &ctx, &unresolved_table("mytable")).unwrap();
        assert!(result.changed);
        assert_eq!(
            pretty_plan_tree_string(&result.data),
            "ResolvedTable: mydb.mytable\n"
        );
    }
}
