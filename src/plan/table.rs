use std::fmt;

use derive_new::new;

use super::{single_child, PlanNode, PlanRef, PlanTreeNode};
use crate::analyzer::{check_children_number, AnalyzerResult};
use crate::catalog::{Column, TableRef};

/// A table reference as written in the query, not yet looked up in the catalog.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedTable {
    pub database: Option<String>,
    pub name: String,
    pub alias: Option<String>,
}

impl PlanTreeNode for UnresolvedTable {
    fn children(&self) -> Vec<PlanRef> {
        vec![]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        check_children_number("UnresolvedTable", &children, 0)?;
        Ok(self.clone().into())
    }

    no_expressions!("UnresolvedTable");

    fn output_columns(&self) -> Vec<Column> {
        vec![]
    }

    fn node_resolved(&self) -> bool {
        false
    }
}

impl fmt::Display for UnresolvedTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "UnresolvedTable: ")?;
        if let Some(database) = &self.database {
            write!(f, "{}.", database)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {}", alias)?;
        }
        Ok(())
    }
}

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTable {
    pub table: TableRef,
}

impl PlanTreeNode for ResolvedTable {
    fn children(&self) -> Vec<PlanRef> {
        vec![]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        check_children_number("ResolvedTable", &children, 0)?;
        Ok(self.clone().into())
    }

    no_expressions!("ResolvedTable");

    fn output_columns(&self) -> Vec<Column> {
        self.table.columns().to_vec()
    }
}

impl fmt::Display for ResolvedTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ResolvedTable: {}.{}",
            self.table.database, self.table.name
        )
    }
}

/// A relation known to produce no rows, keeping the shape of what it replaced.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct EmptyTable {
    pub columns: Vec<Column>,
}

impl PlanTreeNode for EmptyTable {
    fn children(&self) -> Vec<PlanRef> {
        vec![]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        check_children_number("EmptyTable", &children, 0)?;
        Ok(self.clone().into())
    }

    no_expressions!("EmptyTable");

    fn output_columns(&self) -> Vec<Column> {
        self.columns.clone()
    }
}

impl fmt::Display for EmptyTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EmptyTable")
    }
}

/// Renames the source of its child's columns.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct TableAlias {
    pub name: String,
    pub child: PlanRef,
}

impl PlanTreeNode for TableAlias {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        let child = single_child("TableAlias", children)?;
        Ok(Self::new(self.name.clone(), child).into())
    }

    no_expressions!("TableAlias");

    fn output_columns(&self) -> Vec<Column> {
        self.child
            .output_columns()
            .into_iter()
            .map(|c| Column {
                table: self.name.clone(),
                ..c
            })
            .collect()
    }
}

impl fmt::Display for TableAlias {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TableAlias: {}", self.name)
    }
}
