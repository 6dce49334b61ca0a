use std::fmt;

use derive_new::new;

use super::{single_child, PlanNode, PlanRef, PlanTreeNode};
use crate::analyzer::{check_children_number, AnalyzerResult};
use crate::catalog::Column;

/// `START TRANSACTION`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartTransaction;

/// `COMMIT`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit;

/// `ROLLBACK`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rollback;

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct CreateSavepoint {
    pub name: String,
}

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct RollbackSavepoint {
    pub name: String,
}

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSavepoint {
    pub name: String,
}

macro_rules! impl_transaction_statement {
    ($($node_name:ident),*) => {
        $(
            impl PlanTreeNode for $node_name {
                fn children(&self) -> Vec<PlanRef> {
                    vec![]
                }

                fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
                    check_children_number(stringify!($node_name), &children, 0)?;
                    Ok(self.clone().into())
                }

                no_expressions!(stringify!($node_name));

                fn output_columns(&self) -> Vec<Column> {
                    vec![]
                }
            }
        )*
    };
}

impl_transaction_statement!(
    StartTransaction,
    Commit,
    Rollback,
    CreateSavepoint,
    RollbackSavepoint,
    ReleaseSavepoint
);

impl fmt::Display for StartTransaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "StartTransaction")
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Commit")
    }
}

impl fmt::Display for Rollback {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rollback")
    }
}

impl fmt::Display for CreateSavepoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CreateSavepoint: {}", self.name)
    }
}

impl fmt::Display for RollbackSavepoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RollbackSavepoint: {}", self.name)
    }
}

impl fmt::Display for ReleaseSavepoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ReleaseSavepoint: {}", self.name)
    }
}

/// A stored procedure handler. The wrapped statement runs when `condition` is raised; the
/// analyzer treats the whole node as opaque.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct DeclareHandler {
    pub condition: String,
    pub statement: PlanRef,
}

impl PlanTreeNode for DeclareHandler {
    fn children(&self) -> Vec<PlanRef> {
        vec![self.statement.clone()]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode> {
        let statement = single_child("DeclareHandler", children)?;
        Ok(Self::new(self.condition.clone(), statement).into())
    }

    no_expressions!("DeclareHandler");

    fn output_columns(&self) -> Vec<Column> {
        vec![]
    }
}

impl fmt::Display for DeclareHandler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DeclareHandler: for {}", self.condition)
    }
}
