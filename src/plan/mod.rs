/// Implements `with_expressions` for nodes that carry no expressions.
macro_rules! no_expressions {
    ($node:expr) => {
        fn with_expressions(
            &self,
            exprs: Vec<$crate::expression::ExprRef>,
        ) -> $crate::analyzer::AnalyzerResult<$crate::plan::PlanNode> {
            $crate::analyzer::check_expression_number($node, &exprs, 0)?;
            Ok(self.clone().into())
        }
    };
}

mod aggregate;
mod ddl;
mod distinct;
mod exchange;
mod filter;
mod join;
mod limit;
mod process;
mod project;
mod sort;
mod table;
mod transaction;

use std::fmt::{self, Write};
use std::sync::Arc;

pub use aggregate::*;
pub use ddl::*;
pub use distinct::*;
use enum_dispatch::enum_dispatch;
pub use exchange::*;
pub use filter::*;
pub use join::*;
pub use limit::*;
pub use process::*;
pub use project::*;
pub use sort::*;
use strum_macros::{Display, EnumDiscriminants, IntoStaticStr};
pub use table::*;
pub use transaction::*;

use crate::analyzer::{check_children_number, AnalyzerResult};
use crate::catalog::Column;
use crate::expression::ExprRef;

/// The type of reference to a plan node. Nodes are immutable; a rewrite that changes nothing
/// hands back the same `Arc`.
pub type PlanRef = Arc<PlanNode>;

/// The tree contract every plan node implements. Used by the rewriters, which only see nodes
/// through their children and expressions.
#[enum_dispatch]
pub trait PlanTreeNode {
    /// Get the child plan nodes.
    fn children(&self) -> Vec<PlanRef>;

    /// Clone the node with new children. Fails when the number of children does not match the
    /// node's arity.
    fn with_children(&self, children: Vec<PlanRef>) -> AnalyzerResult<PlanNode>;

    /// Expressions owned by this node, not including those of its children.
    fn expressions(&self) -> Vec<ExprRef> {
        vec![]
    }

    fn with_expressions(&self, exprs: Vec<ExprRef>) -> AnalyzerResult<PlanNode>;

    /// The row shape produced by this node.
    fn output_columns(&self) -> Vec<Column>;

    /// Whether this node itself is resolved, regardless of its children and expressions.
    fn node_resolved(&self) -> bool {
        true
    }
}

#[enum_dispatch(PlanTreeNode)]
#[derive(Debug, Clone, PartialEq, Eq, EnumDiscriminants)]
#[strum_discriminants(name(PlanNodeType), derive(Display, IntoStaticStr, Hash))]
pub enum PlanNode {
    UnresolvedTable(UnresolvedTable),
    ResolvedTable(ResolvedTable),
    EmptyTable(EmptyTable),
    TableAlias(TableAlias),
    Filter(Filter),
    Project(Project),
    GroupBy(GroupBy),
    Window(Window),
    Limit(Limit),
    Offset(Offset),
    Sort(Sort),
    TopN(TopN),
    Distinct(Distinct),
    OrderedDistinct(OrderedDistinct),
    Join(Join),
    Exchange(Exchange),
    CreateIndex(CreateIndex),
    QueryProcess(QueryProcess),
    TransactionCommitting(TransactionCommitting),
    StartTransaction(StartTransaction),
    Commit(Commit),
    Rollback(Rollback),
    CreateSavepoint(CreateSavepoint),
    RollbackSavepoint(RollbackSavepoint),
    ReleaseSavepoint(ReleaseSavepoint),
    DeclareHandler(DeclareHandler),
}

impl PlanNode {
    pub fn node_type(&self) -> PlanNodeType {
        self.into()
    }

    pub fn name(&self) -> &'static str {
        self.node_type().into()
    }

    /// A plan is resolved when every node and every expression in it is resolved.
    pub fn resolved(&self) -> bool {
        self.node_resolved()
            && self.expressions().iter().all(|e| e.resolved())
            && self.children().iter().all(|c| c.resolved())
    }

    /// Statements that manage a transaction rather than read or write rows.
    pub fn is_transaction_statement(&self) -> bool {
        matches!(
            self,
            PlanNode::StartTransaction(_)
                | PlanNode::Commit(_)
                | PlanNode::Rollback(_)
                | PlanNode::CreateSavepoint(_)
                | PlanNode::RollbackSavepoint(_)
                | PlanNode::ReleaseSavepoint(_)
        )
    }

    pub fn explain(&self, level: usize, explain_result: &mut dyn Write) -> fmt::Result {
        writeln!(explain_result, "{}{}", " ".repeat(level * 2), self)?;
        for child in self.children() {
            child.explain(level + 1, explain_result)?;
        }
        Ok(())
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlanNode::UnresolvedTable(n) => write!(f, "{}", n),
            PlanNode::ResolvedTable(n) => write!(f, "{}", n),
            PlanNode::EmptyTable(n) => write!(f, "{}", n),
            PlanNode::TableAlias(n) => write!(f, "{}", n),
            PlanNode::Filter(n) => write!(f, "{}", n),
            PlanNode::Project(n) => write!(f, "{}", n),
            PlanNode::GroupBy(n) => write!(f, "{}", n),
            PlanNode::Window(n) => write!(f, "{}", n),
            PlanNode::Limit(n) => write!(f, "{}", n),
            PlanNode::Offset(n) => write!(f, "{}", n),
            PlanNode::Sort(n) => write!(f, "{}", n),
            PlanNode::TopN(n) => write!(f, "{}", n),
            PlanNode::Distinct(n) => write!(f, "{}", n),
            PlanNode::OrderedDistinct(n) => write!(f, "{}", n),
            PlanNode::Join(n) => write!(f, "{}", n),
            PlanNode::Exchange(n) => write!(f, "{}", n),
            PlanNode::CreateIndex(n) => write!(f, "{}", n),
            PlanNode::QueryProcess(n) => write!(f, "{}", n),
            PlanNode::TransactionCommitting(n) => write!(f, "{}", n),
            PlanNode::StartTransaction(n) => write!(f, "{}", n),
            PlanNode::Commit(n) => write!(f, "{}", n),
            PlanNode::Rollback(n) => write!(f, "{}", n),
            PlanNode::CreateSavepoint(n) => write!(f, "{}", n),
            PlanNode::RollbackSavepoint(n) => write!(f, "{}", n),
            PlanNode::ReleaseSavepoint(n) => write!(f, "{}", n),
            PlanNode::DeclareHandler(n) => write!(f, "{}", n),
        }
    }
}

/// Checks the arity of a single-child node and returns that child.
pub(crate) fn single_child(node: &str, children: Vec<PlanRef>) -> AnalyzerResult<PlanRef> {
    check_children_number(node, &children, 1)?;
    Ok(children[0].clone())
}

pub(crate) fn format_exprs(exprs: &[ExprRef]) -> String {
    exprs
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
