mod binary_op;
mod subquery;

use std::fmt;
use std::sync::Arc;

use arrow::datatypes::DataType;
pub use binary_op::*;
use derive_new::new;
use sqlparser::ast::BinaryOperator;
pub use subquery::*;

use crate::analyzer::{check_children_number, AnalyzerResult};
use crate::catalog::Column;
use crate::types::ScalarValue;

/// The type of reference to an expression. Unchanged expressions are shared, so rewrites can
/// detect "nothing happened" with `Arc::ptr_eq`.
pub type ExprRef = Arc<Expression>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Literal(ScalarValue),
    UnresolvedColumn(UnresolvedColumn),
    GetField(GetField),
    BinaryExpr(BinaryExpr),
    Alias(Alias),
    WindowFunction(WindowFunction),
    Subquery(Subquery),
}

/// A column reference as written in the query, before it is bound to an input row position.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedColumn {
    pub table: Option<String>,
    pub name: String,
}

/// A column bound to a position of the input row.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct GetField {
    pub index: usize,
    pub table: String,
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl GetField {
    pub fn from_column(index: usize, column: &Column) -> Self {
        Self {
            index,
            table: column.table.clone(),
            name: column.name.clone(),
            data_type: column.data_type.clone(),
            nullable: column.nullable,
        }
    }
}

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub child: ExprRef,
    pub name: String,
}

/// Ranking functions evaluated over a window, e.g. `row_number()`.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct WindowFunction {
    pub name: String,
    pub args: Vec<ExprRef>,
}

impl Expression {
    pub fn literal(value: impl Into<ScalarValue>) -> ExprRef {
        Arc::new(Expression::Literal(value.into()))
    }

    pub fn column(name: &str) -> ExprRef {
        Arc::new(Expression::UnresolvedColumn(UnresolvedColumn::new(
            None,
            name.to_string(),
        )))
    }

    pub fn qualified_column(table: &str, name: &str) -> ExprRef {
        Arc::new(Expression::UnresolvedColumn(UnresolvedColumn::new(
            Some(table.to_string()),
            name.to_string(),
        )))
    }

    pub fn binary(op: BinaryOperator, left: ExprRef, right: ExprRef) -> ExprRef {
        Arc::new(Expression::BinaryExpr(BinaryExpr::new(op, left, right)))
    }

    pub fn alias(child: ExprRef, name: &str) -> ExprRef {
        Arc::new(Expression::Alias(Alias::new(child, name.to_string())))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Literal(_) => "Literal",
            Expression::UnresolvedColumn(_) => "UnresolvedColumn",
            Expression::GetField(_) => "GetField",
            Expression::BinaryExpr(_) => "BinaryExpr",
            Expression::Alias(_) => "Alias",
            Expression::WindowFunction(_) => "WindowFunction",
            Expression::Subquery(_) => "Subquery",
        }
    }

    /// Subquery plans are not expression children: they are reached through the subquery
    /// itself.
    pub fn children(&self) -> Vec<ExprRef> {
        match self {
            Expression::Literal(_)
            | Expression::UnresolvedColumn(_)
            | Expression::GetField(_)
            | Expression::Subquery(_) => vec![],
            Expression::BinaryExpr(e) => vec![e.left.clone(), e.right.clone()],
            Expression::Alias(e) => vec![e.child.clone()],
            Expression::WindowFunction(e) => e.args.clone(),
        }
    }

    pub fn with_children(&self, children: Vec<ExprRef>) -> AnalyzerResult<ExprRef> {
        let expected = match self {
            Expression::WindowFunction(e) => e.args.len(),
            _ => self.children().len(),
        };
        check_children_number(self.kind(), &children, expected)?;

        let new_expr = match self {
            Expression::Literal(_)
            | Expression::UnresolvedColumn(_)
            | Expression::GetField(_)
            | Expression::Subquery(_) => self.clone(),
            Expression::BinaryExpr(e) => Expression::BinaryExpr(BinaryExpr::new(
                e.op.clone(),
                children[0].clone(),
                children[1].clone(),
            )),
            Expression::Alias(e) => {
                Expression::Alias(Alias::new(children[0].clone(), e.name.clone()))
            }
            Expression::WindowFunction(e) => {
                Expression::WindowFunction(WindowFunction::new(e.name.clone(), children))
            }
        };
        Ok(Arc::new(new_expr))
    }

    pub fn resolved(&self) -> bool {
        match self {
            Expression::UnresolvedColumn(_) => false,
            Expression::Subquery(sq) => sq.resolved(),
            _ => self.children().iter().all(|c| c.resolved()),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Expression::Literal(v) => v.data_type(),
            Expression::UnresolvedColumn(_) => DataType::Null,
            Expression::GetField(e) => e.data_type.clone(),
            Expression::BinaryExpr(e) => e.data_type(),
            Expression::Alias(e) => e.child.data_type(),
            Expression::WindowFunction(_) => DataType::Int64,
            Expression::Subquery(sq) => sq.data_type(),
        }
    }

    pub fn nullable(&self) -> bool {
        match self {
            Expression::Literal(v) => v.is_null(),
            Expression::GetField(e) => e.nullable,
            Expression::WindowFunction(_) => false,
            Expression::Alias(e) => e.child.nullable(),
            _ => true,
        }
    }

    /// The column name this expression produces when projected.
    pub fn name(&self) -> String {
        match self {
            Expression::Alias(e) => e.name.clone(),
            Expression::GetField(e) => e.name.clone(),
            Expression::UnresolvedColumn(e) => e.name.clone(),
            _ => self.to_string(),
        }
    }

    pub fn as_literal(&self) -> Option<&ScalarValue> {
        match self {
            Expression::Literal(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Literal(v) => write!(f, "{}", v),
            Expression::UnresolvedColumn(e) => match &e.table {
                Some(table) => write!(f, "{}.{}", table, e.name),
                None => write!(f, "{}", e.name),
            },
            Expression::GetField(e) => write!(f, "{}.{}", e.table, e.name),
            Expression::BinaryExpr(e) => write!(f, "({} {} {})", e.left, e.op, e.right),
            Expression::Alias(e) => write!(f, "{} as {}", e.child, e.name),
            Expression::WindowFunction(e) => {
                let args = e
                    .args
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}({})", e.name, args)
            }
            Expression::Subquery(sq) => write!(f, "(subquery: {})", sq.query_string),
        }
    }
}
