use arrow::datatypes::DataType;
use derive_new::new;
use sqlparser::ast::BinaryOperator;

use super::ExprRef;

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub op: BinaryOperator,
    pub left: ExprRef,
    pub right: ExprRef,
}

impl BinaryExpr {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self.op,
            BinaryOperator::Eq
                | BinaryOperator::NotEq
                | BinaryOperator::Lt
                | BinaryOperator::LtEq
                | BinaryOperator::Gt
                | BinaryOperator::GtEq
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self.op, BinaryOperator::And | BinaryOperator::Or)
    }

    pub fn data_type(&self) -> DataType {
        if self.is_comparison() || self.is_logical() {
            return DataType::Boolean;
        }
        let left = self.left.data_type();
        if left == DataType::Null {
            self.right.data_type()
        } else {
            left
        }
    }
}

/// Splits a predicate into its top-level `AND` operands.
pub fn split_conjunction(expr: &ExprRef) -> Vec<ExprRef> {
    match expr.as_ref() {
        super::Expression::BinaryExpr(e) if e.op == BinaryOperator::And => {
            let mut exprs = split_conjunction(&e.left);
            exprs.extend(split_conjunction(&e.right));
            exprs
        }
        _ => vec![expr.clone()],
    }
}

/// Joins predicates back with `AND`, returning `None` for an empty input.
pub fn conjunction(exprs: Vec<ExprRef>) -> Option<ExprRef> {
    exprs
        .into_iter()
        .reduce(|acc, e| super::Expression::binary(BinaryOperator::And, acc, e))
}
