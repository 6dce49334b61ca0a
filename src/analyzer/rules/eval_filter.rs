use std::cmp::Ordering;
use std::sync::Arc;

use sqlparser::ast::BinaryOperator;

use crate::analyzer::{Analyzer, AnalyzerResult, Context, Rule, RuleId, RuleSelector, Scope};
use crate::expression::{BinaryExpr, ExprRef, Expression};
use crate::plan::{EmptyTable, Filter, PlanNode, PlanRef, PlanTreeNode};
use crate::transform::{transform_expr_up, transform_up, Transformed};
use crate::types::ScalarValue;

/// Folds constant predicates of filters. A filter that is always true is replaced by its child,
/// one that is never true by an empty table.
#[derive(Clone)]
pub struct EvalFilter;

impl EvalFilter {
    fn compare(op: &BinaryOperator, left: &ScalarValue, right: &ScalarValue) -> Option<ScalarValue> {
        if left.is_null() || right.is_null() {
            return Some(ScalarValue::Boolean(None));
        }
        let ordering = match (left.as_i128(), right.as_i128()) {
            (Some(l), Some(r)) => l.cmp(&r),
            _ => match (left, right) {
                (ScalarValue::String(Some(l)), ScalarValue::String(Some(r))) => l.cmp(r),
                (ScalarValue::Float64(Some(l)), ScalarValue::Float64(Some(r))) => l.cmp(r),
                (ScalarValue::Boolean(Some(l)), ScalarValue::Boolean(Some(r))) => l.cmp(r),
                _ => return None,
            },
        };
        let result = match op {
            BinaryOperator::Eq => ordering == Ordering::Equal,
            BinaryOperator::NotEq => ordering != Ordering::Equal,
            BinaryOperator::Lt => ordering == Ordering::Less,
            BinaryOperator::LtEq => ordering != Ordering::Greater,
            BinaryOperator::Gt => ordering == Ordering::Greater,
            BinaryOperator::GtEq => ordering != Ordering::Less,
            _ => return None,
        };
        Some(ScalarValue::Boolean(Some(result)))
    }

    /// `AND`/`OR` with at least one literal operand. NULL operands are left alone.
    fn fold_logical(expr: &BinaryExpr) -> Option<ExprRef> {
        let left = expr.left.as_literal().and_then(|v| v.as_bool());
        let right = expr.right.as_literal().and_then(|v| v.as_bool());
        match (&expr.op, left, right) {
            (BinaryOperator::And, Some(false), _) | (BinaryOperator::And, _, Some(false)) => {
                Some(Expression::literal(false))
            }
            (BinaryOperator::Or, Some(true), _) | (BinaryOperator::Or, _, Some(true)) => {
                Some(Expression::literal(true))
            }
            (BinaryOperator::And, Some(true), _) | (BinaryOperator::Or, Some(false), _) => {
                Some(expr.right.clone())
            }
            (BinaryOperator::And, _, Some(true)) | (BinaryOperator::Or, _, Some(false)) => {
                Some(expr.left.clone())
            }
            _ => None,
        }
    }

    fn fold(expr: &ExprRef) -> AnalyzerResult<Transformed<ExprRef>> {
        let binary = match expr.as_ref() {
            Expression::BinaryExpr(b) => b,
            _ => return Ok(Transformed::no(expr.clone())),
        };
        let folded = if binary.is_logical() {
            Self::fold_logical(binary)
        } else {
            match (binary.left.as_literal(), binary.right.as_literal()) {
                (Some(l), Some(r)) => Self::compare(&binary.op, l, r)
                    .map(|v| Arc::new(Expression::Literal(v))),
                _ => None,
            }
        };
        Ok(match folded {
            Some(e) => Transformed::yes(e),
            None => Transformed::no(expr.clone()),
        })
    }

    fn eval(filter: &Filter) -> AnalyzerResult<Option<PlanRef>> {
        let predicate = transform_expr_up(&filter.predicate, &mut Self::fold)?;
        let node: PlanRef = match predicate.data.as_literal() {
            Some(v) if v.as_bool() == Some(true) => filter.child.clone(),
            Some(v) if v.is_null() || v.as_bool() == Some(false) => {
                Arc::new(EmptyTable::new(filter.child.output_columns()).into())
            }
            _ if predicate.changed => {
                Arc::new(Filter::new(predicate.data, filter.child.clone()).into())
            }
            _ => return Ok(None),
        };
        Ok(Some(node))
    }
}

impl Rule for EvalFilter {
    fn id(&self) -> RuleId {
        RuleId::EvalFilter
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
            if let PlanNode::Filter(filter) = node.as_ref() {
                if let Some(evaluated) = Self::eval(filter)? {
                    return Ok(Transformed::yes(evaluated));
                }
            }
            Ok(Transformed::no(node.clone()))
        })
    }
}
