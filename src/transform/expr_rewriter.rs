use std::sync::Arc;

use super::Transformed;
use crate::analyzer::AnalyzerResult;
use crate::expression::ExprRef;

/// Rewrites an expression tree bottom-up. Nested subquery plans are not entered; rules that need
/// them match `Expression::Subquery` themselves.
pub fn transform_expr_up<F>(expr: &ExprRef, f: &mut F) -> AnalyzerResult<Transformed<ExprRef>>
where
    F: FnMut(&ExprRef) -> AnalyzerResult<Transformed<ExprRef>>,
{
    let children = expr.children();
    let mut changed = false;
    let mut new_children = Vec::with_capacity(children.len());
    for child in children.iter() {
        let result = transform_expr_up(child, f)?;
        changed |= result.changed || !Arc::ptr_eq(child, &result.data);
        new_children.push(result.data);
    }

    let node = if changed {
        expr.with_children(new_children)?
    } else {
        expr.clone()
    };

    let result = f(&node)?;
    Ok(Transformed::new(result.data, changed || result.changed))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sqlparser::ast::BinaryOperator;

    use super::*;
    use crate::expression::Expression;
    use crate::types::ScalarValue;

    fn bump_literals(e: &ExprRef) -> AnalyzerResult<Transformed<ExprRef>> {
        match e.as_literal() {
            Some(ScalarValue::Int64(Some(v))) => Ok(Transformed::yes(Expression::literal(v + 1))),
            _ => Ok(Transformed::no(e.clone())),
        }
    }

    #[test]
    fn test_transform_expr_up_rebuilds_changed_path() {
        let untouched = Expression::column("a");
        let expr = Expression::binary(
            BinaryOperator::Plus,
            untouched.clone(),
            Expression::literal(1_i64),
        );
        let result = transform_expr_up(&expr, &mut bump_literals).unwrap();
        assert!(result.changed);
        assert_eq!(result.data.to_string(), "(a + 2)");
        assert!(Arc::ptr_eq(&result.data.children()[0], &untouched));
    }

    #[test]
    fn test_transform_expr_up_unchanged_keeps_reference() {
        let expr = Expression::binary(
            BinaryOperator::And,
            Expression::column("a"),
            Expression::column("b"),
        );
        let result = transform_expr_up(&expr, &mut bump_literals).unwrap();
        assert!(!result.changed);
        assert!(Arc::ptr_eq(&result.data, &expr));
    }
}
