use std::sync::Arc;

use crate::catalog::schema::Schema;
use crate::execution::expressions::abstract_expression::{Expression, ExpressionOps};
use crate::storage::table::tuple::Tuple;
use crate::types_db::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonType {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

/// Compares two child expressions, producing a boolean value. A comparison
/// involving null is not true, per SQL three-valued logic collapsed to the
/// accept/reject decision executors make.
#[derive(Debug, Clone)]
pub struct ComparisonExpression {
    left: Arc<Expression>,
    right: Arc<Expression>,
    comp_type: ComparisonType,
}

impl ComparisonExpression {
    pub fn new(left: Arc<Expression>, right: Arc<Expression>, comp_type: ComparisonType) -> Self {
        Self {
            left,
            right,
            comp_type,
        }
    }

    fn compare(&self, lhs: &Value, rhs: &Value) -> Value {
        let result = match self.comp_type {
            ComparisonType::Equal => lhs.compare_equals(rhs),
            ComparisonType::NotEqual => {
                lhs.compare(rhs).is_some() && !lhs.compare_equals(rhs)
            }
            ComparisonType::LessThan => lhs.compare_less_than(rhs),
            ComparisonType::LessThanOrEqual => {
                lhs.compare_less_than(rhs) || lhs.compare_equals(rhs)
            }
            ComparisonType::GreaterThan => lhs.compare_greater_than(rhs),
            ComparisonType::GreaterThanOrEqual => {
                lhs.compare_greater_than(rhs) || lhs.compare_equals(rhs)
            }
        };
        Value::new(result)
    }
}

impl ExpressionOps for ComparisonExpression {
    fn evaluate(&self, tuple: &Tuple, schema: &Schema) -> Value {
        let lhs = self.left.evaluate(tuple, schema);
        let rhs = self.right.evaluate(tuple, schema);
        self.compare(&lhs, &rhs)
    }

    fn evaluate_join(
        &self,
        left: &Tuple,
        left_schema: &Schema,
        right: &Tuple,
        right_schema: &Schema,
    ) -> Value {
        let lhs = self.left.evaluate_join(left, left_schema, right, right_schema);
        let rhs = self.right.evaluate_join(left, left_schema, right, right_schema);
        self.compare(&lhs, &rhs)
    }

    fn evaluate_aggregate(&self, group_bys: &[Value], aggregates: &[Value]) -> Value {
        let lhs = self.left.evaluate_aggregate(group_bys, aggregates);
        let rhs = self.right.evaluate_aggregate(group_bys, aggregates);
        self.compare(&lhs, &rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::expressions::column_value_expression::ColumnValueExpression;
    use crate::execution::expressions::constant_value_expression::ConstantValueExpression;

    fn col(idx: usize) -> Arc<Expression> {
        Arc::new(Expression::ColumnValue(ColumnValueExpression::new(0, idx)))
    }

    fn constant(v: Value) -> Arc<Expression> {
        Arc::new(Expression::Constant(ConstantValueExpression::new(v)))
    }

    #[test]
    fn test_comparisons_on_tuples() {
        let schema = Schema::default();
        let tuple = Tuple::new(vec![Value::new(5)]);

        let eq = ComparisonExpression::new(col(0), constant(Value::new(5)), ComparisonType::Equal);
        assert!(eq.evaluate(&tuple, &schema).as_bool());

        let lt =
            ComparisonExpression::new(col(0), constant(Value::new(3)), ComparisonType::LessThan);
        assert!(!lt.evaluate(&tuple, &schema).as_bool());

        let ge = ComparisonExpression::new(
            col(0),
            constant(Value::new(5)),
            ComparisonType::GreaterThanOrEqual,
        );
        assert!(ge.evaluate(&tuple, &schema).as_bool());
    }

    #[test]
    fn test_null_comparison_rejects() {
        let schema = Schema::default();
        let tuple = Tuple::new(vec![Value::null()]);
        let eq = ComparisonExpression::new(col(0), constant(Value::new(5)), ComparisonType::Equal);
        assert!(!eq.evaluate(&tuple, &schema).as_bool());
        let ne =
            ComparisonExpression::new(col(0), constant(Value::new(5)), ComparisonType::NotEqual);
        assert!(!ne.evaluate(&tuple, &schema).as_bool());
    }
}
