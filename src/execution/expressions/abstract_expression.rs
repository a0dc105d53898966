use crate::catalog::schema::Schema;
use crate::execution::expressions::aggregate_value_expression::AggregateValueExpression;
use crate::execution::expressions::column_value_expression::ColumnValueExpression;
use crate::execution::expressions::comparison_expression::ComparisonExpression;
use crate::execution::expressions::constant_value_expression::ConstantValueExpression;
use crate::storage::table::tuple::Tuple;
use crate::types_db::value::Value;

/// Evaluation capabilities every expression supports. Each form of
/// evaluation matches one executor context: single-tuple predicates,
/// two-sided join predicates, and aggregate projection.
pub trait ExpressionOps {
    fn evaluate(&self, tuple: &Tuple, schema: &Schema) -> Value;

    fn evaluate_join(
        &self,
        left: &Tuple,
        left_schema: &Schema,
        right: &Tuple,
        right_schema: &Schema,
    ) -> Value;

    fn evaluate_aggregate(&self, group_bys: &[Value], aggregates: &[Value]) -> Value;
}

/// The closed set of expression forms the executors evaluate.
///
/// A plan node with no predicate gets the explicit `AlwaysTrue` variant
/// substituted by its executor, rather than an allocated constant-true
/// expression; semantically it always accepts.
#[derive(Debug, Clone)]
pub enum Expression {
    Constant(ConstantValueExpression),
    ColumnValue(ColumnValueExpression),
    Comparison(ComparisonExpression),
    AggregateValue(AggregateValueExpression),
    AlwaysTrue,
}

impl ExpressionOps for Expression {
    fn evaluate(&self, tuple: &Tuple, schema: &Schema) -> Value {
        match self {
            Expression::Constant(e) => e.evaluate(tuple, schema),
            Expression::ColumnValue(e) => e.evaluate(tuple, schema),
            Expression::Comparison(e) => e.evaluate(tuple, schema),
            Expression::AggregateValue(_) => Value::null(),
            Expression::AlwaysTrue => Value::new(true),
        }
    }

    fn evaluate_join(
        &self,
        left: &Tuple,
        left_schema: &Schema,
        right: &Tuple,
        right_schema: &Schema,
    ) -> Value {
        match self {
            Expression::Constant(e) => e.evaluate_join(left, left_schema, right, right_schema),
            Expression::ColumnValue(e) => e.evaluate_join(left, left_schema, right, right_schema),
            Expression::Comparison(e) => e.evaluate_join(left, left_schema, right, right_schema),
            Expression::AggregateValue(_) => Value::null(),
            Expression::AlwaysTrue => Value::new(true),
        }
    }

    fn evaluate_aggregate(&self, group_bys: &[Value], aggregates: &[Value]) -> Value {
        match self {
            Expression::Constant(e) => e.evaluate_aggregate(group_bys, aggregates),
            Expression::AggregateValue(e) => e.evaluate_aggregate(group_bys, aggregates),
            Expression::Comparison(e) => e.evaluate_aggregate(group_bys, aggregates),
            Expression::ColumnValue(_) => Value::null(),
            Expression::AlwaysTrue => Value::new(true),
        }
    }
}
