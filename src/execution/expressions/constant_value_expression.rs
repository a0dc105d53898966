use crate::catalog::schema::Schema;
use crate::execution::expressions::abstract_expression::ExpressionOps;
use crate::storage::table::tuple::Tuple;
use crate::types_db::value::Value;

/// An expression evaluating to a fixed value regardless of input.
#[derive(Debug, Clone)]
pub struct ConstantValueExpression {
    value: Value,
}

impl ConstantValueExpression {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl ExpressionOps for ConstantValueExpression {
    fn evaluate(&self, _tuple: &Tuple, _schema: &Schema) -> Value {
        self.value.clone()
    }

    fn evaluate_join(
        &self,
        _left: &Tuple,
        _left_schema: &Schema,
        _right: &Tuple,
        _right_schema: &Schema,
    ) -> Value {
        self.value.clone()
    }

    fn evaluate_aggregate(&self, _group_bys: &[Value], _aggregates: &[Value]) -> Value {
        self.value.clone()
    }
}
