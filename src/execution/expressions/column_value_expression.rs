use crate::catalog::schema::Schema;
use crate::execution::expressions::abstract_expression::ExpressionOps;
use crate::storage::table::tuple::Tuple;
use crate::types_db::value::Value;

/// References one column of an input tuple. In join contexts `tuple_idx`
/// selects the side: 0 for the left child, 1 for the right.
#[derive(Debug, Clone)]
pub struct ColumnValueExpression {
    tuple_idx: usize,
    col_idx: usize,
}

impl ColumnValueExpression {
    pub fn new(tuple_idx: usize, col_idx: usize) -> Self {
        Self { tuple_idx, col_idx }
    }

    pub fn get_tuple_idx(&self) -> usize {
        self.tuple_idx
    }

    pub fn get_col_idx(&self) -> usize {
        self.col_idx
    }
}

impl ExpressionOps for ColumnValueExpression {
    fn evaluate(&self, tuple: &Tuple, _schema: &Schema) -> Value {
        tuple.get_value(self.col_idx).clone()
    }

    fn evaluate_join(
        &self,
        left: &Tuple,
        _left_schema: &Schema,
        right: &Tuple,
        _right_schema: &Schema,
    ) -> Value {
        if self.tuple_idx == 0 {
            left.get_value(self.col_idx).clone()
        } else {
            right.get_value(self.col_idx).clone()
        }
    }

    fn evaluate_aggregate(&self, _group_bys: &[Value], _aggregates: &[Value]) -> Value {
        Value::null()
    }
}
