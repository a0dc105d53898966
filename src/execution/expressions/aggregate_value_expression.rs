use crate::catalog::schema::Schema;
use crate::execution::expressions::abstract_expression::ExpressionOps;
use crate::storage::table::tuple::Tuple;
use crate::types_db::value::Value;

/// Projects one term out of an aggregation result row: either a group-by
/// column or a computed aggregate, selected by `term_idx`.
#[derive(Debug, Clone)]
pub struct AggregateValueExpression {
    is_group_by_term: bool,
    term_idx: usize,
}

impl AggregateValueExpression {
    pub fn new(is_group_by_term: bool, term_idx: usize) -> Self {
        Self {
            is_group_by_term,
            term_idx,
        }
    }
}

impl ExpressionOps for AggregateValueExpression {
    fn evaluate(&self, _tuple: &Tuple, _schema: &Schema) -> Value {
        Value::null()
    }

    fn evaluate_join(
        &self,
        _left: &Tuple,
        _left_schema: &Schema,
        _right: &Tuple,
        _right_schema: &Schema,
    ) -> Value {
        Value::null()
    }

    fn evaluate_aggregate(&self, group_bys: &[Value], aggregates: &[Value]) -> Value {
        if self.is_group_by_term {
            group_bys[self.term_idx].clone()
        } else {
            aggregates[self.term_idx].clone()
        }
    }
}
