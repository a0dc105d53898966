use std::sync::Arc;

use crate::catalog::schema::Schema;
use crate::execution::expressions::abstract_expression::Expression;
use crate::execution::plans::abstract_plan::PlanNode;
use crate::types_db::value::Value;

/// The aggregate functions the hash aggregation supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationType {
    CountStar,
    Count,
    Sum,
    Min,
    Max,
}

/// A group's identity: the evaluated group-by expressions, in order. When
/// the plan has no group-bys a single empty key aggregates all input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregateKey {
    pub group_bys: Vec<Value>,
}

/// A group's running aggregates, one slot per aggregate expression.
#[derive(Debug, Clone)]
pub struct AggregateValue {
    pub aggregates: Vec<Value>,
}

/// Hash aggregation over a child plan with optional grouping and HAVING.
#[derive(Debug)]
pub struct AggregationPlanNode {
    output_schema: Schema,
    child: Arc<PlanNode>,
    group_bys: Vec<Arc<Expression>>,
    aggregates: Vec<Arc<Expression>>,
    agg_types: Vec<AggregationType>,
    having: Option<Arc<Expression>>,
    output_exprs: Vec<Arc<Expression>>,
}

impl AggregationPlanNode {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        output_schema: Schema,
        child: Arc<PlanNode>,
        group_bys: Vec<Arc<Expression>>,
        aggregates: Vec<Arc<Expression>>,
        agg_types: Vec<AggregationType>,
        having: Option<Arc<Expression>>,
        output_exprs: Vec<Arc<Expression>>,
    ) -> Self {
        assert_eq!(aggregates.len(), agg_types.len());
        Self {
            output_schema,
            child,
            group_bys,
            aggregates,
            agg_types,
            having,
            output_exprs,
        }
    }

    pub fn get_output_schema(&self) -> &Schema {
        &self.output_schema
    }

    pub fn get_child_plan(&self) -> &Arc<PlanNode> {
        &self.child
    }

    pub fn get_group_bys(&self) -> &[Arc<Expression>] {
        &self.group_bys
    }

    pub fn get_aggregates(&self) -> &[Arc<Expression>] {
        &self.aggregates
    }

    pub fn get_aggregate_types(&self) -> &[AggregationType] {
        &self.agg_types
    }

    pub fn get_having(&self) -> Option<&Arc<Expression>> {
        self.having.as_ref()
    }

    pub fn get_output_exprs(&self) -> &[Arc<Expression>] {
        &self.output_exprs
    }
}
