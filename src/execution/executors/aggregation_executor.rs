use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::schema::Schema;
use crate::common::exception::DBError;
use crate::common::rid::RID;
use crate::execution::executors::abstract_executor::AbstractExecutor;
use crate::execution::expressions::abstract_expression::{Expression, ExpressionOps};
use crate::execution::plans::aggregation_plan::{
    AggregateKey, AggregateValue, AggregationPlanNode, AggregationType,
};
use crate::storage::table::tuple::Tuple;
use crate::types_db::value::Value;

/// Hash table of running aggregates keyed by group.
///
/// `insert_combine` folds one input row into its group following SQL null
/// rules: `count(*)` counts every row, `count(col)`, `sum`, `min` and
/// `max` ignore null inputs, and an aggregate over only nulls stays null.
struct SimpleAggregationHashTable {
    map: HashMap<AggregateKey, AggregateValue>,
    agg_types: Vec<AggregationType>,
}

impl SimpleAggregationHashTable {
    fn new(agg_types: Vec<AggregationType>) -> Self {
        Self {
            map: HashMap::new(),
            agg_types,
        }
    }

    fn generate_initial_value(&self) -> AggregateValue {
        let aggregates = self
            .agg_types
            .iter()
            .map(|agg_type| match agg_type {
                AggregationType::CountStar => Value::new(0),
                _ => Value::null(),
            })
            .collect();
        AggregateValue { aggregates }
    }

    fn insert_combine(&mut self, key: AggregateKey, input: AggregateValue) {
        let initial = self.generate_initial_value();
        let entry = self.map.entry(key).or_insert(initial);
        for (i, agg_type) in self.agg_types.iter().enumerate() {
            let current = &entry.aggregates[i];
            let incoming = &input.aggregates[i];
            entry.aggregates[i] = match agg_type {
                AggregationType::CountStar => current.add(&Value::new(1)),
                AggregationType::Count => {
                    if incoming.is_null() {
                        current.clone()
                    } else if current.is_null() {
                        Value::new(1)
                    } else {
                        current.add(&Value::new(1))
                    }
                }
                AggregationType::Sum => {
                    if incoming.is_null() {
                        current.clone()
                    } else if current.is_null() {
                        incoming.clone()
                    } else {
                        current.add(incoming)
                    }
                }
                AggregationType::Min => current.min(incoming),
                AggregationType::Max => current.max(incoming),
            };
        }
    }

    fn into_entries(self) -> Vec<(AggregateKey, AggregateValue)> {
        self.map.into_iter().collect()
    }
}

/// Hash aggregation over a child executor.
///
/// The child is drained at `init`, building one `AggregateValue` per
/// group; `next` walks the groups, filters through the HAVING predicate
/// (always-true when the plan has none) and projects through the plan's
/// aggregate-value expressions.
pub struct AggregationExecutor {
    plan: Arc<AggregationPlanNode>,
    child: Box<dyn AbstractExecutor>,
    having: Arc<Expression>,
    entries: Vec<(AggregateKey, AggregateValue)>,
    cursor: usize,
}

impl AggregationExecutor {
    pub fn new(plan: Arc<AggregationPlanNode>, child: Box<dyn AbstractExecutor>) -> Self {
        let having = plan
            .get_having()
            .cloned()
            .unwrap_or_else(|| Arc::new(Expression::AlwaysTrue));
        Self {
            plan,
            child,
            having,
            entries: Vec::new(),
            cursor: 0,
        }
    }

    fn make_aggregate_key(&self, tuple: &Tuple) -> AggregateKey {
        AggregateKey {
            group_bys: self
                .plan
                .get_group_bys()
                .iter()
                .map(|expr| expr.evaluate(tuple, self.child.get_output_schema()))
                .collect(),
        }
    }

    fn make_aggregate_value(&self, tuple: &Tuple) -> AggregateValue {
        AggregateValue {
            aggregates: self
                .plan
                .get_aggregates()
                .iter()
                .map(|expr| expr.evaluate(tuple, self.child.get_output_schema()))
                .collect(),
        }
    }
}

impl AbstractExecutor for AggregationExecutor {
    fn init(&mut self) {
        self.child.init();
        let mut table =
            SimpleAggregationHashTable::new(self.plan.get_aggregate_types().to_vec());

        while let Ok(Some((tuple, _))) = self.child.next() {
            let key = self.make_aggregate_key(&tuple);
            let value = self.make_aggregate_value(&tuple);
            table.insert_combine(key, value);
        }

        self.entries = table.into_entries();
        self.cursor = 0;
    }

    fn next(&mut self) -> Result<Option<(Tuple, RID)>, DBError> {
        while self.cursor < self.entries.len() {
            let (key, value) = &self.entries[self.cursor];
            self.cursor += 1;

            let accepted = self
                .having
                .evaluate_aggregate(&key.group_bys, &value.aggregates);
            if !accepted.as_bool() {
                continue;
            }

            let values = self
                .plan
                .get_output_exprs()
                .iter()
                .map(|expr| expr.evaluate_aggregate(&key.group_bys, &value.aggregates))
                .collect();
            let out = Tuple::new(values);
            let rid = out.get_rid();
            return Ok(Some((out, rid)));
        }
        Ok(None)
    }

    fn get_output_schema(&self) -> &Schema {
        self.plan.get_output_schema()
    }
}
