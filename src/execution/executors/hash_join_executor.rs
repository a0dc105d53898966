use std::collections::HashMap;
use std::sync::Arc;

use log::trace;

use crate::catalog::schema::Schema;
use crate::common::exception::DBError;
use crate::common::rid::RID;
use crate::execution::executors::abstract_executor::AbstractExecutor;
use crate::execution::expressions::abstract_expression::ExpressionOps;
use crate::execution::plans::hash_join_plan::HashJoinPlanNode;
use crate::storage::table::tuple::Tuple;
use crate::types_db::value::Value;

/// Join key: the evaluated join-key expression of one side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HashJoinKey {
    key: Value,
}

/// In-memory hash join.
///
/// `init` drains the left child into a multimap from join key to the full
/// value vectors of matching left tuples. `next` advances through the
/// right child; each right tuple's bucket is walked entry by entry across
/// successive calls through a bucket cursor, emitting one joined tuple per
/// left match in the order right tuples are drained.
pub struct HashJoinExecutor {
    plan: Arc<HashJoinPlanNode>,
    left: Box<dyn AbstractExecutor>,
    right: Box<dyn AbstractExecutor>,
    hash_table: HashMap<HashJoinKey, Vec<Vec<Value>>>,
    current_bucket: Vec<Vec<Value>>,
    bucket_idx: usize,
    right_tuple: Option<Tuple>,
}

impl HashJoinExecutor {
    pub fn new(
        plan: Arc<HashJoinPlanNode>,
        left: Box<dyn AbstractExecutor>,
        right: Box<dyn AbstractExecutor>,
    ) -> Self {
        Self {
            plan,
            left,
            right,
            hash_table: HashMap::new(),
            current_bucket: Vec::new(),
            bucket_idx: 0,
            right_tuple: None,
        }
    }
}

impl AbstractExecutor for HashJoinExecutor {
    fn init(&mut self) {
        self.left.init();
        self.right.init();
        self.hash_table.clear();
        self.current_bucket.clear();
        self.bucket_idx = 0;
        self.right_tuple = None;

        // Build phase: hash every left tuple by its join key.
        while let Ok(Some((tuple, _))) = self.left.next() {
            let key = HashJoinKey {
                key: self
                    .plan
                    .get_left_join_key_expression()
                    .evaluate(&tuple, self.left.get_output_schema()),
            };
            self.hash_table
                .entry(key)
                .or_default()
                .push(tuple.get_values().to_vec());
        }
        trace!("hash join built {} buckets", self.hash_table.len());
    }

    fn next(&mut self) -> Result<Option<(Tuple, RID)>, DBError> {
        if self.bucket_idx >= self.current_bucket.len() {
            // Probe phase: pull right tuples until one lands in a
            // non-empty bucket.
            loop {
                let Some((tuple, _)) = self.right.next()? else {
                    return Ok(None);
                };
                let key = HashJoinKey {
                    key: self
                        .plan
                        .get_right_join_key_expression()
                        .evaluate(&tuple, self.right.get_output_schema()),
                };
                if let Some(bucket) = self.hash_table.get(&key) {
                    self.current_bucket = bucket.clone();
                    self.bucket_idx = 0;
                    self.right_tuple = Some(tuple);
                    break;
                }
            }
        }

        let left_tuple = Tuple::new(self.current_bucket[self.bucket_idx].clone());
        self.bucket_idx += 1;
        let right_tuple = self.right_tuple.as_ref().unwrap();

        let values = self
            .plan
            .get_output_exprs()
            .iter()
            .map(|expr| {
                expr.evaluate_join(
                    &left_tuple,
                    self.left.get_output_schema(),
                    right_tuple,
                    self.right.get_output_schema(),
                )
            })
            .collect();
        let out = Tuple::new(values);
        let rid = out.get_rid();
        Ok(Some((out, rid)))
    }

    fn get_output_schema(&self) -> &Schema {
        self.plan.get_output_schema()
    }
}
