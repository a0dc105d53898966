use std::sync::Arc;

use crate::catalog::schema::Schema;
use crate::common::exception::DBError;
use crate::common::rid::RID;
use crate::execution::executors::abstract_executor::AbstractExecutor;
use crate::execution::expressions::abstract_expression::{Expression, ExpressionOps};
use crate::execution::plans::nested_loop_join_plan::NestedLoopJoinPlanNode;
use crate::storage::table::tuple::Tuple;

/// Classic two-loop join: for each outer tuple the inner child is
/// re-initialized and scanned in full. Matches are projected through the
/// plan's output expressions, which address the pair as tuple 0 (left)
/// and tuple 1 (right).
pub struct NestedLoopJoinExecutor {
    plan: Arc<NestedLoopJoinPlanNode>,
    left: Box<dyn AbstractExecutor>,
    right: Box<dyn AbstractExecutor>,
    predicate: Arc<Expression>,
    left_tuple: Option<Tuple>,
}

impl NestedLoopJoinExecutor {
    pub fn new(
        plan: Arc<NestedLoopJoinPlanNode>,
        left: Box<dyn AbstractExecutor>,
        right: Box<dyn AbstractExecutor>,
    ) -> Self {
        let predicate = plan
            .get_predicate()
            .cloned()
            .unwrap_or_else(|| Arc::new(Expression::AlwaysTrue));
        Self {
            plan,
            left,
            right,
            predicate,
            left_tuple: None,
        }
    }
}

impl AbstractExecutor for NestedLoopJoinExecutor {
    fn init(&mut self) {
        self.left.init();
        self.right.init();
        self.left_tuple = None;
    }

    fn next(&mut self) -> Result<Option<(Tuple, RID)>, DBError> {
        if self.left_tuple.is_none() {
            match self.left.next()? {
                Some((tuple, _)) => self.left_tuple = Some(tuple),
                // The outer side is empty.
                None => return Ok(None),
            }
        }

        loop {
            let right_tuple = match self.right.next()? {
                Some((tuple, _)) => tuple,
                None => {
                    // Inner exhausted: advance the outer and rescan.
                    match self.left.next()? {
                        Some((tuple, _)) => self.left_tuple = Some(tuple),
                        None => return Ok(None),
                    }
                    self.right.init();
                    continue;
                }
            };

            let left_tuple = self.left_tuple.as_ref().unwrap();
            let matched = self.predicate.evaluate_join(
                left_tuple,
                self.left.get_output_schema(),
                &right_tuple,
                self.right.get_output_schema(),
            );
            if !matched.as_bool() {
                continue;
            }

            let values = self
                .plan
                .get_output_exprs()
                .iter()
                .map(|expr| {
                    expr.evaluate_join(
                        left_tuple,
                        self.left.get_output_schema(),
                        &right_tuple,
                        self.right.get_output_schema(),
                    )
                })
                .collect();
            let out = Tuple::new(values);
            let rid = out.get_rid();
            return Ok(Some((out, rid)));
        }
    }

    fn get_output_schema(&self) -> &Schema {
        self.plan.get_output_schema()
    }
}
