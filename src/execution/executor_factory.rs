use std::sync::Arc;

use crate::execution::executor_context::ExecutorContext;
use crate::execution::executors::abstract_executor::AbstractExecutor;
use crate::execution::executors::aggregation_executor::AggregationExecutor;
use crate::execution::executors::delete_executor::DeleteExecutor;
use crate::execution::executors::distinct_executor::DistinctExecutor;
use crate::execution::executors::hash_join_executor::HashJoinExecutor;
use crate::execution::executors::insert_executor::InsertExecutor;
use crate::execution::executors::nested_loop_join_executor::NestedLoopJoinExecutor;
use crate::execution::executors::seq_scan_executor::SeqScanExecutor;
use crate::execution::executors::update_executor::UpdateExecutor;
use crate::execution::plans::abstract_plan::PlanNode;

/// Builds the executor tree for a plan tree. Dispatch is a closed match
/// over the operator set; executors own their children.
pub struct ExecutorFactory;

impl ExecutorFactory {
    pub fn create_executor(
        context: Arc<ExecutorContext>,
        plan: &PlanNode,
    ) -> Box<dyn AbstractExecutor> {
        match plan {
            PlanNode::SeqScan(p) => {
                Box::new(SeqScanExecutor::new(context, Arc::clone(p)))
            }
            PlanNode::Insert(p) => {
                let child = p
                    .get_child_plan()
                    .map(|c| Self::create_executor(Arc::clone(&context), c.as_ref()));
                Box::new(InsertExecutor::new(context, Arc::clone(p), child))
            }
            PlanNode::Update(p) => {
                let child = Self::create_executor(Arc::clone(&context), p.get_child_plan().as_ref());
                Box::new(UpdateExecutor::new(context, Arc::clone(p), child))
            }
            PlanNode::Delete(p) => {
                let child = Self::create_executor(Arc::clone(&context), p.get_child_plan().as_ref());
                Box::new(DeleteExecutor::new(context, Arc::clone(p), child))
            }
            PlanNode::NestedLoopJoin(p) => {
                let left = Self::create_executor(Arc::clone(&context), p.get_left_plan().as_ref());
                let right = Self::create_executor(Arc::clone(&context), p.get_right_plan().as_ref());
                Box::new(NestedLoopJoinExecutor::new(Arc::clone(p), left, right))
            }
            PlanNode::HashJoin(p) => {
                let left = Self::create_executor(Arc::clone(&context), p.get_left_plan().as_ref());
                let right = Self::create_executor(Arc::clone(&context), p.get_right_plan().as_ref());
                Box::new(HashJoinExecutor::new(Arc::clone(p), left, right))
            }
            PlanNode::Aggregation(p) => {
                let child = Self::create_executor(Arc::clone(&context), p.get_child_plan().as_ref());
                Box::new(AggregationExecutor::new(Arc::clone(p), child))
            }
            PlanNode::Distinct(p) => {
                let child = Self::create_executor(Arc::clone(&context), p.get_child_plan().as_ref());
                Box::new(DistinctExecutor::new(Arc::clone(p), child))
            }
        }
    }
}
