use std::sync::Arc;

use crate::catalog::schema::Schema;
use crate::execution::plans::aggregation_plan::AggregationPlanNode;
use crate::execution::plans::delete_plan::DeletePlanNode;
use crate::execution::plans::distinct_plan::DistinctPlanNode;
use crate::execution::plans::hash_join_plan::HashJoinPlanNode;
use crate::execution::plans::insert_plan::InsertPlanNode;
use crate::execution::plans::nested_loop_join_plan::NestedLoopJoinPlanNode;
use crate::execution::plans::seq_scan_plan::SeqScanPlanNode;
use crate::execution::plans::update_plan::UpdatePlanNode;

/// The closed set of plan nodes the execution engine understands. Every
/// node carries its output schema and whatever expressions it evaluates;
/// nodes and their children are held through `Arc` so built plans are
/// cheap to share with the executors they spawn.
#[derive(Debug)]
pub enum PlanNode {
    SeqScan(Arc<SeqScanPlanNode>),
    Insert(Arc<InsertPlanNode>),
    Update(Arc<UpdatePlanNode>),
    Delete(Arc<DeletePlanNode>),
    NestedLoopJoin(Arc<NestedLoopJoinPlanNode>),
    HashJoin(Arc<HashJoinPlanNode>),
    Aggregation(Arc<AggregationPlanNode>),
    Distinct(Arc<DistinctPlanNode>),
}

impl PlanNode {
    pub fn get_output_schema(&self) -> &Schema {
        match self {
            PlanNode::SeqScan(p) => p.get_output_schema(),
            PlanNode::Insert(p) => p.get_output_schema(),
            PlanNode::Update(p) => p.get_output_schema(),
            PlanNode::Delete(p) => p.get_output_schema(),
            PlanNode::NestedLoopJoin(p) => p.get_output_schema(),
            PlanNode::HashJoin(p) => p.get_output_schema(),
            PlanNode::Aggregation(p) => p.get_output_schema(),
            PlanNode::Distinct(p) => p.get_output_schema(),
        }
    }
}
