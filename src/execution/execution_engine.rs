use std::sync::Arc;

use log::debug;

use crate::common::exception::DBError;
use crate::execution::executor_context::ExecutorContext;
use crate::execution::executor_factory::ExecutorFactory;
use crate::execution::plans::abstract_plan::PlanNode;
use crate::storage::table::tuple::Tuple;

/// Drives a plan tree to completion, pulling every tuple out of the root
/// executor. A lock failure inside an executor has already aborted the
/// transaction by the time the error reaches here; the engine just stops
/// producing and surfaces it.
pub struct ExecutionEngine;

impl ExecutionEngine {
    pub fn execute(
        plan: &PlanNode,
        context: Arc<ExecutorContext>,
    ) -> Result<Vec<Tuple>, DBError> {
        let mut executor = ExecutorFactory::create_executor(context, plan);
        executor.init();

        let mut results = Vec::new();
        while let Some((tuple, _)) = executor.next()? {
            results.push(tuple);
        }
        debug!("plan produced {} tuples", results.len());
        Ok(results)
    }
}
