use std::sync::Arc;

use crate::catalog::schema::Schema;
use crate::common::config::TableOidT;
use crate::execution::expressions::abstract_expression::Expression;

/// Full scan of a table, filtering through an optional predicate and
/// projecting into the output schema.
#[derive(Debug)]
pub struct SeqScanPlanNode {
    output_schema: Schema,
    table_oid: TableOidT,
    predicate: Option<Arc<Expression>>,
}

impl SeqScanPlanNode {
    pub fn new(
        output_schema: Schema,
        table_oid: TableOidT,
        predicate: Option<Arc<Expression>>,
    ) -> Self {
        Self {
            output_schema,
            table_oid,
            predicate,
        }
    }

    pub fn get_output_schema(&self) -> &Schema {
        &self.output_schema
    }

    pub fn get_table_oid(&self) -> TableOidT {
        self.table_oid
    }

    pub fn get_predicate(&self) -> Option<&Arc<Expression>> {
        self.predicate.as_ref()
    }
}
