use crate::catalog::schema::Schema;
use crate::common::exception::DBError;
use crate::common::rid::RID;
use crate::storage::table::tuple::Tuple;

/// The Volcano tuple-at-a-time iterator interface all executors implement.
/// Executors own their children; a parent drives its subtree by calling
/// `next` until it yields `None`.
pub trait AbstractExecutor: Send {
    /// Resets the executor's state and opens its children. Must be called
    /// before the first `next`.
    fn init(&mut self);

    /// Yields the next tuple and its RID, `Ok(None)` at end of stream, or
    /// an error when the enclosing transaction was aborted mid-flight.
    fn next(&mut self) -> Result<Option<(Tuple, RID)>, DBError>;

    /// Schema of the tuples this executor produces.
    fn get_output_schema(&self) -> &Schema;
}
