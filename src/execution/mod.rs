pub mod execution_engine;
pub mod executor_context;
pub mod executor_factory;
pub mod executors;
pub mod expressions;
pub mod plans;
