pub mod abstract_plan;
pub mod aggregation_plan;
pub mod delete_plan;
pub mod distinct_plan;
pub mod hash_join_plan;
pub mod insert_plan;
pub mod nested_loop_join_plan;
pub mod seq_scan_plan;
pub mod update_plan;
