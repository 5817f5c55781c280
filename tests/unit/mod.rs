//! Unit test modules.

mod goal_progress_test;
mod incident_grouping_test;
mod lab_flagging_test;
mod log_query_test;
mod migration_transform_test;
