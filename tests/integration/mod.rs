//! Integration test modules.

mod config_test;
mod goal_manager_test;
mod migration_test;
