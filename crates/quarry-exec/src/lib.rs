//! Query execution for QuarryDB.
//!
//! This crate provides:
//! - A catalog of tables and secondary indexes
//! - An expression tree with three-valued evaluation
//! - Plan nodes and volcano-style executors
//! - A rule-based optimizer rewriting equi-join nested loops into hash
//!   joins

pub mod catalog;
pub mod executor;
pub mod executors;
pub mod expr;
pub mod optimizer;
pub mod plan;

pub use catalog::{Catalog, IndexInfo, IndexOid, TableInfo, TableOid};
pub use executor::{create_executor, execute, Executor, ExecutorContext};
pub use expr::{ArithmeticType, ComparisonType, Expression, LogicType};
pub use optimizer::optimize;
pub use plan::{JoinType, OrderByType, PlanNode};
