//! Plan nodes consumed by the executor factory.

use crate::catalog::{IndexOid, TableOid};
use crate::expr::Expression;
use quarry_common::{Column, Schema, TypeId, Value};

/// Join flavors. Executors implement Inner and Left; the others exist so
/// planners can express them and fail loudly at executor construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl std::fmt::Display for JoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL",
        };
        write!(f, "{}", name)
    }
}

/// Sort direction for one ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderByType {
    Asc,
    Desc,
}

/// The schema of the `{count}` row emitted by DML executors.
pub fn count_schema() -> Schema {
    Schema::new(vec![Column::new("count", TypeId::Integer)])
}

/// Literal rows, the usual child of an insert.
#[derive(Debug, Clone)]
pub struct ValuesPlan {
    pub rows: Vec<Vec<Value>>,
    pub output_schema: Schema,
}

/// Full table scan with an optional residual filter.
#[derive(Debug, Clone)]
pub struct SeqScanPlan {
    pub table_oid: TableOid,
    pub filter_predicate: Option<Expression>,
    pub output_schema: Schema,
}

/// Scan of a table through one of its secondary indexes.
#[derive(Debug, Clone)]
pub struct IndexScanPlan {
    pub index_oid: IndexOid,
    pub output_schema: Schema,
}

/// Insert the child's rows into a table and all its indexes.
#[derive(Debug, Clone)]
pub struct InsertPlan {
    pub table_oid: TableOid,
    pub child: Box<PlanNode>,
    pub output_schema: Schema,
}

/// Tombstone the child's rows and unlink them from all indexes.
#[derive(Debug, Clone)]
pub struct DeletePlan {
    pub table_oid: TableOid,
    pub child: Box<PlanNode>,
    pub output_schema: Schema,
}

/// Replace the child's rows with tuples synthesized from the target
/// expressions.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    pub table_oid: TableOid,
    pub target_expressions: Vec<Expression>,
    pub child: Box<PlanNode>,
    pub output_schema: Schema,
}

/// Materializing sort.
#[derive(Debug, Clone)]
pub struct SortPlan {
    pub order_bys: Vec<(OrderByType, Expression)>,
    pub child: Box<PlanNode>,
    pub output_schema: Schema,
}

/// Bounded heap returning the first `n` rows of the sort order.
#[derive(Debug, Clone)]
pub struct TopNPlan {
    pub n: usize,
    pub order_bys: Vec<(OrderByType, Expression)>,
    pub child: Box<PlanNode>,
    pub output_schema: Schema,
}

/// Nested loop join on an arbitrary predicate.
#[derive(Debug, Clone)]
pub struct NestedLoopJoinPlan {
    pub predicate: Expression,
    pub join_type: JoinType,
    pub left: Box<PlanNode>,
    pub right: Box<PlanNode>,
    pub output_schema: Schema,
}

/// Hash join on equi-key lists. Key expressions are evaluated against
/// their own side, so both lists use tuple index 0.
#[derive(Debug, Clone)]
pub struct HashJoinPlan {
    pub left_key_expressions: Vec<Expression>,
    pub right_key_expressions: Vec<Expression>,
    pub join_type: JoinType,
    pub left: Box<PlanNode>,
    pub right: Box<PlanNode>,
    pub output_schema: Schema,
}

/// A query plan tree.
#[derive(Debug, Clone)]
pub enum PlanNode {
    Values(ValuesPlan),
    SeqScan(SeqScanPlan),
    IndexScan(IndexScanPlan),
    Insert(InsertPlan),
    Delete(DeletePlan),
    Update(UpdatePlan),
    Sort(SortPlan),
    TopN(TopNPlan),
    NestedLoopJoin(NestedLoopJoinPlan),
    HashJoin(HashJoinPlan),
}

impl PlanNode {
    /// Returns the schema of the rows this node produces.
    pub fn output_schema(&self) -> &Schema {
        match self {
            PlanNode::Values(plan) => &plan.output_schema,
            PlanNode::SeqScan(plan) => &plan.output_schema,
            PlanNode::IndexScan(plan) => &plan.output_schema,
            PlanNode::Insert(plan) => &plan.output_schema,
            PlanNode::Delete(plan) => &plan.output_schema,
            PlanNode::Update(plan) => &plan.output_schema,
            PlanNode::Sort(plan) => &plan.output_schema,
            PlanNode::TopN(plan) => &plan.output_schema,
            PlanNode::NestedLoopJoin(plan) => &plan.output_schema,
            PlanNode::HashJoin(plan) => &plan.output_schema,
        }
    }
}
