//! Volcano executor interface and factory.

use crate::catalog::Catalog;
use crate::executors::{
    DeleteExecutor, HashJoinExecutor, IndexScanExecutor, InsertExecutor, NestedLoopJoinExecutor,
    SeqScanExecutor, SortExecutor, TopNExecutor, UpdateExecutor, ValuesExecutor,
};
use crate::plan::PlanNode;
use quarry_common::{Result, Schema};
use quarry_storage::{Rid, Tuple};
use std::sync::Arc;

/// Shared state every executor can reach.
pub struct ExecutorContext {
    pub catalog: Arc<Catalog>,
}

impl ExecutorContext {
    /// Creates a context over a catalog.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

/// Pull-based operator interface.
///
/// `init` prepares the operator and re-initializes all of its children,
/// so an operator can be re-executed (the nested loop join re-runs its
/// right child once per left row). `next` yields one output row at a
/// time until it returns `None`.
pub trait Executor {
    fn init(&mut self) -> Result<()>;
    fn next(&mut self) -> Result<Option<(Tuple, Rid)>>;
    fn output_schema(&self) -> &Schema;
}

/// Builds the executor tree for a plan.
pub fn create_executor(ctx: &Arc<ExecutorContext>, plan: &PlanNode) -> Result<Box<dyn Executor>> {
    Ok(match plan {
        PlanNode::Values(plan) => Box::new(ValuesExecutor::new(plan.clone())),
        PlanNode::SeqScan(plan) => Box::new(SeqScanExecutor::new(Arc::clone(ctx), plan.clone())),
        PlanNode::IndexScan(plan) => {
            Box::new(IndexScanExecutor::new(Arc::clone(ctx), plan.clone()))
        }
        PlanNode::Insert(plan) => {
            let child = create_executor(ctx, &plan.child)?;
            Box::new(InsertExecutor::new(Arc::clone(ctx), plan.clone(), child))
        }
        PlanNode::Delete(plan) => {
            let child = create_executor(ctx, &plan.child)?;
            Box::new(DeleteExecutor::new(Arc::clone(ctx), plan.clone(), child))
        }
        PlanNode::Update(plan) => {
            let child = create_executor(ctx, &plan.child)?;
            Box::new(UpdateExecutor::new(Arc::clone(ctx), plan.clone(), child))
        }
        PlanNode::Sort(plan) => {
            let child = create_executor(ctx, &plan.child)?;
            Box::new(SortExecutor::new(plan.clone(), child))
        }
        PlanNode::TopN(plan) => {
            let child = create_executor(ctx, &plan.child)?;
            Box::new(TopNExecutor::new(plan.clone(), child))
        }
        PlanNode::NestedLoopJoin(plan) => {
            let left = create_executor(ctx, &plan.left)?;
            let right = create_executor(ctx, &plan.right)?;
            Box::new(NestedLoopJoinExecutor::new(plan.clone(), left, right)?)
        }
        PlanNode::HashJoin(plan) => {
            let left = create_executor(ctx, &plan.left)?;
            let right = create_executor(ctx, &plan.right)?;
            Box::new(HashJoinExecutor::new(plan.clone(), left, right)?)
        }
    })
}

/// Builds, initializes, and fully drains a plan.
pub fn execute(ctx: &Arc<ExecutorContext>, plan: &PlanNode) -> Result<Vec<Tuple>> {
    let mut executor = create_executor(ctx, plan)?;
    executor.init()?;
    let mut rows = Vec::new();
    while let Some((tuple, _rid)) = executor.next()? {
        rows.push(tuple);
    }
    log::trace!("plan produced {} rows", rows.len());
    Ok(rows)
}
