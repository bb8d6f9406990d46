//! Sequential scan executor.

use crate::executor::{Executor, ExecutorContext};
use crate::plan::SeqScanPlan;
use quarry_common::{Result, Schema};
use quarry_storage::{Rid, TableIter, Tuple};
use std::sync::Arc;

/// Scans the table heap in storage order, skipping deleted tuples and
/// applying the plan's filter predicate when present.
pub struct SeqScanExecutor {
    ctx: Arc<ExecutorContext>,
    plan: SeqScanPlan,
    iter: Option<TableIter>,
}

impl SeqScanExecutor {
    pub fn new(ctx: Arc<ExecutorContext>, plan: SeqScanPlan) -> Self {
        Self {
            ctx,
            plan,
            iter: None,
        }
    }
}

impl Executor for SeqScanExecutor {
    fn init(&mut self) -> Result<()> {
        let table_info = self.ctx.catalog.get_table(self.plan.table_oid)?;
        self.iter = Some(table_info.table.iter());
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        let iter = self.iter.as_mut().expect("init() not called");
        while let Some((meta, tuple)) = iter.next()? {
            if meta.is_deleted {
                continue;
            }
            if let Some(predicate) = &self.plan.filter_predicate {
                let keep = predicate
                    .evaluate(&tuple, &self.plan.output_schema)?
                    .as_cmp_bool()
                    .is_true();
                if !keep {
                    continue;
                }
            }
            let rid = tuple.rid;
            return Ok(Some((tuple, rid)));
        }
        Ok(None)
    }

    fn output_schema(&self) -> &Schema {
        &self.plan.output_schema
    }
}
