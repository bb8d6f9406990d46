//! Index scan executor.

use crate::catalog::TableInfo;
use crate::executor::{Executor, ExecutorContext};
use crate::plan::IndexScanPlan;
use quarry_common::{Result, Schema};
use quarry_storage::{IndexIter, Rid, Tuple};
use std::sync::Arc;

/// Walks a B+ tree index in key order, fetching each tuple from the
/// table heap and skipping tombstoned rows.
pub struct IndexScanExecutor {
    ctx: Arc<ExecutorContext>,
    plan: IndexScanPlan,
    table_info: Option<Arc<TableInfo>>,
    iter: Option<IndexIter>,
}

impl IndexScanExecutor {
    pub fn new(ctx: Arc<ExecutorContext>, plan: IndexScanPlan) -> Self {
        Self {
            ctx,
            plan,
            table_info: None,
            iter: None,
        }
    }
}

impl Executor for IndexScanExecutor {
    fn init(&mut self) -> Result<()> {
        let index_info = self.ctx.catalog.get_index(self.plan.index_oid)?;
        let table_info = self.ctx.catalog.get_table_by_name(&index_info.table_name)?;
        self.iter = Some(index_info.index.scan()?);
        self.table_info = Some(table_info);
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        let iter = self.iter.as_mut().expect("init() not called");
        let table_info = self.table_info.as_ref().expect("init() not called");
        while let Some((_key, rid)) = iter.next()? {
            let (meta, tuple) = table_info.table.get_tuple(rid)?;
            if meta.is_deleted {
                continue;
            }
            return Ok(Some((tuple, rid)));
        }
        Ok(None)
    }

    fn output_schema(&self) -> &Schema {
        &self.plan.output_schema
    }
}
