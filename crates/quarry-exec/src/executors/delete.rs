//! Delete executor.

use crate::catalog::{IndexInfo, TableInfo};
use crate::executor::{Executor, ExecutorContext};
use crate::plan::DeletePlan;
use quarry_common::{Result, Schema, Value};
use quarry_storage::{Rid, Tuple, TupleMeta};
use std::sync::Arc;

/// Drains its child, tombstoning each input row in the heap and
/// unlinking it from every index. One-shot `{count}` output.
pub struct DeleteExecutor {
    ctx: Arc<ExecutorContext>,
    plan: DeletePlan,
    child: Box<dyn Executor>,
    table_info: Option<Arc<TableInfo>>,
    index_infos: Vec<Arc<IndexInfo>>,
    done: bool,
}

impl DeleteExecutor {
    pub fn new(ctx: Arc<ExecutorContext>, plan: DeletePlan, child: Box<dyn Executor>) -> Self {
        Self {
            ctx,
            plan,
            child,
            table_info: None,
            index_infos: Vec::new(),
            done: false,
        }
    }

    fn delete_row(&self, tuple: &Tuple, rid: Rid) -> Result<()> {
        let table_info = self.table_info.as_ref().expect("init() not called");
        let (meta, _) = table_info.table.get_tuple(rid)?;
        debug_assert!(!meta.is_deleted, "delete fed an already-deleted tuple");

        for index_info in &self.index_infos {
            let key = tuple.key_from_tuple(
                &table_info.schema,
                &index_info.key_schema,
                &index_info.key_attrs,
            )?;
            index_info.index.delete_entry(&key, rid)?;
        }
        table_info
            .table
            .update_tuple_meta(TupleMeta { is_deleted: true }, rid)
    }
}

impl Executor for DeleteExecutor {
    fn init(&mut self) -> Result<()> {
        self.child.init()?;
        let table_info = self.ctx.catalog.get_table(self.plan.table_oid)?;
        self.index_infos = self.ctx.catalog.get_table_indexes(&table_info.name);
        self.table_info = Some(table_info);
        self.done = false;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        if self.done {
            return Ok(None);
        }
        let mut count = 0i64;
        while let Some((tuple, rid)) = self.child.next()? {
            self.delete_row(&tuple, rid)?;
            count += 1;
        }
        self.done = true;
        log::debug!("delete removed {} rows", count);
        let out = Tuple::from_values(&[Value::Integer(count)], &self.plan.output_schema)?;
        Ok(Some((out, Rid::INVALID)))
    }

    fn output_schema(&self) -> &Schema {
        &self.plan.output_schema
    }
}
