//! Update executor.

use crate::catalog::{IndexInfo, TableInfo};
use crate::executor::{Executor, ExecutorContext};
use crate::plan::UpdatePlan;
use quarry_common::{Result, Schema, Value};
use quarry_storage::{Rid, Tuple, TupleMeta};
use std::sync::Arc;

/// Updates rows as delete-then-insert: each input row is unlinked from
/// the indexes and tombstoned, then the replacement tuple synthesized
/// from the target expressions is inserted with a fresh record id.
/// One-shot `{count}` output.
pub struct UpdateExecutor {
    ctx: Arc<ExecutorContext>,
    plan: UpdatePlan,
    child: Box<dyn Executor>,
    table_info: Option<Arc<TableInfo>>,
    index_infos: Vec<Arc<IndexInfo>>,
    done: bool,
}

impl UpdateExecutor {
    pub fn new(ctx: Arc<ExecutorContext>, plan: UpdatePlan, child: Box<dyn Executor>) -> Self {
        Self {
            ctx,
            plan,
            child,
            table_info: None,
            index_infos: Vec::new(),
            done: false,
        }
    }

    /// Replaces one row. Returns false when the new tuple could not be
    /// stored.
    fn update_row(&mut self, old_tuple: &Tuple, old_rid: Rid) -> Result<bool> {
        let table_info = self.table_info.as_ref().expect("init() not called");
        let (meta, _) = table_info.table.get_tuple(old_rid)?;
        debug_assert!(!meta.is_deleted, "update fed an already-deleted tuple");

        for index_info in &self.index_infos {
            let key = old_tuple.key_from_tuple(
                &table_info.schema,
                &index_info.key_schema,
                &index_info.key_attrs,
            )?;
            index_info.index.delete_entry(&key, old_rid)?;
        }
        table_info
            .table
            .update_tuple_meta(TupleMeta { is_deleted: true }, old_rid)?;

        let child_schema = self.child.output_schema();
        let new_values: Vec<Value> = self
            .plan
            .target_expressions
            .iter()
            .map(|expr| expr.evaluate(old_tuple, child_schema))
            .collect::<Result<_>>()?;
        let new_tuple = Tuple::from_values(&new_values, child_schema)?;

        let Some(new_rid) = table_info
            .table
            .insert_tuple(TupleMeta::default(), &new_tuple)?
        else {
            return Ok(false);
        };
        for index_info in &self.index_infos {
            let key = new_tuple.key_from_tuple(
                &table_info.schema,
                &index_info.key_schema,
                &index_info.key_attrs,
            )?;
            index_info.index.insert_entry(&key, new_rid)?;
        }
        Ok(true)
    }
}

impl Executor for UpdateExecutor {
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
        // Materialize the input before touching the table: replacements
        // are reinserted at the heap tail, and a still-open scan child
        // would otherwise see and update them again.
        let mut pending = Vec::new();
        while let Some((tuple, rid)) = self.child.next()? {
            pending.push((tuple, rid));
        }
        let mut count = 0i64;
        for (tuple, rid) in pending {
            if self.update_row(&tuple, rid)? {
                count += 1;
            }
        }
        self.done = true;
        log::debug!("update rewrote {} rows", count);
        let out = Tuple::from_values(&[Value::Integer(count)], &self.plan.output_schema)?;
        Ok(Some((out, Rid::INVALID)))
    }

    fn output_schema(&self) -> &Schema {
        &self.plan.output_schema
    }
}
