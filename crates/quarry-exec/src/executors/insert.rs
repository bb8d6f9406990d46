//! Insert executor.

use crate::catalog::{IndexInfo, TableInfo};
use crate::executor::{Executor, ExecutorContext};
use crate::plan::InsertPlan;
use quarry_common::{Result, Schema, Value};
use quarry_storage::{Rid, Tuple, TupleMeta};
use std::sync::Arc;

/// Drains its child, inserting every row into the table heap and all of
/// the table's indexes. One-shot: emits a single `{count}` row, then
/// reports exhaustion.
pub struct InsertExecutor {
    ctx: Arc<ExecutorContext>,
    plan: InsertPlan,
    child: Box<dyn Executor>,
    table_info: Option<Arc<TableInfo>>,
    index_infos: Vec<Arc<IndexInfo>>,
    done: bool,
}

impl InsertExecutor {
    pub fn new(ctx: Arc<ExecutorContext>, plan: InsertPlan, child: Box<dyn Executor>) -> Self {
        Self {
            ctx,
            plan,
            child,
            table_info: None,
            index_infos: Vec::new(),
            done: false,
        }
    }

    fn insert_row(&self, tuple: &Tuple) -> Result<bool> {
        let table_info = self.table_info.as_ref().expect("init() not called");
        let Some(rid) = table_info
            .table
            .insert_tuple(TupleMeta::default(), tuple)?
        else {
            return Ok(false);
        };
        for index_info in &self.index_infos {
            let key = tuple.key_from_tuple(
                &table_info.schema,
                &index_info.key_schema,
                &index_info.key_attrs,
            )?;
            index_info.index.insert_entry(&key, rid)?;
        }
        Ok(true)
    }
}

impl Executor for InsertExecutor {
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
        while let Some((tuple, _)) = self.child.next()? {
            if self.insert_row(&tuple)? {
                count += 1;
            }
        }
        self.done = true;
        log::debug!("insert wrote {} rows", count);
        let out = Tuple::from_values(&[Value::Integer(count)], &self.plan.output_schema)?;
        Ok(Some((out, Rid::INVALID)))
    }

    fn output_schema(&self) -> &Schema {
        &self.plan.output_schema
    }
}
