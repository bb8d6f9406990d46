//! Materializing sort executor.

use super::{compare_sort_keys, eval_sort_keys};
use crate::executor::Executor;
use crate::plan::SortPlan;
use quarry_common::{Result, Schema, Value};
use quarry_storage::{Rid, Tuple};

/// Materializes the child, sorts by the ordered `(direction,
/// expression)` terms with lexicographic tie-break, then streams the
/// result. The sort is stable, so equal keys keep child order.
pub struct SortExecutor {
    plan: SortPlan,
    child: Box<dyn Executor>,
    sorted: Vec<Tuple>,
    cursor: usize,
}

impl SortExecutor {
    pub fn new(plan: SortPlan, child: Box<dyn Executor>) -> Self {
        Self {
            plan,
            child,
            sorted: Vec::new(),
            cursor: 0,
        }
    }
}

impl Executor for SortExecutor {
    fn init(&mut self) -> Result<()> {
        self.child.init()?;
        self.sorted.clear();
        self.cursor = 0;

        let mut keyed: Vec<(Vec<Value>, Tuple)> = Vec::new();
        while let Some((tuple, _)) = self.child.next()? {
            let keys = eval_sort_keys(&tuple, &self.plan.order_bys, &self.plan.output_schema)?;
            keyed.push((keys, tuple));
        }
        keyed.sort_by(|(a, _), (b, _)| compare_sort_keys(a, b, &self.plan.order_bys));
        self.sorted = keyed.into_iter().map(|(_, tuple)| tuple).collect();
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        let Some(tuple) = self.sorted.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        let rid = tuple.rid;
        Ok(Some((tuple.clone(), rid)))
    }

    fn output_schema(&self) -> &Schema {
        &self.plan.output_schema
    }
}
