//! Literal-rows executor.

use crate::executor::Executor;
use crate::plan::ValuesPlan;
use quarry_common::{Result, Schema};
use quarry_storage::{Rid, Tuple};

/// Emits a fixed list of literal rows.
pub struct ValuesExecutor {
    plan: ValuesPlan,
    cursor: usize,
}

impl ValuesExecutor {
    pub fn new(plan: ValuesPlan) -> Self {
        Self { plan, cursor: 0 }
    }
}

impl Executor for ValuesExecutor {
    fn init(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        let Some(row) = self.plan.rows.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        let tuple = Tuple::from_values(row, &self.plan.output_schema)?;
        Ok(Some((tuple, Rid::INVALID)))
    }

    fn output_schema(&self) -> &Schema {
        &self.plan.output_schema
    }
}
