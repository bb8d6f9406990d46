//! Nested loop join executor.

use super::{join_tuples, left_padded_with_nulls};
use crate::executor::Executor;
use crate::plan::{JoinType, NestedLoopJoinPlan};
use quarry_common::{QuarryError, Result, Schema};
use quarry_storage::{Rid, Tuple};

/// Left-deep nested loop join.
///
/// The right child is re-initialized for every left row, which is why
/// every executor's `init` must reset its own state. Supports INNER and
/// LEFT joins; LEFT emits one null-padded row per matchless left row.
pub struct NestedLoopJoinExecutor {
    plan: NestedLoopJoinPlan,
    left: Box<dyn Executor>,
    right: Box<dyn Executor>,
    left_tuple: Option<Tuple>,
    left_end: bool,
    last_left_match: bool,
}

impl NestedLoopJoinExecutor {
    pub fn new(
        plan: NestedLoopJoinPlan,
        left: Box<dyn Executor>,
        right: Box<dyn Executor>,
    ) -> Result<Self> {
        if !matches!(plan.join_type, JoinType::Inner | JoinType::Left) {
            return Err(QuarryError::NotImplemented(format!(
                "join type {} not supported",
                plan.join_type
            )));
        }
        Ok(Self {
            plan,
            left,
            right,
            left_tuple: None,
            left_end: false,
            last_left_match: false,
        })
    }

    /// Pulls the next left row and restarts the right child for it.
    fn advance_left(&mut self) -> Result<()> {
        self.last_left_match = false;
        match self.left.next()? {
            Some((tuple, _)) => {
                self.left_tuple = Some(tuple);
                self.right.init()?;
            }
            None => {
                self.left_tuple = None;
                self.left_end = true;
            }
        }
        Ok(())
    }
}

impl Executor for NestedLoopJoinExecutor {
    fn init(&mut self) -> Result<()> {
        self.left.init()?;
        self.right.init()?;
        self.left_end = false;
        self.advance_left()
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        loop {
            if self.left_end {
                return Ok(None);
            }
            let left_tuple = self
                .left_tuple
                .clone()
                .expect("a live left row while not at the end");

            while let Some((right_tuple, _)) = self.right.next()? {
                let matched = self
                    .plan
                    .predicate
                    .evaluate_join(
                        &left_tuple,
                        self.left.output_schema(),
                        &right_tuple,
                        self.right.output_schema(),
                    )?
                    .as_cmp_bool()
                    .is_true();
                if matched {
                    self.last_left_match = true;
                    let out = join_tuples(
                        &left_tuple,
                        self.left.output_schema(),
                        &right_tuple,
                        self.right.output_schema(),
                        &self.plan.output_schema,
                    )?;
                    return Ok(Some((out, Rid::INVALID)));
                }
            }

            // Right side exhausted for this left row.
            let padded = if self.plan.join_type == JoinType::Left && !self.last_left_match {
                Some(left_padded_with_nulls(
                    &left_tuple,
                    self.left.output_schema(),
                    self.right.output_schema(),
                    &self.plan.output_schema,
                )?)
            } else {
                None
            };
            self.advance_left()?;
            if let Some(out) = padded {
                return Ok(Some((out, Rid::INVALID)));
            }
        }
    }

    fn output_schema(&self) -> &Schema {
        &self.plan.output_schema
    }
}
