//! Hash join executor.

use super::{join_tuples, left_padded_with_nulls};
use crate::executor::Executor;
use crate::expr::Expression;
use crate::plan::{HashJoinPlan, JoinType};
use quarry_common::{CmpBool, QuarryError, Result, Schema, Value};
use quarry_storage::{Rid, Tuple};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Join key: the evaluated key expressions of one row.
///
/// Equality follows SQL semantics (null matches nothing, itself
/// included), so rows with null keys never join; hashing keeps the
/// contract that equal keys hash alike by hashing all numerics through
/// their f64 bits.
struct JoinKey {
    values: Vec<Value>,
}

impl PartialEq for JoinKey {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.compare_equals(b) == CmpBool::CmpTrue)
    }
}

impl Eq for JoinKey {}

impl Hash for JoinKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for value in &self.values {
            match value {
                Value::Null => state.write_u8(0),
                Value::Boolean(b) => {
                    state.write_u8(1);
                    state.write_u8(*b as u8);
                }
                Value::Integer(i) => {
                    state.write_u8(2);
                    state.write_u64((*i as f64).to_bits());
                }
                Value::Float(x) => {
                    state.write_u8(2);
                    state.write_u64(x.to_bits());
                }
                Value::Varchar(s) => {
                    state.write_u8(3);
                    state.write(s.as_bytes());
                }
            }
        }
    }
}

/// Hash join: builds a multi-map over the right child, then probes it
/// with each left row, streaming the matches. Supports INNER and LEFT.
pub struct HashJoinExecutor {
    plan: HashJoinPlan,
    left: Box<dyn Executor>,
    right: Box<dyn Executor>,
    table: HashMap<JoinKey, Vec<Tuple>>,
    left_tuple: Option<Tuple>,
    left_end: bool,
    last_left_match: bool,
    bucket: Vec<Tuple>,
    bucket_pos: usize,
}

impl HashJoinExecutor {
    pub fn new(
        plan: HashJoinPlan,
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
            table: HashMap::new(),
            left_tuple: None,
            left_end: false,
            last_left_match: false,
            bucket: Vec::new(),
            bucket_pos: 0,
        })
    }

    fn key_of(
        tuple: &Tuple,
        schema: &Schema,
        expressions: &[Expression],
    ) -> Result<JoinKey> {
        let values = expressions
            .iter()
            .map(|expr| expr.evaluate(tuple, schema))
            .collect::<Result<Vec<_>>>()?;
        Ok(JoinKey { values })
    }

    /// Pulls the next left row and looks up its bucket of right matches.
    fn advance_left(&mut self) -> Result<()> {
        self.last_left_match = false;
        self.bucket = Vec::new();
        self.bucket_pos = 0;
        match self.left.next()? {
            Some((tuple, _)) => {
                let key = Self::key_of(
                    &tuple,
                    self.left.output_schema(),
                    &self.plan.left_key_expressions,
                )?;
                if let Some(matches) = self.table.get(&key) {
                    self.bucket = matches.clone();
                }
                self.left_tuple = Some(tuple);
            }
            None => {
                self.left_tuple = None;
                self.left_end = true;
            }
        }
        Ok(())
    }
}

impl Executor for HashJoinExecutor {
    fn init(&mut self) -> Result<()> {
        self.left.init()?;
        self.right.init()?;
        self.left_end = false;

        // Build phase: consume the right child into the multi-map.
        self.table.clear();
        while let Some((tuple, _)) = self.right.next()? {
            let key = Self::key_of(
                &tuple,
                self.right.output_schema(),
                &self.plan.right_key_expressions,
            )?;
            self.table.entry(key).or_default().push(tuple);
        }
        log::trace!("hash join built {} buckets", self.table.len());

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

            if self.bucket_pos < self.bucket.len() {
                let right_tuple = self.bucket[self.bucket_pos].clone();
                self.bucket_pos += 1;
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

            // Bucket drained for this left row.
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
