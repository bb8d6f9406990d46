//! Top-N executor.

use super::{compare_sort_keys, eval_sort_keys};
use crate::executor::Executor;
use crate::plan::{OrderByType, TopNPlan};
use crate::expr::Expression;
use quarry_common::{Result, Schema, Value};
use quarry_storage::{Rid, Tuple};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

/// Heap entry ordered by precomputed sort keys; the heap's maximum is
/// the worst row currently retained, so it is the one displaced when a
/// better row arrives.
struct TopNEntry {
    keys: Vec<Value>,
    tuple: Tuple,
    order_bys: Arc<Vec<(OrderByType, Expression)>>,
}

impl PartialEq for TopNEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TopNEntry {}

impl PartialOrd for TopNEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TopNEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_sort_keys(&self.keys, &other.keys, &self.order_bys)
    }
}

/// Keeps the first `n` rows of the sort order in a bounded binary heap
/// while draining the child, then streams them in order.
pub struct TopNExecutor {
    plan: TopNPlan,
    child: Box<dyn Executor>,
    result: Vec<Tuple>,
    cursor: usize,
}

impl TopNExecutor {
    pub fn new(plan: TopNPlan, child: Box<dyn Executor>) -> Self {
        Self {
            plan,
            child,
            result: Vec::new(),
            cursor: 0,
        }
    }
}

impl Executor for TopNExecutor {
    fn init(&mut self) -> Result<()> {
        self.child.init()?;
        self.result.clear();
        self.cursor = 0;

        let order_bys = Arc::new(self.plan.order_bys.clone());
        let mut heap: BinaryHeap<TopNEntry> = BinaryHeap::with_capacity(self.plan.n + 1);
        while let Some((tuple, _)) = self.child.next()? {
            let keys = eval_sort_keys(&tuple, &self.plan.order_bys, &self.plan.output_schema)?;
            heap.push(TopNEntry {
                keys,
                tuple,
                order_bys: Arc::clone(&order_bys),
            });
            if heap.len() > self.plan.n {
                heap.pop();
            }
        }
        self.result = heap
            .into_sorted_vec()
            .into_iter()
            .map(|entry| entry.tuple)
            .collect();
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        let Some(tuple) = self.result.get(self.cursor) else {
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
