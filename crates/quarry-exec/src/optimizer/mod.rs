//! Rule-based plan rewriting.

mod nlj_as_hash_join;

pub use nlj_as_hash_join::nlj_as_hash_join;

use crate::plan::PlanNode;

/// Applies every rewrite rule to a plan.
pub fn optimize(plan: PlanNode) -> PlanNode {
    nlj_as_hash_join(plan)
}
