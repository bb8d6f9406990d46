//! Rewrites equi-predicate nested loop joins into hash joins.

use crate::expr::{ComparisonType, Expression, LogicType};
use crate::plan::{HashJoinPlan, PlanNode};
#[cfg(test)]
use crate::plan::NestedLoopJoinPlan;

/// Post-order traversal: children are optimized first, then the current
/// node is rewritten when its predicate is a single column equality
/// across the two sides, or an AND of two such equalities.
pub fn nlj_as_hash_join(plan: PlanNode) -> PlanNode {
    let plan = rewrite_children(plan);

    let nlj = match plan {
        PlanNode::NestedLoopJoin(nlj) => nlj,
        other => return other,
    };

    if let Expression::Comparison { .. } = &nlj.predicate {
        if let Some((left_key, right_key)) = extract_equi_condition(&nlj.predicate) {
            log::debug!("rewriting single-equality NLJ to hash join");
            return PlanNode::HashJoin(HashJoinPlan {
                left_key_expressions: vec![left_key],
                right_key_expressions: vec![right_key],
                join_type: nlj.join_type,
                left: nlj.left,
                right: nlj.right,
                output_schema: nlj.output_schema,
            });
        }
    }

    if let Expression::Logic {
        op: LogicType::And,
        left,
        right,
    } = &nlj.predicate
    {
        if let (Some((lk1, rk1)), Some((lk2, rk2))) =
            (extract_equi_condition(left), extract_equi_condition(right))
        {
            log::debug!("rewriting two-equality NLJ to hash join");
            return PlanNode::HashJoin(HashJoinPlan {
                left_key_expressions: vec![lk1, lk2],
                right_key_expressions: vec![rk1, rk2],
                join_type: nlj.join_type,
                left: nlj.left,
                right: nlj.right,
                output_schema: nlj.output_schema,
            });
        }
    }

    PlanNode::NestedLoopJoin(nlj)
}

fn rewrite_children(plan: PlanNode) -> PlanNode {
    match plan {
        PlanNode::Insert(mut p) => {
            p.child = Box::new(nlj_as_hash_join(*p.child));
            PlanNode::Insert(p)
        }
        PlanNode::Delete(mut p) => {
            p.child = Box::new(nlj_as_hash_join(*p.child));
            PlanNode::Delete(p)
        }
        PlanNode::Update(mut p) => {
            p.child = Box::new(nlj_as_hash_join(*p.child));
            PlanNode::Update(p)
        }
        PlanNode::Sort(mut p) => {
            p.child = Box::new(nlj_as_hash_join(*p.child));
            PlanNode::Sort(p)
        }
        PlanNode::TopN(mut p) => {
            p.child = Box::new(nlj_as_hash_join(*p.child));
            PlanNode::TopN(p)
        }
        PlanNode::NestedLoopJoin(mut p) => {
            p.left = Box::new(nlj_as_hash_join(*p.left));
            p.right = Box::new(nlj_as_hash_join(*p.right));
            PlanNode::NestedLoopJoin(p)
        }
        PlanNode::HashJoin(mut p) => {
            p.left = Box::new(nlj_as_hash_join(*p.left));
            p.right = Box::new(nlj_as_hash_join(*p.right));
            PlanNode::HashJoin(p)
        }
        leaf @ (PlanNode::Values(_) | PlanNode::SeqScan(_) | PlanNode::IndexScan(_)) => leaf,
    }
}

/// Matches `col(tuple 0) = col(tuple 1)` in either orientation.
///
/// Returns the key expressions `(left, right)`, both normalized to
/// tuple index 0 because each is evaluated against its own side.
fn extract_equi_condition(expr: &Expression) -> Option<(Expression, Expression)> {
    let Expression::Comparison {
        op: ComparisonType::Equal,
        left,
        right,
    } = expr
    else {
        return None;
    };
    let Expression::ColumnValue {
        tuple_idx: left_tuple,
        col_idx: left_col,
    } = **left
    else {
        return None;
    };
    let Expression::ColumnValue {
        tuple_idx: right_tuple,
        col_idx: right_col,
    } = **right
    else {
        return None;
    };

    match (left_tuple, right_tuple) {
        (0, 1) => Some((
            Expression::column(0, left_col),
            Expression::column(0, right_col),
        )),
        (1, 0) => Some((
            Expression::column(0, right_col),
            Expression::column(0, left_col),
        )),
        _ => None,
    }
}
