//! Volcano operators, one module per executor.

mod delete;
mod hash_join;
mod index_scan;
mod insert;
mod nested_loop_join;
mod seq_scan;
mod sort;
mod topn;
mod update;
mod values;

pub use delete::DeleteExecutor;
pub use hash_join::HashJoinExecutor;
pub use index_scan::IndexScanExecutor;
pub use insert::InsertExecutor;
pub use nested_loop_join::NestedLoopJoinExecutor;
pub use seq_scan::SeqScanExecutor;
pub use sort::SortExecutor;
pub use topn::TopNExecutor;
pub use update::UpdateExecutor;
pub use values::ValuesExecutor;

use crate::expr::Expression;
use crate::plan::OrderByType;
use quarry_common::{Result, Schema, Value};
use quarry_storage::Tuple;
use std::cmp::Ordering;

/// Concatenates a left and right tuple into a joined output row.
pub(crate) fn join_tuples(
    left: &Tuple,
    left_schema: &Schema,
    right: &Tuple,
    right_schema: &Schema,
    output_schema: &Schema,
) -> Result<Tuple> {
    let mut values = left.values(left_schema)?;
    values.extend(right.values(right_schema)?);
    Tuple::from_values(&values, output_schema)
}

/// Pads a matchless left row with nulls for the right side.
pub(crate) fn left_padded_with_nulls(
    left: &Tuple,
    left_schema: &Schema,
    right_schema: &Schema,
    output_schema: &Schema,
) -> Result<Tuple> {
    let mut values = left.values(left_schema)?;
    values.extend(std::iter::repeat(Value::Null).take(right_schema.column_count()));
    Tuple::from_values(&values, output_schema)
}

/// Evaluates the ordering expressions of a sort/top-n over one tuple.
pub(crate) fn eval_sort_keys(
    tuple: &Tuple,
    order_bys: &[(OrderByType, Expression)],
    schema: &Schema,
) -> Result<Vec<Value>> {
    order_bys
        .iter()
        .map(|(_, expr)| expr.evaluate(tuple, schema))
        .collect()
}

/// Compares two precomputed sort-key vectors lexicographically,
/// honoring each term's direction.
pub(crate) fn compare_sort_keys(
    a: &[Value],
    b: &[Value],
    order_bys: &[(OrderByType, Expression)],
) -> Ordering {
    for (i, (direction, _)) in order_bys.iter().enumerate() {
        let ord = a[i].sort_cmp(&b[i]);
        if ord != Ordering::Equal {
            return match direction {
                OrderByType::Asc => ord,
                OrderByType::Desc => ord.reverse(),
            };
        }
    }
    Ordering::Equal
}
