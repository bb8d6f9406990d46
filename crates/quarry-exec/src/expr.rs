//! Expression trees with three-valued evaluation.

use quarry_common::{CmpBool, QuarryError, Result, Schema, Value};
use quarry_storage::Tuple;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonType {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicType {
    And,
    Or,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticType {
    Plus,
    Minus,
}

/// An expression evaluated against one tuple (or a pair during joins).
///
/// `ColumnValue` carries the side it reads from: tuple 0 is the left
/// (or only) input, tuple 1 the right.
#[derive(Debug, Clone)]
pub enum Expression {
    ColumnValue { tuple_idx: usize, col_idx: usize },
    Constant(Value),
    Comparison {
        op: ComparisonType,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Logic {
        op: LogicType,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Arithmetic {
        op: ArithmeticType,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    /// Column reference shorthand.
    pub fn column(tuple_idx: usize, col_idx: usize) -> Expression {
        Expression::ColumnValue { tuple_idx, col_idx }
    }

    /// Constant shorthand.
    pub fn constant(value: Value) -> Expression {
        Expression::Constant(value)
    }

    /// Comparison shorthand.
    pub fn comparison(op: ComparisonType, left: Expression, right: Expression) -> Expression {
        Expression::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Conjunction shorthand.
    pub fn and(left: Expression, right: Expression) -> Expression {
        Expression::Logic {
            op: LogicType::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Evaluates against a single tuple.
    pub fn evaluate(&self, tuple: &Tuple, schema: &Schema) -> Result<Value> {
        match self {
            Expression::ColumnValue { tuple_idx, col_idx } => {
                if *tuple_idx != 0 {
                    return Err(QuarryError::ExecutionError(
                        "tuple index 1 outside a join".to_string(),
                    ));
                }
                tuple.value_at(schema, *col_idx)
            }
            Expression::Constant(value) => Ok(value.clone()),
            Expression::Comparison { op, left, right } => {
                let l = left.evaluate(tuple, schema)?;
                let r = right.evaluate(tuple, schema)?;
                Ok(compare(*op, &l, &r))
            }
            Expression::Logic { op, left, right } => {
                let l = left.evaluate(tuple, schema)?;
                let r = right.evaluate(tuple, schema)?;
                Ok(logic(*op, l.as_cmp_bool(), r.as_cmp_bool()))
            }
            Expression::Arithmetic { op, left, right } => {
                let l = left.evaluate(tuple, schema)?;
                let r = right.evaluate(tuple, schema)?;
                match op {
                    ArithmeticType::Plus => l.add(&r),
                    ArithmeticType::Minus => l.subtract(&r),
                }
            }
        }
    }

    /// Evaluates against a pair of tuples during a join.
    pub fn evaluate_join(
        &self,
        left_tuple: &Tuple,
        left_schema: &Schema,
        right_tuple: &Tuple,
        right_schema: &Schema,
    ) -> Result<Value> {
        match self {
            Expression::ColumnValue { tuple_idx, col_idx } => match tuple_idx {
                0 => left_tuple.value_at(left_schema, *col_idx),
                1 => right_tuple.value_at(right_schema, *col_idx),
                _ => Err(QuarryError::ExecutionError(format!(
                    "tuple index {} in join predicate",
                    tuple_idx
                ))),
            },
            Expression::Constant(value) => Ok(value.clone()),
            Expression::Comparison { op, left, right } => {
                let l = left.evaluate_join(left_tuple, left_schema, right_tuple, right_schema)?;
                let r = right.evaluate_join(left_tuple, left_schema, right_tuple, right_schema)?;
                Ok(compare(*op, &l, &r))
            }
            Expression::Logic { op, left, right } => {
                let l = left.evaluate_join(left_tuple, left_schema, right_tuple, right_schema)?;
                let r = right.evaluate_join(left_tuple, left_schema, right_tuple, right_schema)?;
                Ok(logic(*op, l.as_cmp_bool(), r.as_cmp_bool()))
            }
            Expression::Arithmetic { op, left, right } => {
                let l = left.evaluate_join(left_tuple, left_schema, right_tuple, right_schema)?;
                let r = right.evaluate_join(left_tuple, left_schema, right_tuple, right_schema)?;
                match op {
                    ArithmeticType::Plus => l.add(&r),
                    ArithmeticType::Minus => l.subtract(&r),
                }
            }
        }
    }
}

fn compare(op: ComparisonType, left: &Value, right: &Value) -> Value {
    let result = match op {
        ComparisonType::Equal => left.compare_equals(right),
        ComparisonType::NotEqual => left.compare_not_equals(right),
        ComparisonType::LessThan => left.compare_less_than(right),
        ComparisonType::LessThanOrEqual => left.compare_less_than_equals(right),
        ComparisonType::GreaterThan => left.compare_greater_than(right),
        ComparisonType::GreaterThanOrEqual => left.compare_greater_than_equals(right),
    };
    cmp_to_value(result)
}

fn logic(op: LogicType, left: CmpBool, right: CmpBool) -> Value {
    use CmpBool::*;
    let result = match op {
        LogicType::And => match (left, right) {
            (CmpFalse, _) | (_, CmpFalse) => CmpFalse,
            (CmpNull, _) | (_, CmpNull) => CmpNull,
            _ => CmpTrue,
        },
        LogicType::Or => match (left, right) {
            (CmpTrue, _) | (_, CmpTrue) => CmpTrue,
            (CmpNull, _) | (_, CmpNull) => CmpNull,
            _ => CmpFalse,
        },
    };
    cmp_to_value(result)
}

fn cmp_to_value(cmp: CmpBool) -> Value {
    match cmp {
        CmpBool::CmpTrue => Value::Boolean(true),
        CmpBool::CmpFalse => Value::Boolean(false),
        CmpBool::CmpNull => Value::Null,
    }
}
