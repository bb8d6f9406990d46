//! Runtime values and three-valued comparisons.

use crate::error::{QuarryError, Result};
use crate::types::TypeId;

/// Result of a SQL-style comparison: true, false, or null.
///
/// Any comparison involving a null operand is `CmpNull`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpBool {
    CmpTrue,
    CmpFalse,
    CmpNull,
}

impl CmpBool {
    /// Returns true only for `CmpTrue` (null collapses to false).
    pub fn is_true(&self) -> bool {
        matches!(self, CmpBool::CmpTrue)
    }
}

impl From<bool> for CmpBool {
    fn from(b: bool) -> Self {
        if b {
            CmpBool::CmpTrue
        } else {
            CmpBool::CmpFalse
        }
    }
}

/// A typed runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Varchar(String),
}

impl Value {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type of this value, or None for null.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(TypeId::Boolean),
            Value::Integer(_) => Some(TypeId::Integer),
            Value::Float(_) => Some(TypeId::Float),
            Value::Varchar(_) => Some(TypeId::Varchar),
        }
    }

    /// Interprets this value as a boolean predicate result.
    pub fn as_cmp_bool(&self) -> CmpBool {
        match self {
            Value::Null => CmpBool::CmpNull,
            Value::Boolean(b) => (*b).into(),
            _ => CmpBool::CmpFalse,
        }
    }

    /// Orders two non-null values of comparable types.
    ///
    /// Integers are promoted to floats when mixed. Returns None when the
    /// types are incomparable or either side is null.
    fn partial_cmp_values(&self, other: &Value) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering;
        use Value::*;
        match (self, other) {
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Varchar(a), Varchar(b)) => Some(a.cmp(b)),
            (Null, _) | (_, Null) => None,
            _ => {
                // Incomparable types order equal rather than panicking;
                // the planner is expected to keep comparisons well typed.
                Some(Ordering::Equal)
            }
        }
    }

    /// Three-valued equality.
    pub fn compare_equals(&self, other: &Value) -> CmpBool {
        if self.is_null() || other.is_null() {
            return CmpBool::CmpNull;
        }
        match self.partial_cmp_values(other) {
            Some(ord) => (ord == std::cmp::Ordering::Equal).into(),
            None => CmpBool::CmpNull,
        }
    }

    /// Three-valued inequality.
    pub fn compare_not_equals(&self, other: &Value) -> CmpBool {
        match self.compare_equals(other) {
            CmpBool::CmpTrue => CmpBool::CmpFalse,
            CmpBool::CmpFalse => CmpBool::CmpTrue,
            CmpBool::CmpNull => CmpBool::CmpNull,
        }
    }

    /// Three-valued less-than.
    pub fn compare_less_than(&self, other: &Value) -> CmpBool {
        if self.is_null() || other.is_null() {
            return CmpBool::CmpNull;
        }
        match self.partial_cmp_values(other) {
            Some(ord) => (ord == std::cmp::Ordering::Less).into(),
            None => CmpBool::CmpNull,
        }
    }

    /// Three-valued less-than-or-equal.
    pub fn compare_less_than_equals(&self, other: &Value) -> CmpBool {
        if self.is_null() || other.is_null() {
            return CmpBool::CmpNull;
        }
        match self.partial_cmp_values(other) {
            Some(ord) => (ord != std::cmp::Ordering::Greater).into(),
            None => CmpBool::CmpNull,
        }
    }

    /// Three-valued greater-than.
    pub fn compare_greater_than(&self, other: &Value) -> CmpBool {
        if self.is_null() || other.is_null() {
            return CmpBool::CmpNull;
        }
        match self.partial_cmp_values(other) {
            Some(ord) => (ord == std::cmp::Ordering::Greater).into(),
            None => CmpBool::CmpNull,
        }
    }

    /// Three-valued greater-than-or-equal.
    pub fn compare_greater_than_equals(&self, other: &Value) -> CmpBool {
        if self.is_null() || other.is_null() {
            return CmpBool::CmpNull;
        }
        match self.partial_cmp_values(other) {
            Some(ord) => (ord != std::cmp::Ordering::Less).into(),
            None => CmpBool::CmpNull,
        }
    }

    /// Total order used by sort and top-n: nulls first, then by value.
    ///
    /// Distinct from the three-valued comparisons above; the sort
    /// executors need a total order to be deterministic.
    pub fn sort_cmp(&self, other: &Value) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.partial_cmp_values(other).unwrap_or(Ordering::Equal),
        }
    }

    /// Numeric addition. Null propagates.
    pub fn add(&self, other: &Value) -> Result<Value> {
        use Value::*;
        match (self, other) {
            (Null, _) | (_, Null) => Ok(Null),
            (Integer(a), Integer(b)) => Ok(Integer(a.wrapping_add(*b))),
            (Float(a), Float(b)) => Ok(Float(a + b)),
            (Integer(a), Float(b)) => Ok(Float(*a as f64 + b)),
            (Float(a), Integer(b)) => Ok(Float(a + *b as f64)),
            (a, b) => Err(QuarryError::TypeMismatch {
                expected: "numeric".to_string(),
                actual: format!("{:?} + {:?}", a.type_id(), b.type_id()),
            }),
        }
    }

    /// Numeric subtraction. Null propagates.
    pub fn subtract(&self, other: &Value) -> Result<Value> {
        use Value::*;
        match (self, other) {
            (Null, _) | (_, Null) => Ok(Null),
            (Integer(a), Integer(b)) => Ok(Integer(a.wrapping_sub(*b))),
            (Float(a), Float(b)) => Ok(Float(a - b)),
            (Integer(a), Float(b)) => Ok(Float(*a as f64 - b)),
            (Float(a), Integer(b)) => Ok(Float(a - *b as f64)),
            (a, b) => Err(QuarryError::TypeMismatch {
                expected: "numeric".to_string(),
                actual: format!("{:?} - {:?}", a.type_id(), b.type_id()),
            }),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Varchar(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals_same_type() {
        assert_eq!(
            Value::Integer(3).compare_equals(&Value::Integer(3)),
            CmpBool::CmpTrue
        );
        assert_eq!(
            Value::Integer(3).compare_equals(&Value::Integer(4)),
            CmpBool::CmpFalse
        );
        assert_eq!(
            Value::Varchar("a".into()).compare_equals(&Value::Varchar("a".into())),
            CmpBool::CmpTrue
        );
    }

    #[test]
    fn test_null_comparisons_are_null() {
        assert_eq!(
            Value::Null.compare_equals(&Value::Integer(1)),
            CmpBool::CmpNull
        );
        assert_eq!(Value::Null.compare_equals(&Value::Null), CmpBool::CmpNull);
        assert_eq!(
            Value::Integer(1).compare_less_than(&Value::Null),
            CmpBool::CmpNull
        );
    }

    #[test]
    fn test_numeric_promotion() {
        assert_eq!(
            Value::Integer(2).compare_equals(&Value::Float(2.0)),
            CmpBool::CmpTrue
        );
        assert_eq!(
            Value::Float(1.5).compare_less_than(&Value::Integer(2)),
            CmpBool::CmpTrue
        );
    }

    #[test]
    fn test_ordering_comparisons() {
        assert_eq!(
            Value::Integer(1).compare_less_than(&Value::Integer(2)),
            CmpBool::CmpTrue
        );
        assert_eq!(
            Value::Integer(2).compare_greater_than_equals(&Value::Integer(2)),
            CmpBool::CmpTrue
        );
        assert_eq!(
            Value::Varchar("a".into()).compare_less_than(&Value::Varchar("b".into())),
            CmpBool::CmpTrue
        );
    }

    #[test]
    fn test_sort_cmp_nulls_first() {
        use std::cmp::Ordering;
        assert_eq!(Value::Null.sort_cmp(&Value::Integer(1)), Ordering::Less);
        assert_eq!(Value::Integer(1).sort_cmp(&Value::Null), Ordering::Greater);
        assert_eq!(Value::Null.sort_cmp(&Value::Null), Ordering::Equal);
        assert_eq!(
            Value::Integer(5).sort_cmp(&Value::Integer(3)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_arithmetic() {
        assert!(matches!(
            Value::Integer(2).add(&Value::Integer(3)).unwrap(),
            Value::Integer(5)
        ));
        assert!(matches!(
            Value::Integer(2).subtract(&Value::Integer(3)).unwrap(),
            Value::Integer(-1)
        ));
        assert!(Value::Null.add(&Value::Integer(1)).unwrap().is_null());
        assert!(Value::Varchar("x".into()).add(&Value::Integer(1)).is_err());
    }

    #[test]
    fn test_as_cmp_bool() {
        assert_eq!(Value::Boolean(true).as_cmp_bool(), CmpBool::CmpTrue);
        assert_eq!(Value::Boolean(false).as_cmp_bool(), CmpBool::CmpFalse);
        assert_eq!(Value::Null.as_cmp_bool(), CmpBool::CmpNull);
    }
}
