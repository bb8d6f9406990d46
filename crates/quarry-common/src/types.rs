//! Type identifiers for QuarryDB data types.

use serde::{Deserialize, Serialize};

/// Identifier for all supported column types.
///
/// Type IDs are stored in schemas and drive the tuple codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TypeId {
    Boolean = 1,
    Integer = 2,
    Float = 3,
    Varchar = 4,
}

impl TypeId {
    /// Returns the fixed byte size for this type, or None for
    /// variable-length types.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            TypeId::Boolean => Some(1),
            TypeId::Integer => Some(8),
            TypeId::Float => Some(8),
            TypeId::Varchar => None,
        }
    }

    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeId::Integer | TypeId::Float)
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TypeId::Boolean => "BOOLEAN",
            TypeId::Integer => "INTEGER",
            TypeId::Float => "FLOAT",
            TypeId::Varchar => "VARCHAR",
        };
        write!(f, "{}", name)
    }
}
