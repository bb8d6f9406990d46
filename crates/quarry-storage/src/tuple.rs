//! Tuple representation and serialization.

use bytes::{BufMut, Bytes, BytesMut};
use quarry_common::page::PageId;
use quarry_common::{QuarryError, Result, Schema, TypeId, Value};

/// Record id: locates a tuple in the table heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rid {
    /// Page containing the tuple.
    pub page_id: PageId,
    /// Slot number within the page.
    pub slot: u16,
}

impl Rid {
    /// Creates a new record id.
    pub fn new(page_id: PageId, slot: u16) -> Self {
        Self { page_id, slot }
    }

    /// Invalid record id.
    pub const INVALID: Rid = Rid {
        page_id: PageId::INVALID,
        slot: u16::MAX,
    };

    /// Returns true if this is a valid record id.
    pub fn is_valid(&self) -> bool {
        self.page_id.is_valid()
    }
}

impl std::fmt::Display for Rid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.page_id, self.slot)
    }
}

/// Per-tuple metadata stored alongside the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TupleMeta {
    /// Whether the tuple has been deleted.
    pub is_deleted: bool,
}

/// A tuple (row) stored in the database.
///
/// The payload is a schema-driven encoding: per column a null byte
/// followed by the value (fixed width for scalars, u16 length prefix for
/// varchars). `Bytes` makes clones refcounted, so executors copy rows
/// freely.
#[derive(Debug, Clone)]
pub struct Tuple {
    /// Where this tuple lives, or `Rid::INVALID` for synthesized rows.
    pub rid: Rid,
    /// Encoded payload.
    data: Bytes,
}

impl Tuple {
    /// Creates a tuple from raw encoded bytes.
    pub fn from_bytes(rid: Rid, data: Bytes) -> Self {
        Self { rid, data }
    }

    /// Encodes a tuple from values according to the schema.
    pub fn from_values(values: &[Value], schema: &Schema) -> Result<Self> {
        debug_assert_eq!(values.len(), schema.column_count());
        let mut buf = BytesMut::new();
        for (value, column) in values.iter().zip(schema.columns()) {
            if value.is_null() {
                buf.put_u8(1);
                match column.type_id.fixed_size() {
                    Some(size) => buf.put_bytes(0, size),
                    None => buf.put_u16_le(0),
                }
                continue;
            }
            buf.put_u8(0);
            match (column.type_id, value) {
                (TypeId::Boolean, Value::Boolean(b)) => buf.put_u8(*b as u8),
                (TypeId::Integer, Value::Integer(i)) => buf.put_i64_le(*i),
                (TypeId::Float, Value::Float(x)) => buf.put_f64_le(*x),
                (TypeId::Varchar, Value::Varchar(s)) => {
                    buf.put_u16_le(s.len() as u16);
                    buf.put_slice(s.as_bytes());
                }
                (type_id, value) => {
                    return Err(QuarryError::TypeMismatch {
                        expected: type_id.to_string(),
                        actual: format!("{:?}", value.type_id()),
                    })
                }
            }
        }
        Ok(Self {
            rid: Rid::INVALID,
            data: buf.freeze(),
        })
    }

    /// Returns the encoded payload.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Decodes the value of one column.
    pub fn value_at(&self, schema: &Schema, idx: usize) -> Result<Value> {
        let mut offset = 0usize;
        for (i, column) in schema.columns().iter().enumerate() {
            let is_null = *self
                .data
                .get(offset)
                .ok_or_else(|| QuarryError::PageCorrupted("tuple truncated".to_string()))?
                == 1;
            offset += 1;
            let width = match column.type_id.fixed_size() {
                Some(size) => size,
                None => {
                    let len = u16::from_le_bytes([self.data[offset], self.data[offset + 1]]);
                    offset += 2;
                    len as usize
                }
            };
            if i == idx {
                if is_null {
                    return Ok(Value::Null);
                }
                let raw = &self.data[offset..offset + width];
                return Ok(match column.type_id {
                    TypeId::Boolean => Value::Boolean(raw[0] != 0),
                    TypeId::Integer => Value::Integer(i64::from_le_bytes(
                        raw.try_into().expect("integer width is 8"),
                    )),
                    TypeId::Float => Value::Float(f64::from_le_bytes(
                        raw.try_into().expect("float width is 8"),
                    )),
                    TypeId::Varchar => Value::Varchar(
                        std::str::from_utf8(raw)
                            .map_err(|_| {
                                QuarryError::PageCorrupted("invalid utf8 in varchar".to_string())
                            })?
                            .to_string(),
                    ),
                });
            }
            offset += width;
        }
        Err(QuarryError::Internal(format!(
            "column index {} out of range",
            idx
        )))
    }

    /// Decodes every column value.
    pub fn values(&self, schema: &Schema) -> Result<Vec<Value>> {
        (0..schema.column_count())
            .map(|i| self.value_at(schema, i))
            .collect()
    }

    /// Projects the index key columns out of this tuple.
    pub fn key_from_tuple(
        &self,
        schema: &Schema,
        key_schema: &Schema,
        key_attrs: &[usize],
    ) -> Result<Tuple> {
        let values: Vec<Value> = key_attrs
            .iter()
            .map(|&attr| self.value_at(schema, attr))
            .collect::<Result<_>>()?;
        Tuple::from_values(&values, key_schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_common::Column;

    fn sample_schema() -> Schema {
        Schema::new(vec![
            Column::new("id", TypeId::Integer),
            Column::new("name", TypeId::Varchar),
            Column::new("active", TypeId::Boolean),
            Column::new("score", TypeId::Float),
        ])
    }

    fn sample_values() -> Vec<Value> {
        vec![
            Value::Integer(42),
            Value::Varchar("hello".to_string()),
            Value::Boolean(true),
            Value::Float(2.5),
        ]
    }

    #[test]
    fn test_rid_validity() {
        assert!(Rid::new(PageId(1), 0).is_valid());
        assert!(!Rid::INVALID.is_valid());
        assert_eq!(Rid::new(PageId(3), 7).to_string(), "page:3:7");
    }

    #[test]
    fn test_codec_roundtrip() {
        let schema = sample_schema();
        let tuple = Tuple::from_values(&sample_values(), &schema).unwrap();

        assert!(matches!(
            tuple.value_at(&schema, 0).unwrap(),
            Value::Integer(42)
        ));
        match tuple.value_at(&schema, 1).unwrap() {
            Value::Varchar(s) => assert_eq!(s, "hello"),
            other => panic!("expected varchar, got {:?}", other),
        }
        assert!(matches!(
            tuple.value_at(&schema, 2).unwrap(),
            Value::Boolean(true)
        ));
        match tuple.value_at(&schema, 3).unwrap() {
            Value::Float(x) => assert_eq!(x, 2.5),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_codec_nulls() {
        let schema = sample_schema();
        let values = vec![Value::Null, Value::Null, Value::Null, Value::Null];
        let tuple = Tuple::from_values(&values, &schema).unwrap();

        for i in 0..4 {
            assert!(tuple.value_at(&schema, i).unwrap().is_null());
        }
    }

    #[test]
    fn test_values_decodes_all_columns() {
        let schema = sample_schema();
        let tuple = Tuple::from_values(&sample_values(), &schema).unwrap();
        let values = tuple.values(&schema).unwrap();
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn test_key_from_tuple() {
        let schema = sample_schema();
        let key_schema = Schema::new(vec![Column::new("id", TypeId::Integer)]);
        let tuple = Tuple::from_values(&sample_values(), &schema).unwrap();

        let key = tuple.key_from_tuple(&schema, &key_schema, &[0]).unwrap();
        assert!(matches!(
            key.value_at(&key_schema, 0).unwrap(),
            Value::Integer(42)
        ));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let schema = Schema::new(vec![Column::new("id", TypeId::Integer)]);
        let result = Tuple::from_values(&[Value::Varchar("x".to_string())], &schema);
        assert!(matches!(result, Err(QuarryError::TypeMismatch { .. })));
    }
}
