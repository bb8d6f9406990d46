//! Single-column integer index over the B+ tree.

use super::iterator::BPlusTreeIter;
use super::tree::BPlusTree;
use super::types::OrdComparator;
use crate::tuple::{Rid, Tuple};
use quarry_buffer::BufferPoolManager;
use quarry_common::{BTreeConfig, QuarryError, Result, Schema, Value};
use std::sync::Arc;

/// A secondary index keyed on one integer column.
///
/// Entries map the key column's value to the row's record id. The
/// underlying tree is append-only; `delete_entry` is accepted for
/// interface completeness and row visibility is governed by heap
/// tombstones.
pub struct BPlusTreeIndex {
    tree: BPlusTree<i64, Rid>,
    key_schema: Schema,
    key_attrs: Vec<usize>,
}

impl BPlusTreeIndex {
    /// Creates an index. `key_attrs` maps key columns to table columns.
    pub fn new(
        bpm: Arc<BufferPoolManager>,
        key_schema: Schema,
        key_attrs: Vec<usize>,
        config: BTreeConfig,
    ) -> Result<Self> {
        let tree = BPlusTree::new(bpm, OrdComparator::default(), config)?;
        Ok(Self {
            tree,
            key_schema,
            key_attrs,
        })
    }

    /// Returns the key schema.
    pub fn key_schema(&self) -> &Schema {
        &self.key_schema
    }

    /// Returns the key attribute mapping.
    pub fn key_attrs(&self) -> &[usize] {
        &self.key_attrs
    }

    /// Extracts the integer key from an already-projected key tuple.
    fn key_of(&self, key_tuple: &Tuple) -> Result<i64> {
        match key_tuple.value_at(&self.key_schema, 0)? {
            Value::Integer(key) => Ok(key),
            other => Err(QuarryError::TypeMismatch {
                expected: "INTEGER index key".to_string(),
                actual: format!("{:?}", other.type_id()),
            }),
        }
    }

    /// Inserts `(key, rid)`. Returns false on a duplicate key.
    pub fn insert_entry(&self, key_tuple: &Tuple, rid: Rid) -> Result<bool> {
        let key = self.key_of(key_tuple)?;
        self.tree.insert(&key, &rid)
    }

    /// Deletes an entry. The tree is append-only, so this forwards to
    /// the tree's no-op removal.
    pub fn delete_entry(&self, key_tuple: &Tuple, _rid: Rid) -> Result<()> {
        let key = self.key_of(key_tuple)?;
        self.tree.remove(&key)
    }

    /// Point lookup by already-projected key tuple.
    pub fn get_rid(&self, key_tuple: &Tuple) -> Result<Option<Rid>> {
        let key = self.key_of(key_tuple)?;
        self.tree.get_value(&key)
    }

    /// Scans the whole index in key order.
    pub fn scan(&self) -> Result<IndexIter> {
        Ok(IndexIter {
            inner: self.tree.iter()?,
        })
    }

    /// Scans from the first key >= `key`.
    pub fn scan_from(&self, key: i64) -> Result<IndexIter> {
        Ok(IndexIter {
            inner: self.tree.iter_from(&key)?,
        })
    }
}

/// Iterator over `(key, rid)` entries of an index.
pub struct IndexIter {
    inner: BPlusTreeIter<i64, Rid>,
}

impl IndexIter {
    /// Yields the next entry in key order.
    pub fn next(&mut self) -> Result<Option<(i64, Rid)>> {
        self.inner.next()
    }

    /// Returns true once the scan is exhausted.
    pub fn is_end(&self) -> bool {
        self.inner.is_end()
    }
}
