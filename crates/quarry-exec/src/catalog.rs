//! Catalog of tables and secondary indexes.

use parking_lot::RwLock;
use quarry_buffer::BufferPoolManager;
use quarry_common::{BTreeConfig, QuarryError, Result, Schema};
use quarry_storage::{BPlusTreeIndex, TableHeap};
use std::collections::HashMap;
use std::sync::Arc;

/// Identifier for a table.
pub type TableOid = u32;

/// Identifier for an index.
pub type IndexOid = u32;

/// Metadata for one table.
pub struct TableInfo {
    pub oid: TableOid,
    pub name: String,
    pub schema: Schema,
    pub table: Arc<TableHeap>,
}

/// Metadata for one secondary index.
pub struct IndexInfo {
    pub oid: IndexOid,
    pub name: String,
    pub table_name: String,
    pub key_schema: Schema,
    pub key_attrs: Vec<usize>,
    pub index: Arc<BPlusTreeIndex>,
}

struct CatalogInner {
    tables: HashMap<TableOid, Arc<TableInfo>>,
    table_names: HashMap<String, TableOid>,
    indexes: HashMap<IndexOid, Arc<IndexInfo>>,
    table_indexes: HashMap<String, Vec<IndexOid>>,
    next_table_oid: TableOid,
    next_index_oid: IndexOid,
}

/// In-memory catalog over a shared buffer pool.
pub struct Catalog {
    bpm: Arc<BufferPoolManager>,
    inner: RwLock<CatalogInner>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new(bpm: Arc<BufferPoolManager>) -> Self {
        Self {
            bpm,
            inner: RwLock::new(CatalogInner {
                tables: HashMap::new(),
                table_names: HashMap::new(),
                indexes: HashMap::new(),
                table_indexes: HashMap::new(),
                next_table_oid: 0,
                next_index_oid: 0,
            }),
        }
    }

    /// Returns the buffer pool this catalog allocates from.
    pub fn buffer_pool(&self) -> &Arc<BufferPoolManager> {
        &self.bpm
    }

    /// Creates a table with a fresh heap.
    pub fn create_table(&self, name: impl Into<String>, schema: Schema) -> Result<Arc<TableInfo>> {
        let name = name.into();
        let mut inner = self.inner.write();
        if inner.table_names.contains_key(&name) {
            return Err(QuarryError::TableAlreadyExists(name));
        }

        let table = Arc::new(TableHeap::new(Arc::clone(&self.bpm))?);
        let oid = inner.next_table_oid;
        inner.next_table_oid += 1;

        let info = Arc::new(TableInfo {
            oid,
            name: name.clone(),
            schema,
            table,
        });
        inner.tables.insert(oid, Arc::clone(&info));
        inner.table_names.insert(name.clone(), oid);
        inner.table_indexes.insert(name, Vec::new());
        Ok(info)
    }

    /// Looks up a table by oid.
    pub fn get_table(&self, oid: TableOid) -> Result<Arc<TableInfo>> {
        self.inner
            .read()
            .tables
            .get(&oid)
            .cloned()
            .ok_or_else(|| QuarryError::TableNotFound(format!("oid {}", oid)))
    }

    /// Looks up a table by name.
    pub fn get_table_by_name(&self, name: &str) -> Result<Arc<TableInfo>> {
        let inner = self.inner.read();
        let oid = inner
            .table_names
            .get(name)
            .ok_or_else(|| QuarryError::TableNotFound(name.to_string()))?;
        Ok(Arc::clone(&inner.tables[oid]))
    }

    /// Creates a secondary index on a table and backfills it from the
    /// existing rows.
    pub fn create_index(
        &self,
        index_name: impl Into<String>,
        table_name: &str,
        key_attrs: Vec<usize>,
        leaf_max_size: usize,
        internal_max_size: usize,
    ) -> Result<Arc<IndexInfo>> {
        let index_name = index_name.into();
        let table_info = self.get_table_by_name(table_name)?;

        let key_schema = Schema::new(
            key_attrs
                .iter()
                .map(|&attr| table_info.schema.column(attr).clone())
                .collect(),
        );

        // The header page is the index's serialization point for root
        // changes; allocate it up front.
        let header = self.bpm.new_page()?;
        let header_page_id = header.page_id();
        drop(header);

        let index = Arc::new(BPlusTreeIndex::new(
            Arc::clone(&self.bpm),
            key_schema.clone(),
            key_attrs.clone(),
            BTreeConfig::new(leaf_max_size, internal_max_size, header_page_id),
        )?);

        // Backfill from rows already in the heap.
        let mut iter = table_info.table.iter();
        let mut backfilled = 0usize;
        while let Some((meta, tuple)) = iter.next()? {
            if meta.is_deleted {
                continue;
            }
            let key = tuple.key_from_tuple(&table_info.schema, &key_schema, &key_attrs)?;
            index.insert_entry(&key, tuple.rid)?;
            backfilled += 1;
        }
        log::debug!("index {} backfilled {} entries", index_name, backfilled);

        let mut inner = self.inner.write();
        let oid = inner.next_index_oid;
        inner.next_index_oid += 1;
        let info = Arc::new(IndexInfo {
            oid,
            name: index_name,
            table_name: table_name.to_string(),
            key_schema,
            key_attrs,
            index,
        });
        inner.indexes.insert(oid, Arc::clone(&info));
        inner
            .table_indexes
            .entry(table_name.to_string())
            .or_default()
            .push(oid);
        Ok(info)
    }

    /// Looks up an index by oid.
    pub fn get_index(&self, oid: IndexOid) -> Result<Arc<IndexInfo>> {
        self.inner
            .read()
            .indexes
            .get(&oid)
            .cloned()
            .ok_or_else(|| QuarryError::IndexNotFound(format!("oid {}", oid)))
    }

    /// Returns every index defined on a table.
    pub fn get_table_indexes(&self, table_name: &str) -> Vec<Arc<IndexInfo>> {
        let inner = self.inner.read();
        inner
            .table_indexes
            .get(table_name)
            .map(|oids| oids.iter().map(|oid| Arc::clone(&inner.indexes[oid])).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_buffer::MemoryDiskManager;
    use quarry_common::{BufferPoolConfig, Column, TypeId, Value};
    use quarry_storage::{Tuple, TupleMeta};

    fn test_catalog() -> Catalog {
        let bpm = Arc::new(BufferPoolManager::new(
            BufferPoolConfig {
                pool_size: 64,
                replacer_k: 2,
            },
            Arc::new(MemoryDiskManager::new()),
        ));
        Catalog::new(bpm)
    }

    fn users_schema() -> Schema {
        Schema::new(vec![
            Column::new("id", TypeId::Integer),
            Column::new("name", TypeId::Varchar),
        ])
    }

    #[test]
    fn test_create_and_get_table() {
        let catalog = test_catalog();
        let info = catalog.create_table("users", users_schema()).unwrap();

        assert_eq!(info.name, "users");
        assert_eq!(catalog.get_table(info.oid).unwrap().oid, info.oid);
        assert_eq!(catalog.get_table_by_name("users").unwrap().oid, info.oid);
        assert!(catalog.get_table_by_name("missing").is_err());
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let catalog = test_catalog();
        catalog.create_table("users", users_schema()).unwrap();
        assert!(matches!(
            catalog.create_table("users", users_schema()),
            Err(QuarryError::TableAlreadyExists(_))
        ));
    }

    #[test]
    fn test_create_index_backfills() {
        let catalog = test_catalog();
        let table = catalog.create_table("users", users_schema()).unwrap();

        for id in 0i64..20 {
            let tuple = Tuple::from_values(
                &[Value::Integer(id), Value::Varchar(format!("u{}", id))],
                &table.schema,
            )
            .unwrap();
            table
                .table
                .insert_tuple(TupleMeta::default(), &tuple)
                .unwrap()
                .unwrap();
        }

        let index = catalog
            .create_index("users_id", "users", vec![0], 8, 8)
            .unwrap();

        let mut iter = index.index.scan().unwrap();
        let mut count = 0i64;
        while let Some((key, _)) = iter.next().unwrap() {
            assert_eq!(key, count);
            count += 1;
        }
        assert_eq!(count, 20);

        let listed = catalog.get_table_indexes("users");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "users_id");
        assert_eq!(catalog.get_index(index.oid).unwrap().oid, index.oid);
    }

    #[test]
    fn test_indexes_of_unknown_table_empty() {
        let catalog = test_catalog();
        assert!(catalog.get_table_indexes("nope").is_empty());
    }
}
