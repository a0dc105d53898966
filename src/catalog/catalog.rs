use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::buffer::buffer_pool_manager::BufferPoolManager;
use crate::catalog::schema::Schema;
use crate::common::config::{IndexOidT, TableOidT, HTABLE_BUCKET_MAX_SIZE};
use crate::common::exception::DBError;
use crate::container::extendible_hash_table::ExtendibleHashTable;
use crate::container::hash_function::HashFunction;
use crate::storage::table::table_heap::TableHeap;

/// Metadata for a registered table.
pub struct TableInfo {
    name: String,
    schema: Schema,
    table_heap: Arc<TableHeap>,
    oid: TableOidT,
}

impl TableInfo {
    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_schema(&self) -> &Schema {
        &self.schema
    }

    pub fn get_table_heap(&self) -> Arc<TableHeap> {
        Arc::clone(&self.table_heap)
    }

    pub fn get_table_oid(&self) -> TableOidT {
        self.oid
    }
}

/// Metadata for a registered index: the key it covers and the extendible
/// hash table implementing it.
pub struct IndexInfo {
    name: String,
    table_name: String,
    key_schema: Schema,
    key_attrs: Vec<usize>,
    index: Arc<ExtendibleHashTable>,
    oid: IndexOidT,
}

impl IndexInfo {
    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_table_name(&self) -> &str {
        &self.table_name
    }

    pub fn get_key_schema(&self) -> &Schema {
        &self.key_schema
    }

    pub fn get_key_attrs(&self) -> &[usize] {
        &self.key_attrs
    }

    pub fn get_index(&self) -> Arc<ExtendibleHashTable> {
        Arc::clone(&self.index)
    }

    pub fn get_index_oid(&self) -> IndexOidT {
        self.oid
    }
}

/// Registry of tables and their indexes.
pub struct Catalog {
    bpm: Arc<BufferPoolManager>,
    tables: HashMap<TableOidT, Arc<TableInfo>>,
    table_names: HashMap<String, TableOidT>,
    indexes: HashMap<IndexOidT, Arc<IndexInfo>>,
    index_names: HashMap<String, Vec<IndexOidT>>,
    next_table_oid: TableOidT,
    next_index_oid: IndexOidT,
}

impl Catalog {
    pub fn new(bpm: Arc<BufferPoolManager>) -> Self {
        Self {
            bpm,
            tables: HashMap::new(),
            table_names: HashMap::new(),
            indexes: HashMap::new(),
            index_names: HashMap::new(),
            next_table_oid: 0,
            next_index_oid: 0,
        }
    }

    pub fn create_table(&mut self, name: &str, schema: Schema) -> Result<Arc<TableInfo>, DBError> {
        if self.table_names.contains_key(name) {
            return Err(DBError::Execution(format!("table {} already exists", name)));
        }
        let oid = self.next_table_oid;
        self.next_table_oid += 1;

        let info = Arc::new(TableInfo {
            name: name.to_string(),
            schema,
            table_heap: Arc::new(TableHeap::new()),
            oid,
        });
        self.tables.insert(oid, Arc::clone(&info));
        self.table_names.insert(name.to_string(), oid);
        debug!("created table '{}' (oid {})", name, oid);
        Ok(info)
    }

    pub fn get_table(&self, oid: TableOidT) -> Option<Arc<TableInfo>> {
        self.tables.get(&oid).cloned()
    }

    pub fn get_table_by_name(&self, name: &str) -> Option<Arc<TableInfo>> {
        self.table_names.get(name).and_then(|oid| self.get_table(*oid))
    }

    /// Creates an extendible hash index over one key column of an existing
    /// table and backfills it from the rows already stored.
    pub fn create_index(
        &mut self,
        index_name: &str,
        table_name: &str,
        key_attr: usize,
    ) -> Result<Arc<IndexInfo>, DBError> {
        let table_info = self
            .get_table_by_name(table_name)
            .ok_or_else(|| DBError::TableNotFound(table_name.to_string()))?;
        let schema = table_info.get_schema();
        if key_attr >= schema.get_column_count() {
            return Err(DBError::Execution(format!(
                "key column {} out of range for table {}",
                key_attr, table_name
            )));
        }
        let key_schema = Schema::copy_schema(schema, &[key_attr]);

        let index = Arc::new(ExtendibleHashTable::new(
            index_name,
            Arc::clone(&self.bpm),
            HashFunction::new(),
            HTABLE_BUCKET_MAX_SIZE,
        )?);

        // Backfill from the existing heap contents.
        for (_, tuple) in table_info.get_table_heap().iter() {
            index.insert(tuple.get_value(key_attr), tuple.get_rid(), None);
        }

        let oid = self.next_index_oid;
        self.next_index_oid += 1;
        let info = Arc::new(IndexInfo {
            name: index_name.to_string(),
            table_name: table_name.to_string(),
            key_schema,
            key_attrs: vec![key_attr],
            index,
            oid,
        });
        self.indexes.insert(oid, Arc::clone(&info));
        self.index_names
            .entry(table_name.to_string())
            .or_default()
            .push(oid);
        debug!("created index '{}' on {}.{}", index_name, table_name, key_attr);
        Ok(info)
    }

    /// Every index declared on the named table.
    pub fn get_table_indexes(&self, table_name: &str) -> Vec<Arc<IndexInfo>> {
        self.index_names
            .get(table_name)
            .map(|oids| {
                oids.iter()
                    .filter_map(|oid| self.indexes.get(oid).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}
