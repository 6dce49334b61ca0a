use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field};
use derive_new::new;

pub type CatalogRef = Arc<dyn Catalog>;

pub type TableRef = Arc<Table>;

/// The storage engine seam used by table resolution. Implementations must be safe for concurrent
/// reads because independent analysis runs share one catalog.
pub trait Catalog: fmt::Debug + Send + Sync {
    fn default_database(&self) -> &str;

    fn table(&self, database: &str, name: &str) -> Option<TableRef>;
}

/// A column of a row shape produced by a plan node. `table` is the source (or alias) the column
/// can be qualified with.
#[derive(new, Clone, PartialEq, Eq)]
pub struct Column {
    pub table: String,
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Column {
    pub fn from_arrow_field(table: &str, field: &Field) -> Self {
        Self {
            table: table.to_string(),
            name: field.name().to_string(),
            data_type: field.data_type().clone(),
            nullable: field.is_nullable(),
        }
    }

    /// Column names and qualifiers are matched case-insensitively.
    pub fn matches(&self, table: Option<&str>, name: &str) -> bool {
        let table_matched = match table {
            Some(t) => self.table.eq_ignore_ascii_case(t),
            None => true,
        };
        table_matched && self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}:{:?}", self.table, self.name, self.data_type)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Table {
    pub database: String,
    pub name: String,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(database: impl Into<String>, name: impl Into<String>, fields: Vec<Field>) -> Self {
        let name = name.into();
        let columns = fields
            .iter()
            .map(|f| Column::from_arrow_field(&name, f))
            .collect();
        Self {
            database: database.into(),
            name,
            columns,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            r#"{}.{} {{
    columns: {:?}
}}"#,
            self.database, self.name, self.columns
        )
    }
}

/// In-memory catalog, keyed by lower-cased database and table names.
#[derive(Debug, Clone)]
pub struct MemoryCatalog {
    default_database: String,
    tables: HashMap<(String, String), TableRef>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new("mydb")
    }
}

impl MemoryCatalog {
    pub fn new(default_database: impl Into<String>) -> Self {
        Self {
            default_database: default_database.into(),
            tables: HashMap::new(),
        }
    }

    pub fn add_table(&mut self, table: Table) -> TableRef {
        let key = (table.database.to_lowercase(), table.name.to_lowercase());
        let table = Arc::new(table);
        self.tables.insert(key, table.clone());
        table
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.add_table(table);
        self
    }
}

impl Catalog for MemoryCatalog {
    fn default_database(&self) -> &str {
        &self.default_database
    }

    fn table(&self, database: &str, name: &str) -> Option<TableRef> {
        self.tables
            .get(&(database.to_lowercase(), name.to_lowercase()))
            .cloned()
    }
}
