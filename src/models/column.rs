//! Physical column model for warehouse tables

/// SQL data types used by the staging and star-schema tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    BigInt,
    Float4,
    Float8,
    Timestamp,
}

impl SqlType {
    /// Warehouse DDL spelling of the type.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Float4 => "FLOAT4",
            SqlType::Float8 => "FLOAT8",
            SqlType::Timestamp => "TIMESTAMP",
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// A single column in a physical table definition.
///
/// Columns are declared as consts, so all fields are `'static`. Constraint
/// flags are set through the const builder methods:
///
/// ```
/// use playlog_etl::models::{Column, SqlType};
///
/// const START_TIME: Column = Column::new("start_time", SqlType::Timestamp)
///     .not_null()
///     .sort_key();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name
    pub name: &'static str,
    /// Column data type
    pub sql_type: SqlType,
    /// Whether the column allows NULL values (default: true)
    pub nullable: bool,
    /// Whether this column is the table's primary key (implies NOT NULL)
    pub is_primary_key: bool,
    /// Whether this column is an auto-incrementing surrogate key
    pub is_identity: bool,
    /// Whether this column is the table's sort key
    pub is_sort_key: bool,
}

impl Column {
    /// Create a nullable, unconstrained column.
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: true,
            is_primary_key: false,
            is_identity: false,
            is_sort_key: false,
        }
    }

    /// Mark the column NOT NULL.
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark the column as the table's primary key.
    pub const fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    /// Mark the column as an auto-incrementing surrogate key.
    pub const fn identity(mut self) -> Self {
        self.is_identity = true;
        self.nullable = false;
        self
    }

    /// Mark the column as the table's sort key.
    pub const fn sort_key(mut self) -> Self {
        self.is_sort_key = true;
        self
    }

    /// Render the column's DDL fragment.
    pub fn render(&self) -> String {
        let mut ddl = format!("{} {}", self.name, self.sql_type.as_sql());
        if self.is_identity {
            ddl.push_str(" IDENTITY(1,1)");
        }
        if self.is_primary_key {
            ddl.push_str(" PRIMARY KEY");
        } else if !self.nullable {
            ddl.push_str(" NOT NULL");
        }
        if self.is_sort_key {
            ddl.push_str(" SORTKEY");
        }
        ddl
    }
}
