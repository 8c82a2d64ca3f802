//! Physical table model and DDL rendering

use super::column::Column;

/// Declarative shape of one warehouse table.
///
/// Rendering is deterministic: columns appear in declaration order. Both DDL
/// forms are idempotent (`IF EXISTS` / `IF NOT EXISTS`) so a schema reset can
/// be rerun against a partially created database without erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    /// Table name
    pub name: &'static str,
    /// Ordered column list
    pub columns: &'static [Column],
}

impl TableDef {
    pub const fn new(name: &'static str, columns: &'static [Column]) -> Self {
        Self { name, columns }
    }

    /// `DROP TABLE IF EXISTS` statement for this table.
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(Column::render).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.name,
            columns.join(",\n    ")
        )
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The table's primary-key column, if it has one.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_primary_key)
    }

    /// The table's sort-key column, if it has one.
    pub fn sort_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_sort_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SqlType;

    const DEMO: TableDef = TableDef::new(
        "demo",
        &[
            Column::new("id", SqlType::Integer).identity().primary_key(),
            Column::new("name", SqlType::Text),
            Column::new("seen_at", SqlType::Timestamp).not_null().sort_key(),
        ],
    );

    #[test]
    fn test_drop_sql_is_idempotent_form() {
        assert_eq!(DEMO.drop_sql(), "DROP TABLE IF EXISTS demo");
    }

    #[test]
    fn test_create_sql_renders_all_columns_in_order() {
        let sql = DEMO.create_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS demo ("));
        let id_pos = sql.find("id INTEGER IDENTITY(1,1) PRIMARY KEY").unwrap();
        let name_pos = sql.find("name TEXT").unwrap();
        let seen_pos = sql.find("seen_at TIMESTAMP NOT NULL SORTKEY").unwrap();
        assert!(id_pos < name_pos && name_pos < seen_pos);
    }

    #[test]
    fn test_key_lookups() {
        assert_eq!(DEMO.primary_key().unwrap().name, "id");
        assert_eq!(DEMO.sort_key().unwrap().name, "seen_at");
        assert!(DEMO.column("missing").is_none());
    }
}
