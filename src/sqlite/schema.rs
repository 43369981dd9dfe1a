//! Typed table definitions rendered to SQLite DDL.

/// Schema definition for a SQLite database
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub tables: Vec<TableDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// All `CREATE TABLE` statements, in declaration order, as one batch.
    pub fn to_sql(&self) -> String {
        self.tables
            .iter()
            .map(TableDefinition::to_sql)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn add_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn add_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn to_sql(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(ColumnDefinition::to_sql).collect();
        parts.extend(self.foreign_keys.iter().map(ForeignKey::to_sql));
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n);",
            quote_identifier(&self.name),
            parts.join(",\n  ")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
    pub default_value: Option<DefaultValue>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            constraints: Vec::new(),
            default_value: None,
        }
    }

    pub fn with_constraint(mut self, constraint: ColumnConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_default(mut self, default_value: DefaultValue) -> Self {
        self.default_value = Some(default_value);
        self
    }

    pub fn to_sql(&self) -> String {
        let mut sql = format!(
            "{} {}",
            quote_identifier(&self.name),
            self.data_type.as_sql()
        );
        for constraint in &self.constraints {
            sql.push(' ');
            sql.push_str(constraint.as_sql());
        }
        if let Some(default) = &self.default_value {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default.to_sql());
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Text,
    Real,
    /// Declared as `DATETIME`; stored with NUMERIC affinity.
    DateTime,
}

impl DataType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Text => "TEXT",
            DataType::Real => "REAL",
            DataType::DateTime => "DATETIME",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnConstraint {
    PrimaryKey,
    NotNull,
    Unique,
}

impl ColumnConstraint {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnConstraint::PrimaryKey => "PRIMARY KEY",
            ColumnConstraint::NotNull => "NOT NULL",
            ColumnConstraint::Unique => "UNIQUE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Integer(i64),
    CurrentTimestamp,
}

impl DefaultValue {
    pub fn to_sql(&self) -> String {
        match self {
            DefaultValue::Integer(v) => v.to_string(),
            DefaultValue::CurrentTimestamp => "CURRENT_TIMESTAMP".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

impl ForeignKey {
    pub fn new(
        column: impl Into<String>,
        foreign_table: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            foreign_table: foreign_table.into(),
            foreign_column: foreign_column.into(),
        }
    }

    pub fn to_sql(&self) -> String {
        format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            quote_identifier(&self.column),
            quote_identifier(&self.foreign_table),
            quote_identifier(&self.foreign_column)
        )
    }
}

/// Quote an identifier for interpolation into SQL text.
pub fn quote_identifier(identifier: &str) -> String {
    let escaped = identifier.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_identifier_escapes_embedded_quotes() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn column_renders_constraints_then_default() {
        let column = ColumnDefinition::new("stock", DataType::Integer)
            .with_constraint(ColumnConstraint::NotNull)
            .with_default(DefaultValue::Integer(0));
        assert_eq!(column.to_sql(), "\"stock\" INTEGER NOT NULL DEFAULT 0");

        let created = ColumnDefinition::new("created_at", DataType::DateTime)
            .with_default(DefaultValue::CurrentTimestamp);
        assert_eq!(
            created.to_sql(),
            "\"created_at\" DATETIME DEFAULT CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn table_renders_foreign_keys_after_columns() {
        let table = TableDefinition::new("orders")
            .add_column(
                ColumnDefinition::new("id", DataType::Integer)
                    .with_constraint(ColumnConstraint::PrimaryKey),
            )
            .add_column(ColumnDefinition::new("user_id", DataType::Integer))
            .add_foreign_key(ForeignKey::new("user_id", "users", "id"));

        assert_eq!(
            table.to_sql(),
            "CREATE TABLE IF NOT EXISTS \"orders\" (\n  \"id\" INTEGER PRIMARY KEY,\n  \"user_id\" INTEGER,\n  FOREIGN KEY (\"user_id\") REFERENCES \"users\"(\"id\")\n);"
        );
    }

    #[test]
    fn schema_looks_up_tables_by_name() {
        let schema = Schema::new()
            .add_table(TableDefinition::new("a"))
            .add_table(TableDefinition::new("b"));
        assert!(schema.table("b").is_some());
        assert!(schema.table("c").is_none());
        assert_eq!(schema.to_sql().lines().count(), 6);
    }
}
