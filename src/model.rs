//! Data model - tables, columns, values and typed records
//!
//! Table and column identifiers form a closed set. Nothing outside these
//! enums is ever interpolated into a statement:
//! - `projects(id, name, start_date, end_date)`
//! - `tasks(id, project_id, name, description, status, start_date, end_date)`

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;

use crate::{Error, Result};

/// The tables of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Projects,
    Tasks,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Projects => "projects",
            Table::Tasks => "tasks",
        }
    }

    pub fn all() -> &'static [Table] {
        &[Table::Projects, Table::Tasks]
    }

    /// Columns in schema definition order. Row values follow this order.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Table::Projects => &[Column::Id, Column::Name, Column::StartDate, Column::EndDate],
            Table::Tasks => &[
                Column::Id,
                Column::ProjectId,
                Column::Name,
                Column::Description,
                Column::Status,
                Column::StartDate,
                Column::EndDate,
            ],
        }
    }

    /// Columns supplied on insert (everything but the surrogate key)
    pub fn insertable_columns(&self) -> &'static [Column] {
        &self.columns()[1..]
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns().contains(&column)
    }

    pub fn column_index(&self, column: Column) -> Option<usize> {
        self.columns().iter().position(|c| *c == column)
    }

    /// Resolve a column name, rejecting names that do not belong to this table
    pub fn column(&self, name: &str) -> Result<Column> {
        let unknown = || Error::UnknownColumn {
            table: self.as_str().to_string(),
            column: name.to_string(),
        };
        let column: Column = name.parse().map_err(|_| unknown())?;
        if self.has_column(column) {
            Ok(column)
        } else {
            Err(unknown())
        }
    }

    /// Fail with `UnknownColumn` unless every column belongs to this table
    pub fn check_columns<'a>(&self, columns: impl IntoIterator<Item = &'a Column>) -> Result<()> {
        for column in columns {
            if !self.has_column(*column) {
                return Err(Error::UnknownColumn {
                    table: self.as_str().to_string(),
                    column: column.as_str().to_string(),
                });
            }
        }
        Ok(())
    }
}

impl FromStr for Table {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "projects" | "project" => Ok(Table::Projects),
            "tasks" | "task" => Ok(Table::Tasks),
            _ => Err(Error::UnknownTable(s.to_string())),
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
}

/// Every column known to the store, across both tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    ProjectId,
    Name,
    Description,
    Status,
    StartDate,
    EndDate,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::ProjectId => "project_id",
            Column::Name => "name",
            Column::Description => "description",
            Column::Status => "status",
            Column::StartDate => "start_date",
            Column::EndDate => "end_date",
        }
    }

    pub fn all() -> &'static [Column] {
        &[
            Column::Id,
            Column::ProjectId,
            Column::Name,
            Column::Description,
            Column::Status,
            Column::StartDate,
            Column::EndDate,
        ]
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Id | Column::ProjectId => ColumnType::Integer,
            _ => ColumnType::Text,
        }
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(Column::Id),
            "project_id" | "projekt_id" => Ok(Column::ProjectId),
            "name" | "nazwa" => Ok(Column::Name),
            "description" | "opis" => Ok(Column::Description),
            "status" => Ok(Column::Status),
            "start_date" => Ok(Column::StartDate),
            "end_date" => Ok(Column::EndDate),
            _ => Err(Error::UnknownColumn {
                table: "*".to_string(),
                column: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single cell value, bound as a statement parameter or read back from a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl FieldValue {
    /// Parse a raw string (e.g. from the command line) according to the column's type
    pub fn parse_for(column: Column, raw: &str) -> Result<Self> {
        match column.column_type() {
            ColumnType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| Error::InvalidValue {
                    column,
                    value: raw.to_string(),
                }),
            ColumnType::Text => Ok(FieldValue::Text(raw.to_string())),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Null => write!(f, ""),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Real(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            FieldValue::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            FieldValue::Integer(v) => ToSqlOutput::Borrowed(ValueRef::Integer(*v)),
            FieldValue::Real(v) => ToSqlOutput::Borrowed(ValueRef::Real(*v)),
            FieldValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl FromSql for FieldValue {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(FieldValue::Null),
            ValueRef::Integer(v) => Ok(FieldValue::Integer(v)),
            ValueRef::Real(v) => Ok(FieldValue::Real(v)),
            ValueRef::Text(_) => value.as_str().map(|s| FieldValue::Text(s.to_string())),
            ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

/// A row read back from a table; `values` follow `table.columns()` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub table: Table,
    pub values: Vec<FieldValue>,
}

impl Row {
    pub fn get(&self, column: Column) -> Option<&FieldValue> {
        self.table.column_index(column).and_then(|i| self.values.get(i))
    }

    pub fn id(&self) -> Option<i64> {
        self.get(Column::Id).and_then(FieldValue::as_i64)
    }

    fn integer(&self, column: Column) -> Result<i64> {
        self.get(column)
            .and_then(FieldValue::as_i64)
            .ok_or_else(|| self.invalid(column))
    }

    fn text(&self, column: Column) -> Result<String> {
        self.get(column)
            .and_then(FieldValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| self.invalid(column))
    }

    fn optional_text(&self, column: Column) -> Result<Option<String>> {
        match self.get(column) {
            Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Text(s)) => Ok(Some(s.clone())),
            _ => Err(self.invalid(column)),
        }
    }

    fn invalid(&self, column: Column) -> Error {
        Error::InvalidValue {
            column,
            value: self.get(column).map(|v| format!("{:?}", v)).unwrap_or_default(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.table.columns().iter().zip(&self.values) {
            map.serialize_entry(column.as_str(), value)?;
        }
        map.end()
    }
}

/// A persisted project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TryFrom<&Row> for Project {
    type Error = Error;

    fn try_from(row: &Row) -> Result<Self> {
        if row.table != Table::Projects {
            return Err(Error::UnknownTable(row.table.to_string()));
        }
        Ok(Project {
            id: row.integer(Column::Id)?,
            name: row.text(Column::Name)?,
            start_date: row.optional_text(Column::StartDate)?,
            end_date: row.optional_text(Column::EndDate)?,
        })
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
}

impl TryFrom<&Row> for Task {
    type Error = Error;

    fn try_from(row: &Row) -> Result<Self> {
        if row.table != Table::Tasks {
            return Err(Error::UnknownTable(row.table.to_string()));
        }
        Ok(Task {
            id: row.integer(Column::Id)?,
            project_id: row.integer(Column::ProjectId)?,
            name: row.text(Column::Name)?,
            description: row.optional_text(Column::Description)?,
            status: row.text(Column::Status)?,
            start_date: row.text(Column::StartDate)?,
            end_date: row.text(Column::EndDate)?,
        })
    }
}

/// Project fields for insertion (id will be set by DB)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, start_date: Option<&str>, end_date: Option<&str>) -> Self {
        Self {
            name: name.into(),
            start_date: start_date.map(str::to_string),
            end_date: end_date.map(str::to_string),
        }
    }

    /// Values in `Table::Projects.insertable_columns()` order
    pub fn values(&self) -> Vec<FieldValue> {
        vec![
            self.name.clone().into(),
            self.start_date.clone().into(),
            self.end_date.clone().into(),
        ]
    }
}

/// Task fields for insertion (id will be set by DB)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub project_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
}

impl NewTask {
    pub fn new(
        project_id: i64,
        name: impl Into<String>,
        description: Option<&str>,
        status: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            project_id,
            name: name.into(),
            description: description.map(str::to_string),
            status: status.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// Values in `Table::Tasks.insertable_columns()` order
    pub fn values(&self) -> Vec<FieldValue> {
        vec![
            self.project_id.into(),
            self.name.clone().into(),
            self.description.clone().into(),
            self.status.clone().into(),
            self.start_date.clone().into(),
            self.end_date.clone().into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_roundtrip() {
        for table in Table::all() {
            let parsed: Table = table.as_str().parse().unwrap();
            assert_eq!(*table, parsed);
        }
        assert!("users".parse::<Table>().is_err());
    }

    #[test]
    fn test_column_roundtrip() {
        for column in Column::all() {
            let parsed: Column = column.as_str().parse().unwrap();
            assert_eq!(*column, parsed);
        }
        assert_eq!("nazwa".parse::<Column>().unwrap(), Column::Name);
    }

    #[test]
    fn test_column_membership() {
        assert_eq!(Table::Tasks.column("status").unwrap(), Column::Status);
        assert!(Table::Projects.column("status").is_err());
        assert!(Table::Projects.column("name; DROP TABLE tasks").is_err());
        assert!(matches!(
            Table::Projects.check_columns(&[Column::Name, Column::ProjectId]),
            Err(Error::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_insertable_columns_skip_id() {
        assert_eq!(Table::Projects.insertable_columns().len(), 3);
        assert_eq!(Table::Tasks.insertable_columns().len(), 6);
        assert!(!Table::Tasks.insertable_columns().contains(&Column::Id));
    }

    #[test]
    fn test_parse_for_column_type() {
        assert_eq!(
            FieldValue::parse_for(Column::ProjectId, "7").unwrap(),
            FieldValue::Integer(7)
        );
        assert!(FieldValue::parse_for(Column::Id, "seven").is_err());
        assert_eq!(
            FieldValue::parse_for(Column::Status, "42").unwrap(),
            FieldValue::Text("42".to_string())
        );
    }

    #[test]
    fn test_row_to_project() {
        let row = Row {
            table: Table::Projects,
            values: vec![FieldValue::Integer(1), "A".into(), FieldValue::Null, "2020-05-13 00:00:00".into()],
        };
        let project = Project::try_from(&row).unwrap();
        assert_eq!(project.id, 1);
        assert_eq!(project.name, "A");
        assert_eq!(project.start_date, None);
        assert_eq!(project.end_date.as_deref(), Some("2020-05-13 00:00:00"));

        assert!(Task::try_from(&row).is_err());
    }

    #[test]
    fn test_row_serializes_as_map() {
        let row = Row {
            table: Table::Projects,
            values: vec![FieldValue::Integer(3), "C".into(), FieldValue::Null, FieldValue::Null],
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "C");
        assert!(json["start_date"].is_null());
    }
}
