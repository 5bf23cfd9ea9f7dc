//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, params_from_iter};
use serde::Serialize;
use crate::{Result, Error};
use crate::model::{Column, FieldValue, NewProject, NewTask, Project, Row, Table, Task};
use super::{query, schema};

/// SQLite-backed store for projects and tasks
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open a database file without touching the schema
    pub fn connect(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        tracing::debug!("Opened store at {}", path.display());
        Self::from_connection(conn)
    }

    /// Deleting a project leaves its tasks in place, so the store must not
    /// enforce the tasks -> projects foreign key (bundled SQLite turns it on).
    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", false)?;
        Ok(Self { conn })
    }

    /// Open a database file (creates if doesn't exist) and initialize the schema
    pub fn open(path: &Path) -> Result<Self> {
        let store = Self::connect(path)?;
        store.create_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self::from_connection(conn)?;
        store.create_schema()?;
        Ok(store)
    }

    /// Open the store at `path`, run `f`, then close the store.
    ///
    /// The handle is released on both paths; a failure from `f` takes
    /// precedence over a failure to close.
    pub fn with_store<T, F>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&Store) -> Result<T>,
    {
        let store = Self::open(path)?;
        let result = f(&store);
        let closed = store.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    /// Close the connection, reporting any error from SQLite
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Storage(e))?;
        tracing::debug!("Closed store");
        Ok(())
    }

    /// Create the projects and tasks tables if they do not exist
    pub fn create_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        tracing::info!("Schema ready: {}", Table::all().iter().map(Table::as_str).collect::<Vec<_>>().join(", "));
        Ok(())
    }

    // ========== Generic Operations ==========

    /// Insert one row from values in `table.insertable_columns()` order, returning the new id
    pub fn insert(&self, table: Table, values: &[FieldValue]) -> Result<i64> {
        let stmt = query::insert(table, values)?;
        if table == Table::Tasks {
            let index = table
                .insertable_columns()
                .iter()
                .position(|c| *c == Column::ProjectId)
                .unwrap_or(0);
            self.require_project(&values[index])?;
        }
        tracing::debug!("{}: {}", table, stmt.sql);
        self.conn.execute(&stmt.sql, params_from_iter(stmt.params))?;
        let id = self.conn.last_insert_rowid();
        tracing::info!("Inserted {} #{}", table, id);
        Ok(id)
    }

    /// Query all rows in the table
    pub fn select_all(&self, table: Table) -> Result<Vec<Row>> {
        let stmt = query::select_all(table);
        self.query_rows(table, stmt)
    }

    /// Query rows matching every `column = value` predicate
    pub fn select_where(&self, table: Table, predicates: &[(Column, FieldValue)]) -> Result<Vec<Row>> {
        let stmt = query::select_where(table, predicates)?;
        self.query_rows(table, stmt)
    }

    /// Set the given fields on the row with `id`
    pub fn update(&self, table: Table, id: i64, fields: &[(Column, FieldValue)]) -> Result<()> {
        let id_value = FieldValue::Integer(id);
        let stmt = query::update(table, &id_value, fields)?;

        if table == Table::Tasks {
            for (_, value) in fields.iter().filter(|(c, _)| *c == Column::ProjectId) {
                self.require_project(value)?;
            }
        }

        tracing::debug!("{}: {}", table, stmt.sql);
        let changed = self.conn.execute(&stmt.sql, params_from_iter(stmt.params))?;
        if changed == 0 {
            return Err(Error::RowNotFound { table, id });
        }
        tracing::info!("Updated {} #{}", table, id);
        Ok(())
    }

    /// Delete rows matching every `column = value` predicate, returning how many went
    pub fn delete_where(&self, table: Table, predicates: &[(Column, FieldValue)]) -> Result<usize> {
        let stmt = query::delete_where(table, predicates)?;
        tracing::debug!("{}: {}", table, stmt.sql);
        let deleted = self.conn.execute(&stmt.sql, params_from_iter(stmt.params))?;
        tracing::info!("Deleted {} row(s) from {}", deleted, table);
        Ok(deleted)
    }

    /// Delete all rows from table
    pub fn delete_all(&self, table: Table) -> Result<usize> {
        let stmt = query::delete_all(table);
        tracing::debug!("{}: {}", table, stmt.sql);
        let deleted = self.conn.execute(&stmt.sql, [])?;
        tracing::info!("Deleted {} row(s) from {}", deleted, table);
        Ok(deleted)
    }

    fn query_rows(&self, table: Table, stmt: query::Statement<'_>) -> Result<Vec<Row>> {
        tracing::debug!("{}: {}", table, stmt.sql);
        let width = table.columns().len();
        let mut prepared = self.conn.prepare(&stmt.sql)?;
        let rows = prepared
            .query_map(params_from_iter(stmt.params), |row| {
                let values = (0..width)
                    .map(|i| row.get::<_, FieldValue>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(Row { table, values })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // ========== Project / Task Operations ==========

    /// Create a new project, returning its id
    pub fn insert_project(&self, project: &NewProject) -> Result<i64> {
        self.insert(Table::Projects, &project.values())
    }

    /// Create a new task under an existing project, returning its id
    pub fn insert_task(&self, task: &NewTask) -> Result<i64> {
        self.insert(Table::Tasks, &task.values())
    }

    /// Whether SQLite is enforcing foreign keys on this connection
    pub fn foreign_keys_enforced(&self) -> Result<bool> {
        let enabled: bool = self.conn.pragma_query_value(None, "foreign_keys", |row| row.get(0))?;
        Ok(enabled)
    }

    /// Check whether a project with this id exists
    pub fn project_exists(&self, id: i64) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn require_project(&self, value: &FieldValue) -> Result<()> {
        let id = value.as_i64().ok_or_else(|| Error::InvalidValue {
            column: Column::ProjectId,
            value: value.to_string(),
        })?;
        if !self.project_exists(id)? {
            return Err(Error::ProjectNotFound(id));
        }
        Ok(())
    }

    /// All projects as typed records
    pub fn projects(&self) -> Result<Vec<Project>> {
        self.select_all(Table::Projects)?
            .iter()
            .map(Project::try_from)
            .collect()
    }

    /// Tasks belonging to one project
    pub fn tasks_for_project(&self, project_id: i64) -> Result<Vec<Task>> {
        self.select_where(Table::Tasks, &[(Column::ProjectId, FieldValue::Integer(project_id))])?
            .iter()
            .map(Task::try_from)
            .collect()
    }

    /// Count rows in a table
    pub fn count(&self, table: Table) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.as_str());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            projects: self.count(Table::Projects)?,
            tasks: self.count(Table::Tasks)?,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub projects: usize,
    pub tasks: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Projects: {}", self.projects)?;
        writeln!(f, "  Tasks: {}", self.tasks)
    }
}
