//! Database schema definitions

/// SQL to create the projects table
pub const CREATE_PROJECTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    start_date TEXT,
    end_date TEXT
)
"#;

/// SQL to create the tasks table
/// `project_id` references `projects(id)`; there is no ON DELETE action
pub const CREATE_TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL,
    name TEXT(250) NOT NULL,
    description TEXT,
    status TEXT(15) NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects (id)
)
"#;

/// All schema creation statements, parents first
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![CREATE_PROJECTS_TABLE, CREATE_TASKS_TABLE]
}
