//! File-backed store tests.

use rusqlite::Connection;
use tasktrack::{Column, Error, FieldValue, NewProject, NewTask, Store, Table};
use tempfile::TempDir;

fn table_definitions(path: &std::path::Path) -> Vec<(String, String)> {
    let conn = Connection::open(path).unwrap();
    let mut stmt = conn
        .prepare("SELECT name, sql FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap()
}

#[test]
fn test_schema_creation_twice_on_fresh_file() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("database.db");

    let store = Store::connect(&db).unwrap();
    store.create_schema().unwrap();
    store.close().unwrap();
    let first = table_definitions(&db);

    let store = Store::connect(&db).unwrap();
    store.create_schema().unwrap();
    store.close().unwrap();
    let second = table_definitions(&db);

    assert_eq!(first, second);
    let names: Vec<&str> = first.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["projects", "tasks"]);
    assert!(first[1].1.contains("FOREIGN KEY (project_id) REFERENCES projects (id)"));
}

#[test]
fn test_rows_persist_across_handles() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("database.db");

    let (project, task) = Store::with_store(&db, |store| {
        let project = store.insert_project(&NewProject::new("Czytanie książek", None, None))?;
        let task = store.insert_task(&NewTask::new(
            project,
            "Przeczytać powieść",
            Some("Przeczytać 400 stron"),
            "started",
            "2020-05-11 12:00:00",
            "2020-05-11 15:00:00",
        ))?;
        Ok((project, task))
    })
    .unwrap();

    let tasks = Store::with_store(&db, |store| store.tasks_for_project(project)).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, task);
    assert_eq!(tasks[0].description.as_deref(), Some("Przeczytać 400 stron"));
}

#[test]
fn test_with_store_returns_closure_error_and_keeps_committed_rows() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("database.db");

    let result: tasktrack::Result<()> = Store::with_store(&db, |store| {
        store.insert_project(&NewProject::new("committed", None, None))?;
        store.select_where(Table::Projects, &[])?;
        Ok(())
    });
    assert!(matches!(result, Err(Error::EmptyPredicate(_))));

    let rows = Store::with_store(&db, |store| {
        store.select_where(Table::Projects, &[(Column::Name, FieldValue::from("committed"))])
    })
    .unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_open_fails_for_unusable_path() {
    let temp = TempDir::new().unwrap();
    let missing_dir = temp.path().join("no").join("such").join("dir").join("database.db");
    assert!(matches!(Store::open(&missing_dir), Err(Error::Storage(_))));
}

#[test]
fn test_file_store_allows_deleting_referenced_project() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("database.db");

    Store::with_store(&db, |store| {
        assert!(!store.foreign_keys_enforced()?);
        let project = store.insert_project(&NewProject::new("Jazda na rowerze", None, None))?;
        store.insert_task(&NewTask::new(
            project,
            "Wycieczka rowerowa",
            None,
            "started",
            "2020-05-11 12:00:00",
            "2020-05-11 15:00:00",
        ))?;

        let deleted = store.delete_where(
            Table::Projects,
            &[(Column::Name, FieldValue::from("Jazda na rowerze"))],
        )?;
        assert_eq!(deleted, 1);
        assert_eq!(store.tasks_for_project(project)?.len(), 1);
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_connect_leaves_schema_alone() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("database.db");

    let store = Store::connect(&db).unwrap();
    store.close().unwrap();
    assert!(table_definitions(&db).is_empty());
}
