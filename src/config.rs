use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE: &str = "database.db";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TasktrackConfig {
    pub database: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("tasktrack.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<TasktrackConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: TasktrackConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// CLI flag first, then the config file, then `database.db`
pub fn resolve_database_path(cli: Option<&Path>, config: Option<&TasktrackConfig>) -> PathBuf {
    cli.map(Path::to_path_buf)
        .or_else(|| config.and_then(|c| c.database.as_ref()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_and_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasktrack.toml");
        std::fs::write(&path, "database = \"data/tracker.db\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.database.as_deref(), Some("data/tracker.db"));

        assert_eq!(
            resolve_database_path(None, Some(&config)),
            PathBuf::from("data/tracker.db")
        );
        assert_eq!(
            resolve_database_path(Some(Path::new("cli.db")), Some(&config)),
            PathBuf::from("cli.db")
        );
        assert_eq!(resolve_database_path(None, None), PathBuf::from(DEFAULT_DATABASE));
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("store.db");
        ensure_db_dir(&db).unwrap();
        assert!(dir.path().join("nested").is_dir());
    }
}
