//! Schema migrations using PRAGMA user_version.

pub mod v001_facts;
pub mod v002_results;

use rusqlite::Connection;
use unicorn_core::errors::StorageError;

/// Ordered `(sql, version)` pairs.
const MIGRATIONS: &[(&str, u32)] = &[
    (v001_facts::MIGRATION_SQL, 1),
    (v002_results::MIGRATION_SQL, 2),
];

/// Apply every migration newer than the database's `user_version`.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current = current_version(conn).map_err(|e| StorageError::MigrationFailed {
        version: 0,
        message: e.to_string(),
    })?;

    for (sql, version) in MIGRATIONS {
        if current >= *version {
            continue;
        }
        let failed = |e: rusqlite::Error| StorageError::MigrationFailed {
            version: *version,
            message: e.to_string(),
        };
        conn.execute_batch(&format!("BEGIN;\n{sql}\nPRAGMA user_version = {version};\nCOMMIT;"))
            .map_err(|e| {
                let _ = conn.execute_batch("ROLLBACK;");
                failed(e)
            })?;
        tracing::info!(version = version, "applied migration");
    }
    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(crate::sqlite_err)
}

pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|(_, v)| *v).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), latest_version());
        run_migrations(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), latest_version());

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('pitch_facts', 'pa_facts', 'unicorn_results', 'unicorn_top50_daily')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 4);
    }
}
