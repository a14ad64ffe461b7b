//! Database schema migrations.
//!
//! Applied versions are recorded in `_migrations`. Each pending migration
//! runs in its own transaction together with its version row, so a failed
//! migration leaves the schema at the previous version.

use tokio_rusqlite::{Connection, params, rusqlite};

use super::Error;

/// Migration list: (version, SQL), in ascending version order.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_partitions.sql")),
    (2, include_str!("../../migrations/002_entries_url_index.sql")),
];

fn current_version(conn: &rusqlite::Connection) -> Result<i64, Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?)
}

fn apply(conn: &mut rusqlite::Connection, version: i64, sql: &str) -> Result<(), Error> {
    let failed = |e: rusqlite::Error| Error::MigrationFailed(format!("version {version}: {e}"));

    let tx = conn.transaction().map_err(failed)?;
    tx.execute_batch(sql).map_err(failed)?;
    tx.execute(
        "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
        params![version, chrono::Utc::now().to_rfc3339()],
    )
    .map_err(failed)?;
    tx.commit().map_err(failed)
}

/// Apply every migration newer than the recorded schema version.
///
/// # Errors
///
/// Returns [`Error::MigrationFailed`] naming the version whose SQL failed.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        let current = current_version(conn)?;
        for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
            tracing::debug!(version, "applying cache migration");
            apply(conn, version, sql)?;
        }
        Ok(())
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn table_exists(conn: &Connection, name: &'static str) -> bool {
        conn.call(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE name = ?1)",
                [name],
                |row| row.get(0),
            )
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        run(&conn).await.unwrap();

        assert!(table_exists(&conn, "partitions").await);
        assert!(table_exists(&conn, "entries").await);
    }

    #[tokio::test]
    async fn test_migrations_version_tracking() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        let latest: i64 = conn
            .call(|conn| conn.query_row("SELECT MAX(version) FROM _migrations", [], |row| row.get(0)))
            .await
            .unwrap();

        assert_eq!(latest, MIGRATIONS[MIGRATIONS.len() - 1].0);
    }

    #[tokio::test]
    async fn test_upgrades_from_first_version() {
        let conn = Connection::open_in_memory().await.unwrap();
        conn.call(|conn| -> Result<(), Error> {
            current_version(conn)?;
            apply(conn, MIGRATIONS[0].0, MIGRATIONS[0].1)
        })
        .await
        .unwrap();
        assert!(!table_exists(&conn, "idx_entries_url").await);

        run(&conn).await.unwrap();
        assert!(table_exists(&conn, "idx_entries_url").await);
    }

    #[tokio::test]
    async fn test_failed_migration_names_version() {
        let conn = Connection::open_in_memory().await.unwrap();
        let result = conn
            .call(|conn| -> Result<(), Error> {
                current_version(conn)?;
                apply(conn, 99, "CREATE TABLE broken (")
            })
            .await
            .map_err(Error::from);

        match result {
            Err(Error::MigrationFailed(msg)) => assert!(msg.contains("version 99")),
            other => panic!("expected migration failure, got {other:?}"),
        }
    }
}
