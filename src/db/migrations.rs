use anyhow::Context;
use rusqlite::Connection;

/// One schema step, identified by its file name in `migrations/`.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub name: &'static str,
    pub sql: &'static str,
}

/// Applies every migration not yet recorded in `_migrations`, in order.
pub fn run_migrations(conn: &Connection, migrations: &[Migration]) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    for migration in migrations {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [migration.name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;

        if already_applied {
            continue;
        }

        conn.execute_batch(migration.sql)
            .with_context(|| format!("failed to apply migration: {}", migration.name))?;

        conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [migration.name])
            .with_context(|| format!("failed to record migration: {}", migration.name))?;

        tracing::info!(migration = %migration.name, "applied migration");
    }

    Ok(())
}

/// Fails when any of `tables` is missing from the schema.
pub fn ensure_tables(conn: &Connection, tables: &[&str]) -> anyhow::Result<()> {
    for table in tables {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .with_context(|| format!("failed to look up table: {table}"))?;

        anyhow::ensure!(exists, "database schema is missing table `{table}`");
    }
    Ok(())
}
