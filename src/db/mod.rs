pub mod migrations;
pub mod queries;

use anyhow::Context;
use rusqlite::Connection;

use migrations::Migration;

/// Schema migrations compiled into the binary, applied in order.
pub const MIGRATIONS: &[Migration] = &[Migration {
    name: "001_initial.sql",
    sql: include_str!("../../migrations/001_initial.sql"),
}];

/// Tables every endpoint depends on.
const REQUIRED_TABLES: &[&str] = &[
    "slot_days",
    "time_slots",
    "bookings",
    "inquiries",
    "logbook",
    "artifacts",
];

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn, MIGRATIONS)?;
    migrations::ensure_tables(&conn, REQUIRED_TABLES)?;

    Ok(conn)
}
