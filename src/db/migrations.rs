//! Additive schema migrations, run on every startup.
//!
//! Each step names the column it introduces, checks its own precondition via
//! `PRAGMA table_info`, and is a no-op once the schema is current. Steps run
//! in a fixed order because later ones backfill from columns earlier ones
//! guarantee. Nothing here ever removes data; the only destructive-looking
//! path is the shadow-table rebuild, which copies every row before dropping
//! the original.

use crate::errors::{Error, Result};
use rusqlite::Connection;
use tracing::{debug, info, instrument, warn};

struct Migration {
    name: &'static str,
    apply: fn(&Connection) -> Result<()>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "reminders_category",
        apply: add_reminder_category,
    },
    Migration {
        name: "reminders_status",
        apply: add_reminder_status,
    },
    Migration {
        name: "reminders_paid",
        apply: add_reminder_paid,
    },
    Migration {
        name: "goals_progress",
        apply: add_goal_progress,
    },
];

#[instrument(skip(conn))]
pub(crate) fn run_migrations(conn: &Connection) -> Result<()> {
    for migration in MIGRATIONS {
        debug!("Checking migration '{}'", migration.name);
        (migration.apply)(conn)
            .map_err(|e| Error::Schema(format!("Migration '{}' failed: {e}", migration.name)))?;
    }
    info!("Schema migrations are up to date.");
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn add_reminder_category(conn: &Connection) -> Result<()> {
    if column_exists(conn, "reminders", "category")? {
        debug!("Category column already exists in reminders table");
        return Ok(());
    }
    info!("Adding category column to reminders table");
    match conn.execute(
        "ALTER TABLE reminders ADD COLUMN category TEXT NOT NULL DEFAULT 'General'",
        [],
    ) {
        Ok(_) => {
            info!("Successfully added category column to reminders table");
            Ok(())
        }
        Err(e) => {
            // A locked store can refuse the in-place ALTER; rebuild through
            // a shadow table instead, carrying every row across.
            warn!(
                "Failed to add category column in place ({}); rebuilding reminders table",
                e
            );
            rebuild_reminders_with_category(conn)
        }
    }
}

fn rebuild_reminders_with_category(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;
        CREATE TABLE reminders_new (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL DEFAULT 'General',
            due_date TEXT NOT NULL,
            paid INTEGER NOT NULL DEFAULT 0
        );
        INSERT INTO reminders_new (id, name, amount, due_date, paid)
            SELECT id, name, amount, due_date, paid FROM reminders;
        DROP TABLE reminders;
        ALTER TABLE reminders_new RENAME TO reminders;
        COMMIT;",
    )
    .map_err(|e| Error::Storage(format!("Failed to rebuild reminders table: {e}")))?;
    info!("Recreated reminders table with category column");
    Ok(())
}

fn add_reminder_status(conn: &Connection) -> Result<()> {
    if column_exists(conn, "reminders", "status")? {
        debug!("Status column already exists in reminders table");
        return Ok(());
    }
    info!("Adding status column to reminders table");
    conn.execute(
        "ALTER TABLE reminders ADD COLUMN status TEXT NOT NULL DEFAULT 'Pending'",
        [],
    )?;
    if column_exists(conn, "reminders", "paid")? {
        let updated = conn.execute(
            "UPDATE reminders SET status = CASE WHEN paid = 1 THEN 'Paid' ELSE 'Pending' END",
            [],
        )?;
        info!("Backfilled status from paid flag on {} reminders", updated);
    }
    Ok(())
}

fn add_reminder_paid(conn: &Connection) -> Result<()> {
    if column_exists(conn, "reminders", "paid")? {
        debug!("Paid column already exists in reminders table");
        return Ok(());
    }
    info!("Adding paid column to reminders table");
    conn.execute(
        "ALTER TABLE reminders ADD COLUMN paid INTEGER NOT NULL DEFAULT 0",
        [],
    )?;
    let updated = conn.execute(
        "UPDATE reminders SET paid = CASE WHEN status = 'Paid' THEN 1 ELSE 0 END",
        [],
    )?;
    info!("Backfilled paid from status on {} reminders", updated);
    Ok(())
}

fn add_goal_progress(conn: &Connection) -> Result<()> {
    if column_exists(conn, "goals", "progress")? {
        debug!("Progress column already exists in goals table");
        return Ok(());
    }
    info!("Adding progress column to goals table");
    conn.execute(
        "ALTER TABLE goals ADD COLUMN progress REAL NOT NULL DEFAULT 0.0",
        [],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    // Reminders and goals tables as the first released schema shipped them:
    // no category/status on reminders, no progress on goals.
    fn setup_legacy_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE reminders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                amount REAL NOT NULL,
                due_date TEXT NOT NULL,
                paid INTEGER NOT NULL
            );
            CREATE TABLE goals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                target_date TEXT NOT NULL
            );",
        )
        .unwrap();
        conn
    }

    fn reminder_columns(conn: &Connection) -> Vec<String> {
        let mut stmt = conn.prepare("PRAGMA table_info(reminders)").unwrap();
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        columns
    }

    #[test]
    fn migrates_legacy_schema_and_backfills() {
        let conn = setup_legacy_db();
        conn.execute(
            "INSERT INTO reminders (name, amount, due_date, paid) VALUES (?1, ?2, ?3, ?4)",
            params!["Rent", 900.0, "2026-06-01", 1],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO reminders (name, amount, due_date, paid) VALUES (?1, ?2, ?3, ?4)",
            params!["Water", 40.0, "2026-06-10", 0],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO goals (name, amount, category, target_date) VALUES (?1, ?2, ?3, ?4)",
            params!["Vacation", 1500.0, "Entertainment", "2026-12-01"],
        )
        .unwrap();

        run_migrations(&conn).unwrap();

        let columns = reminder_columns(&conn);
        for expected in ["category", "status", "paid"] {
            assert!(columns.contains(&expected.to_string()), "missing {expected}");
        }

        // Status derived from the pre-existing paid flag, category defaulted.
        let (category, status): (String, String) = conn
            .query_row(
                "SELECT category, status FROM reminders WHERE name = 'Rent'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(category, "General");
        assert_eq!(status, "Paid");

        let status: String = conn
            .query_row(
                "SELECT status FROM reminders WHERE name = 'Water'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(status, "Pending");

        let progress: f64 = conn
            .query_row(
                "SELECT progress FROM goals WHERE name = 'Vacation'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(progress, 0.0);
    }

    #[test]
    fn running_twice_is_a_noop() {
        let conn = setup_legacy_db();
        conn.execute(
            "INSERT INTO reminders (name, amount, due_date, paid) VALUES (?1, ?2, ?3, ?4)",
            params!["Internet", 60.0, "2026-07-01", 0],
        )
        .unwrap();

        run_migrations(&conn).unwrap();
        let columns_after_first = reminder_columns(&conn);
        run_migrations(&conn).unwrap();
        let columns_after_second = reminder_columns(&conn);

        assert_eq!(columns_after_first, columns_after_second);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM reminders", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn shadow_rebuild_preserves_all_rows() {
        let conn = setup_legacy_db();
        conn.execute(
            "INSERT INTO reminders (name, amount, due_date, paid) VALUES (?1, ?2, ?3, ?4)",
            params!["Rent", 900.0, "2026-06-01", 1],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO reminders (name, amount, due_date, paid) VALUES (?1, ?2, ?3, ?4)",
            params!["Power", 80.0, "2026-06-15", 0],
        )
        .unwrap();

        rebuild_reminders_with_category(&conn).unwrap();

        assert!(column_exists(&conn, "reminders", "category").unwrap());
        let rows: Vec<(i64, String, f64, String, i64)> = conn
            .prepare("SELECT id, name, amount, due_date, paid FROM reminders ORDER BY id")
            .unwrap()
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            })
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1, "Rent");
        assert_eq!(rows[0].4, 1);
        assert_eq!(rows[1].1, "Power");

        let category: String = conn
            .query_row(
                "SELECT category FROM reminders WHERE name = 'Rent'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(category, "General");
    }

    #[test]
    fn fresh_schema_needs_no_migration() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::schema::create_tables(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let columns = reminder_columns(&conn);
        let category_count = columns.iter().filter(|c| c.as_str() == "category").count();
        assert_eq!(category_count, 1, "no duplicate columns");
    }
}
