use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use tracing::debug;

use crate::app_dirs::AppDirs;
use crate::workout::{Intensity, NewWorkout, Workout};

const DATE_FMT: &str = "%Y-%m-%d";

/// SQLite-backed workout store. Single writer by construction: the app is
/// single-threaded and local-only.
#[derive(Debug)]
pub struct WorkoutStore {
    conn: Connection,
}

impl WorkoutStore {
    /// Open the store at the default state-dir location, creating the
    /// schema (and parent directories) if needed.
    pub fn open_default() -> Result<Self> {
        let db_path = AppDirs::db_path().context("could not resolve a data directory")?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        Self::open(&db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("opening {}", path.as_ref().display()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Ephemeral store for tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                duration_min REAL NOT NULL,
                intensity INTEGER NOT NULL,
                load REAL NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_workouts_date ON workouts(date)",
            [],
        )?;

        Ok(())
    }

    /// Insert a workout; the load column is derived here, never taken
    /// from the caller.
    pub fn add(&self, workout: &NewWorkout) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO workouts (date, duration_min, intensity, load) VALUES (?1, ?2, ?3, ?4)",
            params![
                workout.date.format(DATE_FMT).to_string(),
                workout.duration_min,
                workout.intensity.multiplier(),
                workout.load(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, load = workout.load(), "workout added");
        Ok(id)
    }

    /// Overwrite the editable fields of a record, recomputing the load at
    /// save time so a stale value cannot survive an edit. Returns whether
    /// a row was touched.
    pub fn update(&self, id: i64, fields: &NewWorkout) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE workouts SET date = ?1, duration_min = ?2, intensity = ?3, load = ?4 WHERE id = ?5",
            params![
                fields.date.format(DATE_FMT).to_string(),
                fields.duration_min,
                fields.intensity.multiplier(),
                fields.load(),
                id,
            ],
        )?;
        debug!(id, changed, "workout updated");
        Ok(changed > 0)
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM workouts WHERE id = ?1", params![id])?;
        debug!(id, changed, "workout deleted");
        Ok(changed > 0)
    }

    pub fn get(&self, id: i64) -> Result<Option<Workout>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, duration_min, intensity, load FROM workouts WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], row_to_workout)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// All workouts, most recent day first; same-day entries keep a
    /// stable id order.
    pub fn query_all(&self) -> Result<Vec<Workout>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, duration_min, intensity, load FROM workouts ORDER BY date DESC, id ASC",
        )?;

        let rows = stmt.query_map([], row_to_workout)?;
        let mut workouts = Vec::new();
        for row in rows {
            workouts.push(row?);
        }
        Ok(workouts)
    }
}

fn row_to_workout(row: &rusqlite::Row<'_>) -> rusqlite::Result<Workout> {
    let date_str: String = row.get(1)?;
    let date = NaiveDate::parse_from_str(&date_str, DATE_FMT).map_err(|_| {
        rusqlite::Error::InvalidColumnType(1, "date".to_string(), rusqlite::types::Type::Text)
    })?;

    let intensity_raw: u8 = row.get(3)?;
    let intensity = Intensity::from_multiplier(intensity_raw).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(
            3,
            "intensity".to_string(),
            rusqlite::types::Type::Integer,
        )
    })?;

    Ok(Workout {
        id: row.get(0)?,
        date,
        duration_min: row.get(2)?,
        intensity,
        load: row.get(4)?,
    })
}
