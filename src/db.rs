//! SQLite cache for imported or fetched sea-level datasets

use anyhow::Result;
use rusqlite::Connection;

use crate::models::{SeriesPoint, TimeSeries};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per dataset that has been loaded into the cache
        CREATE TABLE IF NOT EXISTS datasets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source TEXT NOT NULL,
            loaded_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Yearly mean sea-level rise, rebased so the first year is zero
        CREATE TABLE IF NOT EXISTS sea_level (
            dataset_id INTEGER NOT NULL,
            year INTEGER NOT NULL,
            value_mm REAL NOT NULL,
            PRIMARY KEY (dataset_id, year)
        );

        CREATE INDEX IF NOT EXISTS idx_sea_level_dataset ON sea_level(dataset_id);
        "#,
    )?;
    Ok(())
}

/// Store a series as a new dataset, returning its id
pub fn insert_series(conn: &mut Connection, series: &TimeSeries) -> Result<i64> {
    let tx = conn.transaction()?;
    tx.execute("INSERT INTO datasets (source) VALUES (?1)", [&series.source])?;
    let dataset_id = tx.last_insert_rowid();
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO sea_level (dataset_id, year, value_mm) VALUES (?1, ?2, ?3)",
        )?;
        for point in &series.points {
            stmt.execute((dataset_id, point.year, point.value_mm))?;
        }
    }
    tx.commit()?;
    Ok(dataset_id)
}

/// Most recently stored dataset, if any
pub fn latest_series(conn: &Connection) -> Result<Option<TimeSeries>> {
    let mut stmt = conn.prepare("SELECT id, source FROM datasets ORDER BY id DESC LIMIT 1")?;
    let mut rows = stmt.query([])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };
    let dataset_id: i64 = row.get(0)?;
    let source: String = row.get(1)?;

    let mut stmt = conn.prepare(
        "SELECT year, value_mm FROM sea_level WHERE dataset_id = ?1 ORDER BY year",
    )?;
    let rows = stmt.query_map([dataset_id], |row| {
        Ok(SeriesPoint {
            year: row.get(0)?,
            value_mm: row.get(1)?,
        })
    })?;

    let mut points = Vec::new();
    for row in rows {
        points.push(row?);
    }
    if points.is_empty() {
        return Ok(None);
    }
    Ok(Some(TimeSeries::new(&source, points)?))
}

/// (id, source, point count, loaded at) for every cached dataset
pub fn list_datasets(conn: &Connection) -> Result<Vec<(i64, String, i64, String)>> {
    let mut stmt = conn.prepare(
        "SELECT d.id, d.source, COUNT(s.year), d.loaded_at
         FROM datasets d
         LEFT JOIN sea_level s ON s.dataset_id = d.id
         GROUP BY d.id
         ORDER BY d.id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Drop every cached dataset
pub fn clear_datasets(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM sea_level;
        DELETE FROM datasets;
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn empty_cache_has_no_series() {
        let conn = memory_db();
        assert!(latest_series(&conn).unwrap().is_none());
        assert!(list_datasets(&conn).unwrap().is_empty());
    }

    #[test]
    fn latest_dataset_wins() {
        let mut conn = memory_db();
        insert_series(&mut conn, &TimeSeries::embedded()).unwrap();
        let newer = TimeSeries::new(
            "import",
            vec![
                SeriesPoint { year: 2020, value_mm: 0.0 },
                SeriesPoint { year: 2021, value_mm: 3.5 },
            ],
        )
        .unwrap();
        insert_series(&mut conn, &newer).unwrap();

        assert_eq!(latest_series(&conn).unwrap(), Some(newer));
        let datasets = list_datasets(&conn).unwrap();
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0].2, 31);
        assert_eq!(datasets[1].2, 2);
    }

    #[test]
    fn clear_removes_everything() {
        let mut conn = memory_db();
        insert_series(&mut conn, &TimeSeries::embedded()).unwrap();
        clear_datasets(&conn).unwrap();
        assert!(latest_series(&conn).unwrap().is_none());
    }

    #[test]
    fn schema_init_is_idempotent() {
        let conn = memory_db();
        init_schema(&conn).unwrap();
    }
}
