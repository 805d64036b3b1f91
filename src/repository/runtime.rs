use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use crate::model::Runtime;

const COLUMNS: &str = "runtime_id, drawing_id, machine, machine_runtime";

fn row_to_runtime(row: &SqliteRow) -> Result<Runtime, sqlx::Error> {
    Ok(Runtime {
        runtime_id: row.try_get("runtime_id")?,
        drawing_id: row.try_get("drawing_id")?,
        machine: row.try_get("machine")?,
        machine_runtime: row.try_get("machine_runtime")?,
    })
}

/// Inserts the runtime or overwrites the row with the same id.
pub async fn save(conn: &mut SqliteConnection, runtime: &Runtime) -> Result<Runtime, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"INSERT INTO runtimes ({COLUMNS}) VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(runtime_id) DO UPDATE SET
               drawing_id = excluded.drawing_id,
               machine = excluded.machine,
               machine_runtime = excluded.machine_runtime
           RETURNING {COLUMNS}"#
    ))
    .bind(runtime.runtime_id)
    .bind(runtime.drawing_id)
    .bind(&runtime.machine)
    .bind(runtime.machine_runtime)
    .fetch_one(&mut *conn)
    .await?;

    row_to_runtime(&row)
}

pub async fn save_all(conn: &mut SqliteConnection, runtimes: &[Runtime]) -> Result<Vec<Runtime>, sqlx::Error> {
    let mut saved = Vec::with_capacity(runtimes.len());
    for runtime in runtimes {
        saved.push(save(&mut *conn, runtime).await?);
    }
    Ok(saved)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Runtime>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM runtimes WHERE runtime_id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(row_to_runtime).transpose()
}

pub async fn find_by_drawing_id(conn: &mut SqliteConnection, drawing_id: i64) -> Result<Vec<Runtime>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM runtimes WHERE drawing_id = ?1 ORDER BY runtime_id"
    ))
    .bind(drawing_id)
    .fetch_all(&mut *conn)
    .await?;
    rows.iter().map(row_to_runtime).collect()
}

pub async fn find_all(conn: &mut SqliteConnection) -> Result<Vec<Runtime>, sqlx::Error> {
    let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM runtimes ORDER BY runtime_id"))
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(row_to_runtime).collect()
}

/// Returns whether a row was removed.
pub async fn delete_by_id(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM runtimes WHERE runtime_id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Bulk delete; returns the number of removed rows.
pub async fn delete_by_drawing_id(conn: &mut SqliteConnection, drawing_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM runtimes WHERE drawing_id = ?1")
        .bind(drawing_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Orphan removal: drops the drawing's runtimes whose ids are not in `keep`.
pub async fn delete_orphans(
    conn: &mut SqliteConnection,
    drawing_id: i64,
    keep: &[i64],
) -> Result<u64, sqlx::Error> {
    let existing: Vec<i64> = sqlx::query_scalar("SELECT runtime_id FROM runtimes WHERE drawing_id = ?1")
        .bind(drawing_id)
        .fetch_all(&mut *conn)
        .await?;

    let mut removed = 0;
    for id in existing.into_iter().filter(|id| !keep.contains(id)) {
        if delete_by_id(&mut *conn, id).await? {
            removed += 1;
        }
    }
    Ok(removed)
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM runtimes").fetch_one(&mut *conn).await
}

pub async fn exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM runtimes WHERE runtime_id = ?1)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}
