use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::feedback;
use crate::model::History;

const COLUMNS: &str = "history_id, query_drawing, query_path, timestamp";

fn row_to_history(row: &SqliteRow) -> Result<History, sqlx::Error> {
    Ok(History {
        history_id: Some(row.try_get("history_id")?),
        query_drawing: row.try_get("query_drawing")?,
        query_path: row.try_get("query_path")?,
        timestamp: row.try_get("timestamp")?,
        feedbacks: Vec::new(),
    })
}

async fn load_feedbacks(conn: &mut SqliteConnection, mut history: History) -> Result<History, sqlx::Error> {
    if let Some(id) = history.history_id {
        history.feedbacks = feedback::find_by_history_id(&mut *conn, id).await?;
    }
    Ok(history)
}

/// Writes the history row and cascades its feedbacks.
///
/// Feedbacks of this entry that are no longer listed are removed.
pub async fn save(conn: &mut SqliteConnection, history: &History) -> Result<History, sqlx::Error> {
    let row = match history.history_id {
        None => {
            sqlx::query(&format!(
                r#"INSERT INTO history (query_drawing, query_path, timestamp)
                   VALUES (?1, ?2, ?3)
                   RETURNING {COLUMNS}"#
            ))
            .bind(&history.query_drawing)
            .bind(history.query_path.as_deref())
            .bind(history.timestamp)
            .fetch_one(&mut *conn)
            .await?
        }
        Some(id) => {
            sqlx::query(&format!(
                r#"INSERT INTO history ({COLUMNS}) VALUES (?1, ?2, ?3, ?4)
                   ON CONFLICT(history_id) DO UPDATE SET
                       query_drawing = excluded.query_drawing,
                       query_path = excluded.query_path,
                       timestamp = excluded.timestamp
                   RETURNING {COLUMNS}"#
            ))
            .bind(id)
            .bind(&history.query_drawing)
            .bind(history.query_path.as_deref())
            .bind(history.timestamp)
            .fetch_one(&mut *conn)
            .await?
        }
    };

    let mut saved = row_to_history(&row)?;
    let Some(history_id) = saved.history_id else {
        return Ok(saved);
    };

    let mut kept = Vec::with_capacity(history.feedbacks.len());
    for entry in &history.feedbacks {
        let mut entry = entry.clone();
        entry.history_id = history_id;
        let stored = feedback::save(&mut *conn, &entry).await?;
        if let Some(id) = stored.feedback_id {
            kept.push(id);
        }
        saved.feedbacks.push(stored);
    }

    let removed = feedback::delete_orphans(&mut *conn, history_id, &kept).await?;
    if removed > 0 {
        tracing::debug!(history_id, removed, "Removed orphaned feedbacks");
    }

    Ok(saved)
}

pub async fn save_all(conn: &mut SqliteConnection, entries: &[History]) -> Result<Vec<History>, sqlx::Error> {
    let mut saved = Vec::with_capacity(entries.len());
    for entry in entries {
        saved.push(save(&mut *conn, entry).await?);
    }
    Ok(saved)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<History>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM history WHERE history_id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match row {
        Some(row) => {
            let history = row_to_history(&row)?;
            Ok(Some(load_feedbacks(conn, history).await?))
        }
        None => Ok(None),
    }
}

pub async fn find_all(conn: &mut SqliteConnection) -> Result<Vec<History>, sqlx::Error> {
    let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM history ORDER BY history_id"))
        .fetch_all(&mut *conn)
        .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in &rows {
        let history = row_to_history(row)?;
        entries.push(load_feedbacks(&mut *conn, history).await?);
    }
    Ok(entries)
}

/// Feedbacks of the entry go with it through the foreign key cascade.
pub async fn delete_by_id(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM history WHERE history_id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM history WHERE history_id = ?1)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM history").fetch_one(&mut *conn).await
}
