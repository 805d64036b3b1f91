use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use crate::model::{Feedback, FeedbackValue};

const COLUMNS: &str = "feedback_id, history_id, drawing_id, feedback_desc, feedback_value";

fn row_to_feedback(row: &SqliteRow) -> Result<Feedback, sqlx::Error> {
    let raw: i64 = row.try_get("feedback_value")?;
    let feedback_value = FeedbackValue::try_from(raw).map_err(|v| sqlx::Error::ColumnDecode {
        index: "feedback_value".to_string(),
        source: format!("feedback value {} out of range", v).into(),
    })?;

    Ok(Feedback {
        feedback_id: Some(row.try_get("feedback_id")?),
        history_id: row.try_get("history_id")?,
        drawing_id: row.try_get("drawing_id")?,
        feedback_desc: row.try_get("feedback_desc")?,
        feedback_value,
    })
}

/// Inserts a new row when `feedback_id` is `None`, otherwise writes the row
/// with that id (creating it if needed).
pub async fn save(conn: &mut SqliteConnection, feedback: &Feedback) -> Result<Feedback, sqlx::Error> {
    let row = match feedback.feedback_id {
        None => {
            sqlx::query(&format!(
                r#"INSERT INTO feedbacks (history_id, drawing_id, feedback_desc, feedback_value)
                   VALUES (?1, ?2, ?3, ?4)
                   RETURNING {COLUMNS}"#
            ))
            .bind(feedback.history_id)
            .bind(feedback.drawing_id)
            .bind(feedback.feedback_desc.as_deref())
            .bind(feedback.feedback_value.as_i64())
            .fetch_one(&mut *conn)
            .await?
        }
        Some(id) => {
            sqlx::query(&format!(
                r#"INSERT INTO feedbacks ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)
                   ON CONFLICT(feedback_id) DO UPDATE SET
                       history_id = excluded.history_id,
                       drawing_id = excluded.drawing_id,
                       feedback_desc = excluded.feedback_desc,
                       feedback_value = excluded.feedback_value
                   RETURNING {COLUMNS}"#
            ))
            .bind(id)
            .bind(feedback.history_id)
            .bind(feedback.drawing_id)
            .bind(feedback.feedback_desc.as_deref())
            .bind(feedback.feedback_value.as_i64())
            .fetch_one(&mut *conn)
            .await?
        }
    };

    row_to_feedback(&row)
}

pub async fn save_all(conn: &mut SqliteConnection, feedbacks: &[Feedback]) -> Result<Vec<Feedback>, sqlx::Error> {
    let mut saved = Vec::with_capacity(feedbacks.len());
    for feedback in feedbacks {
        saved.push(save(&mut *conn, feedback).await?);
    }
    Ok(saved)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Feedback>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM feedbacks WHERE feedback_id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(row_to_feedback).transpose()
}

pub async fn find_by_history_id(conn: &mut SqliteConnection, history_id: i64) -> Result<Vec<Feedback>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM feedbacks WHERE history_id = ?1 ORDER BY feedback_id"
    ))
    .bind(history_id)
    .fetch_all(&mut *conn)
    .await?;
    rows.iter().map(row_to_feedback).collect()
}

pub async fn find_by_drawing_id(conn: &mut SqliteConnection, drawing_id: i64) -> Result<Vec<Feedback>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM feedbacks WHERE drawing_id = ?1 ORDER BY feedback_id"
    ))
    .bind(drawing_id)
    .fetch_all(&mut *conn)
    .await?;
    rows.iter().map(row_to_feedback).collect()
}

pub async fn find_all(conn: &mut SqliteConnection) -> Result<Vec<Feedback>, sqlx::Error> {
    let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM feedbacks ORDER BY feedback_id"))
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(row_to_feedback).collect()
}

pub async fn delete_by_id(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM feedbacks WHERE feedback_id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Orphan removal for a history entry: drops its feedbacks not in `keep`.
pub async fn delete_orphans(
    conn: &mut SqliteConnection,
    history_id: i64,
    keep: &[i64],
) -> Result<u64, sqlx::Error> {
    let existing: Vec<i64> = sqlx::query_scalar("SELECT feedback_id FROM feedbacks WHERE history_id = ?1")
        .bind(history_id)
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

pub async fn exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM feedbacks WHERE feedback_id = ?1)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM feedbacks").fetch_one(&mut *conn).await
}
