use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::{feedback, runtime, search_data};
use crate::model::Drawing;

fn row_to_drawing(row: &SqliteRow) -> Result<Drawing, sqlx::Error> {
    Ok(Drawing::new(row.try_get("drawing_id")?, row.try_get("original_drawing")?))
}

async fn load_children(conn: &mut SqliteConnection, mut drawing: Drawing) -> Result<Drawing, sqlx::Error> {
    drawing.runtimes = runtime::find_by_drawing_id(&mut *conn, drawing.drawing_id).await?;
    drawing.search_data = search_data::find_by_drawing_id(&mut *conn, drawing.drawing_id).await?;
    drawing.feedbacks = feedback::find_by_drawing_id(&mut *conn, drawing.drawing_id).await?;
    Ok(drawing)
}

/// Upserts the drawing and cascades to its children:
/// - runtimes are upserted and unlisted runtimes of this drawing are removed
/// - search data is upserted, or removed when `search_data` is `None`
/// - listed feedbacks are written, unlisted ones stay
///
/// Returns the drawing as stored afterwards.
pub async fn save(conn: &mut SqliteConnection, drawing: &Drawing) -> Result<Drawing, sqlx::Error> {
    let row = sqlx::query(
        r#"INSERT INTO drawings (drawing_id, original_drawing) VALUES (?1, ?2)
           ON CONFLICT(drawing_id) DO UPDATE SET original_drawing = excluded.original_drawing
           RETURNING drawing_id, original_drawing"#,
    )
    .bind(drawing.drawing_id)
    .bind(&drawing.original_drawing)
    .fetch_one(&mut *conn)
    .await?;
    let stored = row_to_drawing(&row)?;
    let drawing_id = stored.drawing_id;

    let mut kept = Vec::with_capacity(drawing.runtimes.len());
    for entry in &drawing.runtimes {
        let mut entry = entry.clone();
        entry.drawing_id = drawing_id;
        kept.push(runtime::save(&mut *conn, &entry).await?.runtime_id);
    }
    let removed = runtime::delete_orphans(&mut *conn, drawing_id, &kept).await?;
    if removed > 0 {
        tracing::debug!(drawing_id, removed, "Removed orphaned runtimes");
    }

    match &drawing.search_data {
        Some(entry) => {
            let mut entry = entry.clone();
            entry.drawing_id = drawing_id;
            search_data::save(&mut *conn, &entry).await?;
        }
        None => {
            if search_data::delete_by_drawing_id(&mut *conn, drawing_id).await? > 0 {
                tracing::debug!(drawing_id, "Removed orphaned search data");
            }
        }
    }

    for entry in &drawing.feedbacks {
        let mut entry = entry.clone();
        entry.drawing_id = drawing_id;
        feedback::save(&mut *conn, &entry).await?;
    }

    load_children(conn, stored).await
}

pub async fn save_all(conn: &mut SqliteConnection, drawings: &[Drawing]) -> Result<Vec<Drawing>, sqlx::Error> {
    let mut saved = Vec::with_capacity(drawings.len());
    for drawing in drawings {
        saved.push(save(&mut *conn, drawing).await?);
    }
    Ok(saved)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Drawing>, sqlx::Error> {
    let row = sqlx::query("SELECT drawing_id, original_drawing FROM drawings WHERE drawing_id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match row {
        Some(row) => {
            let drawing = row_to_drawing(&row)?;
            Ok(Some(load_children(conn, drawing).await?))
        }
        None => Ok(None),
    }
}

pub async fn find_all(conn: &mut SqliteConnection) -> Result<Vec<Drawing>, sqlx::Error> {
    let rows = sqlx::query("SELECT drawing_id, original_drawing FROM drawings ORDER BY drawing_id")
        .fetch_all(&mut *conn)
        .await?;

    let mut drawings = Vec::with_capacity(rows.len());
    for row in &rows {
        let drawing = row_to_drawing(row)?;
        drawings.push(load_children(&mut *conn, drawing).await?);
    }
    Ok(drawings)
}

/// Runtimes, search data and feedbacks of the drawing go with it through
/// the foreign key cascade.
pub async fn delete_by_id(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM drawings WHERE drawing_id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM drawings WHERE drawing_id = ?1)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM drawings").fetch_one(&mut *conn).await
}
