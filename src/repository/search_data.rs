use sqlx::{sqlite::SqliteRow, types::Json, Row, SqliteConnection};

use crate::model::{SearchData, SearchFeatures};

const COLUMNS: &str = "searchdata_id, drawing_id, shape, material, general_tolerances, surfaces, gdts, \
    threads, outer_dimensions, search_vector, part_number, ocr_text, runtime_text, llm_text, llm_vector";

fn json_column<T>(row: &SqliteRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: serde::de::DeserializeOwned + Send + 'static,
{
    Ok(row.try_get::<Option<Json<T>>, _>(column)?.map(|json| json.0))
}

fn row_to_search_data(row: &SqliteRow) -> Result<SearchData, sqlx::Error> {
    Ok(SearchData {
        search_data_id: row.try_get("searchdata_id")?,
        drawing_id: row.try_get("drawing_id")?,
        features: SearchFeatures {
            shape: json_column(row, "shape")?,
            material: json_column(row, "material")?,
            general_tolerances: json_column(row, "general_tolerances")?,
            surfaces: json_column(row, "surfaces")?,
            gdts: json_column(row, "gdts")?,
            threads: json_column(row, "threads")?,
            outer_dimensions: json_column(row, "outer_dimensions")?,
            search_vector: json_column(row, "search_vector")?,
            part_number: row.try_get("part_number")?,
            ocr_text: json_column(row, "ocr_text")?,
            runtime_text: row.try_get("runtime_text")?,
            llm_text: row.try_get("llm_text")?,
            llm_vector: json_column(row, "llm_vector")?,
        },
    })
}

/// Inserts or overwrites by `searchdata_id`.
///
/// A drawing holds at most one entry, so a different entry already attached
/// to the same drawing is removed first.
pub async fn save(conn: &mut SqliteConnection, search_data: &SearchData) -> Result<SearchData, sqlx::Error> {
    let replaced = sqlx::query("DELETE FROM searchdata WHERE drawing_id = ?1 AND searchdata_id <> ?2")
        .bind(search_data.drawing_id)
        .bind(search_data.search_data_id)
        .execute(&mut *conn)
        .await?;
    if replaced.rows_affected() > 0 {
        tracing::debug!(
            drawing_id = search_data.drawing_id,
            search_data_id = search_data.search_data_id,
            "Replaced previous search data of drawing"
        );
    }

    let f = &search_data.features;
    let row = sqlx::query(&format!(
        r#"INSERT INTO searchdata ({COLUMNS})
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
           ON CONFLICT(searchdata_id) DO UPDATE SET
               drawing_id = excluded.drawing_id,
               shape = excluded.shape,
               material = excluded.material,
               general_tolerances = excluded.general_tolerances,
               surfaces = excluded.surfaces,
               gdts = excluded.gdts,
               threads = excluded.threads,
               outer_dimensions = excluded.outer_dimensions,
               search_vector = excluded.search_vector,
               part_number = excluded.part_number,
               ocr_text = excluded.ocr_text,
               runtime_text = excluded.runtime_text,
               llm_text = excluded.llm_text,
               llm_vector = excluded.llm_vector
           RETURNING {COLUMNS}"#
    ))
    .bind(search_data.search_data_id)
    .bind(search_data.drawing_id)
    .bind(f.shape.as_ref().map(Json))
    .bind(f.material.as_ref().map(Json))
    .bind(f.general_tolerances.as_ref().map(Json))
    .bind(f.surfaces.as_ref().map(Json))
    .bind(f.gdts.as_ref().map(Json))
    .bind(f.threads.as_ref().map(Json))
    .bind(f.outer_dimensions.as_ref().map(Json))
    .bind(f.search_vector.as_ref().map(Json))
    .bind(f.part_number.as_deref())
    .bind(f.ocr_text.as_ref().map(Json))
    .bind(f.runtime_text.as_deref())
    .bind(f.llm_text.as_deref())
    .bind(f.llm_vector.as_ref().map(Json))
    .fetch_one(&mut *conn)
    .await?;

    row_to_search_data(&row)
}

pub async fn save_all(
    conn: &mut SqliteConnection,
    entries: &[SearchData],
) -> Result<Vec<SearchData>, sqlx::Error> {
    let mut saved = Vec::with_capacity(entries.len());
    for entry in entries {
        saved.push(save(&mut *conn, entry).await?);
    }
    Ok(saved)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<SearchData>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM searchdata WHERE searchdata_id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(row_to_search_data).transpose()
}

pub async fn find_by_drawing_id(
    conn: &mut SqliteConnection,
    drawing_id: i64,
) -> Result<Option<SearchData>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM searchdata WHERE drawing_id = ?1"))
        .bind(drawing_id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(row_to_search_data).transpose()
}

pub async fn find_all(conn: &mut SqliteConnection) -> Result<Vec<SearchData>, sqlx::Error> {
    let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM searchdata ORDER BY searchdata_id"))
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(row_to_search_data).collect()
}

pub async fn delete_by_id(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM searchdata WHERE searchdata_id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_by_drawing_id(conn: &mut SqliteConnection, drawing_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM searchdata WHERE drawing_id = ?1")
        .bind(drawing_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM searchdata").fetch_one(&mut *conn).await
}

pub async fn exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM searchdata WHERE searchdata_id = ?1)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}
