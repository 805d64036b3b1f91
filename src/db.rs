use sqlx::{SqliteConnection, SqlitePool};

/// Per-connection settings applied to every pooled connection.
pub async fn configure_connection(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    // Cascades depend on it, so a failure here is fatal for the connection
    sqlx::query("PRAGMA foreign_keys=ON;").execute(&mut *conn).await?;
    if let Err(e) = sqlx::query("PRAGMA busy_timeout=10000;").execute(&mut *conn).await {
        tracing::warn!("Failed to set busy_timeout: {}", e);
    }
    Ok(())
}

/// Creates the five tables and their indexes. Safe to call on every start.
///
/// Cascades live in the schema: removing a drawing removes its runtimes,
/// search data and feedbacks; removing a history entry removes its feedbacks.
pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }
    // Cascades depend on this, so fail hard
    sqlx::query("PRAGMA foreign_keys=ON;").execute(pool).await?;
    if let Err(e) = sqlx::query("PRAGMA busy_timeout=10000;").execute(pool).await {
        tracing::warn!("Failed to set busy_timeout: {}", e);
    }

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS drawings (
            drawing_id INTEGER PRIMARY KEY,
            original_drawing BLOB NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    // Array-valued features are JSON text columns
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS searchdata (
            searchdata_id INTEGER PRIMARY KEY,
            drawing_id INTEGER NOT NULL UNIQUE,
            shape TEXT NULL,
            material TEXT NULL,
            general_tolerances TEXT NULL,
            surfaces TEXT NULL,
            gdts TEXT NULL,
            threads TEXT NULL,
            outer_dimensions TEXT NULL,
            search_vector TEXT NULL,
            part_number TEXT NULL,
            ocr_text TEXT NULL,
            runtime_text TEXT NULL,
            llm_text TEXT NULL,
            llm_vector TEXT NULL,
            FOREIGN KEY(drawing_id) REFERENCES drawings(drawing_id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS runtimes (
            runtime_id INTEGER PRIMARY KEY,
            drawing_id INTEGER NOT NULL,
            machine TEXT NOT NULL,
            machine_runtime REAL NOT NULL,
            FOREIGN KEY(drawing_id) REFERENCES drawings(drawing_id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS history (
            history_id INTEGER PRIMARY KEY AUTOINCREMENT,
            query_drawing BLOB NOT NULL,
            query_path TEXT NULL,
            timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS feedbacks (
            feedback_id INTEGER PRIMARY KEY AUTOINCREMENT,
            history_id INTEGER NOT NULL,
            drawing_id INTEGER NOT NULL,
            feedback_desc TEXT NULL,
            feedback_value INTEGER NOT NULL CHECK (feedback_value IN (0, 1, 2)),
            FOREIGN KEY(history_id) REFERENCES history(history_id) ON DELETE CASCADE,
            FOREIGN KEY(drawing_id) REFERENCES drawings(drawing_id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        ("idx_runtimes_drawing", "CREATE INDEX IF NOT EXISTS idx_runtimes_drawing ON runtimes(drawing_id)"),
        ("idx_feedbacks_history", "CREATE INDEX IF NOT EXISTS idx_feedbacks_history ON feedbacks(history_id)"),
        ("idx_feedbacks_drawing", "CREATE INDEX IF NOT EXISTS idx_feedbacks_drawing ON feedbacks(drawing_id)"),
    ];

    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            match &e {
                sqlx::Error::Database(db_err) => {
                    let msg = db_err.message().to_lowercase();
                    if msg.contains("already exists") || msg.contains("duplicate") {
                        tracing::debug!("Index {} already exists, skipping", name);
                    } else {
                        tracing::warn!("Failed to create index {}: {}", name, e);
                    }
                }
                _ => {
                    tracing::warn!("Failed to create index {}: {}", name, e);
                }
            }
        }
    }

    Ok(())
}
