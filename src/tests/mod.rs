//! Unit and integration tests for the drawing archive.
//!
//! ## Test Modules
//!
//! - **db_tests**: schema creation and constraints
//! - **repository_tests**: SQL-level cascades and orphan removal
//! - **mapping_tests**: entity <-> DTO conversion
//! - **service_tests**: transactions, existence checks, error classification
//! - **api_tests**: HTTP endpoints end to end
//! - **error_tests**: error messages and response envelopes
//! - **config_tests**: configuration loading and validation
//!
//! Individual modules can be run with e.g. `cargo test service_tests`.

pub mod error_tests;
pub mod mapping_tests;
pub mod repository_tests;

#[cfg(test)]
pub(crate) mod fixtures {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::time::Duration;
    use tempfile::TempDir;

    use crate::model::{Drawing, Feedback, FeedbackValue, History, Runtime, SearchData, SearchFeatures};

    /// A schema-initialized database that lives as long as this value.
    pub struct TestDb {
        pub pool: SqlitePool,
        _dir: TempDir,
    }

    pub async fn setup_test_db() -> TestDb {
        let dir = TempDir::new().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("archive.db"))
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new().max_connections(8).connect_with(options).await.unwrap();
        crate::db::init_db(&pool).await.unwrap();

        TestDb { pool, _dir: dir }
    }

    pub fn runtime(runtime_id: i64, drawing_id: i64, machine: &str, machine_runtime: f64) -> Runtime {
        Runtime { runtime_id, drawing_id, machine: machine.to_string(), machine_runtime }
    }

    pub fn search_data(search_data_id: i64, drawing_id: i64) -> SearchData {
        SearchData {
            search_data_id,
            drawing_id,
            features: SearchFeatures {
                shape: Some(vec![0.25, 0.5, 0.75]),
                material: Some(vec!["S235JR".to_string(), "1.4301".to_string()]),
                general_tolerances: Some(vec!["ISO 2768-mK".to_string()]),
                surfaces: Some(vec!["Ra 3.2".to_string()]),
                gdts: None,
                threads: Some(vec!["M8x1.25".to_string()]),
                outer_dimensions: Some(vec![120.0, 80.0, 15.5]),
                search_vector: Some(vec![1.0, 0.0, -1.0]),
                part_number: Some("PN-4711".to_string()),
                ocr_text: Some(vec!["FLANGE".to_string(), "SCALE 1:2".to_string()]),
                runtime_text: Some("milling 12 min".to_string()),
                llm_text: None,
                llm_vector: Some(vec![0.125]),
            },
        }
    }

    /// Drawing with two runtimes and search data, all linked.
    pub fn drawing(drawing_id: i64) -> Drawing {
        let mut drawing = Drawing::new(drawing_id, vec![0x25, 0x50, 0x44, 0x46, drawing_id as u8]);
        drawing.runtimes = vec![
            runtime(drawing_id * 10 + 1, drawing_id, "mill", 12.5),
            runtime(drawing_id * 10 + 2, drawing_id, "lathe", 3.0),
        ];
        drawing.search_data = Some(search_data(drawing_id * 100, drawing_id));
        drawing
    }

    pub fn history(path: &str) -> History {
        History::new(vec![0xFF, 0xD8, 0xFF], Some(path.to_string()))
    }

    pub fn feedback(history_id: i64, drawing_id: i64, value: FeedbackValue) -> Feedback {
        Feedback {
            feedback_id: None,
            history_id,
            drawing_id,
            feedback_desc: Some(format!("judged {:?}", value)),
            feedback_value: value,
        }
    }
}
