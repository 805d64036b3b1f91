use std::sync::Arc;

use crate::config::AppConfig;
use crate::mapping::DtoMapper;
use crate::service::{DrawingService, FeedbackService, HistoryService, RuntimeService, SearchDataService};

/// The shared application state.
///
/// Every service holds its own handle to the same pool; cloning the state is
/// cheap and is what axum does per request.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool, used directly by the readiness probe.
    pub db: sqlx::SqlitePool,
    pub config: Arc<AppConfig>,
    /// Entity <-> DTO conversion, including parent lookups.
    pub mapper: DtoMapper,
    pub drawings: DrawingService,
    pub runtimes: RuntimeService,
    pub search_data: SearchDataService,
    pub feedbacks: FeedbackService,
    pub history: HistoryService,
}

impl AppState {
    /// Wires the mapper and all services to `db`.
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        Self {
            mapper: DtoMapper::new(db.clone()),
            drawings: DrawingService::new(db.clone()),
            runtimes: RuntimeService::new(db.clone()),
            search_data: SearchDataService::new(db.clone()),
            feedbacks: FeedbackService::new(db.clone()),
            history: HistoryService::new(db.clone()),
            config: Arc::new(config),
            db,
        }
    }
}
