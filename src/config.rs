use std::path::Path;

use serde::Deserialize;

const DEFAULTS: &str = include_str!("../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Upper bound for request bodies. Drawings arrive base64-encoded.
    pub max_body_bytes: usize,
    /// Origins allowed by CORS. Empty or `"*"` means any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub directory: String,
    pub file_prefix: String,
    /// Used when `RUST_LOG` is not set.
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        match ::config::Config::builder()
            .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

impl HttpConfig {
    /// True when CORS should accept any origin.
    pub fn cors_is_permissive(&self) -> bool {
        self.cors_allowed_origins.is_empty() || self.cors_allowed_origins.iter().any(|o| o.trim() == "*")
    }
}

/// Loads the configuration: embedded defaults -> `drawing-archive.toml` ->
/// `$DRAWING_ARCHIVE_CONFIG` -> `DRAWING_ARCHIVE__*` environment variables.
pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let custom_path = std::env::var("DRAWING_ARCHIVE_CONFIG").ok();
    load_with(custom_path.as_deref())
}

/// Same layering as [`load`], with an explicit override file instead of
/// reading `DRAWING_ARCHIVE_CONFIG`.
pub fn load_with(custom_path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
        // Optional local file: drawing-archive.toml (in CWD)
        .add_source(::config::File::with_name("drawing-archive").required(false));

    if let Some(path) = custom_path {
        builder = builder.add_source(::config::File::with_name(path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(
        ::config::Environment::with_prefix("DRAWING_ARCHIVE")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("http.cors_allowed_origins")
            .try_parsing(true),
    );

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    if cfg.database.url.trim().is_empty() {
        return Err(anyhow::anyhow!("database.url must not be empty"));
    }
    if cfg.database.max_connections == 0 {
        return Err(anyhow::anyhow!("database.max_connections must be > 0"));
    }

    if cfg.http.max_body_bytes < 1024 {
        return Err(anyhow::anyhow!("http.max_body_bytes must be >= 1024"));
    }

    if cfg.logging.directory.trim().is_empty() {
        return Err(anyhow::anyhow!("logging.directory must not be empty"));
    }

    Ok(())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    let path = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"));
    if let Some(path) = path {
        if path.starts_with(":memory:") {
            return Ok(());
        }
        // Drop query parameters such as ?mode=rwc
        let path = path.split('?').next().unwrap_or(path);
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}
