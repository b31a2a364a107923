//! Configuration module
//!
//! Configuration is read from the environment (and an optional `.env` file). Every
//! setting has a default so a bare `warehouse-api` starts against a local SQLite file.

use std::env;
use std::path::{Path, PathBuf};

use crate::models::MediaKind;

// Common constants
const SERVER_PORT: u16 = 3010;
const MAX_CONNECTIONS: u32 = 1;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const DATABASE_URL: &str = "sqlite://warehouse.db?mode=rwc";
const WAREHOUSE_DIR: &str = "./warehouse";
const IMPORT_LOG_DIR: &str = "./logs";

/// Server and database settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub request_timeout_secs: u64,
    pub environment: String,
}

/// Where each import job reads from and which files it accepts
#[derive(Clone, Debug)]
pub struct ImportConfig {
    pub image_dir: PathBuf,
    pub music_dir: PathBuf,
    pub pdf_dir: PathBuf,
    pub ppt_dir: PathBuf,
    pub log_dir: PathBuf,
    pub import_on_startup: bool,
    pub image_extensions: Vec<String>,
    pub music_extensions: Vec<String>,
    pub pdf_extensions: Vec<String>,
    pub ppt_extensions: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct WarehouseConfig {
    pub base: BaseConfig,
    pub database_url: String,
    pub import: ImportConfig,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<WarehouseConfig>);

impl Config {
    fn inner(&self) -> &WarehouseConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = WarehouseConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.inner().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.inner().base.request_timeout_secs
    }

    pub fn import(&self) -> &ImportConfig {
        &self.inner().import
    }

    pub fn import_on_startup(&self) -> bool {
        self.inner().import.import_on_startup
    }

    pub fn import_log_dir(&self) -> &Path {
        &self.inner().import.log_dir
    }

    pub fn import_dir(&self, kind: MediaKind) -> &Path {
        self.inner().import.dir(kind)
    }

    pub fn extensions(&self, kind: MediaKind) -> &[String] {
        self.inner().import.extensions(kind)
    }
}

impl ImportConfig {
    pub fn dir(&self, kind: MediaKind) -> &Path {
        match kind {
            MediaKind::Image => &self.image_dir,
            MediaKind::Music => &self.music_dir,
            MediaKind::Pdf => &self.pdf_dir,
            MediaKind::Presentation => &self.ppt_dir,
        }
    }

    pub fn extensions(&self, kind: MediaKind) -> &[String] {
        match kind {
            MediaKind::Image => &self.image_extensions,
            MediaKind::Music => &self.music_extensions,
            MediaKind::Pdf => &self.pdf_extensions,
            MediaKind::Presentation => &self.ppt_extensions,
        }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl WarehouseConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = parse_cors(&lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()));

        let base = BaseConfig {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            environment,
        };

        let warehouse_dir =
            PathBuf::from(lookup("WAREHOUSE_DIR").unwrap_or_else(|| WAREHOUSE_DIR.to_string()));
        let dir_for = |key: &str, kind: MediaKind| {
            lookup(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| warehouse_dir.join(kind.default_dir_name()))
        };
        let extensions_for = |key: &str, kind: MediaKind| {
            lookup(key)
                .map(|v| parse_list(&v))
                .unwrap_or_else(|| kind.default_extensions().iter().map(|e| e.to_string()).collect())
        };

        let import = ImportConfig {
            image_dir: dir_for("IMAGE_DIR", MediaKind::Image),
            music_dir: dir_for("MUSIC_DIR", MediaKind::Music),
            pdf_dir: dir_for("PDF_DIR", MediaKind::Pdf),
            ppt_dir: dir_for("PPT_DIR", MediaKind::Presentation),
            log_dir: PathBuf::from(
                lookup("IMPORT_LOG_DIR").unwrap_or_else(|| IMPORT_LOG_DIR.to_string()),
            ),
            import_on_startup: lookup("IMPORT_ON_STARTUP")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            image_extensions: extensions_for("IMAGE_EXTENSIONS", MediaKind::Image),
            music_extensions: extensions_for("MUSIC_EXTENSIONS", MediaKind::Music),
            pdf_extensions: extensions_for("PDF_EXTENSIONS", MediaKind::Pdf),
            ppt_extensions: extensions_for("PPT_EXTENSIONS", MediaKind::Presentation),
        };

        Ok(WarehouseConfig {
            base,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DATABASE_URL.to_string()),
            import,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a SQLite connection string (sqlite://...)"
            ));
        }

        if self.base.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }

        let environment = self.base.environment.to_lowercase();
        let is_production = environment == "production" || environment == "prod";
        if is_production && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        for kind in MediaKind::ALL {
            if self.import.extensions(kind).is_empty() {
                return Err(anyhow::anyhow!(
                    "No file extensions configured for {} imports",
                    kind
                ));
            }
        }

        Ok(())
    }
}

fn parse_cors(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
