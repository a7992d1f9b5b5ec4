//! Configuration management
//!
//! Configuration is read from a `config.yml` file and may be overridden by
//! `BLOG_*` environment variables. Every section has defaults, so a missing
//! or empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Banner image upload configuration
    #[serde(default)]
    pub upload: UploadConfig,
    /// List pagination configuration
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Upper bound on pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "data/blog.db".to_string()
}

fn default_max_connections() -> u32 {
    10
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite (default)
    #[default]
    Sqlite,
    /// MySQL
    Mysql,
}

impl DatabaseDriver {
    /// Parse a driver name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "sqlite" => Some(Self::Sqlite),
            "mysql" => Some(Self::Mysql),
            _ => None,
        }
    }
}

/// Upload configuration for banner images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory banner images are written to
    #[serde(default = "default_upload_path")]
    pub path: PathBuf,
    /// Public URL prefix the upload directory is served under
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    /// Maximum file size in bytes (default: 5MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed image MIME types
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: default_upload_path(),
            public_prefix: default_public_prefix(),
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_public_prefix() -> String {
    "/uploads".to_string()
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/gif".to_string(),
        "image/webp".to_string(),
    ]
}

impl UploadConfig {
    /// Check if a MIME type is allowed
    pub fn is_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }

    /// Get file extension for a MIME type
    pub fn extension_for(&self, mime_type: &str) -> &'static str {
        match mime_type {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            "image/bmp" => "bmp",
            _ => "bin",
        }
    }
}

/// Pagination configuration for post listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when the request does not specify one
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Largest page size a request may ask for
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    100
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load and validate configuration from file
    ///
    /// A missing or empty file yields the default configuration. Invalid YAML
    /// is reported with its line and column.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        Ok(config)
    }

    /// Load configuration from file, then apply environment overrides
    ///
    /// Recognised variables:
    /// - BLOG_SERVER_HOST, BLOG_SERVER_PORT, BLOG_SERVER_CORS_ORIGIN
    /// - BLOG_DATABASE_DRIVER, BLOG_DATABASE_URL, BLOG_DATABASE_MAX_CONNECTIONS
    /// - BLOG_UPLOAD_PATH, BLOG_UPLOAD_MAX_FILE_SIZE
    /// - BLOG_PAGINATION_DEFAULT_PAGE_SIZE, BLOG_PAGINATION_MAX_PAGE_SIZE
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pagination.max_page_size == 0 {
            return Err(ConfigError::ValidationError(
                "pagination.max_page_size must be at least 1".to_string(),
            ));
        }
        if self.pagination.default_page_size == 0
            || self.pagination.default_page_size > self.pagination.max_page_size
        {
            return Err(ConfigError::ValidationError(format!(
                "pagination.default_page_size must be between 1 and {}",
                self.pagination.max_page_size
            )));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        let prefix = self.upload.public_prefix.trim_end_matches('/');
        if !prefix.starts_with('/') || prefix.starts_with("/api/") || prefix == "/api" {
            return Err(ConfigError::ValidationError(format!(
                "upload.public_prefix must be an absolute path outside /api, got '{}'",
                self.upload.public_prefix
            )));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("BLOG_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parsed::<u16>("BLOG_SERVER_PORT") {
            self.server.port = port;
        }
        if let Ok(cors_origin) = std::env::var("BLOG_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Some(driver) = std::env::var("BLOG_DATABASE_DRIVER")
            .ok()
            .and_then(|d| DatabaseDriver::parse(&d))
        {
            self.database.driver = driver;
        }
        if let Ok(url) = std::env::var("BLOG_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(max) = env_parsed::<u32>("BLOG_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = max;
        }

        if let Ok(path) = std::env::var("BLOG_UPLOAD_PATH") {
            self.upload.path = PathBuf::from(path);
        }
        if let Some(size) = env_parsed::<u64>("BLOG_UPLOAD_MAX_FILE_SIZE") {
            self.upload.max_file_size = size;
        }

        if let Some(size) = env_parsed::<u32>("BLOG_PAGINATION_DEFAULT_PAGE_SIZE") {
            self.pagination.default_page_size = size;
        }
        if let Some(size) = env_parsed::<u32>("BLOG_PAGINATION_MAX_PAGE_SIZE") {
            self.pagination.max_page_size = size;
        }
    }
}

/// Read and parse an environment variable, ignoring unparsable values
fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Tests touching the process environment share this lock.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        super::CONFIG_ENV_MUTEX
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn write_config(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "{}", yaml).expect("Failed to write config");
        file
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let config = Config::load(std::path::Path::new("missing_blog_config.yml")).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.driver, DatabaseDriver::Sqlite);
        assert_eq!(config.database.url, "data/blog.db");
        assert_eq!(config.upload.public_prefix, "/uploads");
        assert_eq!(config.pagination.default_page_size, 10);
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let file = write_config("   \n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.pagination.max_page_size, 100);
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let file = write_config("server:\n  port: 9090\nupload:\n  path: /var/blog/media\n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.upload.path, PathBuf::from("/var/blog/media"));
        assert_eq!(config.upload.max_file_size, 5 * 1024 * 1024);
    }

    #[test]
    fn test_load_mysql_config() {
        let file = write_config(
            "database:\n  driver: mysql\n  url: mysql://root@localhost/blog\n  max_connections: 4\n",
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.database.driver, DatabaseDriver::Mysql);
        assert_eq!(config.database.url, "mysql://root@localhost/blog");
        assert_eq!(config.database.max_connections, 4);
    }

    #[test]
    fn test_load_invalid_yaml_reports_location() {
        let file = write_config("server:\n  port: [not, a, port\n");
        let err = Config::load(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
        assert!(err.contains("line"));
    }

    #[test]
    fn test_default_page_size_above_max_rejected() {
        let file = write_config("pagination:\n  default_page_size: 50\n  max_page_size: 20\n");
        let err = Config::load(file.path()).unwrap_err().to_string();
        assert!(err.contains("default_page_size"));
    }

    #[test]
    fn test_public_prefix_must_be_absolute() {
        let file = write_config("upload:\n  public_prefix: uploads\n");
        assert!(Config::load(file.path()).is_err());

        let file = write_config("upload:\n  public_prefix: /api/v1/files\n");
        assert!(Config::load(file.path()).is_err());

        let file = write_config("upload:\n  public_prefix: /media/\n");
        assert!(Config::load(file.path()).is_ok());
    }

    #[test]
    fn test_upload_type_checks() {
        let upload = UploadConfig::default();
        assert!(upload.is_type_allowed("image/png"));
        assert!(!upload.is_type_allowed("application/pdf"));
        assert_eq!(upload.extension_for("image/jpeg"), "jpg");
        assert_eq!(upload.extension_for("text/plain"), "bin");
    }

    #[test]
    fn test_env_overrides_apply() {
        let _guard = lock_env();
        std::env::set_var("BLOG_SERVER_PORT", "7001");
        std::env::set_var("BLOG_DATABASE_DRIVER", "MySQL");
        std::env::set_var("BLOG_UPLOAD_PATH", "/tmp/blog-uploads");
        std::env::set_var("BLOG_PAGINATION_DEFAULT_PAGE_SIZE", "25");

        let config = Config::load_with_env(std::path::Path::new("missing_blog_config.yml"));

        std::env::remove_var("BLOG_SERVER_PORT");
        std::env::remove_var("BLOG_DATABASE_DRIVER");
        std::env::remove_var("BLOG_UPLOAD_PATH");
        std::env::remove_var("BLOG_PAGINATION_DEFAULT_PAGE_SIZE");

        let config = config.unwrap();
        assert_eq!(config.server.port, 7001);
        assert_eq!(config.database.driver, DatabaseDriver::Mysql);
        assert_eq!(config.upload.path, PathBuf::from("/tmp/blog-uploads"));
        assert_eq!(config.pagination.default_page_size, 25);
    }

    #[test]
    fn test_env_override_can_fix_file_value() {
        let _guard = lock_env();
        let file = write_config("pagination:\n  default_page_size: 50\n  max_page_size: 20\n");
        assert!(Config::load(file.path()).is_err());

        std::env::set_var("BLOG_PAGINATION_MAX_PAGE_SIZE", "80");
        let config = Config::load_with_env(file.path());
        std::env::remove_var("BLOG_PAGINATION_MAX_PAGE_SIZE");

        let config = config.unwrap();
        assert_eq!(config.pagination.default_page_size, 50);
        assert_eq!(config.pagination.max_page_size, 80);
    }

    #[test]
    fn test_env_override_invalid_values_ignored() {
        let _guard = lock_env();
        std::env::set_var("BLOG_SERVER_PORT", "not-a-port");
        std::env::set_var("BLOG_DATABASE_DRIVER", "postgres");

        let config = Config::load_with_env(std::path::Path::new("missing_blog_config.yml"));

        std::env::remove_var("BLOG_SERVER_PORT");
        std::env::remove_var("BLOG_DATABASE_DRIVER");

        let config = config.unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.driver, DatabaseDriver::Sqlite);
    }
}
