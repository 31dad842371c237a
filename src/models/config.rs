//! Configuration for the catalog backend.
//!
//! Values come from an optional YAML file, then `CATALOG__*` environment
//! variables (a `.env` file is honoured), later sources overriding earlier
//! ones. For example `CATALOG__MEDIA__ROOT_DIR=/srv/media`.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::media::MAX_UPLOAD_BYTES;
use crate::pagination::{ADMIN_PAGE_SIZE, MAX_PAGE_SIZE, PUBLIC_PAGE_SIZE};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Path of the SQLite database file.
    pub database_url: String,
    pub media: MediaConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Settings for the filesystem media store.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded images are written under.
    pub root_dir: PathBuf,
    /// Public URL prefix that serves `root_dir`.
    pub public_base_url: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

/// Default page sizes of the public and admin listings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PaginationConfig {
    #[serde(default = "default_public_page_size")]
    pub public_page_size: usize,
    #[serde(default = "default_admin_page_size")]
    pub admin_page_size: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            public_page_size: PUBLIC_PAGE_SIZE,
            admin_page_size: ADMIN_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

fn default_max_upload_bytes() -> usize {
    MAX_UPLOAD_BYTES
}

fn default_public_page_size() -> usize {
    PUBLIC_PAGE_SIZE
}

fn default_admin_page_size() -> usize {
    ADMIN_PAGE_SIZE
}

fn default_max_page_size() -> usize {
    MAX_PAGE_SIZE
}

impl CatalogConfig {
    /// Loads configuration from `path` (if given and present) and the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        // A missing .env file is normal in production.
        let _ = dotenvy::dotenv();

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(false));
        }

        let config: Self = builder
            .add_source(Environment::with_prefix("CATALOG").separator("__"))
            .build()?
            .try_deserialize()?;
        config.pagination.validate()?;
        Ok(config)
    }
}

impl PaginationConfig {
    /// Every page size must allow at least one row.
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("public_page_size", self.public_page_size),
            ("admin_page_size", self.admin_page_size),
            ("max_page_size", self.max_page_size),
        ] {
            if value == 0 {
                return Err(ConfigError::Message(format!(
                    "pagination.{name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_yaml_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database_url: catalog.db\nmedia:\n  root_dir: /tmp/media\n  public_base_url: http://localhost:3000/media\n"
        )
        .unwrap();

        let config = CatalogConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.database_url, "catalog.db");
        assert_eq!(config.media.root_dir, PathBuf::from("/tmp/media"));
        assert_eq!(config.media.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.pagination, PaginationConfig::default());
        assert_eq!(config.pagination.admin_page_size, 50);
    }

    #[test]
    fn overrides_pagination_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database_url: catalog.db\nmedia:\n  root_dir: /tmp/media\n  public_base_url: http://localhost/media\npagination:\n  public_page_size: 12\n"
        )
        .unwrap();

        let config = CatalogConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.pagination.public_page_size, 12);
        assert_eq!(config.pagination.admin_page_size, 50);
    }

    #[test]
    fn rejects_zero_page_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database_url: catalog.db\nmedia:\n  root_dir: /tmp/media\n  public_base_url: http://localhost/media\npagination:\n  max_page_size: 0\n"
        )
        .unwrap();

        let err = CatalogConfig::load(Some(file.path())).unwrap_err();

        assert!(err.to_string().contains("max_page_size"));
    }
}
