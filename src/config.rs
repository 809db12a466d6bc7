//! Configuration Management
//!
//! Loads the resource definitions and the bearer token for restadmin.

use crate::resource::registry::{RecordPath, ResourceDef, UpdateMethod, DEFAULT_READ_ONLY_FIELDS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable consulted for the bearer token
pub const TOKEN_ENV: &str = "RESTADMIN_TOKEN";

/// Base URL used by the starter configuration
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8000/api/v1";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Resources to expose
    #[serde(default)]
    pub resources: Vec<ResourceDef>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("restadmin").join("resources.yaml"))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used and a missing file yields an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        let Some(path) = Self::default_path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            tracing::debug!("No config file at {:?}", path);
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::info!(
            "Loaded {} resource definitions from {:?}",
            config.resources.len(),
            path
        );
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    /// Get effective token (CLI > environment > config file)
    pub fn effective_token(&self, cli: Option<&str>) -> Option<String> {
        resolve_token(cli, std::env::var(TOKEN_ENV).ok().as_deref(), self.token.as_deref())
    }

    /// Starter configuration for the collections behind an API gateway
    pub fn starter(gateway: &str) -> Result<Self> {
        let base = gateway.trim_end_matches('/');
        let url = |path: &str| -> Result<Url> {
            let raw = format!("{}/{}", base, path);
            Url::parse(&raw).with_context(|| format!("Invalid URL {}", raw))
        };

        let mut user_read_only: Vec<String> =
            DEFAULT_READ_ONLY_FIELDS.iter().map(|s| s.to_string()).collect();
        user_read_only.push("email".to_string());

        let resources = vec![
            ResourceDef::new("User", url("users")?)
                .with_schema_endpoint(url("admin/schema/users")?)
                .with_database("user-service")
                .with_record_path(RecordPath::IdPrefixed)
                .with_update_method(UpdateMethod::Put)
                .with_read_only_fields(user_read_only),
            ResourceDef::new("Product", url("products")?)
                .with_schema_endpoint(url("admin/schema/products")?)
                .with_database("product-service")
                .with_form_encoding(true),
            ResourceDef::new("Category", url("categories")?)
                .with_schema_endpoint(url("admin/schema/categories")?)
                .with_database("product-service"),
            ResourceDef::new("Image", url("images")?)
                .with_schema_endpoint(url("admin/schema/images")?)
                .with_database("product-service")
                .with_form_encoding(true),
            ResourceDef::new("Review", url("reviews")?)
                .with_schema_endpoint(url("admin/schema/reviews")?)
                .with_database("product-service"),
        ];

        Ok(Self {
            token: None,
            resources,
        })
    }
}

/// First non-empty token in precedence order
fn resolve_token(cli: Option<&str>, env: Option<&str>, file: Option<&str>) -> Option<String> {
    [cli, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}
