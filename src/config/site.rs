//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `prismic.api_endpoint`
pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";
/// Environment variable overriding `prismic.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub timezone: String,

    // Date format (date-fns tokens)
    pub date_format: String,

    // Directory
    pub public_dir: String,

    // Listing
    pub load_more_label: String,
    pub loading_label: String,

    #[serde(default)]
    pub prismic: PrismicConfig,
    #[serde(default)]
    pub revalidate: RevalidateConfig,
    #[serde(default)]
    pub reading: ReadingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            language: "pt-BR".to_string(),
            timezone: "UTC".to_string(),

            date_format: "dd LLL yyyy".to_string(),

            public_dir: "public".to_string(),

            load_more_label: "Carregar mais posts".to_string(),
            loading_label: "Carregando...".to_string(),

            prismic: PrismicConfig::default(),
            revalidate: RevalidateConfig::default(),
            reading: ReadingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `PRISMIC_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!("Using {} from environment", ENDPOINT_ENV);
            self.prismic.api_endpoint = endpoint;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.prismic.access_token = Some(token);
        }
    }
}

/// Prismic repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismicConfig {
    pub api_endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    pub page_size: usize,
    pub listing_fields: Vec<String>,
}

impl Default for PrismicConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 2,
            listing_fields: vec![
                "title".to_string(),
                "subtitle".to_string(),
                "author".to_string(),
            ],
        }
    }
}

impl PrismicConfig {
    /// Listing fields qualified with the document type (`posts.title`)
    pub fn projected_fields(&self) -> Vec<String> {
        self.listing_fields
            .iter()
            .map(|field| {
                if field.contains('.') {
                    field.clone()
                } else {
                    format!("{}.{}", self.document_type, field)
                }
            })
            .collect()
    }
}

/// Staleness periods, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevalidateConfig {
    pub listing: u64,
    pub post: u64,
}

impl Default for RevalidateConfig {
    fn default() -> Self {
        Self {
            listing: 60,
            post: 60 * 60 * 24,
        }
    }
}

impl RevalidateConfig {
    pub fn listing(&self) -> Duration {
        Duration::from_secs(self.listing)
    }

    pub fn post(&self) -> Duration {
        Duration::from_secs(self.post)
    }
}

/// Reading time estimation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: usize,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
        }
    }
}
