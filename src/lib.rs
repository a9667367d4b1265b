//! spacetraveling: a blog front end for a Prismic content repository
//!
//! Posts are fetched from the repository, formatted for display (localized
//! dates, author fallback, reading time) and rendered with built-in Tera
//! templates, either to static files or on request by a small HTTP server.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod prismic;
pub mod provider;
pub mod server;
pub mod session;
pub mod templates;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

use prismic::PrismicClient;
use provider::DataProvider;

/// A blog site rooted at a directory
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Load the site in `base_dir`, using defaults when it has no `_config.yml`
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            public_dir,
        })
    }

    /// HTTP client for the configured repository; its master ref is never
    /// older than the listing's staleness budget
    pub fn client(&self) -> Result<PrismicClient> {
        Ok(PrismicClient::from_config(&self.config.prismic)?
            .with_ref_ttl(self.config.revalidate.listing()))
    }

    /// Page props provider backed by the configured repository
    pub fn provider(&self) -> Result<DataProvider<PrismicClient>> {
        DataProvider::new(self.client()?, self.config.clone())
    }
}
