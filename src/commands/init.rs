//! Initialize a new blog site

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

use crate::config::{SiteConfig, ACCESS_TOKEN_ENV, ENDPOINT_ENV};

/// Write a default `_config.yml` into `target_dir`
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        bail!("Config already exists: {:?}", config_path);
    }

    let header = format!(
        "# spacetraveling configuration\n\
         # {} and {} override prismic.api_endpoint and prismic.access_token\n\n",
        ENDPOINT_ENV, ACCESS_TOKEN_ENV
    );
    let body = serde_yaml::to_string(&SiteConfig::default())?;
    fs::write(&config_path, header + &body)?;

    Ok(())
}
