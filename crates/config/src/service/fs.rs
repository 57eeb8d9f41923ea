use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use campusgate_model::{BoxError, Config};

use crate::service::{
    config_format::{ConfigFormat, Json, Toml},
    Retrieve,
};

/// # Filesystem Configuration Backend
///
/// The whole configuration lives in a single file, e.g. `config.toml` or `config.json`.
#[derive(Debug, Clone)]
pub struct Fs<F> {
    pub path: Arc<Path>,
    pub format: F,
}

impl<F> Fs<F>
where
    F: ConfigFormat,
{
    pub fn new(path: impl AsRef<Path>, format: F) -> Self {
        Self {
            path: Arc::from(path.as_ref()),
            format,
        }
    }

    pub async fn collect_config(&self) -> Result<Config, BoxError> {
        tracing::debug!(path = ?self.path, "[Cg.Config] retrieve config");
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| format!("fail to read config file {}: {e}", self.path.display()))?;
        let config: Config = self.format.de(&bytes)?;
        tracing::trace!("config: {config:?}");
        Ok(config)
    }

    pub async fn save_config(&self, config: &Config) -> Result<(), BoxError> {
        let bytes = self.format.ser(config)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

impl<F> Retrieve for Fs<F>
where
    F: ConfigFormat + Send + Sync,
{
    async fn retrieve_config(&self) -> Result<Config, BoxError> {
        self.collect_config().await
    }
}

/// A file backend whose format follows the file extension, `.toml` or anything else as json.
#[derive(Debug, Clone)]
pub enum AnyFs {
    Json(Fs<Json>),
    Toml(Fs<Toml>),
}

impl AnyFs {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let toml = Toml::default();
        if path.extension() == Some(toml.extension()) {
            AnyFs::Toml(Fs::new(path, toml))
        } else {
            AnyFs::Json(Fs::new(path, Json::default()))
        }
    }
}

impl Retrieve for AnyFs {
    async fn retrieve_config(&self) -> Result<Config, BoxError> {
        match self {
            AnyFs::Json(fs) => fs.collect_config().await,
            AnyFs::Toml(fs) => fs.collect_config().await,
        }
    }
}
