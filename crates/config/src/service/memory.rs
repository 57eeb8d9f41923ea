use campusgate_model::{BoxError, Config};

use super::Retrieve;

/// A configuration built in code.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    pub config: Config,
}

impl Memory {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl Retrieve for Memory {
    async fn retrieve_config(&self) -> Result<Config, BoxError> {
        Ok(self.config.clone())
    }
}
