use std::sync::Arc;

use crate::config::Config;
use crate::llm::{GroqClient, UpstreamCallError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub llm: GroqClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, UpstreamCallError> {
        let llm = GroqClient::new(config.llm_settings())?;
        Ok(Self {
            config: Arc::new(config),
            llm,
        })
    }
}
