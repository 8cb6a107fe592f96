
use std::sync::Arc;
use crate::runtime_context::RuntimeContext;

use anyhow::Result;
use tracing::{info, warn};

pub struct RuntimeApp {
    runtime_context: Arc<RuntimeContext>,
}

impl RuntimeApp {
    pub fn new(runtime_context: &Arc<RuntimeContext>) -> Arc<Self> {
        let runtime_context = Arc::clone(runtime_context);
        let handler = Self {
            runtime_context,
        };
        Arc::new(handler)
    }

    // a missing bot token is not fatal, the signature scheme still works without it
    pub async fn launch(self: &Arc<Self>) -> Result<()> {
        let verifier = self.runtime_context.verifier();
        if !verifier.anchors().has_bot_token() {
            warn!("TELEGRAM_BOT_TOKEN is not set, hash verification will always fail");
        }
        let config = verifier.config();
        info!(
            max_age_secs = config.max_age_secs,
            fallback_policy = ?config.fallback_policy,
            "init data verifier ready"
        );
        Ok(())
    }
}
