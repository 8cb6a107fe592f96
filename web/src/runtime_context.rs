
use std::env;
use std::sync::Arc;

use cores::init_data_freshness::DEFAULT_MAX_AGE_SECS;
use cores::{FallbackPolicy, InitDataVerifier, TrustAnchors, VerifierConfig};
use tracing::warn;

// TELEGRAM_BOT_TOKEN, INIT_DATA_MAX_AGE_SECS, INIT_DATA_FALLBACK_POLICY
const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
const MAX_AGE_VAR: &str = "INIT_DATA_MAX_AGE_SECS";
const FALLBACK_POLICY_VAR: &str = "INIT_DATA_FALLBACK_POLICY";

pub struct RuntimeContext {
    verifier: Arc<InitDataVerifier>,
}

impl RuntimeContext {
    // configuration is read once here and never again
    pub fn new() -> Arc<Self> {
        let bot_token = env::var(BOT_TOKEN_VAR).unwrap_or_default();
        let anchors = TrustAnchors::telegram(bot_token.trim());
        let config = VerifierConfig {
            max_age_secs: Self::max_age_secs(env::var(MAX_AGE_VAR).ok().as_deref()),
            fallback_policy: Self::fallback_policy(env::var(FALLBACK_POLICY_VAR).ok().as_deref()),
        };
        Self::with_verifier(InitDataVerifier::new(anchors, config))
    }

    pub fn with_verifier(verifier: InitDataVerifier) -> Arc<Self> {
        let context = Self {
            verifier: Arc::new(verifier),
        };
        Arc::new(context)
    }

    pub fn verifier(&self) -> &Arc<InitDataVerifier> {
        &self.verifier
    }

    fn max_age_secs(value: Option<&str>) -> i64 {
        let Some(value) = value else {
            return DEFAULT_MAX_AGE_SECS;
        };
        match value.trim().parse::<i64>() {
            Ok(max_age_secs) if max_age_secs >= 0 => max_age_secs,
            _ => {
                warn!("{} is not a non-negative integer, using {}", MAX_AGE_VAR, DEFAULT_MAX_AGE_SECS);
                DEFAULT_MAX_AGE_SECS
            }
        }
    }

    fn fallback_policy(value: Option<&str>) -> FallbackPolicy {
        let Some(value) = value else {
            return FallbackPolicy::default();
        };
        value.parse().unwrap_or_else(|error| {
            warn!("{}: {}, using lenient", FALLBACK_POLICY_VAR, error);
            FallbackPolicy::default()
        })
    }
}
