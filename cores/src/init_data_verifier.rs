
use std::str::FromStr;

use thiserror::Error;
use tracing::{info, warn};

use crate::init_data_errors::VerificationError;
use crate::init_data_freshness::{is_fresh, staleness_warning, unix_now, DEFAULT_MAX_AGE_SECS};
use crate::init_data_hash::verify_hash_fields;
use crate::init_data_message::{parse_fields, InitDataFields};
use crate::init_data_signature::verify_signature_fields;
use crate::init_data_verdict::{SchemeOutcome, VerificationMethod, VerificationVerdict, VerifiedFields};
use crate::trust_anchors::TrustAnchors;

// What happens when a signature is present and well-formed but does not verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    // Try the hash scheme anyway.
    #[default]
    Lenient,
    // Reject without consulting the hash scheme.
    Strict,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown fallback policy: {0}")]
pub struct UnknownFallbackPolicy(String);

impl FromStr for FallbackPolicy {
    type Err = UnknownFallbackPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            _ => Err(UnknownFallbackPolicy(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifierConfig {
    pub max_age_secs: i64,
    pub fallback_policy: FallbackPolicy,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            fallback_policy: FallbackPolicy::default(),
        }
    }
}

#[derive(Debug, PartialEq)]
enum VerificationState {
    TrySignature(InitDataFields),
    TryHash(InitDataFields),
    Success(VerificationMethod, VerifiedFields),
    Fail(Option<VerificationMethod>, VerificationError),
}

// Stateless init data verifier. Signature first, hash second, freshness attached on success.
#[derive(Debug, Clone)]
pub struct InitDataVerifier {
    anchors: TrustAnchors,
    config: VerifierConfig,
}

impl InitDataVerifier {
    pub fn new(anchors: TrustAnchors, config: VerifierConfig) -> Self {
        Self {
            anchors,
            config,
        }
    }

    pub fn anchors(&self) -> &TrustAnchors {
        &self.anchors
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn verify_now(&self, init_data: &str) -> VerificationVerdict {
        self.verify(init_data, unix_now())
    }

    pub fn verify(&self, init_data: &str, now: i64) -> VerificationVerdict {
        let mut state = self.start(init_data);
        loop {
            state = match state {
                VerificationState::TrySignature(fields) => self.try_signature(fields),
                VerificationState::TryHash(fields) => self.try_hash(fields),
                VerificationState::Success(method, verified) => {
                    return self.succeed(method, verified, now);
                }
                VerificationState::Fail(method, error) => {
                    return VerificationVerdict::failure(method, error);
                }
            };
        }
    }

    fn start(&self, init_data: &str) -> VerificationState {
        if init_data.trim().is_empty() {
            return VerificationState::Fail(None, VerificationError::MissingPayload);
        }
        match parse_fields(init_data) {
            Ok(fields) => VerificationState::TrySignature(fields),
            Err(error) => VerificationState::Fail(None, error),
        }
    }

    fn try_signature(&self, fields: InitDataFields) -> VerificationState {
        match verify_signature_fields(&fields, self.anchors.public_key()) {
            SchemeOutcome::Success(verified) => VerificationState::Success(VerificationMethod::Signature, verified),
            SchemeOutcome::Fallback(VerificationError::SignatureMismatch)
                if self.config.fallback_policy == FallbackPolicy::Strict =>
            {
                VerificationState::Fail(Some(VerificationMethod::Signature), VerificationError::SignatureMismatch)
            }
            SchemeOutcome::Fallback(error) | SchemeOutcome::HardFail(error) => {
                info!("signature scheme declined ({}), trying hash", error);
                VerificationState::TryHash(fields)
            }
        }
    }

    fn try_hash(&self, fields: InitDataFields) -> VerificationState {
        match verify_hash_fields(&fields, self.anchors.bot_token()) {
            SchemeOutcome::Success(verified) => VerificationState::Success(VerificationMethod::Hash, verified),
            SchemeOutcome::Fallback(error) | SchemeOutcome::HardFail(error) => {
                if error.is_configuration() {
                    warn!("hash scheme unavailable: {}", error);
                }
                VerificationState::Fail(Some(VerificationMethod::Hash), error)
            }
        }
    }

    fn succeed(&self, method: VerificationMethod, verified: VerifiedFields, now: i64) -> VerificationVerdict {
        let max_age_secs = self.config.max_age_secs;
        let auth_date_valid = is_fresh(verified.auth_date, max_age_secs, now);
        let warning = if auth_date_valid {
            None
        } else {
            let warning = staleness_warning(verified.auth_date, max_age_secs);
            warn!("init data verified by {:?} but {}", method, warning);
            Some(warning)
        };
        VerificationVerdict::success(method, verified, auth_date_valid, warning)
    }
}
