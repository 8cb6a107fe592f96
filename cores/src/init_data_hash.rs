
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::init_data_errors::{preview, VerificationError};
use crate::init_data_message::{parse_fields, render_canonical, InitDataFields, HASH_FIELD};
use crate::init_data_verdict::{SchemeOutcome, VerifiedFields};

type HmacSha256 = Hmac<Sha256>;

const SECRET_KEY_SEED: &[u8] = b"WebAppData";

// https://core.telegram.org/bots/webapps#validating-data-received-via-the-mini-app
// all failures are terminal, there is no scheme after this one
pub fn verify_hash(payload: &str, bot_token: &str) -> SchemeOutcome {
    match parse_fields(payload) {
        Ok(fields) => verify_hash_fields(&fields, bot_token),
        Err(error) => SchemeOutcome::HardFail(error),
    }
}

pub(crate) fn verify_hash_fields(fields: &InitDataFields, bot_token: &str) -> SchemeOutcome {
    if bot_token.is_empty() {
        return SchemeOutcome::HardFail(VerificationError::NotConfigured);
    }
    let Some(hash) = fields.get(HASH_FIELD) else {
        return SchemeOutcome::HardFail(VerificationError::MissingHash);
    };
    let calculated_hash = match calculate_fields_hash(fields, bot_token) {
        Ok(calculated_hash) => calculated_hash,
        Err(error) => return SchemeOutcome::HardFail(error),
    };
    if constant_time_eq(calculated_hash.as_bytes(), hash.as_bytes()) {
        SchemeOutcome::Success(VerifiedFields::from_fields(fields))
    } else {
        warn!("init data hash {} does not match", preview(hash));
        SchemeOutcome::HardFail(VerificationError::HashMismatch)
    }
}

// Lowercase hex HMAC-SHA256 of the data-check-string, keyed by HMAC("WebAppData", bot token).
pub fn calculate_hash(payload: &str, bot_token: &str) -> Result<String, VerificationError> {
    if bot_token.is_empty() {
        return Err(VerificationError::NotConfigured);
    }
    let fields = parse_fields(payload)?;
    calculate_fields_hash(&fields, bot_token)
}

fn calculate_fields_hash(fields: &InitDataFields, bot_token: &str) -> Result<String, VerificationError> {
    let secret_key = hmac_sha256(SECRET_KEY_SEED, bot_token.as_bytes())?;
    let message = render_canonical(fields, &[HASH_FIELD]);
    let calculated_hash = hmac_sha256(&secret_key, message.as_bytes())?;
    Ok(hex::encode(calculated_hash))
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<[u8; 32], VerificationError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| VerificationError::KeyLength)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().into())
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.ct_eq(right).into()
}
