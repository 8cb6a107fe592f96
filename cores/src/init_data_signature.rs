
use base64::Engine as _;
use base64::engine::GeneralPurpose;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use ed25519_dalek::{Signature, Verifier, VerifyingKey, SIGNATURE_LENGTH};
use tracing::{debug, warn};

use crate::init_data_errors::{preview, VerificationError};
use crate::init_data_message::{parse_fields, render_canonical, InitDataFields, HASH_FIELD, SIGNATURE_FIELD};
use crate::init_data_verdict::{SchemeOutcome, VerifiedFields};

// telegram sends url-safe base64 without padding, older clients send the standard alphabet
const SIGNATURE_ENGINES: [GeneralPurpose; 4] = [URL_SAFE_NO_PAD, URL_SAFE, STANDARD, STANDARD_NO_PAD];

// https://core.telegram.org/bots/webapps#validating-data-for-third-party-use
// every failure here is a fallback, the caller decides whether a bad signature is terminal
pub fn verify_signature(payload: &str, public_key: &[u8; 32]) -> SchemeOutcome {
    match parse_fields(payload) {
        Ok(fields) => verify_signature_fields(&fields, public_key),
        Err(error) => SchemeOutcome::Fallback(error),
    }
}

pub(crate) fn verify_signature_fields(fields: &InitDataFields, public_key: &[u8; 32]) -> SchemeOutcome {
    let Some(signature) = fields.get(SIGNATURE_FIELD) else {
        debug!("init data has no signature");
        return SchemeOutcome::Fallback(VerificationError::MissingSignature);
    };
    match check_signature(fields, signature, public_key) {
        Ok(()) => SchemeOutcome::Success(VerifiedFields::from_fields(fields)),
        Err(VerificationError::SignatureMismatch) => {
            warn!("init data signature {} does not verify, possible tampering", preview(signature));
            SchemeOutcome::Fallback(VerificationError::SignatureMismatch)
        }
        Err(error) => {
            debug!("init data signature {} unusable: {}", preview(signature), error);
            SchemeOutcome::Fallback(error)
        }
    }
}

fn check_signature(fields: &InitDataFields, signature: &str, public_key: &[u8; 32]) -> Result<(), VerificationError> {
    let message = render_canonical(fields, &[SIGNATURE_FIELD, HASH_FIELD]);
    let signature_bytes: [u8; SIGNATURE_LENGTH] = decode_signature(signature)?
        .try_into()
        .map_err(|_| VerificationError::SignatureLength)?;
    let signature = Signature::from_bytes(&signature_bytes);
    let verifying_key = VerifyingKey::from_bytes(public_key)
        .map_err(|_| VerificationError::PublicKey)?;
    verifying_key.verify(message.as_bytes(), &signature)
        .map_err(|_| VerificationError::SignatureMismatch)
}

fn decode_signature(signature: &str) -> Result<Vec<u8>, VerificationError> {
    SIGNATURE_ENGINES.iter()
        .find_map(|engine| engine.decode(signature).ok())
        .ok_or(VerificationError::SignatureEncoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use ed25519_dalek::{Signer, SigningKey};
    use serde_json::json;

    // RFC 8032 signature over `auth_date=1700000000\nuser={"id":42}` with the seed [7; 32], computed offline
    const FIXED_SIGNATURE: &str = "setdm1s2ZxsIsP1V9cK0t_kc3uQp5Ford3t4rp_abnmaxlk51GVAwrH-cJrFJQOiksIBYCxs-FsXZ27U9nbJBA";
    const FIXED_PUBLIC_KEY: &str = "ea4a6c63e29c520abef5507b132ec5f9954776aebebe7b92421eea691446d22c";

    fn fixed_public_key() -> [u8; 32] {
        hex::decode(FIXED_PUBLIC_KEY).unwrap().try_into().unwrap()
    }

    #[test]
    fn accepts_fixed_vector() {
        let payload = format!("user=%7B%22id%22%3A42%7D&auth_date=1700000000&signature={}&hash=ignored", FIXED_SIGNATURE);
        let outcome = verify_signature(&payload, &fixed_public_key());
        assert_eq!(outcome, SchemeOutcome::Success(VerifiedFields {
            user: Some(json!({ "id": 42 })),
            auth_date: Some(1700000000),
        }));
    }

    #[test]
    fn fixed_key_matches_seed() {
        let signing_key = SigningKey::from_bytes(&[7u8; 32]);
        assert_eq!(signing_key.verifying_key().to_bytes(), fixed_public_key());
    }

    #[test]
    fn accepts_standard_alphabet_with_padding() {
        let signing_key = SigningKey::from_bytes(&[9u8; 32]);
        let message = "auth_date=1700000100\nquery_id=AAH";
        let signature = STANDARD.encode(signing_key.sign(message.as_bytes()).to_bytes());
        let payload = format!("auth_date=1700000100&query_id=AAH&signature={}", urlencoding::encode(&signature));
        let outcome = verify_signature(&payload, &signing_key.verifying_key().to_bytes());
        assert!(matches!(outcome, SchemeOutcome::Success(_)));
    }

    #[test]
    fn missing_signature_falls_back() {
        let outcome = verify_signature("auth_date=1&hash=abc", &fixed_public_key());
        assert_eq!(outcome, SchemeOutcome::Fallback(VerificationError::MissingSignature));
    }

    #[test]
    fn tampered_field_is_a_mismatch() {
        let payload = format!("user=%7B%22id%22%3A43%7D&auth_date=1700000000&signature={}", FIXED_SIGNATURE);
        let outcome = verify_signature(&payload, &fixed_public_key());
        assert_eq!(outcome, SchemeOutcome::Fallback(VerificationError::SignatureMismatch));
    }

    #[test]
    fn wrong_key_is_a_mismatch() {
        let other_key = SigningKey::from_bytes(&[8u8; 32]).verifying_key().to_bytes();
        let payload = format!("user=%7B%22id%22%3A42%7D&auth_date=1700000000&signature={}", FIXED_SIGNATURE);
        let outcome = verify_signature(&payload, &other_key);
        assert_eq!(outcome, SchemeOutcome::Fallback(VerificationError::SignatureMismatch));
    }

    #[test]
    fn undecodable_signature_falls_back() {
        let outcome = verify_signature("auth_date=1&signature=***", &fixed_public_key());
        assert_eq!(outcome, SchemeOutcome::Fallback(VerificationError::SignatureEncoding));
    }

    #[test]
    fn short_signature_falls_back() {
        let short = URL_SAFE_NO_PAD.encode([1u8; 32]);
        let payload = format!("auth_date=1&signature={}", short);
        let outcome = verify_signature(&payload, &fixed_public_key());
        assert_eq!(outcome, SchemeOutcome::Fallback(VerificationError::SignatureLength));
    }
}
