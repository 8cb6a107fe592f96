
use thiserror::Error;

// messages end up in the verdict's `error` field, keep them short and free of key material
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationError {
    #[error("missing payload")]
    MissingPayload,
    #[error("malformed payload")]
    MalformedPayload,
    #[error("bot token not configured")]
    NotConfigured,
    #[error("missing hash")]
    MissingHash,
    #[error("hash mismatch")]
    HashMismatch,
    #[error("missing signature")]
    MissingSignature,
    #[error("signature is not valid base64")]
    SignatureEncoding,
    #[error("signature has an unexpected length")]
    SignatureLength,
    #[error("invalid public key")]
    PublicKey,
    #[error("signature mismatch")]
    SignatureMismatch,
    // Hmac takes any key length, new_from_slice still returns a Result and this keeps it off expect()
    #[error("invalid key length")]
    KeyLength,
}

impl VerificationError {
    // True when the failure comes from missing server configuration rather than from the payload.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NotConfigured | Self::PublicKey)
    }

    // True when the payload was well-formed but failed a cryptographic check.
    pub fn is_tamper_signal(&self) -> bool {
        matches!(self, Self::HashMismatch | Self::SignatureMismatch)
    }
}

// Short prefix of a hash or signature, safe to put in a log line.
pub fn preview(value: &str) -> String {
    const PREVIEW_CHARS: usize = 8;
    if value.chars().count() <= PREVIEW_CHARS {
        return value.to_string();
    }
    let prefix: String = value.chars().take(PREVIEW_CHARS).collect();
    [prefix.as_str(), "…"].join("")
}
