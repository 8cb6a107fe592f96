
use serde::Serialize;
use serde_json::Value;

use crate::init_data_errors::VerificationError;
use crate::init_data_message::{InitDataFields, AUTH_DATE_FIELD, USER_FIELD};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMethod {
    Signature,
    Hash,
}

impl VerificationMethod {
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Signature => "Ed25519",
            Self::Hash => "HMAC-SHA256",
        }
    }
}

// Identity fields pulled out of init data once a scheme has accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedFields {
    pub user: Option<Value>,
    pub auth_date: Option<i64>,
}

impl VerifiedFields {
    pub fn from_fields(fields: &InitDataFields) -> Self {
        let user = fields.get(USER_FIELD)
            .and_then(|user| parse_user(user));
        let auth_date = fields.get(AUTH_DATE_FIELD)
            .and_then(|auth_date| auth_date.trim().parse::<i64>().ok());
        Self {
            user,
            auth_date,
        }
    }
}

// some clients encode `user` twice, so a value still carrying escapes gets one more decode
fn parse_user(raw: &str) -> Option<Value> {
    if let Ok(user) = serde_json::from_str::<Value>(raw) {
        return Some(user);
    }
    if !raw.contains('%') {
        return None;
    }
    let decoded = urlencoding::decode(raw).ok()?;
    serde_json::from_str(&decoded).ok()
}

// Result of a single verification scheme.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemeOutcome {
    Success(VerifiedFields),
    // The scheme could not vouch for the payload; the next scheme may still try.
    Fallback(VerificationError),
    // Terminal failure, no other scheme is consulted.
    HardFail(VerificationError),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationVerdict {
    pub valid: bool,
    pub method: Option<VerificationMethod>,
    pub algorithm: String,
    pub user: Option<Value>,
    pub auth_date: Option<i64>,
    pub auth_date_valid: bool,
    pub warning: Option<String>,
    pub error: Option<String>,
}

impl VerificationVerdict {
    pub fn success(method: VerificationMethod, fields: VerifiedFields, auth_date_valid: bool, warning: Option<String>) -> Self {
        Self {
            valid: true,
            method: Some(method),
            algorithm: method.algorithm().to_string(),
            user: fields.user,
            auth_date: fields.auth_date,
            auth_date_valid,
            warning,
            error: None,
        }
    }

    pub fn failure(method: Option<VerificationMethod>, error: VerificationError) -> Self {
        let algorithm = method
            .map(|method| method.algorithm())
            .unwrap_or("none");
        Self {
            valid: false,
            method,
            algorithm: algorithm.to_string(),
            user: None,
            auth_date: None,
            auth_date_valid: false,
            warning: None,
            error: Some(error.to_string()),
        }
    }
}
