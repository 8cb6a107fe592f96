pub mod trust_anchors;
pub mod init_data_errors;
pub mod init_data_message;
pub mod init_data_verdict;
pub mod init_data_signature;
pub mod init_data_hash;
pub mod init_data_freshness;
pub mod init_data_verifier;

pub use init_data_errors::VerificationError;
pub use init_data_verdict::{SchemeOutcome, VerificationMethod, VerificationVerdict, VerifiedFields};
pub use init_data_verifier::{FallbackPolicy, InitDataVerifier, VerifierConfig};
pub use trust_anchors::{TrustAnchors, TELEGRAM_PUBLIC_KEY};
