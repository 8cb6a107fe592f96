
use std::fmt;

// https://core.telegram.org/bots/webapps#validating-data-for-third-party-use
// production Ed25519 key, hex e7bf03a2fa4602af4580703d88dda5bb59f32ed8b02a56c187fe7d34caed242d
pub const TELEGRAM_PUBLIC_KEY: [u8; 32] = [
    0xe7, 0xbf, 0x03, 0xa2, 0xfa, 0x46, 0x02, 0xaf,
    0x45, 0x80, 0x70, 0x3d, 0x88, 0xdd, 0xa5, 0xbb,
    0x59, 0xf3, 0x2e, 0xd8, 0xb0, 0x2a, 0x56, 0xc1,
    0x87, 0xfe, 0x7d, 0x34, 0xca, 0xed, 0x24, 0x2d,
];

// Key material both verification schemes check against. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct TrustAnchors {
    public_key: [u8; 32],
    bot_token: String,
}

impl TrustAnchors {
    pub fn new(public_key: [u8; 32], bot_token: impl Into<String>) -> Self {
        Self {
            public_key,
            bot_token: bot_token.into(),
        }
    }

    pub fn telegram(bot_token: impl Into<String>) -> Self {
        Self::new(TELEGRAM_PUBLIC_KEY, bot_token)
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }

    pub fn has_bot_token(&self) -> bool {
        !self.bot_token.is_empty()
    }
}

impl fmt::Debug for TrustAnchors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bot_token = if self.has_bot_token() { "<redacted>" } else { "<empty>" };
        f.debug_struct("TrustAnchors")
            .field("public_key", &hex::encode(self.public_key))
            .field("bot_token", &bot_token)
            .finish()
    }
}
