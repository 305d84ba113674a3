//! Transient per-response notices.
//!
//! A notice is never stored server-side: it travels in the JSON body of a
//! form submission or in the query string of a redirect. Redirect notices
//! carry an HMAC so pages only show notices this process issued.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// Severity of a notice, matching the alert styles of the admin UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Confirmation,
    Danger,
}

impl NoticeLevel {
    /// Query-string / CSS token for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Confirmation => "confirmation",
            Self::Danger => "danger",
        }
    }

    /// Parse a query-string token. Unknown tokens yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "info" => Some(Self::Info),
            "confirmation" => Some(Self::Confirmation),
            "danger" => Some(Self::Danger),
            _ => None,
        }
    }
}

/// A message shown once to the administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn confirmation(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Confirmation,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Danger,
            message: message.into(),
        }
    }

    /// Rebuild a notice from `?level=&notice=` query parameters.
    ///
    /// Returns `None` unless both parts are present and the level is known.
    #[must_use]
    pub fn from_query(level: Option<&str>, message: Option<&str>) -> Option<Self> {
        let level = NoticeLevel::parse(level?)?;
        let message = message?.trim();
        if message.is_empty() {
            return None;
        }
        Some(Self {
            level,
            message: message.to_string(),
        })
    }

}

type HmacSha256 = Hmac<Sha256>;

/// Signs redirect notices and verifies them when the page is loaded.
#[derive(Clone)]
pub struct NoticeSigner {
    key: SecretString,
}

impl std::fmt::Debug for NoticeSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoticeSigner")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl NoticeSigner {
    #[must_use]
    pub const fn new(key: SecretString) -> Self {
        Self { key }
    }

    /// Signer with a key that lives only as long as this process.
    #[must_use]
    pub fn ephemeral() -> Self {
        let key = format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple());
        Self::new(SecretString::from(key))
    }

    fn mac(&self, level: &str, message: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.key.expose_secret().as_bytes()).ok()?;
        mac.update(level.as_bytes());
        mac.update(b"\n");
        mac.update(message.as_bytes());
        Some(mac)
    }

    /// `path?level=..&notice=..&sig=..` for `notice`.
    ///
    /// Falls back to the bare path if the MAC cannot be built.
    #[must_use]
    pub fn redirect_location(&self, notice: &Notice, path: &str) -> String {
        let level = notice.level.as_str();
        let Some(mac) = self.mac(level, &notice.message) else {
            return path.to_string();
        };
        format!(
            "{path}?level={level}&notice={}&sig={}",
            urlencoding::encode(&notice.message),
            hex::encode(mac.finalize().into_bytes())
        )
    }

    /// Rebuild a notice from query parameters, dropping it unless `sig`
    /// matches.
    #[must_use]
    pub fn verify(
        &self,
        level: Option<&str>,
        message: Option<&str>,
        sig: Option<&str>,
    ) -> Option<Notice> {
        let notice = Notice::from_query(level, message)?;
        let sig = hex::decode(sig?).ok()?;
        self.mac(notice.level.as_str(), message?)?
            .verify_slice(&sig)
            .ok()?;
        Some(notice)
    }
}
