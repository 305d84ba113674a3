//! Route parameter helpers.

use axum::extract::Path;
use serde::Deserialize;

use crate::models::{Notice, NoticeSigner};

/// Parse an optional `{id}` path segment.
///
/// Absent, non-numeric, zero and negative IDs all yield `None`, which the
/// controller treats as "not found".
pub fn route_id<T>(raw: Option<Path<String>>, parse: fn(&str) -> Option<T>) -> Option<T> {
    raw.and_then(|Path(raw)| parse(&raw))
}

/// Transient notice carried in the query string after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub level: Option<String>,
    pub notice: Option<String>,
    pub sig: Option<String>,
}

impl NoticeQuery {
    /// The notice, if present and signed by `signer`.
    pub fn into_notice(self, signer: &NoticeSigner) -> Option<Notice> {
        signer.verify(
            self.level.as_deref(),
            self.notice.as_deref(),
            self.sig.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopping_core::CountryId;

    #[test]
    fn test_route_id() {
        let parse = CountryId::parse;
        assert_eq!(
            route_id(Some(Path("7".to_string())), parse),
            Some(CountryId::new(7))
        );
        assert_eq!(route_id(Some(Path("abc".to_string())), parse), None);
        assert_eq!(route_id(Some(Path("0".to_string())), parse), None);
        assert_eq!(route_id(None, parse), None);
    }
}
