//! Repository conditions → user-facing messages.

use shopping_core::HierarchyLevel;

use crate::db::RepositoryError;
use crate::i18n::Messages;

/// Translate a failed write at `level` into the message shown to the admin.
///
/// Storage failures pass through with their original text.
#[must_use]
pub fn translate(error: &RepositoryError, level: HierarchyLevel, messages: &Messages) -> String {
    match error {
        RepositoryError::DuplicateName => messages.duplicate_name(level).to_string(),
        RepositoryError::HasDependents => messages.has_dependents(level).to_string(),
        RepositoryError::ConcurrencyConflict => messages.concurrency_conflict().to_string(),
        RepositoryError::StorageFailure(message) => message.clone(),
        RepositoryError::NotFound => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;

    #[test]
    fn test_duplicate_uses_level_template() {
        let messages = Messages::new(Locale::Es);
        assert_eq!(
            translate(
                &RepositoryError::DuplicateName,
                HierarchyLevel::Country,
                &messages
            ),
            "Ya existe un país con el mismo nombre."
        );
    }

    #[test]
    fn test_has_dependents_uses_level_template() {
        let messages = Messages::new(Locale::En);
        assert_eq!(
            translate(
                &RepositoryError::HasDependents,
                HierarchyLevel::State,
                &messages
            ),
            messages.has_dependents(HierarchyLevel::State)
        );
    }

    #[test]
    fn test_storage_failure_passes_through() {
        let messages = Messages::default();
        let error = RepositoryError::StorageFailure("connection reset by peer".to_string());
        assert_eq!(
            translate(&error, HierarchyLevel::City, &messages),
            "connection reset by peer"
        );
    }
}
