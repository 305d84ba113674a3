//! Modal form payloads and the responses produced for them.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use super::notice::{Notice, NoticeSigner};

/// Stored in an ID field whose submitted value is not a number.
pub const MALFORMED_ID: i32 = -1;

/// Country create/edit form. `id == 0` means "new".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryForm {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i32,
    pub name: String,
    /// Concurrency token echoed back from the edit form.
    #[serde(deserialize_with = "lenient_id")]
    pub version: i32,
}

/// State create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateForm {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i32,
    #[serde(deserialize_with = "lenient_id")]
    pub country_id: i32,
    pub name: String,
}

/// City create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityForm {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i32,
    #[serde(deserialize_with = "lenient_id")]
    pub state_id: i32,
    pub name: String,
}

/// Read a hidden numeric field without rejecting the whole form.
///
/// Blank becomes `0` (absent); anything that is not an `i32` becomes
/// [`MALFORMED_ID`] so the controller can report it as a field error.
fn lenient_id<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl Visitor<'_> for IdVisitor {
        type Value = i32;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer ID")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i32, E> {
            Ok(i32::try_from(v).unwrap_or(MALFORMED_ID))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i32, E> {
            Ok(i32::try_from(v).unwrap_or(MALFORMED_ID))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i32, E> {
            let v = v.trim();
            if v.is_empty() {
                return Ok(0);
            }
            Ok(v.parse().unwrap_or(MALFORMED_ID))
        }

        fn visit_unit<E: de::Error>(self) -> Result<i32, E> {
            Ok(0)
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// A validation or constraint error attached to a form.
///
/// `field == None` marks a form-level error (shown above the fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Option<String>,
    pub message: String,
}

/// A form plus the errors to display with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormModel<F> {
    pub form: F,
    pub errors: Vec<FieldError>,
}

impl<F> FormModel<F> {
    /// Wrap a form with no errors.
    #[must_use]
    pub const fn new(form: F) -> Self {
        Self {
            form,
            errors: Vec::new(),
        }
    }

    /// Attach an error to a named field.
    pub fn field_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: Some(field.to_string()),
            message: message.into(),
        });
    }

    /// Attach a form-level error.
    pub fn form_error(&mut self, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: None,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// First error message for `field`, if any.
    #[must_use]
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field.as_deref() == Some(field))
            .map(|e| e.message.as_str())
    }

    /// Messages of all form-level errors.
    #[must_use]
    pub fn form_errors(&self) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field.is_none())
            .map(|e| e.message.as_str())
            .collect()
    }
}

/// JSON body returned for every modal form submission.
///
/// On success `html` holds the refreshed list fragment; otherwise it holds
/// the form re-rendered with its errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub is_valid: bool,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl FormResponse {
    #[must_use]
    pub const fn valid(html: String, notice: Notice) -> Self {
        Self {
            is_valid: true,
            html,
            notice: Some(notice),
        }
    }

    #[must_use]
    pub const fn invalid(html: String) -> Self {
        Self {
            is_valid: false,
            html,
            notice: None,
        }
    }
}

/// Result of a delete: where to send the browser and what to tell the admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Parent page path (without query string).
    pub path: String,
    pub notice: Notice,
}

impl DeleteOutcome {
    /// Full redirect target with the signed notice in the query string.
    #[must_use]
    pub fn location(&self, signer: &NoticeSigner) -> String {
        signer.redirect_location(&self.notice, &self.path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_model_errors() {
        let mut model = FormModel::new(CountryForm::default());
        assert!(model.is_valid());

        model.field_error("name", "required");
        model.form_error("storage offline");

        assert!(!model.is_valid());
        assert_eq!(model.error_for("name"), Some("required"));
        assert_eq!(model.error_for("country_id"), None);
        assert_eq!(model.form_errors(), vec!["storage offline"]);
    }

    #[test]
    fn test_form_response_uses_camel_case() {
        let response = FormResponse::invalid("<form></form>".to_string());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["isValid"], false);
        assert!(json.get("notice").is_none());
    }

    #[test]
    fn test_form_deserialize_defaults_missing_fields() {
        let form: StateForm = serde_json::from_str(r#"{"name":"Antioquia"}"#).unwrap();
        assert_eq!(form.id, 0);
        assert_eq!(form.country_id, 0);
        assert_eq!(form.name, "Antioquia");
    }

    #[test]
    fn test_malformed_ids_do_not_reject_the_form() {
        let form: StateForm =
            serde_json::from_str(r#"{"id":"","country_id":"abc","name":"Antioquia"}"#).unwrap();
        assert_eq!(form.id, 0);
        assert_eq!(form.country_id, MALFORMED_ID);

        let form: CityForm = serde_json::from_str(r#"{"id":" 4 ","state_id":7}"#).unwrap();
        assert_eq!(form.id, 4);
        assert_eq!(form.state_id, 7);

        let form: CountryForm =
            serde_json::from_str(r#"{"id":"99999999999","version":null}"#).unwrap();
        assert_eq!(form.id, MALFORMED_ID);
        assert_eq!(form.version, 0);
    }
}
