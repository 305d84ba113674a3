//! User-facing message catalog.
//!
//! Every string shown to an administrator (notices, validation errors,
//! constraint messages) comes from [`Messages`] so the panel can be served
//! in Spanish (default) or English.

use serde::{Deserialize, Serialize};

use shopping_core::HierarchyLevel;

/// Supported interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" | "es-co" => Ok(Self::Es),
            "en" | "en-us" => Ok(Self::En),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

/// Form fields that can carry validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Country,
    State,
}

impl FormField {
    /// Key used for the field in rendered forms and JSON output.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Country => "country_id",
            Self::State => "state_id",
        }
    }
}

/// Localized message catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    /// Create a catalog for a locale.
    #[must_use]
    pub const fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// The catalog's locale.
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    #[must_use]
    pub const fn record_created(&self) -> &'static str {
        match self.locale {
            Locale::Es => "Registro creado.",
            Locale::En => "Record created.",
        }
    }

    #[must_use]
    pub const fn record_updated(&self) -> &'static str {
        match self.locale {
            Locale::Es => "Registro actualizado.",
            Locale::En => "Record updated.",
        }
    }

    #[must_use]
    pub const fn record_deleted(&self) -> &'static str {
        match self.locale {
            Locale::Es => "Registro borrado.",
            Locale::En => "Record deleted.",
        }
    }

    /// Message for a name that already exists under the same parent.
    #[must_use]
    pub const fn duplicate_name(&self, level: HierarchyLevel) -> &'static str {
        match (self.locale, level) {
            (Locale::Es, HierarchyLevel::Country) => "Ya existe un país con el mismo nombre.",
            (Locale::Es, HierarchyLevel::State) => {
                "Ya existe un departamento/estado con el mismo nombre en este país."
            }
            (Locale::Es, HierarchyLevel::City) => {
                "Ya existe una ciudad con el mismo nombre en este departamento/estado."
            }
            (Locale::En, HierarchyLevel::Country) => "A country with the same name already exists.",
            (Locale::En, HierarchyLevel::State) => {
                "A state with the same name already exists in this country."
            }
            (Locale::En, HierarchyLevel::City) => {
                "A city with the same name already exists in this state."
            }
        }
    }

    /// Message for a delete blocked by child records.
    #[must_use]
    pub const fn has_dependents(&self, level: HierarchyLevel) -> &'static str {
        match (self.locale, level) {
            (Locale::Es, HierarchyLevel::Country) => {
                "No se puede borrar el país porque tiene registros relacionados."
            }
            (Locale::Es, HierarchyLevel::State) => {
                "No se puede borrar el estado / departamento porque tiene registros relacionados."
            }
            (Locale::Es, HierarchyLevel::City) => {
                "No se puede borrar la ciudad porque tiene registros relacionados."
            }
            (Locale::En, HierarchyLevel::Country) => {
                "The country cannot be deleted because it has related records."
            }
            (Locale::En, HierarchyLevel::State) => {
                "The state cannot be deleted because it has related records."
            }
            (Locale::En, HierarchyLevel::City) => {
                "The city cannot be deleted because it has related records."
            }
        }
    }

    /// Message for a stale concurrency token.
    #[must_use]
    pub const fn concurrency_conflict(&self) -> &'static str {
        match self.locale {
            Locale::Es => {
                "El registro fue modificado por otro usuario. Recargue la página e intente de nuevo."
            }
            Locale::En => "The record was modified by another user. Reload the page and try again.",
        }
    }

    /// Display label of a form field.
    #[must_use]
    pub const fn field_label(&self, field: FormField) -> &'static str {
        match (self.locale, field) {
            (Locale::Es, FormField::Name) => "Nombre",
            (Locale::Es, FormField::Country) => "País",
            (Locale::Es, FormField::State) => "Departamento/Estado",
            (Locale::En, FormField::Name) => "Name",
            (Locale::En, FormField::Country) => "Country",
            (Locale::En, FormField::State) => "State",
        }
    }

    #[must_use]
    pub fn field_required(&self, field: FormField) -> String {
        let label = self.field_label(field);
        match self.locale {
            Locale::Es => format!("El campo {label} es obligatorio."),
            Locale::En => format!("The {label} field is required."),
        }
    }

    /// Message for a field whose submitted value cannot be read.
    #[must_use]
    pub fn field_invalid(&self, field: FormField) -> String {
        let label = self.field_label(field);
        match self.locale {
            Locale::Es => format!("El valor del campo {label} no es válido."),
            Locale::En => format!("The value of the {label} field is not valid."),
        }
    }

    #[must_use]
    pub fn field_too_long(&self, field: FormField, max: usize) -> String {
        let label = self.field_label(field);
        match self.locale {
            Locale::Es => format!("El campo {label} debe tener máximo {max} caracteres."),
            Locale::En => format!("The {label} field must be at most {max} characters."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parse() {
        assert_eq!("es".parse::<Locale>(), Ok(Locale::Es));
        assert_eq!(" EN ".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_default_locale_is_spanish() {
        let messages = Messages::default();
        assert_eq!(messages.locale(), Locale::Es);
        assert_eq!(messages.record_created(), "Registro creado.");
    }

    #[test]
    fn test_duplicate_messages_differ_per_level() {
        let messages = Messages::new(Locale::En);
        let country = messages.duplicate_name(HierarchyLevel::Country);
        let state = messages.duplicate_name(HierarchyLevel::State);
        let city = messages.duplicate_name(HierarchyLevel::City);
        assert_ne!(country, state);
        assert_ne!(state, city);
        assert!(city.contains("city"));
    }

    #[test]
    fn test_validation_messages_include_label() {
        let messages = Messages::new(Locale::Es);
        assert_eq!(
            messages.field_required(FormField::Name),
            "El campo Nombre es obligatorio."
        );
        assert!(messages.field_too_long(FormField::Name, 50).contains("50"));
        assert_eq!(
            messages.field_invalid(FormField::Country),
            "El valor del campo País no es válido."
        );
    }
}
