use std::collections::HashSet;
use thiserror::Error;

use crate::compiler::View;
use crate::config::{PickerSettings, ServerSettings, Settings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("View '{name}' does not compile: {reason}")]
    InvalidView { name: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_picker(&settings.picker) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_views(settings) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_picker(picker: &PickerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if picker.per_page == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "picker.per_page".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if let Some(url) = &picker.api_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(ValidationError::InvalidValue {
                    field: "picker.api_base_url".to_string(),
                    reason: format!("'{}' is not an http(s) URL", url),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_views(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut names = HashSet::new();

        for definition in &settings.definitions {
            if definition.name.is_empty() {
                errors.push(ValidationError::MissingField("view.name".to_string()));
                continue;
            }
            if !names.insert(definition.name.as_str()) {
                errors.push(ValidationError::Duplicate(format!("view '{}'", definition.name)));
                continue;
            }
            if let Err(e) = definition.compile() {
                errors.push(ValidationError::InvalidView {
                    name: definition.name.clone(),
                    reason: e.to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ViewDefinition;
    use serde_json::json;

    fn definition(value: serde_json::Value) -> ViewDefinition {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(ConfigValidator::validate(&Settings::default()).is_ok());
    }

    #[test]
    fn test_collects_every_problem() {
        let mut settings = Settings::default();
        settings.server.host = String::new();
        settings.server.port = 0;
        settings.picker.per_page = 0;
        settings.picker.api_base_url = Some("ftp://records".to_string());

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_duplicate_and_broken_views() {
        let mut settings = Settings::default();
        settings.definitions = vec![
            definition(json!({"name": "people"})),
            definition(json!({"name": "people"})),
            definition(json!({
                "name": "broken",
                "elements": [{"node": "form", "name": "person", "elements": [
                    {"node": "relationship", "name": "spouse", "elements": [
                        {"node": "field", "name": "x"}
                    ]}
                ]}]
            })),
        ];

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], ValidationError::Duplicate(_)));
        assert!(matches!(
            &errors[1],
            ValidationError::InvalidView { name, .. } if name == "broken"
        ));
    }
}
