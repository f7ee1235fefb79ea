use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Type mismatch for '{attribute}': expected {expected}, found {found}")]
    TypeMismatch {
        attribute: String,
        expected: String,
        found: String,
    },

    #[error("Attribute '{attribute}' is not declared on {element}")]
    AttributeUndeclared {
        attribute: String,
        element: &'static str,
    },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl ModelError {
    pub fn type_mismatch(
        attribute: impl Into<String>,
        expected: impl ToString,
        found: impl Into<String>,
    ) -> Self {
        ModelError::TypeMismatch {
            attribute: attribute.into(),
            expected: expected.to_string(),
            found: found.into(),
        }
    }

    pub fn undeclared(attribute: impl Into<String>, element: &'static str) -> Self {
        ModelError::AttributeUndeclared {
            attribute: attribute.into(),
            element,
        }
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, ModelError::TypeMismatch { .. })
    }

    pub fn is_undeclared(&self) -> bool {
        matches!(self, ModelError::AttributeUndeclared { .. })
    }

    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ModelError::InvariantViolation(_))
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
