use tracing::{debug, trace};

use crate::error::ModelError;
use crate::value::{FromValue, Value, ValueKind};

/// Expected shape of an attribute value.
///
/// Descriptors nest: `ListOf(ListOf(Exact(Text)))` is a list of lists of text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// The value must be a scalar of exactly this kind.
    Exact(ValueKind),
    /// The value must satisfy the inner descriptor or be [`Value::Null`].
    Optional(Box<TypeDescriptor>),
    /// The value must be a list whose every element satisfies the inner
    /// descriptor. The empty list always satisfies.
    ListOf(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn exact(kind: ValueKind) -> Self {
        TypeDescriptor::Exact(kind)
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Optional(Box::new(inner))
    }

    pub fn list_of(inner: TypeDescriptor) -> Self {
        TypeDescriptor::ListOf(Box::new(inner))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeDescriptor::Optional(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, TypeDescriptor::ListOf(_))
    }

    /// Check whether `value` has the shape this descriptor demands.
    pub fn is_satisfied_by(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeDescriptor::Optional(_), Value::Null) => true,
            (TypeDescriptor::Optional(inner), value) => inner.is_satisfied_by(value),
            (TypeDescriptor::Exact(kind), value) => value.kind() == Some(*kind),
            (TypeDescriptor::ListOf(inner), Value::List(items)) => {
                items.iter().all(|item| inner.is_satisfied_by(item))
            }
            (TypeDescriptor::ListOf(_), _) => false,
        }
    }

    /// Describe what in `value` breaks this descriptor, pointing at the first
    /// offending list element.
    fn describe_mismatch(&self, value: &Value) -> String {
        match (self, value) {
            (TypeDescriptor::Optional(inner), value) => inner.describe_mismatch(value),
            (_, Value::Null) => "null (value cannot be null)".to_string(),
            (TypeDescriptor::ListOf(inner), Value::List(items)) => items
                .iter()
                .enumerate()
                .find(|(_, item)| !inner.is_satisfied_by(item))
                .map(|(index, item)| {
                    format!("{} at index {}", inner.describe_mismatch(item), index)
                })
                .unwrap_or_else(|| value.type_name()),
            (_, value) => value.type_name(),
        }
    }
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDescriptor::Exact(kind) => write!(f, "{}", kind),
            TypeDescriptor::Optional(inner) => write!(f, "optional {}", inner),
            TypeDescriptor::ListOf(inner) => write!(f, "list of {}", inner),
        }
    }
}

/// A declared attribute: its name and the descriptor values must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub descriptor: TypeDescriptor,
}

impl AttributeSpec {
    pub fn new(name: &'static str, descriptor: TypeDescriptor) -> Self {
        Self { name, descriptor }
    }
}

/// Closed, name-indexed attribute schema of a model type.
///
/// Implementors declare every attribute up front in [`Attributes::schema`];
/// writes to any other name are rejected.
pub trait Attributes {
    /// Type name used in error messages.
    fn element_name(&self) -> &'static str;

    fn schema(&self) -> &'static [AttributeSpec];

    /// Read an attribute back as a dynamic value.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Store an already validated value. Implementations must convert before
    /// mutating so a failed conversion leaves `self` untouched.
    fn write_attribute(&mut self, name: &str, value: Value) -> Result<(), ModelError>;

    /// Called after a successful [`Attributes::set`].
    fn after_write(&mut self, _name: &str) {}

    fn has_attribute(&self, name: &str) -> bool {
        self.schema().iter().any(|spec| spec.name == name)
    }

    fn descriptor_of(&self, name: &str) -> Option<&'static TypeDescriptor> {
        self.schema()
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| &spec.descriptor)
    }

    /// Validate `value` against the declared descriptor of `name` and assign it.
    fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ModelError>
    where
        Self: Sized,
    {
        let descriptor = self
            .descriptor_of(name)
            .ok_or_else(|| ModelError::undeclared(name, self.element_name()))?;
        validate_and_set(self, name, value.into(), descriptor)?;
        self.after_write(name);
        Ok(())
    }
}

/// Check `value` against `expected`, reporting a mismatch on `attribute`.
pub fn validate(
    attribute: &str,
    value: &Value,
    expected: &TypeDescriptor,
) -> Result<(), ModelError> {
    if expected.is_satisfied_by(value) {
        return Ok(());
    }
    let found = expected.describe_mismatch(value);
    debug!(attribute, expected = %expected, found = %found, "rejected attribute value");
    Err(ModelError::type_mismatch(attribute, expected, found))
}

/// Validate `value` against `expected` and, only if it passes, assign it to
/// the attribute `name` of `target`.
pub fn validate_and_set<T: Attributes + ?Sized>(
    target: &mut T,
    name: &str,
    value: Value,
    expected: &TypeDescriptor,
) -> Result<(), ModelError> {
    if !target.has_attribute(name) {
        debug!(
            attribute = name,
            element = target.element_name(),
            "rejected undeclared attribute"
        );
        return Err(ModelError::undeclared(name, target.element_name()));
    }
    validate(name, &value, expected)?;
    target.write_attribute(name, value)?;
    trace!(attribute = name, element = target.element_name(), "attribute set");
    Ok(())
}

/// Convert a value into the field type of `attribute`. Used by
/// [`Attributes::write_attribute`] implementations.
pub fn extract<T: FromValue>(
    attribute: &str,
    value: Value,
    declared: &TypeDescriptor,
) -> Result<T, ModelError> {
    let found = value.type_name();
    T::from_value(value).ok_or_else(|| ModelError::type_mismatch(attribute, declared, found))
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use super::*;
    use crate::langstring::LangString;

    fn text() -> TypeDescriptor {
        TypeDescriptor::exact(ValueKind::Text)
    }

    fn lang() -> TypeDescriptor {
        TypeDescriptor::exact(ValueKind::LangString)
    }

    /// Minimal attribute holder.
    #[derive(Debug, Default, PartialEq)]
    struct Sample {
        label: String,
        age: Option<i64>,
        tags: Vec<String>,
        grid: Vec<Vec<LangString>>,
    }

    impl Attributes for Sample {
        fn element_name(&self) -> &'static str {
            "Sample"
        }

        fn schema(&self) -> &'static [AttributeSpec] {
            static SCHEMA: OnceLock<Vec<AttributeSpec>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                vec![
                    AttributeSpec::new("label", text()),
                    AttributeSpec::new(
                        "age",
                        TypeDescriptor::optional(TypeDescriptor::exact(ValueKind::Integer)),
                    ),
                    AttributeSpec::new("tags", TypeDescriptor::list_of(text())),
                    AttributeSpec::new(
                        "grid",
                        TypeDescriptor::list_of(TypeDescriptor::list_of(lang())),
                    ),
                ]
            })
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "label" => Some(self.label.clone().into()),
                "age" => Some(self.age.into()),
                "tags" => Some(self.tags.clone().into()),
                "grid" => Some(self.grid.clone().into()),
                _ => None,
            }
        }

        fn write_attribute(&mut self, name: &str, value: Value) -> Result<(), ModelError> {
            let declared = self
                .descriptor_of(name)
                .ok_or_else(|| ModelError::undeclared(name, "Sample"))?;
            match name {
                "label" => self.label = extract(name, value, declared)?,
                "age" => self.age = extract(name, value, declared)?,
                "tags" => self.tags = extract(name, value, declared)?,
                "grid" => self.grid = extract(name, value, declared)?,
                _ => return Err(ModelError::undeclared(name, "Sample")),
            }
            Ok(())
        }
    }

    #[test]
    fn test_exact_kind() {
        assert!(text().is_satisfied_by(&Value::from("x")));
        assert!(!text().is_satisfied_by(&Value::from(1)));
        assert!(!text().is_satisfied_by(&Value::Null));
        assert!(!text().is_satisfied_by(&Value::list(["x"])));
    }

    #[test]
    fn test_optional_accepts_null() {
        let desc = TypeDescriptor::optional(lang());
        assert!(desc.is_satisfied_by(&Value::Null));
        assert!(desc.is_satisfied_by(&Value::from(LangString::new("Car"))));
        assert!(!desc.is_satisfied_by(&Value::from("Car")));
    }

    #[test]
    fn test_empty_list_satisfies_any_list() {
        let descriptors = [
            TypeDescriptor::list_of(text()),
            TypeDescriptor::list_of(lang()),
            TypeDescriptor::list_of(TypeDescriptor::exact(ValueKind::Timestamp)),
            TypeDescriptor::list_of(TypeDescriptor::list_of(text())),
            TypeDescriptor::list_of(TypeDescriptor::optional(text())),
        ];
        for desc in &descriptors {
            assert!(desc.is_satisfied_by(&Value::empty_list()), "{}", desc);
        }
    }

    #[test]
    fn test_single_bad_element_rejects_list() {
        let desc = TypeDescriptor::list_of(text());
        let value = Value::List(vec![
            Value::from("a"),
            Value::from("b"),
            Value::from(3),
            Value::from("d"),
        ]);
        assert!(!desc.is_satisfied_by(&value));
    }

    #[test]
    fn test_scalar_is_not_wrapped_into_list() {
        let desc = TypeDescriptor::list_of(text());
        assert!(!desc.is_satisfied_by(&Value::from("a")));
        assert!(!desc.is_satisfied_by(&Value::Null));
    }

    #[test]
    fn test_nested_lists() {
        let desc = TypeDescriptor::list_of(TypeDescriptor::list_of(text()));

        let valid = Value::List(vec![Value::list(["x"]), Value::empty_list()]);
        assert!(desc.is_satisfied_by(&valid));

        let invalid = Value::List(vec![Value::List(vec![Value::from("x"), Value::from(7)])]);
        assert!(!desc.is_satisfied_by(&invalid));

        // a flat list where a list of lists is expected
        assert!(!desc.is_satisfied_by(&Value::list(["x"])));
    }

    #[test]
    fn test_deep_nesting() {
        let mut desc = text();
        let mut value = Value::from("leaf");
        for _ in 0..6 {
            desc = TypeDescriptor::list_of(desc);
            value = Value::List(vec![value, Value::empty_list()]);
        }
        assert!(desc.is_satisfied_by(&value));
    }

    #[test]
    fn test_descriptor_display() {
        let desc = TypeDescriptor::list_of(TypeDescriptor::optional(lang()));
        assert_eq!(desc.to_string(), "list of optional langstring");
    }

    #[test]
    fn test_validate_reports_index() {
        let desc = TypeDescriptor::list_of(text());
        let err = validate(
            "creators",
            &Value::List(vec![Value::from("Alice"), Value::from(42)]),
            &desc,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::type_mismatch("creators", "list of text", "integer at index 1")
        );
    }

    #[test]
    fn test_validate_reports_null() {
        let err = validate("label", &Value::Null, &text()).unwrap_err();
        assert!(err.to_string().contains("cannot be null"));
    }

    #[test]
    fn test_validate_and_set_assigns() {
        let mut sample = Sample::default();
        validate_and_set(&mut sample, "label", Value::from("John"), &text()).unwrap();
        assert_eq!(sample.label, "John");
        assert_eq!(sample.attribute("label"), Some(Value::from("John")));
    }

    #[test]
    fn test_validate_and_set_mismatch_leaves_value() {
        let mut sample = Sample {
            label: "before".to_string(),
            ..Default::default()
        };
        let err = validate_and_set(&mut sample, "label", Value::from(123), &text()).unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(sample.label, "before");
    }

    #[test]
    fn test_validate_and_set_optional_null() {
        let mut sample = Sample {
            age: Some(30),
            ..Default::default()
        };
        let desc = TypeDescriptor::optional(TypeDescriptor::exact(ValueKind::Integer));
        validate_and_set(&mut sample, "age", Value::Null, &desc).unwrap();
        assert_eq!(sample.age, None);
    }

    #[test]
    fn test_validate_and_set_non_optional_null() {
        let mut sample = Sample::default();
        let desc = TypeDescriptor::exact(ValueKind::Integer);
        let err = validate_and_set(&mut sample, "age", Value::Null, &desc).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_validate_and_set_undeclared() {
        let mut sample = Sample::default();
        let err = validate_and_set(&mut sample, "color", Value::from("red"), &text()).unwrap_err();
        assert_eq!(err, ModelError::undeclared("color", "Sample"));
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_validate_and_set_nested_list() {
        let mut sample = Sample::default();
        let grid = Value::List(vec![
            Value::list([LangString::new("a"), LangString::with_lang("b", "en")]),
            Value::empty_list(),
        ]);
        sample.set("grid", grid.clone()).unwrap();
        assert_eq!(sample.attribute("grid"), Some(grid));
        assert_eq!(sample.grid[1], Vec::<LangString>::new());
    }

    #[test]
    fn test_descriptor_disagreeing_with_field_is_rejected() {
        // passes the supplied descriptor but cannot be stored in a String field
        let mut sample = Sample {
            label: "kept".to_string(),
            ..Default::default()
        };
        let desc = TypeDescriptor::exact(ValueKind::Integer);
        let err = validate_and_set(&mut sample, "label", Value::from(5), &desc).unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(sample.label, "kept");
    }

    #[test]
    fn test_set_uses_declared_descriptor() {
        let mut sample = Sample::default();
        sample.set("tags", vec!["a", "b"]).unwrap();
        assert_eq!(sample.tags, vec!["a".to_string(), "b".to_string()]);

        let err = sample.set("tags", "a").unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(sample.tags.len(), 2);

        let err = sample.set("nickname", "Jo").unwrap_err();
        assert!(err.is_undeclared());
    }
}
