use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::element::{BaseElement, ElementContext};
use crate::error::ModelError;
use crate::id::ElementId;
use crate::langstring::LangString;
use crate::validation::{extract, validate_and_set, AttributeSpec, Attributes, TypeDescriptor};
use crate::value::{Value, ValueKind};

/// Naming attributes in the order the constructor validates them.
pub const NAMING_ATTRIBUTES: [&str; 7] = [
    "pref_name",
    "alt_names",
    "description",
    "editorial_notes",
    "creators",
    "contributors",
    "uri",
];

/// Constructor input for [`NamedElement`]. Every field is a dynamic value
/// checked against the attribute's declared type; `Null` means "not given".
#[derive(Debug, Clone, Default)]
pub struct NamedElementInit {
    pub created: Value,
    pub modified: Value,
    pub pref_name: Value,
    pub alt_names: Value,
    pub description: Value,
    pub editorial_notes: Value,
    pub creators: Value,
    pub contributors: Value,
    pub uri: Value,
}

impl NamedElementInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(mut self, value: impl Into<Value>) -> Self {
        self.created = value.into();
        self
    }

    pub fn modified(mut self, value: impl Into<Value>) -> Self {
        self.modified = value.into();
        self
    }

    pub fn pref_name(mut self, value: impl Into<Value>) -> Self {
        self.pref_name = value.into();
        self
    }

    pub fn alt_names(mut self, value: impl Into<Value>) -> Self {
        self.alt_names = value.into();
        self
    }

    pub fn description(mut self, value: impl Into<Value>) -> Self {
        self.description = value.into();
        self
    }

    pub fn editorial_notes(mut self, value: impl Into<Value>) -> Self {
        self.editorial_notes = value.into();
        self
    }

    pub fn creators(mut self, value: impl Into<Value>) -> Self {
        self.creators = value.into();
        self
    }

    pub fn contributors(mut self, value: impl Into<Value>) -> Self {
        self.contributors = value.into();
        self
    }

    pub fn uri(mut self, value: impl Into<Value>) -> Self {
        self.uri = value.into();
        self
    }

    fn into_naming_values(self) -> [(&'static str, Value); 7] {
        [
            ("pref_name", self.pref_name),
            ("alt_names", self.alt_names),
            ("description", self.description),
            ("editorial_notes", self.editorial_notes),
            ("creators", self.creators),
            ("contributors", self.contributors),
            ("uri", self.uri),
        ]
    }
}

/// An ontology element carrying human-readable names and documentation.
///
/// Equality and hashing go by identifier only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "NamedElementRecord")]
pub struct NamedElement {
    #[serde(flatten)]
    base: BaseElement,
    pref_name: Option<LangString>,
    alt_names: Vec<LangString>,
    description: Option<LangString>,
    editorial_notes: Vec<LangString>,
    creators: Vec<String>,
    contributors: Vec<String>,
    uri: Option<String>,
}

/// Stored form of a [`NamedElement`]. Flat, so unknown keys are rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct NamedElementRecord {
    pub id: ElementId,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pref_name: Option<LangString>,
    #[serde(default)]
    pub alt_names: Vec<LangString>,
    #[serde(default)]
    pub description: Option<LangString>,
    #[serde(default)]
    pub editorial_notes: Vec<LangString>,
    #[serde(default)]
    pub creators: Vec<String>,
    #[serde(default)]
    pub contributors: Vec<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

impl TryFrom<NamedElementRecord> for NamedElement {
    type Error = ModelError;

    fn try_from(record: NamedElementRecord) -> Result<Self, Self::Error> {
        let base = BaseElement::restore(record.id, record.created, record.modified)?;
        Ok(Self {
            base,
            pref_name: record.pref_name,
            alt_names: record.alt_names,
            description: record.description,
            editorial_notes: record.editorial_notes,
            creators: record.creators,
            contributors: record.contributors,
            uri: record.uri,
        })
    }
}

impl NamedElement {
    /// Build a named element, validating each naming attribute in turn.
    ///
    /// Fails on the first invalid attribute; nothing is returned in that case.
    pub fn new(ctx: &ElementContext, mut init: NamedElementInit) -> Result<Self, ModelError> {
        let created = std::mem::take(&mut init.created);
        let modified = std::mem::take(&mut init.modified);
        let base = BaseElement::with_timestamps(ctx, created, modified)?;
        let mut element = Self::from_base(base);
        apply_initial(&mut element, init.into_naming_values())?;
        Ok(element)
    }

    /// A named element with no naming attributes set.
    pub fn empty(ctx: &ElementContext) -> Self {
        Self::from_base(BaseElement::new(ctx))
    }

    fn from_base(base: BaseElement) -> Self {
        Self {
            base,
            pref_name: None,
            alt_names: Vec::new(),
            description: None,
            editorial_notes: Vec::new(),
            creators: Vec::new(),
            contributors: Vec::new(),
            uri: None,
        }
    }

    pub fn base(&self) -> &BaseElement {
        &self.base
    }

    pub fn id(&self) -> ElementId {
        self.base.id()
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.base.created()
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.base.modified()
    }

    pub fn set_modified(&mut self, modified: Option<DateTime<Utc>>) -> Result<(), ModelError> {
        self.base.set_modified(modified)
    }

    pub fn pref_name(&self) -> Option<&LangString> {
        self.pref_name.as_ref()
    }

    pub fn alt_names(&self) -> &[LangString] {
        &self.alt_names
    }

    pub fn description(&self) -> Option<&LangString> {
        self.description.as_ref()
    }

    pub fn editorial_notes(&self) -> &[LangString] {
        &self.editorial_notes
    }

    pub fn creators(&self) -> &[String] {
        &self.creators
    }

    pub fn contributors(&self) -> &[String] {
        &self.contributors
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn set_pref_name(&mut self, pref_name: Option<LangString>) {
        self.pref_name = pref_name;
        self.base.touch();
    }

    pub fn set_alt_names(&mut self, alt_names: Vec<LangString>) {
        self.alt_names = alt_names;
        self.base.touch();
    }

    pub fn add_alt_name(&mut self, alt_name: LangString) {
        self.alt_names.push(alt_name);
        self.base.touch();
    }

    pub fn set_description(&mut self, description: Option<LangString>) {
        self.description = description;
        self.base.touch();
    }

    pub fn set_editorial_notes(&mut self, notes: Vec<LangString>) {
        self.editorial_notes = notes;
        self.base.touch();
    }

    pub fn add_editorial_note(&mut self, note: LangString) {
        self.editorial_notes.push(note);
        self.base.touch();
    }

    pub fn set_creators(&mut self, creators: Vec<String>) {
        self.creators = creators;
        self.base.touch();
    }

    pub fn add_creator(&mut self, creator: impl Into<String>) {
        self.creators.push(creator.into());
        self.base.touch();
    }

    pub fn set_contributors(&mut self, contributors: Vec<String>) {
        self.contributors = contributors;
        self.base.touch();
    }

    pub fn add_contributor(&mut self, contributor: impl Into<String>) {
        self.contributors.push(contributor.into());
        self.base.touch();
    }

    pub fn set_uri(&mut self, uri: Option<String>) {
        self.uri = uri;
        self.base.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.base.touch();
    }

    pub(crate) fn named_schema() -> &'static [AttributeSpec] {
        static SCHEMA: OnceLock<Vec<AttributeSpec>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            let lang = || TypeDescriptor::exact(ValueKind::LangString);
            let text = || TypeDescriptor::exact(ValueKind::Text);

            let mut schema = BaseElement::base_schema().to_vec();
            schema.extend([
                AttributeSpec::new("pref_name", TypeDescriptor::optional(lang())),
                AttributeSpec::new("alt_names", TypeDescriptor::list_of(lang())),
                AttributeSpec::new("description", TypeDescriptor::optional(lang())),
                AttributeSpec::new("editorial_notes", TypeDescriptor::list_of(lang())),
                AttributeSpec::new("creators", TypeDescriptor::list_of(text())),
                AttributeSpec::new("contributors", TypeDescriptor::list_of(text())),
                AttributeSpec::new("uri", TypeDescriptor::optional(text())),
            ]);
            schema
        })
    }
}

/// Validate and assign constructor inputs in order, stopping at the first
/// failure. A `Null` for a list attribute stands for the empty list.
pub(crate) fn apply_initial<T, N>(
    target: &mut T,
    values: impl IntoIterator<Item = (N, Value)>,
) -> Result<(), ModelError>
where
    T: Attributes,
    N: AsRef<str>,
{
    for (name, value) in values {
        let name = name.as_ref();
        let descriptor = target
            .descriptor_of(name)
            .ok_or_else(|| ModelError::undeclared(name, target.element_name()))?;
        let value = match value {
            Value::Null if descriptor.is_list() => Value::empty_list(),
            other => other,
        };
        validate_and_set(target, name, value, descriptor)?;
    }
    Ok(())
}

impl PartialEq for NamedElement {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl Eq for NamedElement {}

impl std::hash::Hash for NamedElement {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.base.hash(state);
    }
}

impl Attributes for NamedElement {
    fn element_name(&self) -> &'static str {
        "NamedElement"
    }

    fn schema(&self) -> &'static [AttributeSpec] {
        NamedElement::named_schema()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "pref_name" => Some(self.pref_name.clone().into()),
            "alt_names" => Some(self.alt_names.clone().into()),
            "description" => Some(self.description.clone().into()),
            "editorial_notes" => Some(self.editorial_notes.clone().into()),
            "creators" => Some(self.creators.clone().into()),
            "contributors" => Some(self.contributors.clone().into()),
            "uri" => Some(self.uri.clone().into()),
            _ => self.base.attribute(name),
        }
    }

    fn write_attribute(&mut self, name: &str, value: Value) -> Result<(), ModelError> {
        let Some(declared) = self.descriptor_of(name) else {
            return Err(ModelError::undeclared(name, self.element_name()));
        };
        match name {
            "pref_name" => self.pref_name = extract(name, value, declared)?,
            "alt_names" => self.alt_names = extract(name, value, declared)?,
            "description" => self.description = extract(name, value, declared)?,
            "editorial_notes" => self.editorial_notes = extract(name, value, declared)?,
            "creators" => self.creators = extract(name, value, declared)?,
            "contributors" => self.contributors = extract(name, value, declared)?,
            "uri" => self.uri = extract(name, value, declared)?,
            _ => return self.base.write_attribute(name, value),
        }
        Ok(())
    }

    fn after_write(&mut self, name: &str) {
        if name != "modified" {
            self.base.touch();
        }
    }
}
