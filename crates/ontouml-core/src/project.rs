use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::element::ElementContext;
use crate::error::ModelError;
use crate::id::ElementId;
use crate::langstring::LangString;
use crate::named::{apply_initial, NamedElement, NamedElementInit, NamedElementRecord};
use crate::validation::{extract, AttributeSpec, Attributes, TypeDescriptor};
use crate::value::{Value, ValueKind};

/// How the ontology in a project is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OntologyRepresentationStyle {
    #[default]
    #[serde(rename = "ontoumlStyle")]
    OntoumlStyle,
    #[serde(rename = "ufoStyle")]
    UfoStyle,
}

impl OntologyRepresentationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            OntologyRepresentationStyle::OntoumlStyle => "ontoumlStyle",
            OntologyRepresentationStyle::UfoStyle => "ufoStyle",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ontoumlStyle" => Some(OntologyRepresentationStyle::OntoumlStyle),
            "ufoStyle" => Some(OntologyRepresentationStyle::UfoStyle),
            _ => None,
        }
    }
}

impl std::fmt::Display for OntologyRepresentationStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constructor input for [`Project`]: the named-element part plus any
/// project attributes by name.
#[derive(Debug, Clone, Default)]
pub struct ProjectInit {
    pub named: NamedElementInit,
    pub attributes: Vec<(String, Value)>,
}

impl ProjectInit {
    pub fn new(named: NamedElementInit) -> Self {
        Self {
            named,
            attributes: Vec::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }
}

/// An OntoUML project: a named element with publication metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ProjectRecord")]
pub struct Project {
    #[serde(flatten)]
    named: NamedElement,
    acronyms: Vec<String>,
    bibliographic_citations: Vec<String>,
    keywords: Vec<LangString>,
    landing_pages: Vec<String>,
    languages: Vec<String>,
    namespace: Option<String>,
    sources: Vec<String>,
    access_rights: Vec<String>,
    ontology_types: Vec<String>,
    themes: Vec<String>,
    license: Option<String>,
    contexts: Vec<String>,
    designed_for_task: Vec<String>,
    publisher: Option<String>,
    representation_style: OntologyRepresentationStyle,
}

/// Stored form of a [`Project`], with the named-element keys inlined so
/// that unknown keys are rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ProjectRecord {
    id: ElementId,
    created: DateTime<Utc>,
    #[serde(default)]
    modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pref_name: Option<LangString>,
    #[serde(default)]
    alt_names: Vec<LangString>,
    #[serde(default)]
    description: Option<LangString>,
    #[serde(default)]
    editorial_notes: Vec<LangString>,
    #[serde(default)]
    creators: Vec<String>,
    #[serde(default)]
    contributors: Vec<String>,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    acronyms: Vec<String>,
    #[serde(default)]
    bibliographic_citations: Vec<String>,
    #[serde(default)]
    keywords: Vec<LangString>,
    #[serde(default)]
    landing_pages: Vec<String>,
    #[serde(default)]
    languages: Vec<String>,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default)]
    access_rights: Vec<String>,
    #[serde(default)]
    ontology_types: Vec<String>,
    #[serde(default)]
    themes: Vec<String>,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    contexts: Vec<String>,
    #[serde(default)]
    designed_for_task: Vec<String>,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    representation_style: OntologyRepresentationStyle,
}

impl TryFrom<ProjectRecord> for Project {
    type Error = ModelError;

    fn try_from(record: ProjectRecord) -> Result<Self, Self::Error> {
        let named = NamedElement::try_from(NamedElementRecord {
            id: record.id,
            created: record.created,
            modified: record.modified,
            pref_name: record.pref_name,
            alt_names: record.alt_names,
            description: record.description,
            editorial_notes: record.editorial_notes,
            creators: record.creators,
            contributors: record.contributors,
            uri: record.uri,
        })?;
        Ok(Self {
            named,
            acronyms: record.acronyms,
            bibliographic_citations: record.bibliographic_citations,
            keywords: record.keywords,
            landing_pages: record.landing_pages,
            languages: record.languages,
            namespace: record.namespace,
            sources: record.sources,
            access_rights: record.access_rights,
            ontology_types: record.ontology_types,
            themes: record.themes,
            license: record.license,
            contexts: record.contexts,
            designed_for_task: record.designed_for_task,
            publisher: record.publisher,
            representation_style: record.representation_style,
        })
    }
}

impl Project {
    pub fn new(ctx: &ElementContext, init: ProjectInit) -> Result<Self, ModelError> {
        let named = NamedElement::new(ctx, init.named)?;
        let mut project = Self::from_named(named);
        apply_initial(&mut project, init.attributes)?;
        Ok(project)
    }

    fn from_named(named: NamedElement) -> Self {
        Self {
            named,
            acronyms: Vec::new(),
            bibliographic_citations: Vec::new(),
            keywords: Vec::new(),
            landing_pages: Vec::new(),
            languages: Vec::new(),
            namespace: None,
            sources: Vec::new(),
            access_rights: Vec::new(),
            ontology_types: Vec::new(),
            themes: Vec::new(),
            license: None,
            contexts: Vec::new(),
            designed_for_task: Vec::new(),
            publisher: None,
            representation_style: OntologyRepresentationStyle::default(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.named.id()
    }

    pub fn named(&self) -> &NamedElement {
        &self.named
    }

    pub fn named_mut(&mut self) -> &mut NamedElement {
        &mut self.named
    }

    pub fn acronyms(&self) -> &[String] {
        &self.acronyms
    }

    pub fn bibliographic_citations(&self) -> &[String] {
        &self.bibliographic_citations
    }

    pub fn keywords(&self) -> &[LangString] {
        &self.keywords
    }

    pub fn landing_pages(&self) -> &[String] {
        &self.landing_pages
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn access_rights(&self) -> &[String] {
        &self.access_rights
    }

    pub fn ontology_types(&self) -> &[String] {
        &self.ontology_types
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn contexts(&self) -> &[String] {
        &self.contexts
    }

    pub fn designed_for_task(&self) -> &[String] {
        &self.designed_for_task
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub fn representation_style(&self) -> OntologyRepresentationStyle {
        self.representation_style
    }

    pub fn set_namespace(&mut self, namespace: Option<String>) {
        self.namespace = namespace;
        self.named.touch();
    }

    pub fn set_license(&mut self, license: Option<String>) {
        self.license = license;
        self.named.touch();
    }

    pub fn set_publisher(&mut self, publisher: Option<String>) {
        self.publisher = publisher;
        self.named.touch();
    }

    pub fn set_representation_style(&mut self, style: OntologyRepresentationStyle) {
        self.representation_style = style;
        self.named.touch();
    }

    pub fn add_keyword(&mut self, keyword: LangString) {
        self.keywords.push(keyword);
        self.named.touch();
    }

    pub fn add_language(&mut self, language: impl Into<String>) {
        self.languages.push(language.into());
        self.named.touch();
    }

    fn project_schema() -> &'static [AttributeSpec] {
        static SCHEMA: OnceLock<Vec<AttributeSpec>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            let text = || TypeDescriptor::exact(ValueKind::Text);
            let texts = || TypeDescriptor::list_of(text());
            let optional_text = || TypeDescriptor::optional(text());

            let mut schema = NamedElement::named_schema().to_vec();
            schema.extend([
                AttributeSpec::new("acronyms", texts()),
                AttributeSpec::new("bibliographic_citations", texts()),
                AttributeSpec::new(
                    "keywords",
                    TypeDescriptor::list_of(TypeDescriptor::exact(ValueKind::LangString)),
                ),
                AttributeSpec::new("landing_pages", texts()),
                AttributeSpec::new("languages", texts()),
                AttributeSpec::new("namespace", optional_text()),
                AttributeSpec::new("sources", texts()),
                AttributeSpec::new("access_rights", texts()),
                AttributeSpec::new("ontology_types", texts()),
                AttributeSpec::new("themes", texts()),
                AttributeSpec::new("license", optional_text()),
                AttributeSpec::new("contexts", texts()),
                AttributeSpec::new("designed_for_task", texts()),
                AttributeSpec::new("publisher", optional_text()),
                AttributeSpec::new("representation_style", text()),
            ]);
            schema
        })
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.named == other.named
    }
}

impl Eq for Project {}

impl std::hash::Hash for Project {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.named.hash(state);
    }
}

impl Attributes for Project {
    fn element_name(&self) -> &'static str {
        "Project"
    }

    fn schema(&self) -> &'static [AttributeSpec] {
        Project::project_schema()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "acronyms" => Some(self.acronyms.clone().into()),
            "bibliographic_citations" => Some(self.bibliographic_citations.clone().into()),
            "keywords" => Some(self.keywords.clone().into()),
            "landing_pages" => Some(self.landing_pages.clone().into()),
            "languages" => Some(self.languages.clone().into()),
            "namespace" => Some(self.namespace.clone().into()),
            "sources" => Some(self.sources.clone().into()),
            "access_rights" => Some(self.access_rights.clone().into()),
            "ontology_types" => Some(self.ontology_types.clone().into()),
            "themes" => Some(self.themes.clone().into()),
            "license" => Some(self.license.clone().into()),
            "contexts" => Some(self.contexts.clone().into()),
            "designed_for_task" => Some(self.designed_for_task.clone().into()),
            "publisher" => Some(self.publisher.clone().into()),
            "representation_style" => Some(self.representation_style.as_str().into()),
            _ => self.named.attribute(name),
        }
    }

    fn write_attribute(&mut self, name: &str, value: Value) -> Result<(), ModelError> {
        let Some(declared) = self.descriptor_of(name) else {
            return Err(ModelError::undeclared(name, self.element_name()));
        };
        match name {
            "acronyms" => self.acronyms = extract(name, value, declared)?,
            "bibliographic_citations" => {
                self.bibliographic_citations = extract(name, value, declared)?
            }
            "keywords" => self.keywords = extract(name, value, declared)?,
            "landing_pages" => self.landing_pages = extract(name, value, declared)?,
            "languages" => self.languages = extract(name, value, declared)?,
            "namespace" => self.namespace = extract(name, value, declared)?,
            "sources" => self.sources = extract(name, value, declared)?,
            "access_rights" => self.access_rights = extract(name, value, declared)?,
            "ontology_types" => self.ontology_types = extract(name, value, declared)?,
            "themes" => self.themes = extract(name, value, declared)?,
            "license" => self.license = extract(name, value, declared)?,
            "contexts" => self.contexts = extract(name, value, declared)?,
            "designed_for_task" => self.designed_for_task = extract(name, value, declared)?,
            "publisher" => self.publisher = extract(name, value, declared)?,
            "representation_style" => {
                let raw: String = extract(name, value, declared)?;
                self.representation_style =
                    OntologyRepresentationStyle::parse(&raw).ok_or_else(|| {
                        ModelError::type_mismatch(
                            name,
                            "one of ontoumlStyle, ufoStyle",
                            format!("text \"{}\"", raw),
                        )
                    })?;
            }
            _ => return self.named.write_attribute(name, value),
        }
        Ok(())
    }

    fn after_write(&mut self, name: &str) {
        if name != "modified" {
            self.named.touch();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::ModelConfig;
    use crate::id::SequentialIds;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, 2, 14, 0, 0).unwrap()
    }

    fn test_context() -> (ElementContext, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let ctx = ElementContext::new(
            clock.clone(),
            Arc::new(SequentialIds::new()),
            ModelConfig::default(),
        );
        (ctx, clock)
    }

    #[test]
    fn test_project_defaults() {
        let (ctx, _) = test_context();
        let project = Project::new(&ctx, ProjectInit::default()).unwrap();

        assert!(project.acronyms().is_empty());
        assert!(project.keywords().is_empty());
        assert_eq!(project.namespace(), None);
        assert_eq!(
            project.representation_style(),
            OntologyRepresentationStyle::OntoumlStyle
        );
        assert_eq!(project.named().created(), start());
    }

    #[test]
    fn test_project_with_attributes() {
        let (ctx, _) = test_context();
        let init = ProjectInit::new(
            NamedElementInit::new().pref_name(LangString::with_lang("Traffic", "en")),
        )
        .attribute("acronyms", vec!["TRF"])
        .attribute("keywords", vec![LangString::new("roads")])
        .attribute("namespace", "https://example.org/traffic#")
        .attribute("representation_style", "ufoStyle");

        let project = Project::new(&ctx, init).unwrap();

        assert_eq!(project.acronyms(), ["TRF".to_string()]);
        assert_eq!(project.keywords()[0].text(), "roads");
        assert_eq!(project.namespace(), Some("https://example.org/traffic#"));
        assert_eq!(
            project.representation_style(),
            OntologyRepresentationStyle::UfoStyle
        );
        assert_eq!(
            project.named().pref_name().map(|n| n.text()),
            Some("Traffic")
        );
    }

    #[test]
    fn test_project_rejects_scalar_for_list() {
        let (ctx, _) = test_context();
        let init = ProjectInit::default().attribute("themes", "a");
        let err = Project::new(&ctx, init).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_project_rejects_unknown_attribute() {
        let (ctx, _) = test_context();
        let init = ProjectInit::default().attribute("elements", Value::empty_list());
        let err = Project::new(&ctx, init).unwrap_err();
        assert_eq!(err, ModelError::undeclared("elements", "Project"));
    }

    #[test]
    fn test_project_rejects_unknown_style() {
        let (ctx, _) = test_context();
        let mut project = Project::new(&ctx, ProjectInit::default()).unwrap();
        let err = project.set("representation_style", "umlStyle").unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(
            project.representation_style(),
            OntologyRepresentationStyle::OntoumlStyle
        );
    }

    #[test]
    fn test_project_set_named_attribute() {
        let (ctx, clock) = test_context();
        let mut project = Project::new(&ctx, ProjectInit::default()).unwrap();

        clock.advance(Duration::hours(1));
        project
            .set("creators", vec!["https://orcid.org/0000-0002"])
            .unwrap();
        assert_eq!(
            project.named().creators(),
            ["https://orcid.org/0000-0002".to_string()]
        );
        assert_eq!(
            project.named().modified(),
            Some(start() + Duration::hours(1))
        );
    }

    #[test]
    fn test_project_typed_setters() {
        let (ctx, clock) = test_context();
        let mut project = Project::new(&ctx, ProjectInit::default()).unwrap();

        clock.advance(Duration::minutes(3));
        project.add_language("en");
        project.set_license(Some("CC-BY-4.0".to_string()));
        project.named_mut().add_contributor("Bob");

        assert_eq!(project.languages(), ["en".to_string()]);
        assert_eq!(project.license(), Some("CC-BY-4.0"));
        assert_eq!(project.named().contributors(), ["Bob".to_string()]);
        assert_eq!(
            project.named().modified(),
            Some(start() + Duration::minutes(3))
        );
    }

    #[test]
    fn test_deserialize_project() {
        let json = serde_json::json!({
            "id": "00000000-0000-0000-0000-000000000007",
            "created": "2023-11-02T14:00:00Z",
            "prefName": { "text": "Traffic", "lang": "en" },
            "designedForTask": ["classification"],
            "representationStyle": "ufoStyle",
        });
        let project: Project = serde_json::from_value(json).unwrap();

        assert_eq!(project.named().created(), start());
        assert_eq!(project.named().pref_name().map(|n| n.text()), Some("Traffic"));
        assert_eq!(project.designed_for_task(), ["classification".to_string()]);
        assert_eq!(
            project.representation_style(),
            OntologyRepresentationStyle::UfoStyle
        );
    }

    #[test]
    fn test_deserialize_project_rejects_unknown_fields() {
        let json = serde_json::json!({
            "id": "00000000-0000-0000-0000-000000000007",
            "created": "2023-11-02T14:00:00Z",
            "elements": [],
        });
        assert!(serde_json::from_value::<Project>(json).is_err());
    }

    #[test]
    fn test_deserialize_project_checks_timestamps() {
        let json = serde_json::json!({
            "id": "00000000-0000-0000-0000-000000000007",
            "created": "2023-11-02T14:00:00Z",
            "modified": "2023-11-01T14:00:00Z",
        });
        assert!(serde_json::from_value::<Project>(json).is_err());
    }

    #[test]
    fn test_style_serialization_names() {
        assert_eq!(OntologyRepresentationStyle::UfoStyle.to_string(), "ufoStyle");
        assert_eq!(
            OntologyRepresentationStyle::parse("ontoumlStyle"),
            Some(OntologyRepresentationStyle::OntoumlStyle)
        );
    }
}
